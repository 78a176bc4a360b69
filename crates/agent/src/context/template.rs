//! Prompt templates with reserved placeholders.
//!
//! Only the names in [`Field`] are placeholders. Any other `{...}` text,
//! including JSON copied from an OpenAPI document, is emitted literally, so
//! tool descriptions never need brace escaping.

/// A reserved placeholder name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Input,
    Language,
    CurrentTime,
    ChatHistory,
    ToolsNames,
    ToolsDescription,
    HumanPrefix,
    AiPrefix,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Input,
        Field::Language,
        Field::CurrentTime,
        Field::ChatHistory,
        Field::ToolsNames,
        Field::ToolsDescription,
        Field::HumanPrefix,
        Field::AiPrefix,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Input => "input",
            Field::Language => "language",
            Field::CurrentTime => "current_time",
            Field::ChatHistory => "chat_history",
            Field::ToolsNames => "tools_names",
            Field::ToolsDescription => "tools_description",
            Field::HumanPrefix => "human_prefix",
            Field::AiPrefix => "ai_prefix",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

/// Values substituted into a template. Unset fields render empty.
#[derive(Debug, Clone, Default)]
pub struct PromptFields {
    pub input: String,
    pub language: String,
    pub current_time: String,
    pub chat_history: String,
    pub tools_names: Vec<String>,
    pub tools_description: String,
    pub human_prefix: String,
    pub ai_prefix: String,
}

impl PromptTemplate {
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let field = after
                .find('}')
                .and_then(|close| Field::from_name(&after[..close]).map(|f| (close, f)));
            match field {
                Some((close, field)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                    rest = &after[close + 1..];
                }
                None => {
                    literal.push('{');
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Whether the template references `field`.
    pub fn uses(&self, field: Field) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field(f) if *f == field))
    }

    pub fn render(&self, fields: &PromptFields) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::Input) => out.push_str(&fields.input),
                Segment::Field(Field::Language) => out.push_str(&fields.language),
                Segment::Field(Field::CurrentTime) => out.push_str(&fields.current_time),
                Segment::Field(Field::ChatHistory) => out.push_str(&fields.chat_history),
                Segment::Field(Field::ToolsNames) => out.push_str(&fields.tools_names.join(", ")),
                Segment::Field(Field::ToolsDescription) => {
                    out.push_str(&fields.tools_description)
                }
                Segment::Field(Field::HumanPrefix) => out.push_str(&fields.human_prefix),
                Segment::Field(Field::AiPrefix) => out.push_str(&fields.ai_prefix),
            }
        }
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::parse(DEFAULT_TEMPLATE)
    }
}

/// Plain chat prompt.
pub const DEFAULT_TEMPLATE: &str = "\
The following is a friendly conversation between {human_prefix} and {ai_prefix}.
{ai_prefix} answers in {language}. The current time is {current_time}.

{chat_history}
{human_prefix}: {input}
{ai_prefix}:";

/// Prompt used when a plugin is enabled.
pub const DEFAULT_TOOLS_TEMPLATE: &str = "\
The following is a conversation between {human_prefix} and {ai_prefix}, who can use tools.
{ai_prefix} answers in {language}. The current time is {current_time}.

{tools_description}

Tool names: {tools_names}

{chat_history}
{human_prefix}: {input}
";
