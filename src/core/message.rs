use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a transcript message. Every message of one type
/// shares a single display preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MessageType {
    User,
    Agent,
    Response,
    Tool,
    CodeExe,
    Browser,
    Info,
    Warning,
    Error,
    Default,
}

impl MessageType {
    pub const ALL: [MessageType; 10] = [
        MessageType::User,
        MessageType::Agent,
        MessageType::Response,
        MessageType::Tool,
        MessageType::CodeExe,
        MessageType::Browser,
        MessageType::Info,
        MessageType::Warning,
        MessageType::Error,
        MessageType::Default,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::User => "user",
            MessageType::Agent => "agent",
            MessageType::Response => "response",
            MessageType::Tool => "tool",
            MessageType::CodeExe => "code_exe",
            MessageType::Browser => "browser",
            MessageType::Info => "info",
            MessageType::Warning => "warning",
            MessageType::Error => "error",
            MessageType::Default => "default",
        }
    }

    /// Resolve a producer-side message kind. Kinds without a dedicated
    /// display type fold into the closest one; anything unknown is `Default`.
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "rate_limit" => MessageType::Warning,
            "hint" => MessageType::Info,
            "util" => MessageType::Default,
            "delegation" => MessageType::Agent,
            other => MessageType::try_from(other).unwrap_or(MessageType::Default),
        }
    }

    /// Header label shown above the message body.
    pub fn label(self) -> &'static str {
        match self {
            MessageType::User => "User message",
            MessageType::Agent => "Agent",
            MessageType::Response => "Response",
            MessageType::Tool => "Tool",
            MessageType::CodeExe => "Code execution",
            MessageType::Browser => "Browser",
            MessageType::Info => "Info",
            MessageType::Warning => "Warning",
            MessageType::Error => "Error",
            MessageType::Default => "Message",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MessageType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, String> {
        match value {
            "user" => Ok(MessageType::User),
            "agent" => Ok(MessageType::Agent),
            "response" => Ok(MessageType::Response),
            "tool" => Ok(MessageType::Tool),
            "code_exe" => Ok(MessageType::CodeExe),
            "browser" => Ok(MessageType::Browser),
            "info" => Ok(MessageType::Info),
            "warning" => Ok(MessageType::Warning),
            "error" => Ok(MessageType::Error),
            "default" => Ok(MessageType::Default),
            _ => Err(format!("invalid message type: {value}")),
        }
    }
}

impl TryFrom<String> for MessageType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        Self::try_from(value.as_str())
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        value.as_str().to_string()
    }
}

/// Synthetic identity assigned to every message when it enters the
/// transcript. Never reused within one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub(crate) u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvValue {
    Text(String),
    /// `img://` reference; the payload is the referenced path.
    Image(String),
}

impl KvValue {
    pub fn text(&self) -> &str {
        match self {
            KvValue::Text(text) => text,
            KvValue::Image(path) => path,
        }
    }
}

/// One key/value row of a structured message, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvRow {
    pub key: String,
    pub values: Vec<KvValue>,
}

impl KvRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: vec![KvValue::Text(value.into())],
        }
    }

    /// Rows for reasoning keys wrap instead of scrolling horizontally.
    pub fn is_thoughts(&self) -> bool {
        self.key == "thoughts" || self.key == "reflection"
    }

    /// All values joined the way they are rendered, one per line.
    pub fn value_text(&self) -> String {
        self.values
            .iter()
            .map(KvValue::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBody {
    pub heading: Option<String>,
    pub kvps: Vec<KvRow>,
    pub content: String,
    /// Run the math hook over this message's text.
    pub latex: bool,
}

impl MessageBody {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn with_kvps(mut self, kvps: Vec<KvRow>) -> Self {
        self.kvps = kvps;
        self
    }

    /// Text copied by the copy control: the content when present, otherwise
    /// the key/value values.
    pub fn copy_text(&self) -> String {
        if !self.content.trim().is_empty() {
            return self.content.trim().to_string();
        }
        self.kvps
            .iter()
            .map(KvRow::value_text)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

/// A message as handed over by a renderer, before it becomes a handle.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub ty: MessageType,
    pub body: MessageBody,
    /// Command text shown as a one-line summary for code execution messages.
    pub command: Option<String>,
    pub streaming: bool,
}

impl NewMessage {
    pub fn new(ty: MessageType, body: MessageBody) -> Self {
        Self {
            ty,
            body,
            command: None,
            streaming: false,
        }
    }

    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_aliases_fold_into_display_types() {
        assert_eq!(MessageType::from_wire("rate_limit"), MessageType::Warning);
        assert_eq!(MessageType::from_wire("hint"), MessageType::Info);
        assert_eq!(MessageType::from_wire("util"), MessageType::Default);
        assert_eq!(MessageType::from_wire("code_exe"), MessageType::CodeExe);
        assert_eq!(MessageType::from_wire("mystery"), MessageType::Default);
    }

    #[test]
    fn invalid_type_strings_are_rejected() {
        assert!(MessageType::try_from("rate_limit").is_err());
        assert_eq!(MessageType::try_from("tool"), Ok(MessageType::Tool));
    }

    #[test]
    fn copy_text_falls_back_to_kv_values() {
        let body = MessageBody::default().with_kvps(vec![
            KvRow::new("thoughts", "checking the logs"),
            KvRow::new("tool_name", "grep"),
        ]);
        assert_eq!(body.copy_text(), "checking the logs\ngrep");
    }
}
