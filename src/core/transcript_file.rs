//! JSON Lines transcript files: one message object per line.
//!
//! ```text
//! {"type": "agent", "heading": "Planning", "kvps": {"thoughts": "..."}}
//! {"type": "code_exe", "command": "ls", "content": "a\nb\n"}
//! ```

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::core::message::{KvRow, KvValue, MessageBody, MessageType, NewMessage};

const IMAGE_SCHEME: &str = "img://";

#[derive(Debug)]
pub enum TranscriptLoadError {
    Read { path: PathBuf, source: io::Error },
    Parse { line: usize, source: serde_json::Error },
}

impl fmt::Display for TranscriptLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptLoadError::Read { path, source } => {
                write!(f, "Failed to read transcript {}: {}", path.display(), source)
            }
            TranscriptLoadError::Parse { line, source } => {
                write!(f, "Invalid transcript record on line {}: {}", line, source)
            }
        }
    }
}

impl Error for TranscriptLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TranscriptLoadError::Read { source, .. } => Some(source),
            TranscriptLoadError::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    heading: Option<String>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    kvps: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    temp: bool,
    #[serde(default)]
    latex: bool,
    #[serde(default)]
    command: Option<String>,
}

/// One transcript line ready to be rendered.
#[derive(Debug, Clone)]
pub struct TranscriptRecord {
    pub message: NewMessage,
    /// Transient progress message, superseded by whatever comes next.
    pub temp: bool,
}

pub fn load_transcript(path: &Path) -> Result<Vec<TranscriptRecord>, TranscriptLoadError> {
    let text = fs::read_to_string(path).map_err(|source| TranscriptLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_transcript(&text)
}

pub fn parse_transcript(text: &str) -> Result<Vec<TranscriptRecord>, TranscriptLoadError> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawRecord = serde_json::from_str(line)
            .map_err(|source| TranscriptLoadError::Parse {
                line: idx + 1,
                source,
            })?;
        records.push(raw.into_record());
    }
    Ok(records)
}

impl RawRecord {
    fn into_record(self) -> TranscriptRecord {
        let ty = self
            .kind
            .as_deref()
            .map_or(MessageType::Default, MessageType::from_wire);
        let mut body = MessageBody::text(self.content);
        body.heading = self.heading.filter(|heading| !heading.trim().is_empty());
        body.latex = self.latex;
        if let Some(kvps) = self.kvps {
            body.kvps = kv_rows(kvps);
        }
        let mut message = NewMessage::new(ty, body);
        message.command = self.command;
        TranscriptRecord {
            message,
            temp: self.temp,
        }
    }
}

/// Rows in declaration order. `tool_args` is flattened so each argument
/// gets its own row.
fn kv_rows(kvps: serde_json::Map<String, Value>) -> Vec<KvRow> {
    let mut rows = Vec::with_capacity(kvps.len());
    for (key, value) in kvps {
        match value {
            Value::Object(args) if key == "tool_args" => {
                rows.extend(args.into_iter().map(|(arg, value)| KvRow {
                    key: arg,
                    values: kv_values(value),
                }));
            }
            value => rows.push(KvRow {
                key,
                values: kv_values(value),
            }),
        }
    }
    rows
}

fn kv_values(value: Value) -> Vec<KvValue> {
    match value {
        Value::String(text) => vec![string_value(text)],
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(string_value(text)),
                _ => None,
            })
            .collect(),
        Value::Array(_) | Value::Object(_) => vec![KvValue::Text(
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
        )],
        Value::Null => Vec::new(),
        other => vec![KvValue::Text(other.to_string())],
    }
}

fn string_value(text: String) -> KvValue {
    match text.strip_prefix(IMAGE_SCHEME) {
        Some(path) => KvValue::Image(path.to_string()),
        None => KvValue::Text(text),
    }
}
