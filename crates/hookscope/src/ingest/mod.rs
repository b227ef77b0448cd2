//! Reading webhook payload files.
//!
//! A file holds either one JSON document (an envelope, or an array of
//! envelopes) or JSON Lines with one envelope per line.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Document,
    DocumentArray,
    JsonLines,
}

impl InputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "json",
            Self::DocumentArray => "json_array",
            Self::JsonLines => "jsonl",
        }
    }
}

/// One envelope read from the input, or the reason it could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDocument {
    /// 1-based position within the file.
    pub index: usize,
    /// 1-based source line for JSON Lines input.
    pub line: Option<usize>,
    pub parsed: Result<Value, String>,
}

impl InputDocument {
    #[must_use]
    pub fn label(&self) -> String {
        match self.line {
            Some(line) => format!("line {line}"),
            None => format!("document {}", self.index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputBatch {
    pub format: InputFormat,
    pub documents: Vec<InputDocument>,
}

pub fn read_input_file(path: &Path) -> Result<InputBatch> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file: {}", path.display()))?;
    Ok(parse_input(&input))
}

/// Splits raw input into documents. Lines that fail to parse become per-document
/// failures instead of failing the batch.
#[must_use]
pub fn parse_input(input: &str) -> InputBatch {
    if let Ok(value) = serde_json::from_str::<Value>(input) {
        return match value {
            Value::Array(items) => InputBatch {
                format: InputFormat::DocumentArray,
                documents: items
                    .into_iter()
                    .enumerate()
                    .map(|(position, item)| InputDocument {
                        index: position + 1,
                        line: None,
                        parsed: Ok(item),
                    })
                    .collect(),
            },
            other => InputBatch {
                format: InputFormat::Document,
                documents: vec![InputDocument {
                    index: 1,
                    line: None,
                    parsed: Ok(other),
                }],
            },
        };
    }

    let mut documents = Vec::new();
    for (line_index, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed = serde_json::from_str::<Value>(trimmed)
            .map_err(|error| format!("invalid JSON: {error}"));
        documents.push(InputDocument {
            index: documents.len() + 1,
            line: Some(line_index + 1),
            parsed,
        });
    }

    InputBatch {
        format: InputFormat::JsonLines,
        documents,
    }
}

#[cfg(test)]
mod tests {
    use super::{InputFormat, parse_input};

    #[test]
    fn single_document() {
        let batch = parse_input(r#"{"object": "page", "entry": []}"#);
        assert_eq!(batch.format, InputFormat::Document);
        assert_eq!(batch.documents.len(), 1);
        assert_eq!(batch.documents[0].label(), "document 1");
    }

    #[test]
    fn array_of_documents() {
        let batch = parse_input(r#"[{"object": "page"}, {"object": "instagram"}]"#);
        assert_eq!(batch.format, InputFormat::DocumentArray);
        assert_eq!(batch.documents.len(), 2);
        assert_eq!(batch.documents[1].index, 2);
    }

    #[test]
    fn json_lines_keep_line_numbers_and_bad_lines() {
        let batch = parse_input("{\"object\": \"page\"}\n\n{not json}\n{\"object\": \"page\"}\n");
        assert_eq!(batch.format, InputFormat::JsonLines);
        assert_eq!(batch.documents.len(), 3);
        assert_eq!(batch.documents[1].line, Some(3));
        assert_eq!(batch.documents[1].label(), "line 3");
        assert!(
            batch.documents[1]
                .parsed
                .as_ref()
                .is_err_and(|error| error.starts_with("invalid JSON")),
        );
        assert_eq!(batch.documents[2].index, 3);
    }
}
