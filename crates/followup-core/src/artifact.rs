//! The answer file handed from the prompt process back to the asker.
//!
//! Schema: a JSON object with either a `result` field (string or null) or an
//! `error` field (string). The file is written once, atomically, and its
//! appearance is the only synchronization signal between the two processes.

use std::fs;
use std::{error, fmt};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;

/// Contents of the answer file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultArtifact {
    /// The prompt failed internally.
    Error { error: String },
    /// The prompt finished; `None` means the user cancelled.
    Answer { result: Option<String> },
}

/// Why an answer file could not be turned into a [`ResultArtifact`].
#[derive(Debug)]
pub enum ArtifactError {
    Io(io::Error),
    Malformed(String),
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::Io(e) => write!(f, "could not read response file: {e}"),
            ArtifactError::Malformed(detail) => write!(f, "{detail}"),
        }
    }
}

impl error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ArtifactError::Io(e) => Some(e),
            ArtifactError::Malformed(_) => None,
        }
    }
}

impl ResultArtifact {
    pub fn answered(text: impl Into<String>) -> Self {
        ResultArtifact::Answer {
            result: Some(text.into()),
        }
    }

    pub fn cancelled() -> Self {
        ResultArtifact::Answer { result: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ResultArtifact::Error {
            error: message.into(),
        }
    }

    /// Parses answer file contents.
    ///
    /// An `error` field wins over `result` when both are present. Anything
    /// that is not an object with one of those two fields is malformed.
    ///
    /// # Errors
    /// Returns [`ArtifactError::Malformed`] for invalid JSON or schema.
    pub fn parse(content: &str) -> Result<Self, ArtifactError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ArtifactError::Malformed(e.to_string()))?;

        let Value::Object(map) = value else {
            return Err(ArtifactError::Malformed(
                "expected a JSON object".to_string(),
            ));
        };

        if let Some(error) = map.get("error") {
            return match error {
                Value::String(message) => Ok(ResultArtifact::error(message.clone())),
                _ => Err(ArtifactError::Malformed(
                    "`error` must be a string".to_string(),
                )),
            };
        }

        match map.get("result") {
            Some(Value::Null) => Ok(ResultArtifact::cancelled()),
            Some(Value::String(text)) => Ok(ResultArtifact::answered(text.clone())),
            Some(_) => Err(ArtifactError::Malformed(
                "`result` must be a string or null".to_string(),
            )),
            None => Err(ArtifactError::Malformed(
                "missing `result` or `error` field".to_string(),
            )),
        }
    }

    /// Reads and parses the answer file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Self, ArtifactError> {
        let content = fs::read_to_string(path).map_err(ArtifactError::Io)?;
        Self::parse(&content)
    }

    /// Writes the artifact so that readers never observe a partial file.
    ///
    /// The JSON goes to a temp file in the destination directory, is synced,
    /// and is then renamed onto `path`.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("create temp file in {}", dir.display()))?;
        serde_json::to_writer(&mut file, self).context("serialize response")?;
        file.flush().context("flush response")?;
        file.as_file().sync_all().context("sync response")?;
        file.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("move response into {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(
            ResultArtifact::parse(r#"{"result": "Yes"}"#).unwrap(),
            ResultArtifact::answered("Yes")
        );
    }

    #[test]
    fn test_parse_null_result_is_cancellation() {
        assert_eq!(
            ResultArtifact::parse(r#"{"result": null}"#).unwrap(),
            ResultArtifact::cancelled()
        );
    }

    #[test]
    fn test_parse_error_wins() {
        assert_eq!(
            ResultArtifact::parse(r#"{"result": "x", "error": "boom"}"#).unwrap(),
            ResultArtifact::error("boom")
        );
    }

    #[test]
    fn test_parse_rejects_malformed_content() {
        for content in ["", "{", "[]", "{}", r#"{"result": 3}"#, r#"{"error": null}"#] {
            assert!(
                matches!(ResultArtifact::parse(content), Err(ArtifactError::Malformed(_))),
                "{content:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_serialized_shape() {
        assert_eq!(
            serde_json::to_string(&ResultArtifact::cancelled()).unwrap(),
            r#"{"result":null}"#
        );
        assert_eq!(
            serde_json::to_string(&ResultArtifact::error("bad")).unwrap(),
            r#"{"error":"bad"}"#
        );
    }

    #[test]
    fn test_write_atomic_leaves_only_the_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("answer.json");
        let artifact = ResultArtifact::answered("line one\n\"quoted\" \\ done");

        artifact.write_atomic(&path).unwrap();

        assert_eq!(ResultArtifact::read(&path).unwrap(), artifact);
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = ResultArtifact::read(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(ArtifactError::Io(_))));
    }
}
