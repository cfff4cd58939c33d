//! Intake validation for newly submitted translation keys.
//!
//! Duplicate detection is not done here: it needs the live collection, so
//! the orchestrator checks it while holding the store lock.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workflow::ItemEdits;

/// Maximum context length, in characters.
pub const MAX_CONTEXT_LEN: usize = 50;

/// Maximum key length, in characters.
pub const MAX_KEY_LEN: usize = 100;

/// Maximum source text length, in characters.
pub const MAX_SOURCE_TEXT_LEN: usize = 500;

/// How many offending keys a bulk import error lists before eliding.
const MAX_REPORTED_KEYS: usize = 3;

static KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z0-9._-]+$").expect("key pattern is valid"));

/// Intake rejected the submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("{field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("import is empty")]
    EmptyImport,

    #[error("invalid key format: {0}")]
    InvalidKeys(String),
}

/// A single key submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItemRequest {
    pub key: String,
    pub source_text: String,
    pub context: String,
}

impl NewItemRequest {
    pub fn new(
        key: impl Into<String>,
        source_text: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            source_text: source_text.into(),
            context: context.into(),
        }
    }

    /// Trim every field and check it against the intake rules.
    pub fn validate(self) -> Result<NewItemRequest, IntakeError> {
        let context = validate_context(&self.context)?;
        let key = validate_key(&self.key)?;
        let source_text = validate_source_text("source_text", &self.source_text)?;
        Ok(NewItemRequest {
            key,
            source_text,
            context,
        })
    }
}

/// Several keys sharing one context, submitted together.
///
/// Entries keep their submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkImportRequest {
    pub context: String,
    pub entries: Vec<(String, String)>,
}

impl BulkImportRequest {
    /// Build from a JSON object of `key -> source text`, in map order.
    pub fn from_json(
        context: impl Into<String>,
        entries: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, IntakeError> {
        let mut pairs = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let Some(text) = value.as_str() else {
                return Err(IntakeError::InvalidField {
                    field: "entries",
                    reason: format!("value for key \"{key}\" must be a string"),
                });
            };
            pairs.push((key.clone(), text.to_string()));
        }
        Ok(Self {
            context: context.into(),
            entries: pairs,
        })
    }

    /// Validate the whole batch, yielding one request per entry.
    pub fn validate(self) -> Result<Vec<NewItemRequest>, IntakeError> {
        let context = validate_context(&self.context)?;
        if self.entries.is_empty() {
            return Err(IntakeError::EmptyImport);
        }

        let invalid: Vec<&str> = self
            .entries
            .iter()
            .map(|(key, _)| key.as_str())
            .filter(|key| !KEY_PATTERN.is_match(key))
            .collect();
        if !invalid.is_empty() {
            return Err(IntakeError::InvalidKeys(summarize_keys(&invalid)));
        }

        self.entries
            .into_iter()
            .map(|(key, text)| {
                let key = validate_key(&key)?;
                let source_text = validate_source_text("entries", &text)?;
                Ok(NewItemRequest {
                    key,
                    source_text,
                    context: context.clone(),
                })
            })
            .collect()
    }
}

/// Join up to three keys, adding "..." when more were left out.
pub fn summarize_keys<S: AsRef<str>>(keys: &[S]) -> String {
    let shown: Vec<&str> = keys
        .iter()
        .take(MAX_REPORTED_KEYS)
        .map(|k| k.as_ref())
        .collect();
    let mut summary = shown.join(", ");
    if keys.len() > MAX_REPORTED_KEYS {
        summary.push_str("...");
    }
    summary
}

/// Hold reviewer edits to the same key and source text rules as intake.
///
/// Blank fields are left alone; the engine ignores them.
pub fn validate_edits(mut edits: ItemEdits) -> Result<ItemEdits, IntakeError> {
    if let Some(key) = edits.key() {
        edits.key = Some(validate_key(key)?);
    }
    if let Some(text) = edits.source_text() {
        edits.source_text = Some(validate_source_text("source_text", text)?);
    }
    Ok(edits)
}

fn validate_context(raw: &str) -> Result<String, IntakeError> {
    let context = raw.trim();
    if context.is_empty() {
        return Err(invalid("context", "context is required"));
    }
    if context.chars().count() > MAX_CONTEXT_LEN {
        return Err(invalid(
            "context",
            format!("context must be less than {MAX_CONTEXT_LEN} characters"),
        ));
    }
    Ok(context.to_string())
}

fn validate_key(raw: &str) -> Result<String, IntakeError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(invalid("key", "key is required"));
    }
    if key.chars().count() > MAX_KEY_LEN {
        return Err(invalid(
            "key",
            format!("key must be less than {MAX_KEY_LEN} characters"),
        ));
    }
    if !KEY_PATTERN.is_match(key) {
        return Err(invalid(
            "key",
            "key must contain only letters, numbers, dots, dashes, and underscores",
        ));
    }
    Ok(key.to_string())
}

fn validate_source_text(field: &'static str, raw: &str) -> Result<String, IntakeError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(invalid(field, "source text is required"));
    }
    if text.chars().count() > MAX_SOURCE_TEXT_LEN {
        return Err(invalid(
            field,
            format!("source text must be less than {MAX_SOURCE_TEXT_LEN} characters"),
        ));
    }
    Ok(text.to_string())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> IntakeError {
    IntakeError::InvalidField {
        field,
        reason: reason.into(),
    }
}
