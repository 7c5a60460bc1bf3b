//! Refresh-token request payload templates.
//!
//! Template values are either JSON literals, passed through untouched, or
//! strings that may embed placeholders from a fixed set:
//!
//! | Placeholder | Replaced with |
//! |-------------|---------------|
//! | `${TOKEN:refresh}` | Refresh credential of the previous token (empty if none) |
//! | `${TOKEN:access}` | Access credential of the previous token (empty if none) |
//! | `${ENV:<NAME>}` | Process configuration value `<NAME>` (empty if unset) |
//!
//! Any other `${KIND:arg}` form is rejected rather than passed through.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::auth::Token;

/// Errors in refresh payload templates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Placeholder kind is not one of `TOKEN` or `ENV`.
    #[error("unknown placeholder '{placeholder}' in field '{field}'")]
    UnknownPlaceholder {
        /// Payload field containing the placeholder.
        field: String,
        /// The raw placeholder text.
        placeholder: String,
    },

    /// `TOKEN:` placeholder names a field other than `access`/`refresh`.
    #[error("unknown token field '{name}' in field '{field}'")]
    UnknownTokenField {
        /// Payload field containing the placeholder.
        field: String,
        /// The token field name.
        name: String,
    },

    /// `ENV:` placeholder with an empty variable name.
    #[error("empty ENV placeholder in field '{field}'")]
    EmptyEnvName {
        /// Payload field containing the placeholder.
        field: String,
    },
}

/// Which credential of the previous token to substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenField {
    /// `${TOKEN:access}`.
    Access,
    /// `${TOKEN:refresh}`.
    Refresh,
}

/// A recognized placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Credential from the previous token.
    Token(TokenField),
    /// Named process configuration value.
    Env(String),
}

impl Placeholder {
    fn parse(field: &str, kind: &str, arg: &str, raw: &str) -> Result<Self, TemplateError> {
        match kind {
            "TOKEN" => match arg {
                "refresh" => Ok(Self::Token(TokenField::Refresh)),
                "access" => Ok(Self::Token(TokenField::Access)),
                other => Err(TemplateError::UnknownTokenField {
                    field: field.to_string(),
                    name: other.to_string(),
                }),
            },
            "ENV" => {
                if arg.trim().is_empty() {
                    Err(TemplateError::EmptyEnvName {
                        field: field.to_string(),
                    })
                } else {
                    Ok(Self::Env(arg.trim().to_string()))
                }
            }
            _ => Err(TemplateError::UnknownPlaceholder {
                field: field.to_string(),
                placeholder: raw.to_string(),
            }),
        }
    }

    fn resolve<F>(&self, previous: Option<&Token>, lookup_env: &F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            Self::Token(TokenField::Refresh) => previous
                .map(|t| t.refresh_token.clone())
                .unwrap_or_default(),
            Self::Token(TokenField::Access) => previous
                .map(|t| t.access_token.clone())
                .unwrap_or_default(),
            Self::Env(name) => lookup_env(name).unwrap_or_default(),
        }
    }
}

#[allow(clippy::expect_used)] // Regex is compile-time constant
fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_]+):([^}]*)\}").expect("placeholder regex is valid")
    })
}

/// Field name → literal or placeholder string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshTemplate(BTreeMap<String, Value>);

impl RefreshTemplate {
    /// Build a template from field/value pairs.
    pub fn new<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Whether the template has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every placeholder used by the template, in field order.
    ///
    /// # Errors
    ///
    /// Returns the first unrecognized placeholder.
    pub fn placeholders(&self) -> Result<Vec<Placeholder>, TemplateError> {
        let mut found = Vec::new();
        for (field, value) in &self.0 {
            let Value::String(text) = value else {
                continue;
            };
            for cap in placeholder_regex().captures_iter(text) {
                found.push(parse_capture(field, &cap)?);
            }
        }
        Ok(found)
    }

    /// Check that every placeholder is recognized.
    ///
    /// # Errors
    ///
    /// Returns the first unrecognized placeholder.
    pub fn validate(&self) -> Result<(), TemplateError> {
        self.placeholders().map(|_| ())
    }

    /// Render the payload, substituting placeholders.
    ///
    /// `lookup_env` supplies `${ENV:<NAME>}` values.
    ///
    /// # Errors
    ///
    /// Returns an error for unrecognized placeholders.
    pub fn render<F>(
        &self,
        previous: Option<&Token>,
        lookup_env: F,
    ) -> Result<Map<String, Value>, TemplateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut payload = Map::new();
        for (field, value) in &self.0 {
            let rendered = match value {
                Value::String(text) => {
                    Value::String(render_string(field, text, previous, &lookup_env)?)
                }
                literal => literal.clone(),
            };
            payload.insert(field.clone(), rendered);
        }
        Ok(payload)
    }
}

fn parse_capture(field: &str, cap: &Captures<'_>) -> Result<Placeholder, TemplateError> {
    let raw = cap.get(0).map_or("", |m| m.as_str());
    let kind = cap.get(1).map_or("", |m| m.as_str());
    let arg = cap.get(2).map_or("", |m| m.as_str());
    Placeholder::parse(field, kind, arg, raw)
}

fn render_string<F>(
    field: &str,
    text: &str,
    previous: Option<&Token>,
    lookup_env: &F,
) -> Result<String, TemplateError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut rendered = String::with_capacity(text.len());
    let mut last = 0;

    for cap in placeholder_regex().captures_iter(text) {
        let Some(whole) = cap.get(0) else {
            continue;
        };
        let placeholder = parse_capture(field, &cap)?;
        rendered.push_str(&text[last..whole.start()]);
        rendered.push_str(&placeholder.resolve(previous, lookup_env));
        last = whole.end();
    }

    rendered.push_str(&text[last..]);
    Ok(rendered)
}
