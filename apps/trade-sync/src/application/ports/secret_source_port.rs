//! Secret Source Port (Driven Port)
//!
//! Read-only access to process configuration values used by `${ENV:<NAME>}`
//! refresh placeholders.

use std::collections::HashMap;

/// Lookup of named configuration values.
pub trait SecretSource: Send + Sync {
    /// Value for `name`, if set.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Fixed in-memory secrets.
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets {
    values: HashMap<String, String>,
}

impl StaticSecrets {
    /// Create an empty secret set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for StaticSecrets
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl SecretSource for StaticSecrets {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
