//! Process environment secret source.

use crate::application::ports::SecretSource;

/// Reads `${ENV:<NAME>}` values from the process environment.
///
/// Empty variables are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvSecrets;

impl SecretSource for ProcessEnvSecrets {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}
