use std::fmt;

/// Raised while loading a scoring configuration; never produced mid-scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub section: &'static str,
    pub detail: String,
}

impl ConfigError {
    pub fn new(section: &'static str, detail: impl Into<String>) -> Self {
        Self {
            section,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid scoring config (section={}): {}", self.section, self.detail)
    }
}

impl std::error::Error for ConfigError {}
