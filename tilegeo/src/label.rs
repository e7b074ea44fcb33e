//! Bilingual labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A place name carried in Arabic and English.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub ar: String,
    #[serde(default)]
    pub en: String,
}

impl Label {
    pub fn new(ar: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            ar: ar.into(),
            en: en.into(),
        }
    }

    /// Exact match against either language.
    pub fn matches(&self, name: &str) -> bool {
        (!self.ar.is_empty() && self.ar == name) || (!self.en.is_empty() && self.en == name)
    }

    pub fn is_empty(&self) -> bool {
        self.ar.is_empty() && self.en.is_empty()
    }

    /// Label in the requested language, falling back to the other one.
    pub fn get(&self, arabic: bool) -> &str {
        let (primary, secondary) = if arabic {
            (&self.ar, &self.en)
        } else {
            (&self.en, &self.ar)
        };
        if primary.is_empty() {
            secondary
        } else {
            primary
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.en.is_empty(), self.ar.is_empty()) {
            (false, false) => write!(f, "{} ({})", self.en, self.ar),
            (false, true) => f.write_str(&self.en),
            (true, _) => f.write_str(&self.ar),
        }
    }
}
