//! Brand - a promoted product selected for the cycle

use serde::{Deserialize, Serialize};

/// Brand as selected in the market step. Accepts either a bare name or a
/// `{ "name": .., "code": .. }` object when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBrand")]
pub struct Brand {
    /// Display name, also the join key against DS_BRAND
    pub name: String,
    /// Short code used in submission routing; resolved from config when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBrand {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        code: Option<String>,
    },
}

impl From<RawBrand> for Brand {
    fn from(raw: RawBrand) -> Self {
        match raw {
            RawBrand::Name(name) => Brand { name, code: None },
            RawBrand::Full { name, code } => Brand { name, code },
        }
    }
}

impl Brand {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Name comparison used for every brand match in the bundle
    pub fn matches(&self, other: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(other.trim())
    }
}
