use serde::{Deserialize, Serialize};
use std::fmt;

/// A node name in the rule system's type lattice (not a Rust type).
///
/// Semantic types are closed-world: every type a rule mentions must be
/// declared in the lattice the rule library ships alongside it. Examples:
/// `Number`, `Number/Integer`, `Temporal`, `Temporal/Date`, `PK`, `FK`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemanticType(pub String);

impl SemanticType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SemanticType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SemanticType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
