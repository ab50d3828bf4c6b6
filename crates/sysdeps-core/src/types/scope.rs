//! Dependency scopes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Usage classification of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Needed to compile and run (the default)
    #[default]
    Compile,
    /// Needed only at runtime
    Runtime,
    /// Supplied by the environment at runtime
    Provided,
    /// Needed only by tests
    Test,
}

impl Scope {
    /// Parse a scope string. Unknown or empty values fall back to `Compile`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "runtime" => Scope::Runtime,
            "provided" => Scope::Provided,
            "test" => Scope::Test,
            _ => Scope::Compile,
        }
    }

    /// Parse an optional scope, treating `None` as `Compile`
    pub fn parse_opt(value: Option<&str>) -> Self {
        value.map(Self::parse).unwrap_or_default()
    }

    /// Strength of this scope when several declarations disagree.
    ///
    /// `test < provided < runtime < compile`
    pub fn priority(self) -> u8 {
        match self {
            Scope::Test => 0,
            Scope::Provided => 1,
            Scope::Runtime => 2,
            Scope::Compile => 3,
        }
    }

    /// Check if this scope outranks `other`
    pub fn outranks(self, other: Scope) -> bool {
        self.priority() > other.priority()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::Test => "test",
        }
    }

    pub fn is_test(self) -> bool {
        self == Scope::Test
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
