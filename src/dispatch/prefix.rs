//! Route matching for chain registrations.
//!
//! A prefix is a literal string compared against the path component of the
//! request target. There is no pattern syntax and no segment boundary check:
//! `/hello` matches `/hello`, `/hello/there` and `/helloworld` alike. An empty
//! prefix matches every path.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutePrefix(String);

impl RoutePrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    /// Prefix that matches every path
    pub fn any() -> Self {
        Self(String::new())
    }

    pub fn is_any(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-sensitive literal prefix test against a request path
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(self.0.as_str())
    }
}

impl From<&str> for RoutePrefix {
    fn from(prefix: &str) -> Self {
        Self::new(prefix)
    }
}

impl From<String> for RoutePrefix {
    fn from(prefix: String) -> Self {
        Self(prefix)
    }
}

impl fmt::Display for RoutePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            f.write_str("*")
        } else {
            f.write_str(&self.0)
        }
    }
}
