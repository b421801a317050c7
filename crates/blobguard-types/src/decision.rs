use std::fmt;

/// Outcome of an authorization check. Computed fresh per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Forbidden,
    NotFound,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::Forbidden => f.write_str("forbidden"),
            Self::NotFound => f.write_str("not-found"),
        }
    }
}
