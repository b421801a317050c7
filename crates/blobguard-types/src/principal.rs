use std::fmt;

use serde::{Deserialize, Serialize};

/// The identity a request is evaluated as.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Principal {
    Anonymous,
    User { name: String },
}

impl Principal {
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self::User { name: name.into() }
    }

    /// The user name, or `None` for anonymous requests.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::User { name } => Some(name),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("anonymous"),
            Self::User { name } => write!(f, "user:{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_variants() {
        let a = Principal::anonymous();
        assert!(a.is_anonymous());
        assert_eq!(a.name(), None);
        assert_eq!(a.to_string(), "anonymous");

        let u = Principal::user("alice");
        assert!(!u.is_anonymous());
        assert_eq!(u.name(), Some("alice"));
        assert_eq!(u.to_string(), "user:alice");
    }
}
