use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle operation requested for a contact center user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Provision,
    Deprovision,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::Provision, Action::Deprovision];

    /// Exact, case-sensitive match against the attribute values the dispatcher
    /// writes. Anything else is not an action.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "provision" => Some(Self::Provision),
            "deprovision" => Some(Self::Deprovision),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provision => "provision",
            Self::Deprovision => "deprovision",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_values() {
        assert_eq!(Action::parse("provision"), Some(Action::Provision));
        assert_eq!(Action::parse("deprovision"), Some(Action::Deprovision));
    }

    #[test]
    fn parse_is_case_sensitive_and_rejects_padding() {
        assert_eq!(Action::parse("Provision"), None);
        assert_eq!(Action::parse(" provision"), None);
        assert_eq!(Action::parse(""), None);
        assert_eq!(Action::parse("suspend"), None);
    }

    #[test]
    fn as_str_matches_parse() {
        for action in Action::ALL {
            assert_eq!(Action::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn serializes_lowercase() {
        let encoded = serde_json::to_string(&Action::Deprovision).expect("action should serialize");
        assert_eq!(encoded, "\"deprovision\"");
    }
}
