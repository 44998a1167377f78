//! Outcome classes of a terminated path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How a sampled path ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeClass {
    /// The program finished normally.
    Success,
    /// The program hit an error (assertion, exception, ...).
    Error,
    /// Execution stopped at a constraint boundary (depth bound, solver limit).
    ConstraintBoundary,
}

impl OutcomeClass {
    pub const ALL: [OutcomeClass; 3] = [
        OutcomeClass::Success,
        OutcomeClass::Error,
        OutcomeClass::ConstraintBoundary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeClass::Success => "success",
            OutcomeClass::Error => "error",
            OutcomeClass::ConstraintBoundary => "constraint_boundary",
        }
    }
}

impl fmt::Display for OutcomeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" | "succ" => Ok(OutcomeClass::Success),
            "error" | "fail" | "failure" => Ok(OutcomeClass::Error),
            "constraint_boundary" | "constraint_hit" | "grey" => {
                Ok(OutcomeClass::ConstraintBoundary)
            }
            _ => Err(CoreError::UnknownOutcome(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_classes() {
        assert_eq!("success".parse::<OutcomeClass>().unwrap(), OutcomeClass::Success);
        assert_eq!("FAIL".parse::<OutcomeClass>().unwrap(), OutcomeClass::Error);
        assert_eq!(
            "constraint_hit".parse::<OutcomeClass>().unwrap(),
            OutcomeClass::ConstraintBoundary
        );
    }

    #[test]
    fn test_parse_unknown_class() {
        let err = "timeout".parse::<OutcomeClass>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownOutcome(ref s) if s == "timeout"));
    }

    #[test]
    fn test_display_roundtrips() {
        for class in OutcomeClass::ALL {
            assert_eq!(class.to_string().parse::<OutcomeClass>().unwrap(), class);
        }
    }
}
