#![forbid(unsafe_code)]

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How the health percentage is rounded for display.
///
/// Stored either as its ordinal (`0..=3`) or as its lowercase name. Anything
/// unrecognized falls back to [`RoundingPolicy::Ceiling`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "PolicyRepr", into = "String")]
pub enum RoundingPolicy {
    /// Two decimals, trailing zeros dropped.
    Keep,
    #[default]
    Ceiling,
    Round,
    Floor,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyRepr {
    Ordinal(i64),
    Name(String),
}

impl RoundingPolicy {
    pub const ALL: [RoundingPolicy; 4] = [Self::Keep, Self::Ceiling, Self::Round, Self::Floor];

    pub fn from_ordinal(value: i64) -> Self {
        match value {
            0 => Self::Keep,
            1 => Self::Ceiling,
            2 => Self::Round,
            3 => Self::Floor,
            _ => Self::default(),
        }
    }

    pub fn ordinal(self) -> i64 {
        match self {
            Self::Keep => 0,
            Self::Ceiling => 1,
            Self::Round => 2,
            Self::Floor => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Ceiling => "ceiling",
            Self::Round => "round",
            Self::Floor => "floor",
        }
    }
}

impl From<PolicyRepr> for RoundingPolicy {
    fn from(repr: PolicyRepr) -> Self {
        match repr {
            PolicyRepr::Ordinal(value) => Self::from_ordinal(value),
            PolicyRepr::Name(name) => name.parse().unwrap_or_default(),
        }
    }
}

impl From<RoundingPolicy> for String {
    fn from(policy: RoundingPolicy) -> Self {
        policy.name().to_owned()
    }
}

impl FromStr for RoundingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|policy| policy.name() == needle)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "rounding policy",
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ordinal_falls_back_to_ceiling() {
        assert_eq!(RoundingPolicy::from_ordinal(7), RoundingPolicy::Ceiling);
        assert_eq!(RoundingPolicy::from_ordinal(-1), RoundingPolicy::Ceiling);
    }

    #[test]
    fn ordinals_are_stable() {
        for policy in RoundingPolicy::ALL {
            assert_eq!(RoundingPolicy::from_ordinal(policy.ordinal()), policy);
        }
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Floor".parse::<RoundingPolicy>().unwrap(), RoundingPolicy::Floor);
        assert!("nearest".parse::<RoundingPolicy>().is_err());
    }
}
