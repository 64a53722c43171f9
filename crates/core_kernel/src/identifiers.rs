//! Identifiers for scoring events and claims
//!
//! Both are UUID v7 so they sort by creation time, which keeps the audit
//! table's primary key roughly append-ordered. The display form carries a
//! prefix (`SCR-…`, `CLM-…`); JSON carries the bare UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

macro_rules! scoring_identifier {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// A fresh time-ordered identifier
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        /// Accepts the prefixed display form or a bare UUID
        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|source| CoreError::InvalidIdentifier {
                        kind: stringify!($name),
                        value: s.to_string(),
                        source,
                    })
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

scoring_identifier!(
    /// One per scoring call; re-submitting a claim yields a new one
    ScoringId,
    "SCR"
);
scoring_identifier!(
    /// Assigned to a claim at ingest
    ClaimId,
    "CLM"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsing_with_and_without_prefix() {
        let original = ClaimId::new();
        let parsed: ClaimId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: ClaimId = original.as_uuid().to_string().parse().unwrap();
        assert_eq!(original, bare);
    }

    #[test]
    fn test_invalid_id_names_the_kind() {
        let error = "SCR-not-a-uuid".parse::<ScoringId>().unwrap_err();
        assert!(matches!(error, CoreError::InvalidIdentifier { kind: "ScoringId", .. }));
        assert!(error.to_string().contains("SCR-not-a-uuid"));
    }
}
