//! Tests for the identifier newtypes

use core_kernel::{ClaimId, ScoringId};
use proptest::prelude::*;
use uuid::Uuid;

mod scoring_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(ScoringId::new(), ScoringId::new());
    }

    #[test]
    fn test_ids_are_time_ordered() {
        let first = ScoringId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = ScoringId::new();
        assert_eq!(first.as_uuid().get_version_num(), 7);
        assert!(first < second);
    }

    #[test]
    fn test_display_uses_prefix() {
        assert_eq!(ScoringId::PREFIX, "SCR");
        assert!(ScoringId::new().to_string().starts_with("SCR-"));
    }

    #[test]
    fn test_json_is_bare_uuid() {
        let id = ScoringId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}

mod claim_id_tests {
    use super::*;

    #[test]
    fn test_display_uses_prefix() {
        assert_eq!(ClaimId::PREFIX, "CLM");
        assert!(ClaimId::new().to_string().starts_with("CLM-"));
    }

    #[test]
    fn test_foreign_prefix_is_rejected() {
        let scoring = ScoringId::new().to_string();
        assert!(scoring.parse::<ClaimId>().is_err());
    }
}

proptest! {
    #[test]
    fn prop_display_parse_preserves_uuid(bytes in any::<[u8; 16]>()) {
        let uuid = Uuid::from_bytes(bytes);
        let id = ClaimId::from_uuid(uuid);
        let parsed: ClaimId = id.to_string().parse().unwrap();
        prop_assert_eq!(*parsed.as_uuid(), uuid);
    }
}
