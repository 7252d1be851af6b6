//! Property-based tests for the in-memory tables.

use std::collections::HashMap;

use planbook_core::PlanningError;
use proptest::prelude::*;

use super::store::{Table, UniqueIndex};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The first claimant of a key owns it; later claims by others report
    /// that owner and change nothing.
    #[test]
    fn prop_first_claim_wins(claims in prop::collection::vec((0u8..8, 0u32..4), 1..64)) {
        let index: UniqueIndex<u8, u32> = UniqueIndex::new();
        let mut owners: HashMap<u8, u32> = HashMap::new();

        for (key, id) in claims {
            let expected_owner = *owners.entry(key).or_insert(id);
            let result = index.claim(key, id);
            if expected_owner == id {
                prop_assert_eq!(result, Ok(()));
            } else {
                prop_assert_eq!(result, Err(expected_owner));
            }
            prop_assert_eq!(index.get(&key), Some(expected_owner));
        }
    }

    /// An update commits exactly when its closure succeeds.
    #[test]
    fn prop_update_commits_only_on_success(
        start in any::<i64>(),
        steps in prop::collection::vec((any::<i32>(), any::<bool>()), 0..32),
    ) {
        let table: Table<u8, i64> = Table::new("row");
        table.insert_new(0, start);
        let mut expected = start;

        for (delta, succeed) in steps {
            let result = table.update(&0, |value| {
                *value = value.wrapping_add(i64::from(delta));
                if succeed {
                    Ok(*value)
                } else {
                    Err(PlanningError::Validation("rejected".into()))
                }
            });
            if succeed {
                expected = expected.wrapping_add(i64::from(delta));
                prop_assert_eq!(result, Ok(expected));
            } else {
                prop_assert!(result.is_err());
            }
            prop_assert_eq!(table.get(&0), Some(expected));
        }
    }
}
