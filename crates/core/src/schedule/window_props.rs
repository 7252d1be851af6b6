//! Property-based tests for window gating.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use super::types::{PlanWindows, SchedulePlan};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Offsets in minutes from the start of 2024.
fn arb_plan() -> impl Strategy<Value = SchedulePlan> {
    (0i64..100_000, 0i64..50_000, 0i64..100_000, 0i64..50_000, any::<bool>()).prop_map(
        |(edit_start, edit_len, accept_start, accept_len, edit_enabled)| {
            let edit_start = base() + Duration::minutes(edit_start);
            let accept_start = base() + Duration::minutes(accept_start);
            SchedulePlan {
                year: 2024,
                windows: PlanWindows {
                    edit_start,
                    edit_end: edit_start + Duration::minutes(edit_len),
                    accept_start,
                    accept_end: accept_start + Duration::minutes(accept_len),
                },
                edit_enabled,
                created_at: base(),
                updated_at: base(),
            }
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Editability is exactly the switch AND inclusive edit-window membership.
    #[test]
    fn prop_is_editable_matches_definition(plan in arb_plan(), offset in -1_000i64..200_000) {
        let now = base() + Duration::minutes(offset);
        let expected = plan.edit_enabled
            && plan.windows.edit_start <= now
            && now <= plan.windows.edit_end;
        prop_assert_eq!(plan.is_editable(now), expected);
    }

    /// Acceptance gating ignores the editing switch.
    #[test]
    fn prop_acceptance_ignores_edit_switch(mut plan in arb_plan(), offset in -1_000i64..200_000) {
        let now = base() + Duration::minutes(offset);
        let before = plan.is_acceptable(now);
        plan.edit_enabled = !plan.edit_enabled;
        prop_assert_eq!(plan.is_acceptable(now), before);
    }

    /// Window bounds are inclusive.
    #[test]
    fn prop_bounds_are_inclusive(mut plan in arb_plan()) {
        plan.edit_enabled = true;
        prop_assert!(plan.is_editable(plan.windows.edit_start));
        prop_assert!(plan.is_editable(plan.windows.edit_end));
        prop_assert!(plan.is_acceptable(plan.windows.accept_start));
        prop_assert!(plan.is_acceptable(plan.windows.accept_end));
    }
}
