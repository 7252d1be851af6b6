//! Property-based tests for the acceptance workflow.

use chrono::{Duration, TimeZone, Utc};
use planbook_shared::types::{AccountId, BranchId, CurrencyType, EntryId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::acceptance::{AcceptanceLevel, AcceptanceService, AcceptanceState};
use super::service::LedgerService;
use super::types::{CreateEntryInput, MONTHS, MonthlyAmounts};
use crate::error::PlanningError;
use crate::schedule::{PlanWindows, SchedulePlan};

fn arb_state() -> impl Strategy<Value = AcceptanceState> {
    prop::sample::select(AcceptanceState::ALL.to_vec())
}

fn arb_level() -> impl Strategy<Value = AcceptanceLevel> {
    prop_oneof![Just(AcceptanceLevel::Division), Just(AcceptanceLevel::HeadOffice)]
}

/// Amounts in cents so every generated value has at most two fractional digits.
fn arb_months() -> impl Strategy<Value = [Decimal; MONTHS]> {
    prop::array::uniform12(-10_000_000_000i64..10_000_000_000).prop_map(|cents| {
        cents.map(|c| Decimal::new(c, 2))
    })
}

fn plan(edit_enabled: bool) -> SchedulePlan {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    SchedulePlan {
        year: 2024,
        windows: PlanWindows {
            edit_start: start,
            edit_end: start + Duration::days(30),
            accept_start: start + Duration::days(31),
            accept_end: start + Duration::days(40),
        },
        edit_enabled,
        created_at: start,
        updated_at: start,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The total always equals the sum of the twelve months.
    #[test]
    fn prop_total_is_sum_of_months(months in arb_months()) {
        let amounts = MonthlyAmounts::new(months).unwrap();
        let expected: Decimal = months.iter().copied().sum();
        prop_assert_eq!(amounts.total(), expected);
        prop_assert_eq!(amounts.total_through(12).unwrap(), expected);
    }

    /// Accepting by division twice equals accepting once.
    #[test]
    fn prop_division_acceptance_idempotent(state in arb_state()) {
        let (entry, actor, now) = (EntryId::new(), UserId::new(), Utc::now());
        let once = AcceptanceService::accept_by_division(entry, state, actor, now);
        let twice = AcceptanceService::accept_by_division(entry, once.to, actor, now);
        prop_assert_eq!(once.to, twice.to);
        prop_assert!(!twice.changed);
        prop_assert!(once.to.division_accepted());
    }

    /// Head office acceptance fails exactly when the division flag is clear.
    #[test]
    fn prop_head_office_requires_division(state in arb_state()) {
        let entry = EntryId::new();
        let result = AcceptanceService::accept_by_head_office(entry, state, UserId::new(), Utc::now());
        if state.division_accepted() {
            prop_assert_eq!(result.map(|a| a.to), Ok(AcceptanceState::FullyAccepted));
        } else {
            prop_assert_eq!(result, Err(PlanningError::PrematureAcceptance(entry)));
        }
    }

    /// Revoking clears only the requested flag.
    #[test]
    fn prop_revoke_clears_one_flag(state in arb_state(), level in arb_level()) {
        let result = AcceptanceService::revoke(EntryId::new(), state, level, UserId::new(), Utc::now());
        match result {
            Ok(action) => {
                prop_assert!(!action.to.is_accepted_at(level));
                let other = match level {
                    AcceptanceLevel::Division => AcceptanceLevel::HeadOffice,
                    AcceptanceLevel::HeadOffice => AcceptanceLevel::Division,
                };
                prop_assert_eq!(action.to.is_accepted_at(other), state.is_accepted_at(other));
            }
            Err(err) => {
                prop_assert!(!state.is_accepted_at(level));
                let is_not_accepted = matches!(err, PlanningError::NotAccepted { .. });
                prop_assert!(is_not_accepted);
            }
        }
    }

    /// Any accepted entry is immutable, whatever the window says.
    #[test]
    fn prop_accepted_entry_is_immutable(
        state in arb_state(),
        edit_enabled in any::<bool>(),
        offset_days in -10i64..60,
        months in arb_months(),
    ) {
        let sched = plan(edit_enabled);
        let created_at = sched.windows.edit_start;
        let mut entry = LedgerService::create(
            CreateEntryInput {
                account_id: AccountId::new(),
                year: 2024,
                branch_id: BranchId::new(),
                currency: CurrencyType::Som,
                amounts: MonthlyAmounts::uniform(Decimal::ONE).unwrap(),
                description: String::new(),
                is_added: false,
            },
            &plan(true),
            created_at,
        )
        .unwrap();
        entry.state = state;

        let now = created_at + Duration::days(offset_days);
        let result = LedgerService::update_amounts(
            &mut entry,
            &sched,
            MonthlyAmounts::new(months).unwrap(),
            now,
        );
        if state.has_any_acceptance() {
            prop_assert_eq!(result, Err(PlanningError::ImmutableAfterAcceptance(entry.id)));
        } else {
            prop_assert_eq!(result.is_ok(), sched.is_editable(now));
        }
    }
}
