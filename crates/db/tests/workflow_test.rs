//! Integration tests for the planned amount workflow.

mod common;

use chrono::Duration;
use common::{YEAR, World, at};
use planbook_core::PlanningError;
use planbook_core::indicator::IndicatorCode;
use planbook_core::planned::{AcceptanceLevel, AcceptanceState, MonthlyAmounts};
use planbook_core::schedule::WindowKind;
use planbook_shared::types::CurrencyType;
use rust_decimal_macros::dec;

// ============================================================================
// Test: the 2024 example from edit window to head-office acceptance
// ============================================================================
#[test]
fn test_2024_scenario() {
    let w = World::scenario();
    w.repos
        .indicators
        .bind(IndicatorCode::LoanPortfolio, w.loans.id)
        .unwrap();

    w.clock.set(at(1, 15));
    let entry = w
        .repos
        .planned
        .create(w.entry_input(w.loan_account.id, CurrencyType::Dollar, dec!(100)))
        .unwrap();
    assert_eq!(entry.total_amount(), dec!(1200.00));

    // Acceptance window is not open yet.
    let result = w.repos.planned.accept_by_division(entry.id, w.head.id);
    assert!(matches!(
        result,
        Err(PlanningError::WindowClosed { window: WindowKind::Acceptance, .. })
    ));

    w.clock.set(at(2, 5));
    let result = w
        .repos
        .planned
        .update_amounts(entry.id, MonthlyAmounts::uniform(dec!(1)).unwrap());
    assert!(matches!(
        result,
        Err(PlanningError::WindowClosed { window: WindowKind::Edit, .. })
    ));

    assert_eq!(
        w.repos
            .planned
            .accept_by_head_office(entry.id, w.head_office_user),
        Err(PlanningError::PrematureAcceptance(entry.id))
    );

    let division = w
        .repos
        .planned
        .accept_by_division(entry.id, w.head.id)
        .unwrap();
    assert_eq!(division.to, AcceptanceState::DivisionAccepted);
    assert_eq!(division.actor, w.head.owner);

    // Not fully accepted yet, so the indicator ignores it.
    let indicators = w.repos.indicators.compute(YEAR, None).unwrap();
    assert_eq!(indicators[&IndicatorCode::LoanPortfolio], dec!(0));

    let head = w
        .repos
        .planned
        .accept_by_head_office(entry.id, w.head_office_user)
        .unwrap();
    assert_eq!(head.to, AcceptanceState::FullyAccepted);

    assert_eq!(w.repos.planned.reporting_total(entry.id).unwrap(), dec!(1800.00));
    let indicators = w.repos.indicators.compute(YEAR, None).unwrap();
    assert_eq!(indicators[&IndicatorCode::LoanPortfolio], dec!(1800.00));
    let first_quarter = w.repos.indicators.compute(YEAR, Some(3)).unwrap();
    assert_eq!(first_quarter[&IndicatorCode::LoanPortfolio], dec!(450.00));
}

// ============================================================================
// Test: one entry per account and year
// ============================================================================
#[test]
fn test_duplicate_entry_rejected() {
    let w = World::scenario();
    w.clock.set(at(1, 10));
    w.repos
        .planned
        .create(w.entry_input(w.loan_account.id, CurrencyType::Som, dec!(5)))
        .unwrap();

    assert_eq!(
        w.repos
            .planned
            .create(w.entry_input(w.loan_account.id, CurrencyType::Som, dec!(6))),
        Err(PlanningError::DuplicateEntry {
            account: w.loan_account.id,
            year: YEAR
        })
    );
}

// ============================================================================
// Test: accepted entries stay immutable even when editing reopens
// ============================================================================
#[test]
fn test_accepted_entry_immutable_when_edit_reopens() {
    let w = World::scenario();
    w.clock.set(at(1, 10));
    let entry = w
        .repos
        .planned
        .create(w.entry_input(w.loan_account.id, CurrencyType::Som, dec!(5)))
        .unwrap();

    w.clock.set(at(2, 2));
    w.repos
        .planned
        .accept_by_division(entry.id, w.head.id)
        .unwrap();

    // Stretch the edit window over today.
    let mut windows = common::scenario_windows();
    windows.edit_end = at(3, 1);
    w.repos.schedule.update_windows(YEAR, windows).unwrap();
    assert!(w.repos.schedule.is_editable(YEAR).unwrap());

    let immutable = Err(PlanningError::ImmutableAfterAcceptance(entry.id));
    assert_eq!(
        w.repos
            .planned
            .update_amounts(entry.id, MonthlyAmounts::uniform(dec!(9)).unwrap())
            .map(|_| ()),
        immutable
    );
    assert_eq!(w.repos.planned.set_added(entry.id, true).map(|_| ()), immutable);
    assert_eq!(w.repos.planned.delete(entry.id), immutable);
}

// ============================================================================
// Test: create needs a rate, an active account and an operating branch
// ============================================================================
#[test]
fn test_create_preconditions() {
    let w = World::scenario();
    w.clock.set(at(1, 10));

    assert_eq!(
        w.repos
            .planned
            .create(w.entry_input(w.loan_account.id, CurrencyType::Euro, dec!(1)))
            .map(|_| ()),
        Err(PlanningError::MissingRate {
            currency: CurrencyType::Euro,
            year: YEAR
        })
    );

    w.repos
        .chart
        .set_account_active(w.deposit_account.id, false)
        .unwrap();
    assert!(matches!(
        w.repos
            .planned
            .create(w.entry_input(w.deposit_account.id, CurrencyType::Som, dec!(1))),
        Err(PlanningError::InactiveReference { entity: "account", .. })
    ));

    w.repos
        .chart
        .set_branch_operating(w.head.id, false)
        .unwrap();
    assert!(matches!(
        w.repos
            .planned
            .create(w.entry_input(w.loan_account.id, CurrencyType::Som, dec!(1))),
        Err(PlanningError::InactiveReference { entity: "branch", .. })
    ));

    let mut input = w.entry_input(w.loan_account.id, CurrencyType::Som, dec!(1));
    input.year = 2023;
    assert!(matches!(
        w.repos.planned.create(input),
        Err(PlanningError::NotFound { entity: "schedule plan", .. })
    ));
}

// ============================================================================
// Test: division-planned accounts are accepted by the division's branch
// ============================================================================
#[test]
fn test_division_planned_account_ownership() {
    let w = World::scenario();
    w.clock.set(at(1, 10));
    let entry = w
        .repos
        .planned
        .create(w.entry_input(w.deposit_account.id, CurrencyType::Som, dec!(10)))
        .unwrap();

    w.clock.set(at(2, 3));
    assert_eq!(
        w.repos.planned.accept_by_division(entry.id, w.head.id),
        Err(PlanningError::NotOwner {
            entry: entry.id,
            caller: w.head.id
        })
    );
    let action = w
        .repos
        .planned
        .accept_by_division(entry.id, w.regional.id)
        .unwrap();
    assert_eq!(action.actor, w.regional.owner);

    let stored = w.repos.planned.get(entry.id).unwrap();
    assert_eq!(stored.division_stamp.map(|s| s.at), Some(at(2, 3)));
}

// ============================================================================
// Test: revocation and rate protection
// ============================================================================
#[test]
fn test_revoke_and_rate_protection() {
    let w = World::scenario();
    w.clock.set(at(1, 10));
    let entry = w
        .repos
        .planned
        .create(w.entry_input(w.loan_account.id, CurrencyType::Dollar, dec!(10)))
        .unwrap();

    // Draft entries do not pin the rate.
    w.repos
        .currency
        .set_rate(CurrencyType::Dollar, YEAR, dec!(1.6))
        .unwrap();
    w.repos
        .currency
        .set_rate(CurrencyType::Dollar, YEAR, dec!(1.5))
        .unwrap();

    w.clock.set(at(2, 3));
    w.repos
        .planned
        .accept_by_division(entry.id, w.head.id)
        .unwrap();
    assert!(matches!(
        w.repos
            .currency
            .set_rate(CurrencyType::Dollar, YEAR, dec!(2)),
        Err(PlanningError::ReferentialIntegrity { .. })
    ));
    assert!(matches!(
        w.repos.currency.delete_rate(CurrencyType::Dollar, YEAR),
        Err(PlanningError::ReferentialIntegrity { .. })
    ));

    let revoked = w
        .repos
        .planned
        .revoke_acceptance(entry.id, AcceptanceLevel::Division, w.head_office_user)
        .unwrap();
    assert_eq!(revoked.to, AcceptanceState::Draft);
    assert!(matches!(
        w.repos
            .planned
            .revoke_acceptance(entry.id, AcceptanceLevel::Division, w.head_office_user),
        Err(PlanningError::NotAccepted { .. })
    ));

    // Revocation is only possible inside the acceptance window.
    w.clock.advance(Duration::days(30));
    assert!(matches!(
        w.repos
            .planned
            .revoke_acceptance(entry.id, AcceptanceLevel::HeadOffice, w.head_office_user),
        Err(PlanningError::WindowClosed { .. })
    ));
}

// ============================================================================
// Test: draft entries may be deleted and re-created
// ============================================================================
#[test]
fn test_delete_draft_releases_key() {
    let w = World::scenario();
    w.clock.set(at(1, 10));
    let entry = w
        .repos
        .planned
        .create(w.entry_input(w.loan_account.id, CurrencyType::Som, dec!(1)))
        .unwrap();

    w.repos.planned.delete(entry.id).unwrap();
    assert!(w.repos.planned.find(w.loan_account.id, YEAR).is_none());

    let again = w
        .repos
        .planned
        .create(w.entry_input(w.loan_account.id, CurrencyType::Som, dec!(2)))
        .unwrap();
    assert_eq!(w.repos.planned.find(w.loan_account.id, YEAR), Some(again));
}

// ============================================================================
// Test: previous-year facts are write-once and compare with the plan
// ============================================================================
#[test]
fn test_fact_record_and_compare() {
    let w = World::scenario();
    w.clock.set(at(1, 10));
    w.repos
        .planned
        .create(w.entry_input(w.loan_account.id, CurrencyType::Som, dec!(100)))
        .unwrap();

    let fact = w
        .repos
        .facts
        .record(w.loan_account.id, YEAR, dec!(1000))
        .unwrap();
    assert_eq!(fact.recorded_at, at(1, 10));
    assert_eq!(
        w.repos.facts.record(w.loan_account.id, YEAR, dec!(1)),
        Err(PlanningError::AlreadyRecorded {
            account: w.loan_account.id,
            year: YEAR
        })
    );

    let comparison = w.repos.facts.compare(w.loan_account.id, YEAR).unwrap();
    assert_eq!(comparison.planned_total, dec!(1200.00));
    assert_eq!(comparison.change, dec!(200.00));
    assert_eq!(comparison.change_percent, dec!(20.00));

    assert!(matches!(
        w.repos.facts.compare(w.deposit_account.id, YEAR),
        Err(PlanningError::NotFound { .. })
    ));
    assert!(matches!(
        w.repos.chart.delete_account(w.loan_account.id),
        Err(PlanningError::ReferentialIntegrity { .. })
    ));
}
