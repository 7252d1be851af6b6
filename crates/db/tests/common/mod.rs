//! Shared fixture for repository integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use planbook_core::category::{Category, CreateCategoryInput};
use planbook_core::chart::{
    Account, Branch, CreateAccountInput, RegisterBranchInput, RegisterDivisionInput,
    StructuralDivision,
};
use planbook_core::planned::{CreateEntryInput, MonthlyAmounts};
use planbook_core::schedule::{CreatePlanInput, PlanWindows};
use planbook_core::{Clock, FixedClock};
use planbook_db::{PlanningStore, Repositories};
use planbook_shared::PlanningConfig;
use planbook_shared::types::{AccountId, CurrencyType, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const YEAR: i32 = 2024;

/// Noon of a day in 2024.
pub fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(YEAR, month, day, 12, 0, 0).unwrap()
}

/// Edit window January, acceptance window February 1 to 10.
pub fn scenario_windows() -> PlanWindows {
    PlanWindows {
        edit_start: Utc.with_ymd_and_hms(YEAR, 1, 1, 0, 0, 0).unwrap(),
        edit_end: Utc.with_ymd_and_hms(YEAR, 1, 31, 23, 59, 59).unwrap(),
        accept_start: Utc.with_ymd_and_hms(YEAR, 2, 1, 0, 0, 0).unwrap(),
        accept_end: Utc.with_ymd_and_hms(YEAR, 2, 10, 23, 59, 59).unwrap(),
    }
}

/// Both windows cover all of January.
pub fn overlapping_windows() -> PlanWindows {
    let start = Utc.with_ymd_and_hms(YEAR, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(YEAR, 1, 31, 23, 59, 59).unwrap();
    PlanWindows {
        edit_start: start,
        edit_end: end,
        accept_start: start,
        accept_end: end,
    }
}

/// A seeded store for 2024.
///
/// `loans -> retail` and `deposits` (structure planned). The head branch is
/// not structural; the regional branch is and owns `division`.
pub struct World {
    pub repos: Repositories,
    pub store: Arc<PlanningStore>,
    pub clock: Arc<FixedClock>,
    pub loans: Category,
    pub retail: Category,
    pub deposits: Category,
    pub head: Branch,
    pub regional: Branch,
    pub division: StructuralDivision,
    /// `10001.00002` under `retail`.
    pub loan_account: Account,
    /// `20001` under `deposits`, planned by the division.
    pub deposit_account: Account,
    pub head_office_user: UserId,
}

impl World {
    pub fn new(windows: PlanWindows) -> Self {
        let clock = Arc::new(FixedClock::new(at(1, 1)));
        let store = Arc::new(PlanningStore::new());
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let repos = Repositories::new(
            Arc::clone(&store),
            dyn_clock,
            &PlanningConfig::default(),
        );

        let category = |name: &str, parent: Option<&Category>, structure_planned: bool| {
            repos
                .categories
                .create(CreateCategoryInput {
                    name: name.into(),
                    parent_id: parent.map(|p| p.id),
                    structure_planned,
                })
                .unwrap()
        };
        let loans = category("Loans", None, false);
        let retail = category("Retail loans", Some(&loans), false);
        let deposits = category("Deposits", None, true);

        let head = repos
            .chart
            .register_branch(RegisterBranchInput {
                branch_number: 1,
                name: "Head office".into(),
                head_name: "A. Head".into(),
                phone: "+996555000001".into(),
                is_structural: false,
                owner: UserId::new(),
                ..RegisterBranchInput::default()
            })
            .unwrap();
        let regional = repos
            .chart
            .register_branch(RegisterBranchInput {
                branch_number: 2,
                name: "Osh".into(),
                head_name: "B. Regional".into(),
                phone: "+996555000002".into(),
                email: "osh@bank.example".into(),
                is_structural: true,
                employee_count: 40,
                owner: UserId::new(),
                ..RegisterBranchInput::default()
            })
            .unwrap();
        let division = repos
            .chart
            .register_division(RegisterDivisionInput {
                name: "Osh retail desk".into(),
                branch_id: regional.id,
            })
            .unwrap();

        let account = |number: &str, category: &Category| {
            repos
                .chart
                .create_account(CreateAccountInput {
                    number: number.into(),
                    name: format!("Account {number}"),
                    category_id: category.id,
                    division_id: division.id,
                    division_planned: None,
                })
                .unwrap()
        };
        let loan_account = account("10001.00002", &retail);
        let deposit_account = account("20001", &deposits);

        repos
            .schedule
            .create_plan(CreatePlanInput {
                year: YEAR,
                windows,
                edit_enabled: true,
            })
            .unwrap();
        repos
            .currency
            .set_rate(CurrencyType::Dollar, YEAR, dec!(1.5))
            .unwrap();

        Self {
            repos,
            store,
            clock,
            loans,
            retail,
            deposits,
            head,
            regional,
            division,
            loan_account,
            deposit_account,
            head_office_user: UserId::new(),
        }
    }

    pub fn scenario() -> Self {
        Self::new(scenario_windows())
    }

    pub fn entry_input(
        &self,
        account: AccountId,
        currency: CurrencyType,
        monthly: Decimal,
    ) -> CreateEntryInput {
        CreateEntryInput {
            account_id: account,
            year: YEAR,
            branch_id: self.head.id,
            currency,
            amounts: MonthlyAmounts::uniform(monthly).unwrap(),
            description: String::new(),
            is_added: false,
        }
    }
}
