//! Demonstration seeder for Planbook.
//!
//! Builds a budgeting year in memory, drives its entries through both
//! acceptance levels and prints the resulting indicators as JSON.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use planbook_core::category::{Category, CreateCategoryInput};
use planbook_core::chart::{CreateAccountInput, RegisterBranchInput, RegisterDivisionInput};
use planbook_core::indicator::IndicatorCode;
use planbook_core::planned::{CreateEntryInput, MonthlyAmounts};
use planbook_core::schedule::{CreatePlanInput, PlanWindows};
use planbook_core::{Clock, FixedClock};
use planbook_db::{PlanningStore, Repositories};
use planbook_shared::AppConfig;
use planbook_shared::types::{CurrencyType, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let year = Utc::now().year();
    let clock = Arc::new(FixedClock::new(day(year, 1, 1)?));
    let store = Arc::new(PlanningStore::new());
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let repos = Repositories::new(store, dyn_clock, &config.planning);

    info!(year, reporting = %config.planning.reporting_currency, "Seeding demonstration year");
    let report = seed(&repos, &clock, year)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Midnight UTC of a calendar day.
fn day(year: i32, month: u32, day: u32) -> anyhow::Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .with_context(|| format!("invalid date {year}-{month}-{day}"))
}

fn seed(repos: &Repositories, clock: &FixedClock, year: i32) -> anyhow::Result<serde_json::Value> {
    // Chart of accounts
    let category = |name: &str, parent: Option<&Category>, structure_planned: bool| {
        repos.categories.create(CreateCategoryInput {
            name: name.into(),
            parent_id: parent.map(|p| p.id),
            structure_planned,
        })
    };
    let loans = category("Loans", None, false)?;
    let retail = category("Retail loans", Some(&loans), false)?;
    let deposits = category("Deposits", None, true)?;
    let admin = category("Administrative expense", None, false)?;

    let head = repos.chart.register_branch(RegisterBranchInput {
        branch_number: 1,
        name: "Head office".into(),
        head_name: "Head office director".into(),
        phone: "+996312000001".into(),
        address: "Bishkek".into(),
        email: "head@planbook.example".into(),
        is_structural: false,
        employee_count: 120,
        owner: UserId::new(),
        ..RegisterBranchInput::default()
    })?;
    let regional = repos.chart.register_branch(RegisterBranchInput {
        branch_number: 2,
        name: "Osh branch".into(),
        head_name: "Osh branch manager".into(),
        phone: "+996322000002".into(),
        address: "Osh".into(),
        email: "osh@planbook.example".into(),
        is_structural: true,
        employee_count: 35,
        owner: UserId::new(),
        ..RegisterBranchInput::default()
    })?;
    let division = repos.chart.register_division(RegisterDivisionInput {
        name: "Osh deposit desk".into(),
        branch_id: regional.id,
    })?;

    let account = |number: &str, name: &str, category: &Category| {
        repos.chart.create_account(CreateAccountInput {
            number: number.into(),
            name: name.into(),
            category_id: category.id,
            division_id: division.id,
            division_planned: None,
        })
    };
    let retail_loans = account("10001.00001", "Consumer loans", &retail)?;
    let corporate_loans = account("10002", "Corporate loans", &loans)?;
    let term_deposits = account("20001", "Term deposits", &deposits)?;
    let salaries = account("30001", "Staff costs", &admin)?;

    // Schedule and rates
    repos.schedule.create_plan(CreatePlanInput {
        year,
        windows: PlanWindows {
            edit_start: day(year, 1, 1)?,
            edit_end: day(year, 1, 31)?,
            accept_start: day(year, 2, 1)?,
            accept_end: day(year, 2, 10)?,
        },
        edit_enabled: true,
    })?;
    repos.currency.set_rate(CurrencyType::Dollar, year, dec!(87.45))?;
    repos.currency.set_rate(CurrencyType::Euro, year, dec!(95.10))?;

    for (code, category) in [
        (IndicatorCode::LoanPortfolio, &loans),
        (IndicatorCode::Deposits, &deposits),
        (IndicatorCode::AdministrativeExpense, &admin),
    ] {
        repos.indicators.bind(code, category.id)?;
    }

    // Edit window
    clock.set(day(year, 1, 15)?);
    let plan = [
        (&retail_loans, CurrencyType::Som, dec!(250000)),
        (&corporate_loans, CurrencyType::Dollar, dec!(12000)),
        (&term_deposits, CurrencyType::Euro, dec!(4000.50)),
        (&salaries, CurrencyType::Som, dec!(180000)),
    ];
    let mut entries = Vec::with_capacity(plan.len());
    for (account, currency, monthly) in plan {
        let entry = repos.planned.create(CreateEntryInput {
            account_id: account.id,
            year,
            branch_id: head.id,
            currency,
            amounts: MonthlyAmounts::uniform(monthly)?,
            description: format!("{} plan", account.name),
            is_added: false,
        })?;
        entries.push(entry);
    }
    repos
        .facts
        .record(retail_loans.id, year, dec!(2750000))?;

    // Acceptance window
    clock.advance(Duration::days(21));
    let head_office = UserId::new();
    for entry in &entries {
        let caller = if entry.account_id == term_deposits.id {
            regional.id
        } else {
            head.id
        };
        repos.planned.accept_by_division(entry.id, caller)?;
    }
    // The staff-cost entry stays at division level and is left out of indicators.
    for entry in entries.iter().filter(|e| e.account_id != salaries.id) {
        repos.planned.accept_by_head_office(entry.id, head_office)?;
    }

    let indicators = repos.indicators.compute(year, None)?;
    let first_half = repos.indicators.compute(year, Some(6))?;
    let comparison = repos.facts.compare(retail_loans.id, year)?;

    let as_json = |values: &std::collections::BTreeMap<IndicatorCode, Decimal>| {
        values
            .iter()
            .map(|(code, value)| (code.label().to_string(), serde_json::json!(value.to_string())))
            .collect::<serde_json::Map<_, _>>()
    };

    Ok(serde_json::json!({
        "year": year,
        "reporting_currency": repos.currency.book().reporting_currency().as_str(),
        "indicators": as_json(&indicators),
        "indicators_first_half": as_json(&first_half),
        "retail_loans_vs_previous_year": {
            "planned": comparison.planned_total.to_string(),
            "fact": comparison.fact.to_string(),
            "change": comparison.change.to_string(),
            "change_percent": comparison.change_percent.to_string(),
        },
    }))
}
