//! Gating rules for ledger entry mutations.

use chrono::{DateTime, Utc};
use planbook_shared::types::{BranchId, EntryId, UserId};

use super::acceptance::{AcceptanceAction, AcceptanceLevel, AcceptanceService, AcceptanceState};
use super::types::{
    AcceptanceStamp, CreateEntryInput, DEFAULT_DESCRIPTION, MonthlyAmounts, PlannedAmount,
};
use crate::error::PlanningError;
use crate::schedule::{ScheduleService, SchedulePlan};

/// Stateless service applying window, immutability and ownership rules to
/// ledger entries.
///
/// Every function takes the instant the caller observed once for the whole
/// operation and mutates the entry only after all checks pass.
pub struct LedgerService;

impl LedgerService {
    /// Builds a new draft entry.
    ///
    /// # Errors
    ///
    /// `Validation` if the plan is for another year, `WindowClosed` outside
    /// the edit window.
    pub fn create(
        input: CreateEntryInput,
        plan: &SchedulePlan,
        now: DateTime<Utc>,
    ) -> Result<PlannedAmount, PlanningError> {
        Self::check_plan_year(input.year, plan)?;
        ScheduleService::require_editable(plan, now)?;

        Ok(PlannedAmount {
            id: EntryId::new(),
            account_id: input.account_id,
            year: input.year,
            branch_id: input.branch_id,
            currency: input.currency,
            amounts: input.amounts,
            description: normalize_description(&input.description),
            is_added: input.is_added,
            state: AcceptanceState::Draft,
            division_stamp: None,
            head_stamp: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fails unless the entry may be edited at `now`.
    ///
    /// Acceptance is checked before the window, so an accepted entry is
    /// reported as immutable whether or not editing is open.
    pub fn ensure_mutable(
        entry: &PlannedAmount,
        plan: &SchedulePlan,
        now: DateTime<Utc>,
    ) -> Result<(), PlanningError> {
        if entry.state.has_any_acceptance() {
            return Err(PlanningError::ImmutableAfterAcceptance(entry.id));
        }
        Self::check_plan_year(entry.year, plan)?;
        ScheduleService::require_editable(plan, now)
    }

    /// Replaces the monthly amounts.
    pub fn update_amounts(
        entry: &mut PlannedAmount,
        plan: &SchedulePlan,
        amounts: MonthlyAmounts,
        now: DateTime<Utc>,
    ) -> Result<(), PlanningError> {
        Self::ensure_mutable(entry, plan, now)?;
        entry.amounts = amounts;
        entry.touch(now);
        Ok(())
    }

    /// Sets the "added" flag.
    pub fn set_added(
        entry: &mut PlannedAmount,
        plan: &SchedulePlan,
        is_added: bool,
        now: DateTime<Utc>,
    ) -> Result<(), PlanningError> {
        Self::ensure_mutable(entry, plan, now)?;
        entry.is_added = is_added;
        entry.touch(now);
        Ok(())
    }

    /// Replaces the description; blank text becomes `-`.
    pub fn update_description(
        entry: &mut PlannedAmount,
        plan: &SchedulePlan,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PlanningError> {
        Self::ensure_mutable(entry, plan, now)?;
        entry.description = normalize_description(description);
        entry.touch(now);
        Ok(())
    }

    /// Checks the entry may be deleted: draft and editable.
    pub fn check_delete(
        entry: &PlannedAmount,
        plan: &SchedulePlan,
        now: DateTime<Utc>,
    ) -> Result<(), PlanningError> {
        Self::ensure_mutable(entry, plan, now)
    }

    /// Grants division acceptance on behalf of `caller`.
    ///
    /// `owner` is the branch entitled to accept, as resolved by
    /// `ChartService::accepting_branch`.
    ///
    /// # Errors
    ///
    /// `WindowClosed` outside the acceptance window, `NotOwner` when
    /// `caller` is not `owner`.
    pub fn accept_by_division(
        entry: &mut PlannedAmount,
        plan: &SchedulePlan,
        caller: BranchId,
        owner: BranchId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<AcceptanceAction, PlanningError> {
        Self::check_plan_year(entry.year, plan)?;
        ScheduleService::require_acceptable(plan, now)?;
        if caller != owner {
            return Err(PlanningError::NotOwner {
                entry: entry.id,
                caller,
            });
        }

        let action = AcceptanceService::accept_by_division(entry.id, entry.state, actor, now);
        Self::apply(entry, &action);
        Ok(action)
    }

    /// Grants head-office acceptance.
    ///
    /// # Errors
    ///
    /// `WindowClosed` outside the acceptance window, `PrematureAcceptance`
    /// before division acceptance.
    pub fn accept_by_head_office(
        entry: &mut PlannedAmount,
        plan: &SchedulePlan,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<AcceptanceAction, PlanningError> {
        Self::check_plan_year(entry.year, plan)?;
        ScheduleService::require_acceptable(plan, now)?;

        let action = AcceptanceService::accept_by_head_office(entry.id, entry.state, actor, now)?;
        Self::apply(entry, &action);
        Ok(action)
    }

    /// Administrative override clearing one acceptance level.
    ///
    /// # Errors
    ///
    /// `WindowClosed` outside the acceptance window, `NotAccepted` if the
    /// level is not set.
    pub fn revoke_acceptance(
        entry: &mut PlannedAmount,
        plan: &SchedulePlan,
        level: AcceptanceLevel,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<AcceptanceAction, PlanningError> {
        Self::check_plan_year(entry.year, plan)?;
        ScheduleService::require_acceptable(plan, now)?;

        let action = AcceptanceService::revoke(entry.id, entry.state, level, actor, now)?;
        Self::apply(entry, &action);
        Ok(action)
    }

    fn apply(entry: &mut PlannedAmount, action: &AcceptanceAction) {
        if !action.changed {
            return;
        }

        let stamp = action.to.is_accepted_at(action.level).then_some(AcceptanceStamp {
            by: action.actor,
            at: action.at,
        });
        match action.level {
            AcceptanceLevel::Division => entry.division_stamp = stamp,
            AcceptanceLevel::HeadOffice => entry.head_stamp = stamp,
        }
        entry.state = action.to;
        entry.touch(action.at);
    }

    fn check_plan_year(year: i32, plan: &SchedulePlan) -> Result<(), PlanningError> {
        if plan.year == year {
            Ok(())
        } else {
            Err(PlanningError::Validation(format!(
                "entry for {year} checked against the {} plan",
                plan.year
            )))
        }
    }
}

fn normalize_description(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        trimmed.to_string()
    }
}
