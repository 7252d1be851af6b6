//! Schedule plan repository.

use std::sync::Arc;

use planbook_core::schedule::{CreatePlanInput, PlanWindows, SchedulePlan, ScheduleService};
use planbook_core::{Clock, PlanningError};
use tracing::info;

use crate::store::PlanningStore;

/// Per-year schedule plans.
#[derive(Clone)]
pub struct ScheduleRepository {
    store: Arc<PlanningStore>,
    clock: Arc<dyn Clock>,
    enforce_order: bool,
}

impl ScheduleRepository {
    /// Creates a new schedule repository.
    ///
    /// With `enforce_order` a plan's acceptance window may not start before
    /// its edit window.
    #[must_use]
    pub fn new(store: Arc<PlanningStore>, clock: Arc<dyn Clock>, enforce_order: bool) -> Self {
        Self {
            store,
            clock,
            enforce_order,
        }
    }

    /// Creates the plan for a year.
    ///
    /// # Errors
    ///
    /// `Validation` for a year outside `1900..=current`, `InvalidWindow` for
    /// reversed windows, `DuplicatePlan` if the year already has one.
    pub fn create_plan(&self, input: CreatePlanInput) -> Result<SchedulePlan, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        let plan = ScheduleService::create_plan(input, now, self.enforce_order)?;
        if !self.store.plans.insert_new(plan.year, plan.clone()) {
            return Err(PlanningError::DuplicatePlan(plan.year));
        }

        info!(
            year = plan.year,
            edit_start = %plan.windows.edit_start,
            edit_end = %plan.windows.edit_end,
            accept_start = %plan.windows.accept_start,
            accept_end = %plan.windows.accept_end,
            "Schedule plan created"
        );
        Ok(plan)
    }

    /// Gets the plan for a year.
    pub fn get_plan(&self, year: i32) -> Result<SchedulePlan, PlanningError> {
        self.store.plans.require(&year)
    }

    /// All plans, latest year first.
    pub fn list_plans(&self) -> Vec<SchedulePlan> {
        let mut all = self.store.plans.values();
        all.sort_by(|a, b| b.year.cmp(&a.year));
        all
    }

    /// Replaces both windows of a plan.
    pub fn update_windows(
        &self,
        year: i32,
        windows: PlanWindows,
    ) -> Result<SchedulePlan, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        ScheduleService::validate_windows(&windows, self.enforce_order)?;
        let plan = self.store.plans.update(&year, |p| {
            p.windows = windows;
            p.updated_at = now;
            Ok(p.clone())
        })?;

        info!(year, "Schedule windows updated");
        Ok(plan)
    }

    /// Turns editing on or off for a year.
    pub fn set_edit_enabled(&self, year: i32, enabled: bool) -> Result<SchedulePlan, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        let plan = self.store.plans.update(&year, |p| {
            p.edit_enabled = enabled;
            p.updated_at = now;
            Ok(p.clone())
        })?;

        info!(year, enabled, "Schedule editing switched");
        Ok(plan)
    }

    /// Protected delete of a plan.
    ///
    /// # Errors
    ///
    /// `ReferentialIntegrity` while entries, rates or facts exist for the year.
    pub fn delete_plan(&self, year: i32) -> Result<(), PlanningError> {
        let _guard = self.store.write_structure();

        let in_use = [
            ("planned amounts", self.store.entries.count(|e| e.year == year)),
            ("currency rates", self.store.rates.count(|r| r.year == year)),
            ("previous-year facts", self.store.facts.count(|f| f.year == year)),
        ];
        self.store.plans.remove_checked(&year, |_| {
            match in_use.iter().find(|(_, count)| *count > 0) {
                Some((what, count)) => Err(PlanningError::protected(
                    "schedule plan",
                    year,
                    format!("{count} {what} exist for the year"),
                )),
                None => Ok(()),
            }
        })?;

        info!(year, "Schedule plan deleted");
        Ok(())
    }

    /// Whether ledger entries of `year` may be edited right now.
    pub fn is_editable(&self, year: i32) -> Result<bool, PlanningError> {
        let now = self.clock.now();
        Ok(self.get_plan(year)?.is_editable(now))
    }

    /// Whether acceptance for `year` is open right now.
    pub fn is_acceptable(&self, year: i32) -> Result<bool, PlanningError> {
        let now = self.clock.now();
        Ok(self.get_plan(year)?.is_acceptable(now))
    }
}
