//! Repositories over the in-memory store.
//!
//! Each repository applies `planbook-core` rules to stored rows, reads the
//! injected clock once per operation and logs successful mutations.

pub mod category;
pub mod chart;
pub mod currency;
pub mod fact;
pub mod indicator;
pub mod planned;
pub mod schedule;

use std::sync::Arc;

use planbook_core::Clock;
use planbook_shared::PlanningConfig;

use crate::store::PlanningStore;

pub use category::CategoryRepository;
pub use chart::ChartRepository;
pub use currency::CurrencyRepository;
pub use fact::FactRepository;
pub use indicator::IndicatorRepository;
pub use planned::PlannedAmountRepository;
pub use schedule::ScheduleRepository;

/// All repositories over one store and one clock.
#[derive(Clone)]
pub struct Repositories {
    /// Categories.
    pub categories: CategoryRepository,
    /// Branches, divisions and accounts.
    pub chart: ChartRepository,
    /// Schedule plans.
    pub schedule: ScheduleRepository,
    /// Currency rates.
    pub currency: CurrencyRepository,
    /// Ledger entries and acceptance.
    pub planned: PlannedAmountRepository,
    /// Performance indicators.
    pub indicators: IndicatorRepository,
    /// Previous-year facts.
    pub facts: FactRepository,
}

impl Repositories {
    /// Wires every repository to `store` and `clock`.
    #[must_use]
    pub fn new(store: Arc<PlanningStore>, clock: Arc<dyn Clock>, config: &PlanningConfig) -> Self {
        Self {
            categories: CategoryRepository::new(Arc::clone(&store), Arc::clone(&clock)),
            chart: ChartRepository::new(Arc::clone(&store), Arc::clone(&clock)),
            schedule: ScheduleRepository::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                config.enforce_window_order,
            ),
            currency: CurrencyRepository::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                config.reporting_currency,
            ),
            planned: PlannedAmountRepository::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                config.reporting_currency,
            ),
            indicators: IndicatorRepository::new(
                Arc::clone(&store),
                config.reporting_currency,
            ),
            facts: FactRepository::new(store, clock),
        }
    }
}
