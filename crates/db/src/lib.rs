//! Storage layer for Planbook.
//!
//! This crate provides:
//! - Concurrent in-memory tables with uniqueness indexes and protected deletes
//! - One repository per aggregate, applying `planbook-core` rules to stored state

pub mod repositories;
pub mod store;

#[cfg(test)]
mod store_props;

pub use repositories::{
    CategoryRepository, ChartRepository, CurrencyRepository, FactRepository,
    IndicatorRepository, PlannedAmountRepository, Repositories, ScheduleRepository,
};
pub use store::{FactKey, PlanningStore, RateKey, Table, UniqueIndex};
