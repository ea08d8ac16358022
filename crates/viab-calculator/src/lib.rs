#![deny(warnings)]
//! The quantitative engine of the feasibility calculator.
//!
//! Three pure components live here: the floor aggregator ([`floors`]), the
//! cost composer ([`costs`]) and the percentage redistribution engine
//! ([`redistribution`]). A small registry of named formula plugins
//! ([`calculator::FeasibilityCalculator`]) exposes the same arithmetic to
//! collaborators that only hold loosely typed payloads.

pub use viab_types::FieldValue;

pub mod built_in;
pub mod calculator;
pub mod costs;
pub mod floors;
pub mod plugin;
pub mod plugin_manager;
pub mod redistribution;

pub use calculator::FeasibilityCalculator;
pub use costs::{CostBreakdown, CostInputs, MarginHealth, compose};
pub use floors::{AggregatedFloor, FloorAggregation, FloorTotals, aggregate};
pub use redistribution::{
    EditPolicy, EditedShare, Redistribution, RedistributionError, ShareEditor, ShareSnapshot,
    redistribute,
};
