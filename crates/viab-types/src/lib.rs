//! Viab Types
//!
//! This crate defines the data model shared by the feasibility crates
//! (`viab-calculator` and `viab-core`): the loosely typed [`FieldValue`] used at
//! the ingestion boundary, building floors, percentage shares, monthly budgets
//! and the static reference tables that ship with the engine.

#![deny(warnings)]
#![deny(missing_docs)]

mod floor;
mod monthly;
pub mod reference;
mod share;
mod value;

pub use floor::FloorSpec;
pub use monthly::{MonthlyBudget, MonthlyItem};
pub use reference::{BoundsTable, CoefficientRange, CoefficientTable};
pub use share::{ShareBounds, ShareItem, ShareSet, ShareSetKind, ShareSource};
pub use value::{FieldValue, parse_decimal};
