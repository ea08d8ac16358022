//! Built-in formulas provided by the feasibility engine.

// Area formulas
pub mod equivalent_area;

// Cost formulas
pub mod fixed_budget;
pub mod margin;
pub mod percentage_of;

// Allocation formulas
pub mod bounds_check;
pub mod share_of_total;
