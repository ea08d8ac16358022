use serde::{Deserialize, Serialize};

use crate::reference::PRIVATE_AREA_KIND;

/// One row of the building breakdown ("pavimento").
///
/// `repeat_count` is kept at one or more by every constructor in this crate.
/// When `coefficient` is `None` the aggregator resolves it from the floor-kind
/// table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorSpec {
    /// Display name, e.g. "Pavimento Tipo".
    pub name: String,
    /// Key into the floor-kind coefficient table.
    pub kind: String,
    /// How many identical copies of this floor the building has.
    pub repeat_count: u32,
    /// Explicit cost-weight coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient: Option<f64>,
    /// Area of a single copy, in square meters.
    pub raw_area: f64,
    /// Whether the floor counts toward the constructed area.
    pub counts_as_built: bool,
}

impl Default for FloorSpec {
    fn default() -> Self {
        Self {
            name: "Pavimento Tipo".to_string(),
            kind: PRIVATE_AREA_KIND.to_string(),
            repeat_count: 1,
            coefficient: Some(1.0),
            raw_area: 100.0,
            counts_as_built: true,
        }
    }
}

impl FloorSpec {
    /// Creates a single, constructive floor without an explicit coefficient.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, raw_area: f64) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            repeat_count: 1,
            coefficient: None,
            raw_area,
            counts_as_built: true,
        }
    }

    /// Sets the repeat count, raising zero to one.
    #[must_use]
    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count.max(1);
        self
    }

    /// Sets an explicit coefficient.
    #[must_use]
    pub fn with_coefficient(mut self, coefficient: f64) -> Self {
        self.coefficient = Some(coefficient);
        self
    }

    /// Marks whether the floor counts toward the constructed area.
    #[must_use]
    pub fn with_counts_as_built(mut self, counts_as_built: bool) -> Self {
        self.counts_as_built = counts_as_built;
        self
    }

    /// Whether the floor is sellable private area.
    #[must_use]
    pub fn is_private_area(&self) -> bool {
        self.kind == PRIVATE_AREA_KIND
    }
}
