use serde::{Deserialize, Serialize};

/// Where a share's current percentage came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShareSource {
    /// Typed by a person, or a table default.
    #[default]
    Manual,
    /// Adjusted by the redistribution engine to absorb another share's edit.
    Derived,
}

/// Which redistributable percentage set a share belongs to.
///
/// The two sets are independent: an edit in one never moves the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareSetKind {
    /// Construction stages, as a share of the direct cost.
    DirectCostStages,
    /// Percentage-based indirect costs, as a share of the VGV.
    IndirectCostItems,
}

impl ShareSetKind {
    /// Stable lowercase label used in logs and history entries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DirectCostStages => "direct",
            Self::IndirectCostItems => "indirect",
        }
    }
}

/// The `[min, max]` range and default percentage of one share key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShareBounds {
    /// Lowest admissible percentage.
    pub min: f64,
    /// Percentage a new project starts with.
    pub default: f64,
    /// Highest admissible percentage.
    pub max: f64,
}

impl ShareBounds {
    /// Bounds applied to keys missing from a reference table.
    pub const UNBOUNDED: Self = Self { min: 0.0, default: 0.0, max: 100.0 };

    /// Creates bounds from `(min, default, max)`.
    #[must_use]
    pub const fn new(min: f64, default: f64, max: f64) -> Self {
        Self { min, default, max }
    }

    /// Clamps `value` into `[min, max]`. A NaN input lands on `min`.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Whether `value` lies inside `[min, max]`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One named percentage allocation. Percentages are on the 0–100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareItem {
    /// Unique key within its set.
    pub key: String,
    /// Current percentage.
    pub percentage: f64,
    /// Origin of the current percentage.
    #[serde(default)]
    pub source: ShareSource,
}

impl ShareItem {
    /// Creates a manually entered share.
    pub fn manual(key: impl Into<String>, percentage: f64) -> Self {
        Self { key: key.into(), percentage, source: ShareSource::Manual }
    }
}

/// An ordered set of shares with unique keys.
///
/// Order is significant: it is the iteration order used to pick the edited key
/// during redistribution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareSet {
    items: Vec<ShareItem>,
}

impl ShareSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Inserts or replaces an item. A replaced item keeps its position.
    pub fn insert(&mut self, item: ShareItem) -> Option<ShareItem> {
        if let Some(slot) = self.items.iter_mut().find(|i| i.key == item.key) {
            Some(std::mem::replace(slot, item))
        } else {
            self.items.push(item);
            None
        }
    }

    /// Looks up an item by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ShareItem> {
        self.items.iter().find(|i| i.key == key)
    }

    /// Mutable lookup by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ShareItem> {
        self.items.iter_mut().find(|i| i.key == key)
    }

    /// Percentage of `key`, if present.
    #[must_use]
    pub fn percentage(&self, key: &str) -> Option<f64> {
        self.get(key).map(|i| i.percentage)
    }

    /// Overwrites the percentage of an existing key as a manual entry.
    /// Returns `false` when the key is absent.
    pub fn set_percentage(&mut self, key: &str, percentage: f64) -> bool {
        match self.get_mut(key) {
            Some(item) => {
                item.percentage = percentage;
                item.source = ShareSource::Manual;
                true
            }
            None => false,
        }
    }

    /// Iterates over items in set order.
    pub fn iter(&self) -> std::slice::Iter<'_, ShareItem> {
        self.items.iter()
    }

    /// Mutable iteration in set order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ShareItem> {
        self.items.iter_mut()
    }

    /// Iterates over keys in set order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.key.as_str())
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all finite percentages.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.percentage).filter(|p| p.is_finite()).sum()
    }

    /// Whether both sets hold the same keys, in the same order, with equal
    /// percentages. Sources are ignored.
    #[must_use]
    pub fn same_percentages(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|(a, b)| a.key == b.key && a.percentage == b.percentage)
    }
}

impl FromIterator<ShareItem> for ShareSet {
    fn from_iter<T: IntoIterator<Item = ShareItem>>(iter: T) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ShareSet {
    type Item = &'a ShareItem;
    type IntoIter = std::slice::Iter<'a, ShareItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut set: ShareSet =
            [ShareItem::manual("a", 10.0), ShareItem::manual("b", 20.0)].into_iter().collect();
        let old = set.insert(ShareItem::manual("a", 15.0));
        assert_eq!(old.map(|i| i.percentage), Some(10.0));
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(set.total(), 35.0);
    }

    #[test]
    fn bounds_clamp_and_nan() {
        let bounds = ShareBounds::new(35.0, 40.0, 45.0);
        assert_eq!(bounds.clamp(10.0), 35.0);
        assert_eq!(bounds.clamp(50.0), 45.0);
        assert_eq!(bounds.clamp(f64::NAN), 35.0);
        assert!(bounds.contains(40.0));
    }

    #[test]
    fn same_percentages_ignores_source() {
        let a: ShareSet = [ShareItem::manual("a", 1.0)].into_iter().collect();
        let mut b = a.clone();
        if let Some(item) = b.get_mut("a") {
            item.source = ShareSource::Derived;
        }
        assert!(a.same_percentages(&b));
        b.set_percentage("a", 2.0);
        assert!(!a.same_percentages(&b));
    }
}
