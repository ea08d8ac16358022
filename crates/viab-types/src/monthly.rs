use serde::{Deserialize, Serialize};

/// One fixed monthly line item of site administration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyItem {
    /// Unique key within the budget.
    pub key: String,
    /// Amount spent per month of construction.
    pub amount: f64,
}

/// Ordered fixed monthly budget with unique keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlyBudget {
    items: Vec<MonthlyItem>,
}

impl MonthlyBudget {
    /// Creates an empty budget.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Inserts or replaces the amount for `key`.
    pub fn insert(&mut self, key: impl Into<String>, amount: f64) {
        let key = key.into();
        match self.items.iter_mut().find(|i| i.key == key) {
            Some(item) => item.amount = amount,
            None => self.items.push(MonthlyItem { key, amount }),
        }
    }

    /// Amount for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.items.iter().find(|i| i.key == key).map(|i| i.amount)
    }

    /// Iterates over items in budget order.
    pub fn iter(&self) -> std::slice::Iter<'_, MonthlyItem> {
        self.items.iter()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the budget has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all finite monthly amounts.
    #[must_use]
    pub fn monthly_total(&self) -> f64 {
        self.items.iter().map(|i| i.amount).filter(|a| a.is_finite()).sum()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MonthlyBudget {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        let mut budget = Self::new();
        for (key, amount) in iter {
            budget.insert(key, amount);
        }
        budget
    }
}
