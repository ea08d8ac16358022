use crate::plugin::CalculatorPlugin;
use std::collections::BTreeMap;

/// Name → plugin registry. Registering a name twice replaces the first plugin.
pub struct PluginManager {
    plugins: BTreeMap<String, Box<dyn CalculatorPlugin>>,
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginManager {
    pub fn new() -> Self {
        Self { plugins: BTreeMap::new() }
    }

    pub fn register(&mut self, plugin: Box<dyn CalculatorPlugin>) -> bool {
        self.plugins.insert(plugin.name().to_string(), plugin).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&dyn CalculatorPlugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }
}
