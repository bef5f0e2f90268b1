//! Named mathematical constants.

use indexmap::IndexMap;

/// One row of the default catalog.
type Row = (&'static str, f64);

const DEFAULT_CONSTANTS: &[Row] = &[
    ("pi", std::f64::consts::PI),
    ("e", std::f64::consts::E),
    ("tau", std::f64::consts::TAU),
    ("phi", 1.618_033_988_749_895),
];

/// Lookup over the constant catalog.
///
/// Constants resolve after all variable scopes, so a user assignment to
/// `pi` shadows the constant; the explicit reference `#pi` bypasses the
/// shadow and always reaches this registry.
#[derive(Debug, Clone, Default)]
pub struct ConstantRegistry {
    overlay: IndexMap<String, f64>,
}

impl ConstantRegistry {
    pub fn is_constant(&self, name: &str) -> bool {
        self.value_of(name).is_some()
    }

    /// The value bound to `name`, overlay first, then the base catalog.
    pub fn value_of(&self, name: &str) -> Option<f64> {
        if let Some(value) = self.overlay.get(name) {
            return Some(*value);
        }
        DEFAULT_CONSTANTS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, value)| *value)
    }

    /// Register a custom constant in the overlay.
    pub fn define(&mut self, name: &str, value: f64) {
        self.overlay.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pi() {
        let registry = ConstantRegistry::default();
        assert_eq!(registry.value_of("pi"), Some(std::f64::consts::PI));
        assert!(registry.is_constant("e"));
    }

    #[test]
    fn test_unknown_constant() {
        let registry = ConstantRegistry::default();
        assert!(registry.value_of("answer").is_none());
    }

    #[test]
    fn test_overlay_shadows_base() {
        let mut registry = ConstantRegistry::default();
        registry.define("answer", 42.0);
        assert_eq!(registry.value_of("answer"), Some(42.0));

        // The overlay wins over the base catalog, the base stays intact in
        // a fresh registry.
        registry.define("pi", 3.0);
        assert_eq!(registry.value_of("pi"), Some(3.0));
        assert_eq!(
            ConstantRegistry::default().value_of("pi"),
            Some(std::f64::consts::PI)
        );
    }
}
