///
/// KeyValue
///
/// A single mutable spawnarg value. The inherited baseline comes from the
/// owning entity class, is captured once at construction, and never changes
/// afterwards. A KeyValue is exclusively owned by its key slot in one store;
/// it is never shared across entities.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyValue {
    value: String,
    inherited: String,
}

impl KeyValue {
    pub(crate) fn new(value: impl Into<String>, inherited: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            inherited: inherited.into(),
        }
    }

    /// Current value. A KeyValue always has one.
    #[must_use]
    pub fn get(&self) -> &str {
        &self.value
    }

    /// The class default captured at construction (may be empty).
    #[must_use]
    pub fn default_value(&self) -> &str {
        &self.inherited
    }

    /// Overwrite in place, returning the previous value so the store can
    /// record the per-value undo snapshot.
    pub(crate) fn assign(&mut self, value: impl Into<String>) -> String {
        std::mem::replace(&mut self.value, value.into())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_returns_the_previous_value() {
        let mut kv = KeyValue::new("75", "50");
        assert_eq!(kv.get(), "75");

        let previous = kv.assign("90");
        assert_eq!(previous, "75");
        assert_eq!(kv.get(), "90");
    }

    #[test]
    fn inherited_baseline_is_immutable() {
        let mut kv = KeyValue::new("75", "50");
        kv.assign("90");

        assert_eq!(kv.default_value(), "50");
    }
}
