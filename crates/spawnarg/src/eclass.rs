//! Entity-class definitions: the class-default lookup consumed by the
//! key-value store.

use crate::key;
use serde::{Deserialize, Serialize};

///
/// EntityClass
///
/// Declared defaults for entities of one class. The store consults this for
/// `key_value` fallbacks, `is_inherited`, and the baseline captured when a
/// value is first set. Absence of a default is an empty string, never an
/// error.
///

pub trait EntityClass {
    fn name(&self) -> &str;

    /// Declared default for `key` (case-insensitive); empty when the class
    /// declares none.
    fn default_value(&self, key: &str) -> &str;

    /// True when this class is `class_name` or inherits from it.
    fn is_of_type(&self, class_name: &str) -> bool;

    /// Fixed-size classes (lights, speakers) cannot contain child primitives.
    fn is_fixed_size(&self) -> bool;
}

///
/// ClassDef
///
/// Concrete class definition with builder-style attribute declaration and an
/// ancestor chain for `is_of_type`. Class definitions are immutable once a
/// store has been constructed against them.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClassDef {
    name: String,
    fixed_size: bool,
    ancestors: Vec<String>,
    attributes: Vec<(String, String)>,
}

impl ClassDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fixed_size(mut self, fixed: bool) -> Self {
        self.fixed_size = fixed;
        self
    }

    /// Declare an attribute default. Re-declaring a key (case-insensitively)
    /// overwrites the earlier value.
    #[must_use]
    pub fn attribute(mut self, attr_key: impl Into<String>, value: impl Into<String>) -> Self {
        let attr_key = attr_key.into();
        let value = value.into();

        if let Some(slot) = self
            .attributes
            .iter_mut()
            .find(|(existing, _)| key::eq_fold(existing, &attr_key))
        {
            slot.1 = value;
        } else {
            self.attributes.push((attr_key, value));
        }

        self
    }

    /// Inherit from `parent`: records the ancestor chain and adopts every
    /// parent attribute not already declared locally.
    #[must_use]
    pub fn inherit(mut self, parent: &Self) -> Self {
        self.ancestors.push(parent.name.clone());
        self.ancestors.extend(parent.ancestors.iter().cloned());

        for (attr_key, value) in &parent.attributes {
            let declared = self
                .attributes
                .iter()
                .any(|(existing, _)| key::eq_fold(existing, attr_key));
            if !declared {
                self.attributes.push((attr_key.clone(), value.clone()));
            }
        }

        self
    }
}

impl EntityClass for ClassDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_value(&self, attr_key: &str) -> &str {
        self.attributes
            .iter()
            .find(|(existing, _)| key::eq_fold(existing, attr_key))
            .map_or("", |(_, value)| value.as_str())
    }

    fn is_of_type(&self, class_name: &str) -> bool {
        self.name == class_name || self.ancestors.iter().any(|a| a == class_name)
    }

    fn is_fixed_size(&self) -> bool {
        self.fixed_size
    }
}

///
/// TESTS
///
