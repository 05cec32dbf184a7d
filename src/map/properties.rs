use std::collections::BTreeMap;
use derive_more::*;
use serde::{Deserialize, Serialize};

/// Custom properties attached to tiles, terrains, objects and tilesets.
/// Ordered by name so that iteration is stable.
#[derive(Clone, PartialEq, Default, Debug, Deref, DerefMut, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.0.get(name)? {
            PropertyValue::String(value) | PropertyValue::File(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.0.get(name)? {
            PropertyValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.0.get(name)? {
            PropertyValue::Float(value) => Some(*value),
            PropertyValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.0.get(name)? {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Copies every property of `other` into this set, overwriting on name clashes.
    pub fn merge(&mut self, other: &Properties) {
        for (name, value) in other.iter() {
            self.0.insert(name.clone(), value.clone());
        }
    }
}

#[derive(Clone, PartialEq, Debug, From, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Path to a file, relative to the tileset.
    #[from(ignore)]
    File(String),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(String::from(value))
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

#[cfg(test)]
mod test {
    use super::{Properties, PropertyValue};

    #[test]
    fn typed_access() {
        let mut props = Properties::new();
        props.set("solid", true);
        props.set("damage", 3i64);
        props.set("speed", 1.5);
        props.set("sound", "splash");
        props.insert(String::from("script"), PropertyValue::File(String::from("water.lua")));

        assert_eq!(Some(true), props.get_bool("solid"));
        assert_eq!(Some(3), props.get_int("damage"));
        assert_eq!(Some(3.0), props.get_float("damage"));
        assert_eq!(Some(1.5), props.get_float("speed"));
        assert_eq!(Some("splash"), props.get_str("sound"));
        assert_eq!(Some("water.lua"), props.get_str("script"));
        assert_eq!(None, props.get_int("sound"));
        assert_eq!(None, props.get_bool("missing"));
    }

    #[test]
    fn merge_overwrites() {
        let mut base = Properties::new();
        base.set("a", 1i64);
        base.set("b", 2i64);
        let mut other = Properties::new();
        other.set("b", "two");
        base.merge(&other);
        assert_eq!(Some(1), base.get_int("a"));
        assert_eq!(Some("two"), base.get_str("b"));
        assert_eq!(2, base.len());
    }
}
