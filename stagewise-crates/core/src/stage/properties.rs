use std::any::type_name;
use std::any::TypeId;
use std::rc::Rc;

use itertools::Itertools;
use thiserror::Error;

use crate::basic_types::Payload;
use crate::containers::HashMap;

/// Errors raised when accessing a [`PropertyMap`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("property '{0}' has not been declared")]
    Undeclared(String),
    #[error("property '{name}' holds a {declared}, not a {requested}")]
    TypeMismatch {
        name: String,
        declared: &'static str,
        requested: &'static str,
    },
    /// Properties without a value and without a default, as `'name' (description)`.
    #[error("undefined properties: {}", .0.iter().join(", "))]
    Undefined(Vec<String>),
}

/// A named, typed value which configures a stage.
#[derive(Clone, Debug)]
pub struct Property {
    description: String,
    type_id: TypeId,
    type_name: &'static str,
    default: Option<Rc<dyn Payload>>,
    value: Option<Rc<dyn Payload>>,
}

impl Property {
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The explicitly set value, falling back to the default.
    pub fn value(&self) -> Option<&dyn Payload> {
        self.value.as_deref().or(self.default.as_deref())
    }

    pub fn is_defined(&self) -> bool {
        self.value().is_some()
    }

    fn check_type<T: Payload>(&self, name: &str) -> Result<(), PropertyError> {
        if self.type_id == TypeId::of::<T>() {
            Ok(())
        } else {
            Err(PropertyError::TypeMismatch {
                name: name.to_owned(),
                declared: self.type_name,
                requested: type_name::<T>(),
            })
        }
    }
}

/// The properties of a single stage, in the order in which they were declared.
///
/// A stage declares its properties (see [`Stage::declare_properties`]); the values are set by
/// whoever assembles the pipeline. Every declared property needs a value or a default by the time
/// the pipeline is initialised.
///
/// [`Stage::declare_properties`]: crate::stage::Stage::declare_properties
#[derive(Clone, Debug, Default)]
pub struct PropertyMap {
    names: Vec<String>,
    properties: HashMap<String, Property>,
}

impl PropertyMap {
    /// Declare a property holding a `T` which has to be set before initialisation.
    pub fn declare<T: Payload>(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.insert::<T>(name.into(), description.into(), None);
    }

    /// Declare a property holding a `T` which falls back to `default` when it is not set.
    pub fn declare_with_default<T: Payload>(
        &mut self,
        name: impl Into<String>,
        default: T,
        description: impl Into<String>,
    ) {
        let default: Rc<dyn Payload> = Rc::new(default);
        self.insert::<T>(name.into(), description.into(), Some(default));
    }

    /// Declaring a property again replaces its description and default; the value is only kept
    /// if the type stays the same.
    fn insert<T: Payload>(
        &mut self,
        name: String,
        description: String,
        default: Option<Rc<dyn Payload>>,
    ) {
        let value = self
            .properties
            .get(&name)
            .filter(|existing| existing.type_id == TypeId::of::<T>())
            .and_then(|existing| existing.value.as_ref().map(Rc::clone));
        if !self.properties.contains_key(&name) {
            self.names.push(name.clone());
        }

        let _ = self.properties.insert(
            name,
            Property {
                description,
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                default,
                value,
            },
        );
    }

    pub fn set<T: Payload>(&mut self, name: &str, value: T) -> Result<(), PropertyError> {
        let property = self
            .properties
            .get_mut(name)
            .ok_or_else(|| PropertyError::Undeclared(name.to_owned()))?;
        property.check_type::<T>(name)?;

        let value: Rc<dyn Payload> = Rc::new(value);
        property.value = Some(value);
        Ok(())
    }

    /// Remove the value of `name`, so that it falls back to its default.
    pub fn reset(&mut self, name: &str) -> Result<(), PropertyError> {
        let property = self
            .properties
            .get_mut(name)
            .ok_or_else(|| PropertyError::Undeclared(name.to_owned()))?;

        property.value = None;
        Ok(())
    }

    /// The value of `name`; [`None`] if it has neither a value nor a default.
    pub fn get<T: Payload>(&self, name: &str) -> Result<Option<&T>, PropertyError> {
        let property = self
            .property(name)
            .ok_or_else(|| PropertyError::Undeclared(name.to_owned()))?;
        property.check_type::<T>(name)?;

        Ok(property.value().and_then(|value| value.downcast_ref::<T>()))
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> + '_ {
        self.names.iter().filter_map(|name| {
            self.properties
                .get(name)
                .map(|property| (name.as_str(), property))
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Fails with every property which has neither a value nor a default.
    pub fn validate(&self) -> Result<(), PropertyError> {
        let undefined = self
            .iter()
            .filter(|(_, property)| !property.is_defined())
            .map(|(name, property)| format!("'{name}' ({})", property.description))
            .collect::<Vec<_>>();

        if undefined.is_empty() {
            Ok(())
        } else {
            Err(PropertyError::Undefined(undefined))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_used_until_a_value_is_set() {
        let mut properties = PropertyMap::default();
        properties.declare_with_default("max_distance", 2.0_f64, "the longest link");

        assert_eq!(Ok(Some(&2.0)), properties.get::<f64>("max_distance"));

        properties.set("max_distance", 5.0_f64).expect("declared as f64");
        assert_eq!(Ok(Some(&5.0)), properties.get::<f64>("max_distance"));

        properties.reset("max_distance").expect("declared");
        assert_eq!(Ok(Some(&2.0)), properties.get::<f64>("max_distance"));
    }

    #[test]
    fn values_must_match_the_declared_type() {
        let mut properties = PropertyMap::default();
        properties.declare::<u32>("attempts", "how often to retry");

        let mismatch = Err(PropertyError::TypeMismatch {
            name: "attempts".to_owned(),
            declared: "u32",
            requested: "i64",
        });
        assert_eq!(mismatch, properties.set("attempts", 3_i64));
        assert_eq!(
            Err(PropertyError::Undeclared("timeout".to_owned())),
            properties.set("timeout", 3_u32)
        );
        assert_eq!(Ok(None), properties.get::<u32>("attempts"));
    }

    #[test]
    fn validation_lists_every_undefined_property_in_declaration_order() {
        let mut properties = PropertyMap::default();
        properties.declare::<String>("group", "the group to plan for");
        properties.declare_with_default("step", 1_i64, "the step size");
        properties.declare::<f64>("timeout", "seconds per computation");

        let error = properties.validate().expect_err("two properties are undefined");

        assert_eq!(
            "undefined properties: 'group' (the group to plan for), 'timeout' (seconds per \
             computation)",
            error.to_string()
        );

        properties
            .set("group", "arm".to_owned())
            .expect("declared as String");
        properties.set("timeout", 0.5_f64).expect("declared as f64");
        assert_eq!(Ok(()), properties.validate());
    }

    #[test]
    fn redeclaring_keeps_a_value_of_the_same_type() {
        let mut properties = PropertyMap::default();
        properties.declare::<u32>("attempts", "how often to retry");
        properties.set("attempts", 4_u32).expect("declared as u32");

        properties.declare::<u32>("attempts", "retries per state");
        assert_eq!(Ok(Some(&4)), properties.get::<u32>("attempts"));
        assert_eq!(
            Some("retries per state"),
            properties.property("attempts").map(Property::description)
        );

        properties.declare::<f64>("attempts", "retries per state");
        assert_eq!(Ok(None), properties.get::<f64>("attempts"));
        assert_eq!(1, properties.len());
    }
}
