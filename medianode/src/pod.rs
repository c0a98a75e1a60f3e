// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Parameter descriptors.
//!
//! An [`Object`] is a typed key/value record used in both directions of the
//! negotiation protocol:
//!
//! - **Advertising**: a node enumerates objects whose properties carry a
//!   [`Choice`] (a discrete set or a bounded range) next to a preferred value.
//! - **Configuring**: an orchestrator hands back an object whose properties are
//!   all [`Choice::Fixed`]. Keys it leaves out keep their previous value.
//!
//! [`filter`] intersects an advertised object with a caller supplied candidate
//! and [`enum_filtered`] walks an enumeration, skipping every candidate the
//! filter rejects.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    format::{Fraction, Rectangle},
    types::TypeId,
};

/// A single typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Long(i64),
    Id(TypeId),
    Rectangle(Rectangle),
    Fraction(Fraction),
}

impl Value {
    /// Component-wise `self <= other`, `None` for unordered or mismatched kinds.
    ///
    /// Rectangles are ordered per dimension, so `10x5 <= 20x20` but neither of
    /// `10x30` and `20x20` is below the other.
    fn le(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a <= b),
            (Value::Long(a), Value::Long(b)) => Some(a <= b),
            (Value::Rectangle(a), Value::Rectangle(b)) => {
                Some(a.width <= b.width && a.height <= b.height)
            }
            (Value::Fraction(a), Value::Fraction(b)) => {
                a.compare(b).map(|ordering| ordering != Ordering::Greater)
            }
            _ => None,
        }
    }

    fn max(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(*a.max(b))),
            (Value::Long(a), Value::Long(b)) => Some(Value::Long(*a.max(b))),
            (Value::Rectangle(a), Value::Rectangle(b)) => Some(Value::Rectangle(Rectangle::new(
                a.width.max(b.width),
                a.height.max(b.height),
            ))),
            (Value::Fraction(a), Value::Fraction(b)) => match a.compare(b)? {
                Ordering::Less => Some(*other),
                _ => Some(*self),
            },
            _ => None,
        }
    }

    fn min(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(*a.min(b))),
            (Value::Long(a), Value::Long(b)) => Some(Value::Long(*a.min(b))),
            (Value::Rectangle(a), Value::Rectangle(b)) => Some(Value::Rectangle(Rectangle::new(
                a.width.min(b.width),
                a.height.min(b.height),
            ))),
            (Value::Fraction(a), Value::Fraction(b)) => match a.compare(b)? {
                Ordering::Greater => Some(*other),
                _ => Some(*self),
            },
            _ => None,
        }
    }

    fn within(&self, min: &Value, max: &Value) -> bool {
        min.le(self) == Some(true) && self.le(max) == Some(true)
    }

    /// Rust-side type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Id(_) => "id",
            Value::Rectangle(_) => "rectangle",
            Value::Fraction(_) => "fraction",
        }
    }
}

/// Extraction of a concrete Rust value from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

impl_from_value!(bool, Bool);
impl_from_value!(i32, Int);
impl_from_value!(i64, Long);
impl_from_value!(TypeId, Id);
impl_from_value!(Rectangle, Rectangle);
impl_from_value!(Fraction, Fraction);

/// The set of values a property may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Choice {
    /// Exactly the property's value.
    Fixed,
    /// Any value between `min` and `max`, inclusive.
    Range { min: Value, max: Value },
    /// One of the listed alternatives.
    Enum(Vec<Value>),
}

/// One key of an [`Object`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: TypeId,
    /// The value when fixed, the preferred value otherwise.
    pub value: Value,
    pub choice: Choice,
}

impl Property {
    pub fn fixed(key: TypeId, value: Value) -> Self {
        Self {
            key,
            value,
            choice: Choice::Fixed,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.choice, Choice::Fixed)
    }

    /// Returns `true` if `value` is acceptable for this property.
    pub fn accepts(&self, value: &Value) -> bool {
        match &self.choice {
            Choice::Fixed => self.value == *value,
            Choice::Range { min, max } => value.within(min, max),
            Choice::Enum(alternatives) => alternatives.contains(value),
        }
    }

    /// Intersects two properties with the same key.
    ///
    /// The preferred value of `self` wins whenever it survives the
    /// intersection. Returns `None` when nothing is left.
    pub fn intersect(&self, other: &Property) -> Option<Property> {
        if std::mem::discriminant(&self.value) != std::mem::discriminant(&other.value) {
            return None;
        }
        match (&self.choice, &other.choice) {
            (Choice::Fixed, _) => other.accepts(&self.value).then(|| self.clone()),
            (_, Choice::Fixed) => self
                .accepts(&other.value)
                .then(|| Property::fixed(self.key, other.value)),
            (Choice::Range { min: amin, max: amax }, Choice::Range { min: bmin, max: bmax }) => {
                let min = amin.max(bmin)?;
                let max = amax.min(bmax)?;
                if min.le(&max) != Some(true) {
                    return None;
                }
                if min == max {
                    return Some(Property::fixed(self.key, min));
                }
                let value = self.value.max(&min)?.min(&max)?;
                Some(Property {
                    key: self.key,
                    value,
                    choice: Choice::Range { min, max },
                })
            }
            (Choice::Enum(_), Choice::Enum(_))
            | (Choice::Enum(_), Choice::Range { .. })
            | (Choice::Range { .. }, Choice::Enum(_)) => {
                let candidates = match (&self.choice, &other.choice) {
                    (Choice::Enum(values), _) => values,
                    (_, Choice::Enum(values)) => values,
                    _ => unreachable!(),
                };
                let remaining: Vec<Value> = candidates
                    .iter()
                    .filter(|value| self.accepts(value) && other.accepts(value))
                    .copied()
                    .collect();
                match remaining.as_slice() {
                    [] => None,
                    [only] => Some(Property::fixed(self.key, *only)),
                    [first, ..] => {
                        let value = if remaining.contains(&self.value) {
                            self.value
                        } else {
                            *first
                        };
                        Some(Property {
                            key: self.key,
                            value,
                            choice: Choice::Enum(remaining),
                        })
                    }
                }
            }
        }
    }
}

/// A parameter descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Which parameter set this object describes (e.g. the format param id).
    pub id: TypeId,
    /// The object's type (e.g. the format or props object type).
    pub object_type: TypeId,
    pub properties: Vec<Property>,
}

impl Object {
    pub fn new(id: TypeId, object_type: TypeId) -> Self {
        Self {
            id,
            object_type,
            properties: Vec::new(),
        }
    }

    /// Adds a fixed property.
    pub fn with(mut self, key: TypeId, value: Value) -> Self {
        self.properties.push(Property::fixed(key, value));
        self
    }

    /// Adds a property choosing among `alternatives`, preferring `value`.
    pub fn with_enum(
        mut self,
        key: TypeId,
        value: Value,
        alternatives: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.properties.push(Property {
            key,
            value,
            choice: Choice::Enum(alternatives.into_iter().collect()),
        });
        self
    }

    /// Adds a property ranging over `[min, max]`, preferring `value`.
    pub fn with_range(mut self, key: TypeId, value: Value, min: Value, max: Value) -> Self {
        self.properties.push(Property {
            key,
            value,
            choice: Choice::Range { min, max },
        });
        self
    }

    pub fn property(&self, key: TypeId) -> Option<&Property> {
        self.properties.iter().find(|property| property.key == key)
    }

    /// Returns `true` if no property carries a choice.
    pub fn is_fixed(&self) -> bool {
        self.properties.iter().all(Property::is_fixed)
    }

    /// Reads an optional concrete value.
    ///
    /// Absent keys yield `Ok(None)` so callers can apply partial updates. A
    /// present key that is not fixed or has another type is an error.
    pub fn get<T: FromValue>(&self, key: TypeId) -> Result<Option<T>> {
        let Some(property) = self.property(key) else {
            return Ok(None);
        };
        if !property.is_fixed() {
            return Err(Error::InvalidValue(format!("property {key} is not fixed")));
        }
        T::from_value(&property.value).map(Some).ok_or_else(|| {
            Error::InvalidValue(format!(
                "property {key} has unexpected type {}",
                property.value.type_name()
            ))
        })
    }
}

/// Intersects `param` with an optional `filter`.
///
/// Keys missing from the filter are unconstrained; keys only present in the
/// filter are ignored. `None` means the filter rejects the object.
pub fn filter(param: &Object, filter: Option<&Object>) -> Option<Object> {
    let Some(filter) = filter else {
        return Some(param.clone());
    };
    if filter.object_type != param.object_type {
        return None;
    }
    let properties = param
        .properties
        .iter()
        .map(|property| match filter.property(property.key) {
            Some(constraint) => property.intersect(constraint),
            None => Some(property.clone()),
        })
        .collect::<Option<Vec<_>>>()?;
    Some(Object {
        id: param.id,
        object_type: param.object_type,
        properties,
    })
}

/// Runs one step of a filtered enumeration.
///
/// `build` produces the candidate at a given index or `None` past the end.
/// Candidates rejected by `filter_object` are skipped without returning to the
/// caller. `index` is left just past the returned candidate, so calling again
/// with the same `index` continues the enumeration.
pub fn enum_filtered<F>(
    index: &mut u32,
    filter_object: Option<&Object>,
    mut build: F,
) -> Result<Option<Object>>
where
    F: FnMut(u32) -> Result<Option<Object>>,
{
    loop {
        let Some(candidate) = build(*index)? else {
            return Ok(None);
        };
        *index += 1;
        if let Some(result) = filter(&candidate, filter_object) {
            return Ok(Some(result));
        }
    }
}
