// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Raw video format description.
//!
//! A format travels between orchestrator and node as a [`crate::pod::Object`]
//! tagged with the format object type. [`VideoInfo`] is its parsed, typed view.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    pod::{Object, Value},
    types::{FormatVideoTypes, TypeId},
};

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Rational number used for frame rates (e.g. 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    pub num: u32,
    pub denom: u32,
}

impl Fraction {
    pub const fn new(num: u32, denom: u32) -> Self {
        Self { num, denom }
    }

    /// Compares two fractions by value, `None` if either has a zero denominator.
    ///
    /// `1/2` and `2/4` compare equal even though they are not `==`.
    pub fn compare(&self, other: &Fraction) -> Option<Ordering> {
        if self.denom == 0 || other.denom == 0 {
            return None;
        }
        let lhs = self.num as u64 * other.denom as u64;
        let rhs = other.num as u64 * self.denom as u64;
        Some(lhs.cmp(&rhs))
    }
}

/// Raw video parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfoRaw {
    /// Pixel encoding.
    pub format: TypeId,
    /// Frame size.
    pub size: Rectangle,
    /// Frame rate.
    pub framerate: Fraction,
}

/// A fully parsed video format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub media_type: TypeId,
    pub media_subtype: TypeId,
    pub raw: VideoInfoRaw,
}

fn required<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| Error::InvalidFormat(format!("missing {what}")))
}

impl VideoInfo {
    /// Parses a concrete format object.
    ///
    /// Every key must be present and fixed; choices are rejected.
    pub fn parse(object: &Object, keys: &FormatVideoTypes) -> Result<Self> {
        let fixed = |key: TypeId, what: &str| -> Result<Value> {
            let property = required(object.property(key), what)?;
            if !property.is_fixed() {
                return Err(Error::InvalidFormat(format!("{what} is not fixed")));
            }
            Ok(property.value)
        };
        let wrong = |what: &str| Error::InvalidFormat(format!("{what} has the wrong type"));

        let Value::Id(media_type) = fixed(keys.media_type, "media type")? else {
            return Err(wrong("media type"));
        };
        let Value::Id(media_subtype) = fixed(keys.media_subtype, "media subtype")? else {
            return Err(wrong("media subtype"));
        };
        let Value::Id(format) = fixed(keys.format, "video format")? else {
            return Err(wrong("video format"));
        };
        let Value::Rectangle(size) = fixed(keys.size, "size")? else {
            return Err(wrong("size"));
        };
        let Value::Fraction(framerate) = fixed(keys.framerate, "framerate")? else {
            return Err(wrong("framerate"));
        };

        Ok(Self {
            media_type,
            media_subtype,
            raw: VideoInfoRaw {
                format,
                size,
                framerate,
            },
        })
    }

    /// Builds the concrete format object describing this format.
    pub fn to_object(&self, id: TypeId, object_type: TypeId, keys: &FormatVideoTypes) -> Object {
        Object::new(id, object_type)
            .with(keys.media_type, Value::Id(self.media_type))
            .with(keys.media_subtype, Value::Id(self.media_subtype))
            .with(keys.format, Value::Id(self.raw.format))
            .with(keys.size, Value::Rectangle(self.raw.size))
            .with(keys.framerate, Value::Fraction(self.raw.framerate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_compares_by_value() {
        let half = Fraction::new(1, 2);
        assert_eq!(half.compare(&Fraction::new(2, 4)), Some(Ordering::Equal));
        assert_eq!(half.compare(&Fraction::new(25, 1)), Some(Ordering::Less));
        assert_eq!(Fraction::new(30000, 1001).compare(&Fraction::new(29, 1)), Some(Ordering::Greater));
        assert_eq!(half.compare(&Fraction::new(1, 0)), None);
    }
}
