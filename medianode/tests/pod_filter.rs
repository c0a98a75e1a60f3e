// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Filtered enumeration over a registry-backed set of format candidates.
//!
//! A filtered walk must visit exactly the candidates that survive a post-hoc
//! intersection of the unfiltered walk, in the same order, and must end.

use std::sync::Arc;

use medianode::{
    Fraction, Object, Rectangle, Result, TypeMap, TypeRegistry, Value,
    pod::{enum_filtered, filter},
    types::{FormatVideoTypes, MediaSubtypes, MediaTypes, ParamTypes, VideoFormatTypes, names},
};
use tracing::info;

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

fn setup_test() -> Arc<TypeRegistry> {
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .init();
    });
    Arc::new(TypeRegistry::new())
}

struct Candidates {
    format_object: medianode::TypeId,
    param: ParamTypes,
    media: MediaTypes,
    subtypes: MediaSubtypes,
    keys: FormatVideoTypes,
    formats: VideoFormatTypes,
}

impl Candidates {
    fn new(map: &dyn TypeMap) -> Self {
        Self {
            format_object: map.get_id(names::FORMAT),
            param: ParamTypes::map(map),
            media: MediaTypes::map(map),
            subtypes: MediaSubtypes::map(map),
            keys: FormatVideoTypes::map(map),
            formats: VideoFormatTypes::map(map),
        }
    }

    /// Three candidates: RGB up to 1080p, UYVY up to 720p and a fixed RGB VGA.
    fn build(&self, index: u32) -> Result<Option<Object>> {
        let base = Object::new(self.param.id_enum_format, self.format_object)
            .with(self.keys.media_type, Value::Id(self.media.video))
            .with(self.keys.media_subtype, Value::Id(self.subtypes.raw));
        let rate = |object: Object| {
            object.with_range(
                self.keys.framerate,
                Value::Fraction(Fraction::new(25, 1)),
                Value::Fraction(Fraction::new(1, 1)),
                Value::Fraction(Fraction::new(60, 1)),
            )
        };
        let candidate = match index {
            0 => rate(
                base.with(self.keys.format, Value::Id(self.formats.rgb)).with_range(
                    self.keys.size,
                    Value::Rectangle(Rectangle::new(320, 240)),
                    Value::Rectangle(Rectangle::new(1, 1)),
                    Value::Rectangle(Rectangle::new(1920, 1080)),
                ),
            ),
            1 => rate(
                base.with(self.keys.format, Value::Id(self.formats.uyvy)).with_range(
                    self.keys.size,
                    Value::Rectangle(Rectangle::new(320, 240)),
                    Value::Rectangle(Rectangle::new(1, 1)),
                    Value::Rectangle(Rectangle::new(1280, 720)),
                ),
            ),
            2 => rate(
                base.with(self.keys.format, Value::Id(self.formats.rgb))
                    .with(self.keys.size, Value::Rectangle(Rectangle::new(640, 480))),
            ),
            _ => return Ok(None),
        };
        Ok(Some(candidate))
    }

    fn walk(&self, filter_object: Option<&Object>) -> Vec<Object> {
        let mut results = Vec::new();
        let mut index = 0;
        while let Some(object) = enum_filtered(&mut index, filter_object, |i| self.build(i)).unwrap() {
            results.push(object);
            assert!(index <= 3, "enumeration must end");
        }
        results
    }
}

#[test]
fn filtered_walk_matches_post_hoc_intersection() {
    let registry = setup_test();
    let candidates = Candidates::new(registry.as_ref());

    let filters = [
        Object::new(candidates.param.id_enum_format, candidates.format_object)
            .with(candidates.keys.format, Value::Id(candidates.formats.rgb)),
        Object::new(candidates.param.id_enum_format, candidates.format_object)
            .with(candidates.keys.size, Value::Rectangle(Rectangle::new(1600, 900))),
        Object::new(candidates.param.id_enum_format, candidates.format_object).with_range(
            candidates.keys.size,
            Value::Rectangle(Rectangle::new(640, 480)),
            Value::Rectangle(Rectangle::new(600, 400)),
            Value::Rectangle(Rectangle::new(800, 600)),
        ),
        Object::new(candidates.param.id_enum_format, candidates.format_object)
            .with(candidates.keys.framerate, Value::Fraction(Fraction::new(120, 1))),
    ];

    let unfiltered = candidates.walk(None);
    assert_eq!(unfiltered.len(), 3);

    for filter_object in &filters {
        let direct = candidates.walk(Some(filter_object));
        let post_hoc: Vec<Object> = unfiltered
            .iter()
            .filter_map(|object| filter(object, Some(filter_object)))
            .collect();
        info!("Filter kept {} of {} candidates", direct.len(), unfiltered.len());
        assert_eq!(direct, post_hoc);
    }
}

#[test]
fn fixed_filter_collapses_choices() {
    let registry = setup_test();
    let candidates = Candidates::new(registry.as_ref());

    let wanted = Object::new(candidates.param.id_enum_format, candidates.format_object)
        .with(candidates.keys.format, Value::Id(candidates.formats.uyvy))
        .with(candidates.keys.size, Value::Rectangle(Rectangle::new(1280, 720)))
        .with(candidates.keys.framerate, Value::Fraction(Fraction::new(30, 1)));

    let result = candidates.walk(Some(&wanted));
    assert_eq!(result.len(), 1);
    assert!(result[0].is_fixed());
    assert_eq!(
        result[0].get::<Rectangle>(candidates.keys.size).unwrap(),
        Some(Rectangle::new(1280, 720))
    );
}

#[test]
fn foreign_object_type_filters_everything() {
    let registry = setup_test();
    let candidates = Candidates::new(registry.as_ref());
    let props = Object::new(candidates.param.id_props, registry.get_id(names::PROPS));
    assert!(candidates.walk(Some(&props)).is_empty());
}
