//! Parameter Descriptors
//!
//! Builders for every parameter the source advertises. Enumerable parameters
//! carry choices; the current format and the buffer and metadata requirements
//! are concrete.

// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

use medianode::{
    Error, Fraction, MAX_BUFFERS, MetaHeader, Object, Rectangle, Result, TypeId, Value, VideoInfo,
};

use super::state::{BUFFER_ALIGN, DEFAULT_BUFFERS, Pattern, Props, Types};

/// Preferred frame size.
pub(crate) const DEFAULT_SIZE: Rectangle = Rectangle::new(320, 240);

/// Preferred frame rate.
pub(crate) const DEFAULT_FRAMERATE: Fraction = Fraction::new(25, 1);

/// Largest frame dimension and frame rate term.
pub(crate) const MAX_DIMENSION: u32 = i32::MAX as u32;

/// Slowest frame rate accepted.
pub(crate) const MIN_FRAMERATE: Fraction = Fraction::new(1, MAX_DIMENSION);

/// One entry of a parameter list.
pub(crate) fn list(t: &Types, id: TypeId, listed: TypeId) -> Object {
    Object::new(id, t.param.list).with(t.param.list_id, Value::Id(listed))
}

pub(crate) fn props(t: &Types, id: TypeId, props: &Props) -> Object {
    Object::new(id, t.props)
        .with_enum(
            t.prop_live,
            Value::Bool(props.live),
            [Value::Bool(false), Value::Bool(true)],
        )
        .with_enum(
            t.prop_pattern,
            Value::Id(t.pattern_id(props.pattern)),
            Pattern::ALL.map(|pattern| Value::Id(t.pattern_id(pattern))),
        )
}

/// Every raw video format the source can produce.
pub(crate) fn enum_format(t: &Types, id: TypeId) -> Object {
    Object::new(id, t.format)
        .with(t.format_video.media_type, Value::Id(t.media_type.video))
        .with(t.format_video.media_subtype, Value::Id(t.media_subtype.raw))
        .with_enum(
            t.format_video.format,
            Value::Id(t.video_format.rgb),
            [Value::Id(t.video_format.rgb), Value::Id(t.video_format.uyvy)],
        )
        .with_range(
            t.format_video.size,
            Value::Rectangle(DEFAULT_SIZE),
            Value::Rectangle(Rectangle::new(1, 1)),
            Value::Rectangle(Rectangle::new(MAX_DIMENSION, MAX_DIMENSION)),
        )
        .with_range(
            t.format_video.framerate,
            Value::Fraction(DEFAULT_FRAMERATE),
            Value::Fraction(MIN_FRAMERATE),
            Value::Fraction(Fraction::new(MAX_DIMENSION, 1)),
        )
}

/// The negotiated format.
pub(crate) fn format(t: &Types, id: TypeId, info: &VideoInfo) -> Object {
    info.to_object(id, t.format, &t.format_video)
}

/// Buffer requirements for frames of `stride` bytes per row.
pub(crate) fn buffers(t: &Types, id: TypeId, stride: u32, height: u32) -> Result<Object> {
    let size = i32::try_from(stride as u64 * height as u64)
        .map_err(|_| Error::InvalidValue(format!("frame of {stride}x{height} bytes is too large")))?;
    let stride = i32::try_from(stride)
        .map_err(|_| Error::InvalidValue(format!("stride {stride} is too large")))?;
    Ok(Object::new(id, t.alloc_buffers.buffers_object)
        .with(t.alloc_buffers.size, Value::Int(size))
        .with(t.alloc_buffers.stride, Value::Int(stride))
        .with_range(
            t.alloc_buffers.buffers,
            Value::Int(DEFAULT_BUFFERS),
            Value::Int(1),
            Value::Int(MAX_BUFFERS as i32),
        )
        .with(t.alloc_buffers.align, Value::Int(BUFFER_ALIGN)))
}

/// Requests a timing header on every buffer.
pub(crate) fn meta(t: &Types, id: TypeId) -> Object {
    Object::new(id, t.alloc_meta_enable.meta_enable)
        .with(t.alloc_meta_enable.meta_type, Value::Id(t.meta.header))
        .with(
            t.alloc_meta_enable.size,
            Value::Int(size_of::<MetaHeader>() as i32),
        )
}
