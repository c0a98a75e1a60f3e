//! State Management for the Video Test Source
//!
//! This module defines the runtime state structures used by videotestsrc:
//! - Construction settings (live, async, pattern) read from the info dictionary
//! - User properties changed through the `Props` parameter
//! - The cached capability id table
//! - Output port state (flags, I/O slot, negotiated format, buffer pool)

// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use super::draw::PixelFormat;

use medianode::{
    BufferPool, Error, IoSlot, PortFlags, PortInfo, Properties, Result, TypeId, TypeMap,
    VideoInfo, config,
    types::{
        AllocBuffersTypes, AllocMetaEnableTypes, FormatVideoTypes, MediaSubtypes, MediaTypes,
        MetaTypes, ParamTypes, VideoFormatTypes, names,
    },
};

/// Name used in logs and in the monitoring report.
pub(crate) const NAME: &str = "videotestsrc";

/// Default for the `live` property (demand paced)
pub(crate) const DEFAULT_LIVE: bool = false;

/// Default for timer-driven non-live production
pub(crate) const DEFAULT_ASYNC: bool = false;

/// Default pattern
pub(crate) const DEFAULT_PATTERN: Pattern = Pattern::SmpteSnow;

/// Buffer count advertised as preferred in the buffer requirements
pub(crate) const DEFAULT_BUFFERS: i32 = 2;

/// Buffer alignment advertised in the buffer requirements
pub(crate) const BUFFER_ALIGN: i32 = 16;

/// Test patterns the source can paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Colour bars over a strip of snow.
    SmpteSnow,
    /// Random grey noise.
    Snow,
}

impl Pattern {
    pub const ALL: [Pattern; 2] = [Pattern::SmpteSnow, Pattern::Snow];

    /// Sub-key of the pattern type capability, also used in the info dictionary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::SmpteSnow => "smpte-snow",
            Pattern::Snow => "snow",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Pattern::ALL
            .into_iter()
            .find(|pattern| pattern.as_str() == name)
            .ok_or_else(|| Error::InvalidValue(format!("unknown pattern '{name}'")))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User properties, updated through the `Props` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Props {
    /// Pace output to wall-clock time
    pub live: bool,

    /// Pattern to paint
    pub pattern: Pattern,
}

impl Default for Props {
    fn default() -> Self {
        Props {
            live: DEFAULT_LIVE,
            pattern: DEFAULT_PATTERN,
        }
    }
}

/// Construction settings read from the factory info dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Initial properties
    pub props: Props,

    /// Drive non-live production from the timer instead of from demand
    pub async_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            props: Props::default(),
            async_mode: DEFAULT_ASYNC,
        }
    }
}

impl Settings {
    /// Reads the well-known keys, falling back to defaults for absent ones.
    pub fn from_info(info: &Properties) -> Result<Self> {
        let mut settings = Settings::default();
        if let Some(live) = config::get_bool(info, config::NODE_LIVE)? {
            settings.props.live = live;
        }
        if let Some(async_mode) = config::get_bool(info, config::NODE_ASYNC)? {
            settings.async_mode = async_mode;
        }
        if let Some(pattern) = config::get_str(info, config::NODE_PATTERN) {
            settings.props.pattern = Pattern::from_name(pattern)?;
        }
        Ok(settings)
    }
}

/// Capability ids resolved once at construction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Types {
    pub node: TypeId,
    pub clock: TypeId,
    pub format: TypeId,
    pub props: TypeId,
    pub prop_live: TypeId,
    pub prop_pattern: TypeId,
    pub pattern_smpte_snow: TypeId,
    pub pattern_snow: TypeId,
    pub param: ParamTypes,
    pub meta: MetaTypes,
    pub media_type: MediaTypes,
    pub media_subtype: MediaSubtypes,
    pub format_video: FormatVideoTypes,
    pub video_format: VideoFormatTypes,
    pub alloc_buffers: AllocBuffersTypes,
    pub alloc_meta_enable: AllocMetaEnableTypes,
}

impl Types {
    pub fn map(map: &dyn TypeMap) -> Self {
        let pattern = |pattern: Pattern| map.resolve(names::PROP_PATTERN_TYPE, Some(pattern.as_str()));
        Types {
            node: map.get_id(names::NODE),
            clock: map.get_id(names::CLOCK),
            format: map.get_id(names::FORMAT),
            props: map.get_id(names::PROPS),
            prop_live: map.get_id(names::PROP_LIVE),
            prop_pattern: map.get_id(names::PROP_PATTERN_TYPE),
            pattern_smpte_snow: pattern(Pattern::SmpteSnow),
            pattern_snow: pattern(Pattern::Snow),
            param: ParamTypes::map(map),
            meta: MetaTypes::map(map),
            media_type: MediaTypes::map(map),
            media_subtype: MediaSubtypes::map(map),
            format_video: FormatVideoTypes::map(map),
            video_format: VideoFormatTypes::map(map),
            alloc_buffers: AllocBuffersTypes::map(map),
            alloc_meta_enable: AllocMetaEnableTypes::map(map),
        }
    }

    pub fn pattern_id(&self, pattern: Pattern) -> TypeId {
        match pattern {
            Pattern::SmpteSnow => self.pattern_smpte_snow,
            Pattern::Snow => self.pattern_snow,
        }
    }

    pub fn pattern_from_id(&self, id: TypeId) -> Option<Pattern> {
        Pattern::ALL
            .into_iter()
            .find(|pattern| self.pattern_id(*pattern) == id)
    }
}

/// Runtime state of the single output port.
#[derive(Debug)]
pub(crate) struct PortState {
    /// Static capabilities; `LIVE` follows the `live` property
    pub info: PortInfo,

    /// Slot shared with the consumer
    pub io: Option<IoSlot>,

    /// Negotiated format, `None` until set
    pub format: Option<VideoInfo>,

    /// Pixel layout of the negotiated format
    pub pixel_format: PixelFormat,

    /// Bytes per row of the negotiated format
    pub stride: u32,

    /// Installed buffers
    pub pool: BufferPool,
}

impl PortState {
    pub fn new(live: bool) -> Self {
        let mut state = PortState {
            info: PortInfo {
                flags: PortFlags::CAN_USE_BUFFERS | PortFlags::NO_REF,
            },
            io: None,
            format: None,
            pixel_format: PixelFormat::Rgb,
            stride: 0,
            pool: BufferPool::new(),
        };
        state.set_live(live);
        state
    }

    pub fn set_live(&mut self, live: bool) {
        self.info.flags.set(PortFlags::LIVE, live);
    }
}
