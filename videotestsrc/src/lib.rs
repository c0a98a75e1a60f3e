//! Video Test Source Plugin
//!
//! This crate provides `videotestsrc`, a media node producing synthetic video
//! (colour bars and snow) for exercising media graphs without a camera.
//!
//! ## Factory
//! - **Name**: `videotestsrc`
//! - **Interfaces**: node and clock, see [`enum_interface_info`]
//! - **Construction**: [`init`] with a [`Support`] bundle (a type map is
//!   required) and an info dictionary (`node.live`, `node.async`, `node.pattern`)
//!
//! ## Supported Formats
//! - **Video**: raw RGB (3 bytes per pixel) and UYVY (2 bytes per pixel), any
//!   size, any frame rate; rows are padded to a multiple of 4 bytes
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//!
//! use medianode::{Node, Properties, Support, TypeRegistry};
//!
//! let support = Support::new(Arc::new(TypeRegistry::new()));
//! let info = Properties::from([("node.pattern".to_owned(), "snow".to_owned())]);
//! let src = videotestsrc::init(&support, &info).unwrap();
//! assert_eq!(src.get_port_ids(), (vec![], vec![0]));
//! ```

// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

use medianode::{Properties, Result, Support, types::names};

/// Video test source node (format negotiation, pacing, painting)
pub mod videotestsrc;

pub use videotestsrc::{
    Frame, Interface, Painter, Pattern, PixelFormat, Props, Settings, TestPattern, VideoTestSrc,
};

/// Name the factory is registered under.
pub const FACTORY_NAME: &str = "videotestsrc";

/// Describes the factory (author, description).
pub fn factory_info() -> Properties {
    Properties::from([
        (
            "factory.author".to_owned(),
            "Media eXchange Layer contributors".to_owned(),
        ),
        (
            "factory.description".to_owned(),
            "Generate a video test pattern".to_owned(),
        ),
    ])
}

/// Enumerates the interface names a handle implements.
///
/// # Returns
/// * `Some(name)` for `index` 0 (node) and 1 (clock)
/// * `None` past the end
pub fn enum_interface_info(index: u32) -> Option<&'static str> {
    [names::NODE, names::CLOCK].get(index as usize).copied()
}

/// Creates a new source instance.
///
/// # Errors
/// * [`medianode::Error::MissingSupport`] if `support` lacks a type map
/// * [`medianode::Error::InvalidValue`] if `info` holds an unparseable setting
pub fn init(support: &Support, info: &Properties) -> Result<VideoTestSrc> {
    VideoTestSrc::new(support, info)
}
