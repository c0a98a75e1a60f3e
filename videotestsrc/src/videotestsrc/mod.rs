//! Video Test Source Node
//!
//! This module implements `videotestsrc`, a node with a single output port
//! that paints synthetic video frames into buffers provided by its
//! orchestrator.
//!
//! ## Responsibilities
//! - Advertises raw RGB and UYVY video in any size and frame rate
//! - Validates the negotiated format and derives the row stride
//! - Tracks buffer ownership between the node and its consumer
//! - Paces production to wall-clock time (live) or to consumer demand
//!
//! ## Properties (set through the `Props` parameter)
//! - `live`: pace output to the clock instead of to demand
//! - `patternType`: `smpte-snow` or `snow`
//!
//! ## Typical Session
//! ```text
//! port_enum_params(EnumFormat) → port_set_param(Format) → port_enum_params(Buffers)
//!   → port_use_buffers → port_set_io → send_command(Start)
//!   → process_output / timer → have_output → port_reuse_buffer …
//! ```

// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

/// Buffer production (dequeue, paint, stamp, publish)
mod create_video;

/// Pattern painters
mod draw;

/// Node, clock and timer implementations
mod imp;

/// Frame pacing and the one-shot timer
mod pacing;

/// Parameter descriptor builders
mod params;


/// Settings, properties, cached type ids and port state
mod state;

pub use draw::{Frame, Painter, PixelFormat, TestPattern};
pub use imp::{Interface, VideoTestSrc};
pub use state::{Pattern, Props, Settings};
