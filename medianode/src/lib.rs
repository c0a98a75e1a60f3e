// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! # medianode
//!
//! Building blocks for pluggable media nodes: the parameter negotiation model,
//! buffer descriptors and their lifecycle, the shared I/O slot, time sources and
//! the [`Node`] interface an orchestrator drives.
//!
//! ## Overview
//!
//! A node is a single-threaded state machine. It never spawns threads, never
//! blocks and never owns a timer: an orchestrator calls its operations and a
//! [`DataLoop`] wakes it up when its reported [`Timeout`] expires.
//!
//! ### Key Concepts
//!
//! - **Capability ids**: names resolved once through a [`TypeMap`] into [`TypeId`]s
//! - **Parameter descriptors**: [`Object`]s advertising choices or carrying fixed values
//! - **Buffers**: descriptors installed by the orchestrator, tracked by a [`BufferPool`]
//! - **I/O slot**: the [`IoSlot`] where a node deposits produced buffer ids
//!
//! ## Negotiation
//!
//! ```text
//! orchestrator                         node
//!     │ enum_params(EnumFormat, i) ──►  │  choices (ranges / enums)
//!     │ set_param(Format, fixed)   ──►  │  validated, stride computed
//!     │ enum_params(Buffers, 0)    ──►  │  size / stride / count
//!     │ use_buffers([...])         ──►  │  pool installed
//!     │ set_io(slot), Start        ──►  │  pacing armed
//!     │ ◄── have_output                 │  id deposited in the slot
//!     │ reuse_buffer(id)           ──►  │  id back on the free list
//! ```

mod error;

pub mod buffer;
pub mod clock;
pub mod config;
pub mod data_loop;
pub mod format;
pub mod io;
pub mod node;
pub mod pod;
pub mod pool;
pub mod types;

pub use buffer::{Buffer, Chunk, Data, DataType, Meta, MetaHeader};
pub use clock::{Clock, ClockState, ClockTime, ManualClock, MonotonicClock, NSEC_PER_SEC, TimeSource};
pub use data_loop::{DataLoop, Timeout, TimerSource};
pub use error::{Error, Result};
pub use format::{Fraction, Rectangle, VideoInfo, VideoInfoRaw};
pub use io::{ID_INVALID, IoSlot, PortIo, Status};
pub use node::{
    Command, Direction, Node, NodeCallbacks, NodeInfo, NodeState, PortCounts, PortFlags, PortInfo,
    Properties, Support,
};
pub use pod::{Choice, Object, Property, Value};
pub use pool::{BufferPool, MAX_BUFFERS};
pub use types::{TypeId, TypeMap, TypeRegistry};
