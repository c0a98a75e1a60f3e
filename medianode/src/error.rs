// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for node operations.
//!
//! Every operation of the node surface reports its outcome through [`Result`].
//! Precondition violations, negotiation failures and resource exhaustion are all
//! local to the caller; none of them leave the node unusable.

use crate::{Direction, types::TypeId};

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when driving a node.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The parameter kind is not known to this node or port.
    #[error("Unknown parameter {0}")]
    UnknownParam(TypeId),

    /// A parameter value has the wrong type, is out of range or is not fixed.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The proposed format failed validation.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The operation requires a negotiated format.
    #[error("No format")]
    NoFormat,

    /// The operation requires an installed buffer set.
    #[error("No buffers")]
    NoBuffers,

    /// Every installed buffer is currently outstanding.
    #[error("Out of buffers")]
    OutOfBuffers,

    /// A buffer descriptor was installed without backing memory.
    #[error("Invalid memory on buffer {0}")]
    InvalidBuffer(u32),

    /// The buffer id does not name an installed buffer.
    #[error("Invalid buffer id {0}")]
    InvalidBufferId(u32),

    /// The buffer was released while not held downstream.
    #[error("Buffer {0} is not outstanding")]
    NotOutstanding(u32),

    /// More buffers were offered than the pool can track.
    #[error("Too many buffers: {0}")]
    TooManyBuffers(usize),

    /// The port direction or id does not exist on this node.
    #[error("Invalid port {direction:?} {port_id}")]
    InvalidPort {
        /// Requested direction.
        direction: Direction,
        /// Requested port id.
        port_id: u32,
    },

    /// The operation is structurally unsupported by this node.
    #[error("Not implemented")]
    NotImplemented,

    /// The node is not in a state where the operation can run.
    #[error("Wrong state: {0}")]
    WrongState(&'static str),

    /// A required support service was not provided at construction.
    #[error("Missing support: {0}")]
    MissingSupport(&'static str),

    /// The requested interface is not implemented by this handle.
    #[error("Unknown interface {0}")]
    UnknownInterface(TypeId),

    /// Failed to render a monitoring report.
    #[error("Json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` for errors the caller can recover from by satisfying a
    /// precondition and retrying.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::MissingSupport(_))
    }
}
