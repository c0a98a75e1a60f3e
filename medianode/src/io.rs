// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! The per-port I/O slot shared between a node and its consumer.

use std::{cell::Cell, rc::Rc};

use serde::{Deserialize, Serialize};

/// Buffer id meaning "no buffer".
pub const ID_INVALID: u32 = u32::MAX;

/// Handshake state of an I/O slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Ok,
    /// The consumer wants a buffer.
    NeedBuffer,
    /// A filled buffer is waiting in the slot.
    HaveBuffer,
    /// The producer ran out of free buffers.
    OutOfBuffers,
}

/// Contents of an I/O slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortIo {
    pub status: Status,
    pub buffer_id: u32,
}

impl Default for PortIo {
    fn default() -> Self {
        Self {
            status: Status::Ok,
            buffer_id: ID_INVALID,
        }
    }
}

/// Shared handle to a port's I/O slot.
///
/// The producer writes `HaveBuffer` plus a buffer id; the consumer takes the
/// buffer and writes `NeedBuffer` (optionally returning a used id). Both sides
/// run on the same data thread, so the slot is a plain [`Cell`].
#[derive(Debug, Clone, Default)]
pub struct IoSlot(Rc<Cell<PortIo>>);

impl IoSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> PortIo {
        self.0.get()
    }

    pub fn set(&self, io: PortIo) {
        self.0.set(io);
    }

    pub fn status(&self) -> Status {
        self.0.get().status
    }

    pub fn set_status(&self, status: Status) {
        let mut io = self.0.get();
        io.status = status;
        self.0.set(io);
    }

    pub fn buffer_id(&self) -> u32 {
        self.0.get().buffer_id
    }

    pub fn set_buffer_id(&self, buffer_id: u32) {
        let mut io = self.0.get();
        io.buffer_id = buffer_id;
        self.0.set(io);
    }

    /// Returns `true` if both handles refer to the same slot.
    pub fn same_slot(&self, other: &IoSlot) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
