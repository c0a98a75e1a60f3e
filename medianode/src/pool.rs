// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-capacity pool of installed buffers.
//!
//! Each buffer is either *free* (queued in FIFO order, available to fill) or
//! *outstanding* (handed downstream, waiting to be recycled). A buffer is never
//! in both states and never in neither.

use std::collections::VecDeque;

use tracing::trace;

use crate::{
    Error, Result,
    buffer::Buffer,
};

/// Largest buffer set a pool accepts.
pub const MAX_BUFFERS: usize = 16;

#[derive(Debug)]
struct Slot {
    buffer: Buffer,
    outstanding: bool,
}

/// Buffer pool with a FIFO free list.
#[derive(Debug, Default)]
pub struct BufferPool {
    slots: Vec<Slot>,
    free: VecDeque<u32>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the installed set.
    ///
    /// Buffer ids are reassigned to their position in `buffers`. All buffers
    /// start free, queued in the given order.
    ///
    /// # Errors
    ///
    /// * [`Error::TooManyBuffers`] if more than [`MAX_BUFFERS`] are offered.
    /// * [`Error::InvalidBuffer`] if a plane that needs memory is not mapped.
    ///
    /// On error the pool is left empty.
    pub fn install(&mut self, buffers: Vec<Buffer>) -> Result<()> {
        self.clear();
        if buffers.len() > MAX_BUFFERS {
            return Err(Error::TooManyBuffers(buffers.len()));
        }
        for (index, mut buffer) in buffers.into_iter().enumerate() {
            let id = index as u32;
            if !buffer.datas.iter().all(|data| data.is_mapped()) {
                self.clear();
                return Err(Error::InvalidBuffer(id));
            }
            buffer.id = id;
            self.slots.push(Slot {
                buffer,
                outstanding: false,
            });
            self.free.push_back(id);
        }
        trace!(count = self.slots.len(), "Installed buffers");
        Ok(())
    }

    /// Drops every installed buffer. Idempotent.
    pub fn clear(&mut self) {
        if !self.slots.is_empty() {
            trace!("Clearing {} buffers", self.slots.len());
        }
        self.slots.clear();
        self.free.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of buffers available to fill.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Ids on the free list, head first.
    pub fn free_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.free.iter().copied()
    }

    /// Takes the oldest free buffer and marks it outstanding.
    pub fn acquire(&mut self) -> Result<u32> {
        let id = self.free.pop_front().ok_or(Error::OutOfBuffers)?;
        if let Some(slot) = self.slots.get_mut(id as usize) {
            slot.outstanding = true;
        }
        Ok(id)
    }

    /// Returns an outstanding buffer to the tail of the free list.
    ///
    /// # Errors
    ///
    /// * [`Error::NoBuffers`] if nothing is installed.
    /// * [`Error::InvalidBufferId`] if `id` does not name an installed buffer.
    /// * [`Error::NotOutstanding`] if the buffer is already free.
    pub fn release(&mut self, id: u32) -> Result<()> {
        if self.slots.is_empty() {
            return Err(Error::NoBuffers);
        }
        let slot = self
            .slots
            .get_mut(id as usize)
            .ok_or(Error::InvalidBufferId(id))?;
        if !slot.outstanding {
            return Err(Error::NotOutstanding(id));
        }
        slot.outstanding = false;
        self.free.push_back(id);
        Ok(())
    }

    pub fn is_outstanding(&self, id: u32) -> bool {
        self.slots
            .get(id as usize)
            .is_some_and(|slot| slot.outstanding)
    }

    pub fn get(&self, id: u32) -> Option<&Buffer> {
        self.slots.get(id as usize).map(|slot| &slot.buffer)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Buffer> {
        self.slots.get_mut(id as usize).map(|slot| &mut slot.buffer)
    }
}
