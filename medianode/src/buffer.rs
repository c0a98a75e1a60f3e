// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Buffer descriptors exchanged between a node and its peers.

use serde::{Deserialize, Serialize};

/// How a data plane's memory is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Plain process memory.
    MemPtr,
    /// Shared memory file descriptor, already mapped.
    MemFd,
    /// DMA buffer, already mapped.
    DmaBuf,
    /// Opaque id understood by the peer; no memory is attached.
    Id,
}

impl DataType {
    /// Returns `true` if a mapping is required for a node to write into it.
    pub fn needs_memory(self) -> bool {
        matches!(self, DataType::MemPtr | DataType::MemFd | DataType::DmaBuf)
    }
}

/// The valid region of a data plane after a node filled it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub offset: u32,
    pub size: u32,
    pub stride: i32,
}

/// One plane of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    pub data_type: DataType,
    /// Capacity of the plane in bytes.
    pub maxsize: u32,
    /// Mapped memory, `None` when the plane is not mapped.
    pub memory: Option<Vec<u8>>,
    pub chunk: Chunk,
}

impl Data {
    /// Creates a zeroed, mapped plane of `maxsize` bytes.
    pub fn mapped(maxsize: u32) -> Self {
        Self {
            data_type: DataType::MemPtr,
            maxsize,
            memory: Some(vec![0; maxsize as usize]),
            chunk: Chunk::default(),
        }
    }

    /// Returns `true` if the plane is writable by the node.
    pub fn is_mapped(&self) -> bool {
        !self.data_type.needs_memory() || self.memory.is_some()
    }
}

/// Per-frame timing header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaHeader {
    pub flags: u32,
    /// Frame sequence number.
    pub seq: u64,
    /// Presentation timestamp in nanoseconds.
    pub pts: i64,
    pub dts_offset: i64,
}

/// Metadata attached to a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Meta {
    Header(MetaHeader),
}

/// A buffer descriptor.
///
/// Buffers are provided by the orchestrator through
/// [`crate::Node::port_use_buffers`]; the node owns them until they are
/// replaced or cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    pub id: u32,
    pub metas: Vec<Meta>,
    pub datas: Vec<Data>,
}

impl Buffer {
    /// Creates a single-plane mapped buffer with a header.
    pub fn alloc(id: u32, maxsize: u32) -> Self {
        Self {
            id,
            metas: vec![Meta::Header(MetaHeader::default())],
            datas: vec![Data::mapped(maxsize)],
        }
    }

    /// The timing header, if the buffer carries one.
    pub fn header(&self) -> Option<&MetaHeader> {
        self.metas.iter().map(|Meta::Header(header)| header).next()
    }

    pub fn header_mut(&mut self) -> Option<&mut MetaHeader> {
        self.metas.iter_mut().map(|Meta::Header(header)| header).next()
    }
}
