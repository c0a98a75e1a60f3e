// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! The node interface driven by an orchestrator, plus its monitoring report.

use std::{collections::BTreeMap, sync::Arc};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Error, Result,
    buffer::Buffer,
    clock::TimeSource,
    io::{IoSlot, Status},
    pod::Object,
    types::{TypeId, TypeMap},
};

/// Free-form string dictionary used for construction info and node properties.
pub type Properties = BTreeMap<String, String>;

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

bitflags! {
    /// Static port capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PortFlags: u32 {
        /// The port accepts externally provided buffers.
        const CAN_USE_BUFFERS = 1 << 0;
        /// Output buffers are handed out without copying.
        const NO_REF = 1 << 1;
        /// The port produces data paced to wall-clock time.
        const LIVE = 1 << 2;
    }
}

/// Snapshot of a port's static capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortInfo {
    pub flags: PortFlags,
}

/// Port counts reported by [`Node::get_n_ports`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PortCounts {
    pub n_input_ports: u32,
    pub max_input_ports: u32,
    pub n_output_ports: u32,
    pub max_output_ports: u32,
}

/// Commands a node may receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Flush,
    Drain,
    Marker,
    ClockUpdate,
}

/// Lifecycle state as reported for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// An error occurred; [`NodeInfo::error`] carries the reason.
    Error,
    /// No format negotiated yet.
    Creating,
    /// Format set but no buffers installed.
    Suspended,
    /// Ready to start.
    Idle,
    /// Producing.
    Running,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Error => "error",
            NodeState::Creating => "creating",
            NodeState::Suspended => "suspended",
            NodeState::Idle => "idle",
            NodeState::Running => "running",
        }
    }
}

/// Monitoring report for a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub id: Uuid,
    pub name: String,
    pub state: NodeState,
    /// Reason for [`NodeState::Error`], `None` otherwise.
    pub error: Option<String>,
    pub n_input_ports: u32,
    pub n_output_ports: u32,
    pub props: Properties,
}

impl NodeInfo {
    /// Renders the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Notifications a node emits towards its orchestrator.
///
/// Callbacks run on the data thread, inside the node operation that triggered
/// them, and must not call back into the node.
pub trait NodeCallbacks {
    /// A buffer was deposited in the output I/O slot.
    fn have_output(&mut self);
}

impl<F: FnMut()> NodeCallbacks for F {
    fn have_output(&mut self) {
        self()
    }
}

/// Services injected at construction.
#[derive(Clone, Default)]
pub struct Support {
    /// Required.
    pub type_map: Option<Arc<dyn TypeMap>>,
    /// Optional; nodes fall back to a monotonic clock.
    pub clock: Option<Arc<dyn TimeSource>>,
}

impl Support {
    pub fn new(type_map: Arc<dyn TypeMap>) -> Self {
        Self {
            type_map: Some(type_map),
            clock: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Returns the type map or [`Error::MissingSupport`].
    pub fn type_map(&self) -> Result<&Arc<dyn TypeMap>> {
        self.type_map
            .as_ref()
            .ok_or(Error::MissingSupport("type map"))
    }
}

/// The operation surface of a media node.
///
/// An orchestrator drives a node exclusively through these operations, all of
/// which run on a single data thread and never block. Parameter enumeration
/// returns `Ok(None)` at the end of the enumeration.
pub trait Node {
    /// Current monitoring report.
    fn info(&self) -> NodeInfo;

    fn enum_params(
        &self,
        id: TypeId,
        index: &mut u32,
        filter: Option<&Object>,
    ) -> Result<Option<Object>>;

    fn set_param(&mut self, id: TypeId, flags: u32, param: Option<&Object>) -> Result<()>;

    fn send_command(&mut self, command: Command) -> Result<()>;

    fn set_callbacks(&mut self, callbacks: Option<Box<dyn NodeCallbacks>>);

    fn get_n_ports(&self) -> PortCounts;

    /// Input and output port ids.
    fn get_port_ids(&self) -> (Vec<u32>, Vec<u32>);

    fn add_port(&mut self, _direction: Direction, _port_id: u32) -> Result<()> {
        Err(Error::NotImplemented)
    }

    fn remove_port(&mut self, _direction: Direction, _port_id: u32) -> Result<()> {
        Err(Error::NotImplemented)
    }

    fn port_get_info(&self, direction: Direction, port_id: u32) -> Result<PortInfo>;

    fn port_enum_params(
        &self,
        direction: Direction,
        port_id: u32,
        id: TypeId,
        index: &mut u32,
        filter: Option<&Object>,
    ) -> Result<Option<Object>>;

    fn port_set_param(
        &mut self,
        direction: Direction,
        port_id: u32,
        id: TypeId,
        flags: u32,
        param: Option<&Object>,
    ) -> Result<()>;

    /// Installs a buffer set, replacing the previous one. An empty set clears.
    fn port_use_buffers(
        &mut self,
        direction: Direction,
        port_id: u32,
        buffers: Vec<Buffer>,
    ) -> Result<()>;

    fn port_alloc_buffers(
        &mut self,
        direction: Direction,
        port_id: u32,
        params: &[Object],
        n_buffers: u32,
    ) -> Result<Vec<Buffer>>;

    /// Read access to an installed buffer, e.g. after it was deposited in the
    /// I/O slot.
    fn port_get_buffer(&self, direction: Direction, port_id: u32, buffer_id: u32)
    -> Result<&Buffer>;

    fn port_set_io(&mut self, direction: Direction, port_id: u32, io: Option<IoSlot>)
    -> Result<()>;

    /// Returns an outstanding output buffer to the node.
    fn port_reuse_buffer(&mut self, port_id: u32, buffer_id: u32) -> Result<()>;

    fn port_send_command(
        &mut self,
        _direction: Direction,
        _port_id: u32,
        _command: Command,
    ) -> Result<()> {
        Err(Error::NotImplemented)
    }

    fn process_input(&mut self) -> Result<Status> {
        Err(Error::NotImplemented)
    }

    fn process_output(&mut self) -> Result<Status>;
}
