//! Video Test Source Implementation
//!
//! This module contains the core implementation of the source:
//! - The [`Node`] operation surface (parameters, commands, port operations)
//! - The [`Clock`] facade
//! - The [`TimerSource`] hook driven by a [`medianode::DataLoop`]
//!
//! ## State Machine
//! ```text
//! Creating ──set_format──► Suspended ──use_buffers──► Idle ──Start──► Running
//!     ▲                        │   ▲                   ▲               │
//!     └──── set_format(None) ──┘   └─ use_buffers([]) ─┘◄──── Pause ───┘
//! ```
//! `Error` is reported after an installation with unmapped memory, until the
//! next successful transition.

// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use medianode::{
    Buffer, Clock, ClockTime, Command, Direction, Error, ID_INVALID, IoSlot, MonotonicClock,
    NSEC_PER_SEC, Node, NodeCallbacks, NodeInfo, NodeState, Object, PortCounts, PortInfo,
    Properties, Result, Status, Support, TimeSource, Timeout, TimerSource, TypeId, VideoInfo,
    config, pod::enum_filtered,
};
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use super::{
    create_video::make_buffer,
    draw::{Painter, PixelFormat, TestPattern},
    pacing::Pacer,
    params,
    state::{NAME, PortState, Props, Settings, Types},
};

/// Node-level properties advertised by every instance.
const MEDIA_CLASS: &str = "Video/Source";

/// A capability exposed by [`VideoTestSrc::get_interface`].
pub enum Interface<'a> {
    Node(&'a mut dyn Node),
    Clock(&'a dyn Clock),
}

/// The video test source node.
///
/// Owns its single output port, its buffer pool and its pacing state. Every
/// operation runs on the caller's thread; the timer is driven from outside
/// through [`TimerSource`].
pub struct VideoTestSrc {
    pub(super) id: Uuid,
    pub(super) types: Types,
    pub(super) clock: Arc<dyn TimeSource>,
    pub(super) props: Props,
    pub(super) port: PortState,
    pub(super) pacer: Pacer,
    pub(super) started: bool,
    pub(super) painter: Box<dyn Painter>,
    callbacks: Option<Box<dyn NodeCallbacks>>,
    error: Option<String>,
    node_props: Properties,
}

impl VideoTestSrc {
    /// Creates a source from its support services and info dictionary.
    ///
    /// # Arguments
    /// * `support` - Injected services; the type map is required
    /// * `info` - Construction settings (`node.live`, `node.async`, `node.pattern`)
    ///
    /// # Errors
    /// * [`Error::MissingSupport`] if no type map was provided
    /// * [`Error::InvalidValue`] if a setting cannot be parsed
    pub fn new(support: &Support, info: &Properties) -> Result<Self> {
        let type_map = support.type_map().inspect_err(|_| {
            error!("{}: a type map is needed", NAME);
        })?;
        let settings = Settings::from_info(info)?;
        let types = Types::map(type_map.as_ref());
        let clock = support
            .clock
            .clone()
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()) as Arc<dyn TimeSource>);

        let src = VideoTestSrc {
            id: Uuid::new_v4(),
            types,
            clock,
            props: settings.props,
            port: PortState::new(settings.props.live),
            pacer: Pacer::new(settings.props.live, settings.async_mode),
            started: false,
            painter: Box::new(TestPattern::default()),
            callbacks: None,
            error: None,
            node_props: Properties::from([(
                config::MEDIA_CLASS.to_owned(),
                MEDIA_CLASS.to_owned(),
            )]),
        };
        info!(
            live = src.props.live,
            async_mode = settings.async_mode,
            pattern = %src.props.pattern,
            "{} {}: initialized",
            NAME,
            src.id
        );
        Ok(src)
    }

    pub(super) fn name(&self) -> &'static str {
        NAME
    }

    /// Instance id reported for monitoring.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current user properties.
    pub fn props(&self) -> Props {
        self.props
    }

    /// Replaces the painter used for new frames.
    pub fn set_painter(&mut self, painter: Box<dyn Painter>) {
        self.painter = painter;
    }

    /// Frames produced since the last start.
    pub fn frame_count(&self) -> u64 {
        self.pacer.frame_count
    }

    /// Epoch of the current run.
    pub fn start_time(&self) -> u64 {
        self.pacer.start_time
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Looks up one of the interfaces this handle implements.
    ///
    /// # Errors
    /// * [`Error::UnknownInterface`] for anything but the node and clock ids
    pub fn get_interface(&mut self, type_id: TypeId) -> Result<Interface<'_>> {
        if type_id == self.types.node {
            Ok(Interface::Node(self))
        } else if type_id == self.types.clock {
            Ok(Interface::Clock(&*self))
        } else {
            Err(Error::UnknownInterface(type_id))
        }
    }

    /// Lifecycle state as reported for monitoring.
    pub fn state(&self) -> NodeState {
        if self.error.is_some() {
            NodeState::Error
        } else if self.port.format.is_none() {
            NodeState::Creating
        } else if self.port.pool.is_empty() {
            NodeState::Suspended
        } else if !self.started {
            NodeState::Idle
        } else {
            NodeState::Running
        }
    }

    fn transitioned(&mut self, reason: &str) {
        self.error = None;
        debug!(state = self.state().as_str(), "{} {}: {}", NAME, self.id, reason);
    }

    fn check_port(&self, direction: Direction, port_id: u32) -> Result<()> {
        if direction != Direction::Output || port_id != 0 {
            return Err(Error::InvalidPort { direction, port_id });
        }
        Ok(())
    }

    /// Re-arms a disarmed timer while running.
    fn resume(&mut self) {
        if self.started && !self.pacer.is_armed() {
            self.pacer.set_timer(true);
        }
    }

    fn clear_buffers(&mut self) {
        if !self.port.pool.is_empty() {
            info!("{} {}: clear buffers", NAME, self.id);
            self.port.pool.clear();
            self.started = false;
            self.pacer.set_timer(false);
        }
    }

    fn set_props(&mut self, param: Option<&Object>) -> Result<()> {
        let t = self.types;
        let mut props = self.props;
        match param {
            None => props = Props::default(),
            Some(param) => {
                if param.object_type != t.props {
                    return Err(Error::InvalidValue(format!(
                        "expected a props object, got {}",
                        param.object_type
                    )));
                }
                if let Some(live) = param.get::<bool>(t.prop_live)? {
                    props.live = live;
                }
                if let Some(pattern) = param.get::<TypeId>(t.prop_pattern)? {
                    props.pattern = t.pattern_from_id(pattern).ok_or_else(|| {
                        Error::InvalidValue(format!("unknown pattern {pattern}"))
                    })?;
                }
            }
        }
        let live_changed = props.live != self.props.live;
        self.props = props;
        self.port.set_live(props.live);
        self.pacer.set_live(props.live);
        if live_changed && self.started {
            // Next frame is due now when going live; timestamps never go back.
            let start_time = if props.live {
                self.clock.now().max(self.pacer.pts())
            } else {
                self.pacer.pts()
            };
            self.pacer.rebase(start_time);
            self.pacer.set_timer(true);
        }
        debug!(live = props.live, pattern = %props.pattern, "{} {}: props updated", NAME, self.id);
        Ok(())
    }

    fn set_format(&mut self, format: Option<&Object>) -> Result<()> {
        let Some(format) = format else {
            self.port.format = None;
            self.clear_buffers();
            self.transitioned("format cleared");
            return Ok(());
        };

        let t = self.types;
        if format.object_type != t.format {
            return Err(Error::InvalidFormat(format!(
                "expected a format object, got {}",
                format.object_type
            )));
        }
        let info = VideoInfo::parse(format, &t.format_video)?;
        if info.media_type != t.media_type.video || info.media_subtype != t.media_subtype.raw {
            return Err(Error::InvalidFormat("only raw video is supported".to_owned()));
        }
        let pixel_format = if info.raw.format == t.video_format.rgb {
            PixelFormat::Rgb
        } else if info.raw.format == t.video_format.uyvy {
            PixelFormat::Uyvy
        } else {
            return Err(Error::InvalidFormat(format!(
                "unsupported video format {}",
                info.raw.format
            )));
        };

        let size = info.raw.size;
        if size.width == 0
            || size.height == 0
            || size.width > params::MAX_DIMENSION
            || size.height > params::MAX_DIMENSION
        {
            return Err(Error::InvalidFormat(format!(
                "size {}x{} out of range",
                size.width, size.height
            )));
        }
        let rate = info.raw.framerate;
        if rate.num == 0
            || rate.denom == 0
            || rate.num > params::MAX_DIMENSION
            || rate.denom > params::MAX_DIMENSION
        {
            return Err(Error::InvalidFormat(format!(
                "framerate {}/{} out of range",
                rate.num, rate.denom
            )));
        }
        let stride = (pixel_format.bytes_per_pixel() as u64 * size.width as u64).next_multiple_of(4);
        if stride * size.height as u64 > i32::MAX as u64 {
            return Err(Error::InvalidFormat(format!(
                "frame of {}x{} is too large",
                size.width, size.height
            )));
        }

        self.port.format = Some(info);
        self.port.pixel_format = pixel_format;
        self.port.stride = stride as u32;
        self.transitioned("format set");
        Ok(())
    }
}

impl Node for VideoTestSrc {
    fn info(&self) -> NodeInfo {
        NodeInfo {
            id: self.id,
            name: NAME.to_owned(),
            state: self.state(),
            error: self.error.clone(),
            n_input_ports: 0,
            n_output_ports: 1,
            props: self.node_props.clone(),
        }
    }

    fn enum_params(
        &self,
        id: TypeId,
        index: &mut u32,
        filter: Option<&Object>,
    ) -> Result<Option<Object>> {
        let t = &self.types;
        enum_filtered(index, filter, |index| {
            if id == t.param.id_list {
                Ok((index == 0).then(|| params::list(t, id, t.param.id_props)))
            } else if id == t.param.id_props {
                Ok((index == 0).then(|| params::props(t, id, &self.props)))
            } else {
                Err(Error::UnknownParam(id))
            }
        })
    }

    fn set_param(&mut self, id: TypeId, _flags: u32, param: Option<&Object>) -> Result<()> {
        if id == self.types.param.id_props {
            self.set_props(param)
        } else {
            Err(Error::UnknownParam(id))
        }
    }

    fn send_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Start => {
                if self.port.format.is_none() {
                    return Err(Error::NoFormat);
                }
                if self.port.pool.is_empty() {
                    return Err(Error::NoBuffers);
                }
                if self.started {
                    return Ok(());
                }
                let start_time = if self.props.live { self.clock.now() } else { 0 };
                self.pacer.reset(start_time);
                self.started = true;
                self.pacer.set_timer(true);
                self.transitioned("started");
                Ok(())
            }
            Command::Pause => {
                if self.port.format.is_none() {
                    return Err(Error::NoFormat);
                }
                if self.port.pool.is_empty() {
                    return Err(Error::NoBuffers);
                }
                if !self.started {
                    return Ok(());
                }
                self.started = false;
                self.pacer.set_timer(false);
                self.transitioned("paused");
                Ok(())
            }
            other => {
                debug!("{} {}: unsupported command {:?}", NAME, self.id, other);
                Err(Error::NotImplemented)
            }
        }
    }

    fn set_callbacks(&mut self, callbacks: Option<Box<dyn NodeCallbacks>>) {
        self.callbacks = callbacks;
    }

    fn get_n_ports(&self) -> PortCounts {
        PortCounts {
            n_input_ports: 0,
            max_input_ports: 0,
            n_output_ports: 1,
            max_output_ports: 1,
        }
    }

    fn get_port_ids(&self) -> (Vec<u32>, Vec<u32>) {
        (Vec::new(), vec![0])
    }

    fn port_get_info(&self, direction: Direction, port_id: u32) -> Result<PortInfo> {
        self.check_port(direction, port_id)?;
        Ok(self.port.info)
    }

    fn port_enum_params(
        &self,
        direction: Direction,
        port_id: u32,
        id: TypeId,
        index: &mut u32,
        filter: Option<&Object>,
    ) -> Result<Option<Object>> {
        self.check_port(direction, port_id)?;
        let t = &self.types;
        let port = &self.port;
        let list = [
            t.param.id_enum_format,
            t.param.id_format,
            t.param.id_buffers,
            t.param.id_meta,
        ];
        enum_filtered(index, filter, |index| {
            if id == t.param.id_list {
                Ok(list
                    .get(index as usize)
                    .map(|listed| params::list(t, id, *listed)))
            } else if id == t.param.id_enum_format {
                Ok((index == 0).then(|| params::enum_format(t, id)))
            } else if id == t.param.id_format {
                let format = port.format.as_ref().ok_or(Error::NoFormat)?;
                Ok((index == 0).then(|| params::format(t, id, format)))
            } else if id == t.param.id_buffers {
                let format = port.format.as_ref().ok_or(Error::NoFormat)?;
                if index > 0 {
                    return Ok(None);
                }
                params::buffers(t, id, port.stride, format.raw.size.height).map(Some)
            } else if id == t.param.id_meta {
                port.format.as_ref().ok_or(Error::NoFormat)?;
                Ok((index == 0).then(|| params::meta(t, id)))
            } else {
                Err(Error::UnknownParam(id))
            }
        })
    }

    fn port_set_param(
        &mut self,
        direction: Direction,
        port_id: u32,
        id: TypeId,
        _flags: u32,
        param: Option<&Object>,
    ) -> Result<()> {
        self.check_port(direction, port_id)?;
        if id == self.types.param.id_format {
            self.set_format(param)
        } else {
            Err(Error::UnknownParam(id))
        }
    }

    fn port_use_buffers(
        &mut self,
        direction: Direction,
        port_id: u32,
        buffers: Vec<Buffer>,
    ) -> Result<()> {
        self.check_port(direction, port_id)?;
        if self.port.format.is_none() {
            return Err(Error::NoFormat);
        }
        self.clear_buffers();
        if buffers.is_empty() {
            self.transitioned("buffers cleared");
            return Ok(());
        }
        match self.port.pool.install(buffers) {
            Ok(()) => {
                self.transitioned("buffers installed");
                Ok(())
            }
            Err(Error::InvalidBuffer(id)) => {
                error!("{} {}: invalid memory on buffer {}", NAME, self.id, id);
                let err = Error::InvalidBuffer(id);
                self.error = Some(err.to_string());
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    fn port_alloc_buffers(
        &mut self,
        direction: Direction,
        port_id: u32,
        _params: &[Object],
        _n_buffers: u32,
    ) -> Result<Vec<Buffer>> {
        self.check_port(direction, port_id)?;
        if self.port.format.is_none() {
            return Err(Error::NoFormat);
        }
        Err(Error::NotImplemented)
    }

    fn port_get_buffer(&self, direction: Direction, port_id: u32, buffer_id: u32) -> Result<&Buffer> {
        self.check_port(direction, port_id)?;
        self.port
            .pool
            .get(buffer_id)
            .ok_or(Error::InvalidBufferId(buffer_id))
    }

    fn port_set_io(&mut self, direction: Direction, port_id: u32, io: Option<IoSlot>) -> Result<()> {
        self.check_port(direction, port_id)?;
        self.port.io = io;
        self.resume();
        Ok(())
    }

    fn port_reuse_buffer(&mut self, port_id: u32, buffer_id: u32) -> Result<()> {
        self.check_port(Direction::Output, port_id)?;
        self.port.pool.release(buffer_id)?;
        trace!("{} {}: reuse buffer {}", NAME, self.id, buffer_id);
        self.resume();
        Ok(())
    }

    fn process_output(&mut self) -> Result<Status> {
        let io = self.port.io.clone().ok_or(Error::WrongState("no io slot"))?;
        if io.status() == Status::HaveBuffer {
            return Ok(Status::HaveBuffer);
        }

        let returned = io.buffer_id();
        if returned != ID_INVALID && (returned as usize) < self.port.pool.len() {
            match self.port.pool.release(returned) {
                Ok(()) => trace!("{} {}: reuse buffer {}", NAME, self.id, returned),
                Err(err) => debug!("{} {}: ignoring returned buffer {}: {}", NAME, self.id, returned, err),
            }
            io.set_buffer_id(ID_INVALID);
        }
        self.resume();

        if !self.props.live && self.started && io.status() == Status::NeedBuffer {
            make_buffer(self)?;
            return Ok(Status::HaveBuffer);
        }
        Ok(Status::Ok)
    }
}

impl Clock for VideoTestSrc {
    fn get_time(&self) -> Result<ClockTime> {
        let now = self.clock.now() as i64;
        Ok(ClockTime {
            rate: NSEC_PER_SEC as i32,
            ticks: now,
            monotonic_time: now,
        })
    }
}

impl TimerSource for VideoTestSrc {
    fn timeout(&self) -> Timeout {
        self.pacer.timeout()
    }

    fn on_timeout(&mut self) {
        self.pacer.consume();
        if !self.started {
            return;
        }
        let Some(io) = self.port.io.clone() else {
            warn!("{} {}: timer fired without an io slot", NAME, self.id);
            return;
        };
        if io.status() == Status::HaveBuffer {
            trace!("{} {}: previous buffer not consumed yet", NAME, self.id);
            return;
        }
        match make_buffer(self) {
            Ok(_) => {
                if let Some(callbacks) = self.callbacks.as_mut() {
                    callbacks.have_output();
                }
            }
            Err(Error::OutOfBuffers) => io.set_status(Status::OutOfBuffers),
            Err(err) => warn!("{} {}: failed to produce buffer: {}", NAME, self.id, err),
        }
    }
}
