// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Common utilities shared across integration tests.

#![allow(dead_code)]

use std::{cell::Cell, rc::Rc, sync::Arc};

use medianode::{
    Buffer, Direction, Fraction, IoSlot, ManualClock, Node, Object, PortIo, Properties,
    Rectangle, Status, Support, TypeId, TypeMap, TypeRegistry, Value,
    types::{
        AllocBuffersTypes, FormatVideoTypes, MediaSubtypes, MediaTypes, ParamTypes,
        VideoFormatTypes, names,
    },
};
use videotestsrc::VideoTestSrc;

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

/// Clock reading when a harness is created.
pub const EPOCH: u64 = 1_000_000_000;

/// Capability ids the tests build descriptors with.
pub struct Ids {
    pub format_object: TypeId,
    pub props_object: TypeId,
    pub param: ParamTypes,
    pub keys: FormatVideoTypes,
    pub formats: VideoFormatTypes,
    pub media: MediaTypes,
    pub subtypes: MediaSubtypes,
    pub alloc: AllocBuffersTypes,
}

impl Ids {
    fn map(map: &dyn TypeMap) -> Self {
        Ids {
            format_object: map.get_id(names::FORMAT),
            props_object: map.get_id(names::PROPS),
            param: ParamTypes::map(map),
            keys: FormatVideoTypes::map(map),
            formats: VideoFormatTypes::map(map),
            media: MediaTypes::map(map),
            subtypes: MediaSubtypes::map(map),
            alloc: AllocBuffersTypes::map(map),
        }
    }
}

/// A source plus the orchestrator-side state needed to drive it.
pub struct Harness {
    pub registry: Arc<TypeRegistry>,
    pub clock: Arc<ManualClock>,
    pub src: VideoTestSrc,
    pub io: IoSlot,
    pub ids: Ids,
    /// Number of `have_output` notifications received.
    pub outputs: Rc<Cell<u32>>,
}

/// Initializes logging and creates a source configured from `info`.
pub fn setup_test(info: &[(&str, &str)]) -> Harness {
    // Initialize logging once (respects RUST_LOG environment variable)
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .init();
    });

    let registry = Arc::new(TypeRegistry::new());
    let clock = Arc::new(ManualClock::new(EPOCH));
    let support = Support::new(registry.clone()).with_clock(clock.clone());
    let info: Properties = info
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    let mut src = videotestsrc::init(&support, &info).unwrap();

    let outputs = Rc::new(Cell::new(0));
    let counter = outputs.clone();
    src.set_callbacks(Some(Box::new(move || counter.set(counter.get() + 1))));

    Harness {
        ids: Ids::map(registry.as_ref()),
        registry,
        clock,
        src,
        io: IoSlot::new(),
        outputs,
    }
}

impl Harness {
    /// A concrete raw video format object.
    pub fn format(&self, format: TypeId, width: u32, height: u32, rate: Fraction) -> Object {
        let keys = &self.ids.keys;
        Object::new(self.ids.param.id_format, self.ids.format_object)
            .with(keys.media_type, Value::Id(self.ids.media.video))
            .with(keys.media_subtype, Value::Id(self.ids.subtypes.raw))
            .with(keys.format, Value::Id(format))
            .with(keys.size, Value::Rectangle(Rectangle::new(width, height)))
            .with(keys.framerate, Value::Fraction(rate))
    }

    /// Sets an RGB format, installs `count` buffers sized from the buffer
    /// requirements and attaches the I/O slot.
    pub fn negotiate(&mut self, width: u32, height: u32, rate: Fraction, count: u32) {
        let format = self.format(self.ids.formats.rgb, width, height, rate);
        self.src
            .port_set_param(Direction::Output, 0, self.ids.param.id_format, 0, Some(&format))
            .unwrap();
        let size = self.buffer_size();
        let buffers = (0..count).map(|id| Buffer::alloc(id, size)).collect();
        self.src
            .port_use_buffers(Direction::Output, 0, buffers)
            .unwrap();
        self.src
            .port_set_io(Direction::Output, 0, Some(self.io.clone()))
            .unwrap();
    }

    /// Frame size advertised in the buffer requirements.
    pub fn buffer_size(&self) -> u32 {
        let mut index = 0;
        let requirements = self
            .src
            .port_enum_params(
                Direction::Output,
                0,
                self.ids.param.id_buffers,
                &mut index,
                None,
            )
            .unwrap()
            .unwrap();
        requirements.get::<i32>(self.ids.alloc.size).unwrap().unwrap() as u32
    }

    /// Takes the buffer in the slot: returns its id, sequence number and pts,
    /// and asks for the next one.
    pub fn take(&self) -> (u32, u64, i64) {
        let io = self.io.get();
        assert_eq!(io.status, Status::HaveBuffer);
        let buffer = self
            .src
            .port_get_buffer(Direction::Output, 0, io.buffer_id)
            .unwrap();
        let header = buffer.header().unwrap();
        let taken = (io.buffer_id, header.seq, header.pts);
        self.io.set(PortIo {
            status: Status::NeedBuffer,
            buffer_id: medianode::ID_INVALID,
        });
        taken
    }
}
