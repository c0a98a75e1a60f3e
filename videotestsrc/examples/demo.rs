// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Drives a video test source the way a graph orchestrator would: negotiate a
//! format, install buffers, start, and pull frames either on demand or from
//! the data loop when the source is live.
//!
//! ```bash
//! cargo run -p videotestsrc --example demo -- --format uyvy --frames 50 --live
//! ```

mod common;

use std::{sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};
use medianode::{
    Buffer, Command, DataLoop, Direction, Error, Fraction, ID_INVALID, IoSlot, MonotonicClock,
    Node, Object, PortIo, Properties, Rectangle, Result, Status, Support, TypeMap, TypeRegistry,
    Value,
    config::{NODE_LIVE, NODE_PATTERN},
    types::{AllocBuffersTypes, FormatVideoTypes, ParamTypes, VideoFormatTypes, names},
};
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Rgb,
    Uyvy,
}

#[derive(Debug, Parser)]
#[command(version, about = "Pull frames from a video test source")]
struct Args {
    #[arg(long, default_value_t = 320)]
    width: u32,

    #[arg(long, default_value_t = 240)]
    height: u32,

    #[arg(long, value_enum, default_value_t = Format::Rgb)]
    format: Format,

    /// Frames per second
    #[arg(long, default_value_t = 25)]
    fps: u32,

    /// Number of frames to pull before stopping
    #[arg(long, default_value_t = 10)]
    frames: u64,

    /// Number of buffers to install
    #[arg(long, default_value_t = 4)]
    buffers: u32,

    /// Pace frames to the monotonic clock
    #[arg(long)]
    live: bool,

    /// smpte-snow or snow
    #[arg(long, default_value = "smpte-snow")]
    pattern: String,
}

fn main() -> Result<()> {
    common::setup_logging();
    let args = Args::parse();

    let registry = Arc::new(TypeRegistry::new());
    let clock = Arc::new(MonotonicClock::new());
    let support = Support::new(registry.clone()).with_clock(clock.clone());
    let settings = Properties::from([
        (NODE_LIVE.to_owned(), args.live.to_string()),
        (NODE_PATTERN.to_owned(), args.pattern.clone()),
    ]);
    let mut src = videotestsrc::init(&support, &settings)?;

    let param = ParamTypes::map(registry.as_ref());
    let keys = FormatVideoTypes::map(registry.as_ref());
    let formats = VideoFormatTypes::map(registry.as_ref());
    let alloc = AllocBuffersTypes::map(registry.as_ref());

    let video_format = match args.format {
        Format::Rgb => formats.rgb,
        Format::Uyvy => formats.uyvy,
    };
    let wanted = Object::new(param.id_enum_format, registry.get_id(names::FORMAT))
        .with(keys.format, Value::Id(video_format))
        .with(keys.size, Value::Rectangle(Rectangle::new(args.width, args.height)))
        .with(keys.framerate, Value::Fraction(Fraction::new(args.fps, 1)));
    let format = src
        .port_enum_params(Direction::Output, 0, param.id_enum_format, &mut 0, Some(&wanted))?
        .ok_or_else(|| Error::InvalidFormat("no format matches the request".to_owned()))?;
    src.port_set_param(Direction::Output, 0, param.id_format, 0, Some(&format))?;

    let requirements = src
        .port_enum_params(Direction::Output, 0, param.id_buffers, &mut 0, None)?
        .ok_or(Error::NoFormat)?;
    let size = requirements
        .get::<i32>(alloc.size)?
        .ok_or_else(|| Error::InvalidValue("buffer requirements lack a size".to_owned()))?;
    info!(size, buffers = args.buffers, "Allocating buffers");
    let buffers = (0..args.buffers)
        .map(|id| Buffer::alloc(id, size as u32))
        .collect();
    src.port_use_buffers(Direction::Output, 0, buffers)?;

    let io = IoSlot::new();
    src.port_set_io(Direction::Output, 0, Some(io.clone()))?;
    src.send_command(Command::Start)?;

    let data_loop = DataLoop::new(clock);
    let mut pulled = 0;
    while pulled < args.frames {
        if args.live {
            data_loop.iterate(&mut src, Duration::from_millis(100));
        } else {
            io.set_status(Status::NeedBuffer);
            src.process_output()?;
        }
        if io.status() != Status::HaveBuffer {
            continue;
        }

        let id = io.buffer_id();
        let buffer = src.port_get_buffer(Direction::Output, 0, id)?;
        if let Some(header) = buffer.header() {
            info!(
                buffer_id = id,
                seq = header.seq,
                pts = header.pts,
                bytes = buffer.datas[0].chunk.size,
                "Pulled frame"
            );
        }
        src.port_reuse_buffer(0, id)?;
        io.set(PortIo {
            status: Status::NeedBuffer,
            buffer_id: ID_INVALID,
        });
        pulled += 1;
    }

    src.send_command(Command::Pause)?;
    println!("{}", src.info().to_json()?);
    Ok(())
}
