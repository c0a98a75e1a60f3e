//! Video Buffer Creation
//!
//! Produces one frame into the oldest free buffer and deposits it in the I/O
//! slot.
//!
//! ## Steps
//! 1. Take the head of the free list (fails with `OutOfBuffers` and disarms the timer)
//! 2. Paint the frame with the configured painter
//! 3. Stamp the chunk and the timing header (sequence = frame count, pts = epoch + elapsed)
//! 4. Advance the frame count and re-arm the timer for the next frame
//! 5. Publish `HaveBuffer` and the buffer id in the I/O slot

// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

use medianode::{Chunk, Error, PortIo, Result, Status};
use tracing::{error, trace};

use super::{draw::Frame, imp::VideoTestSrc};

/// Fills the next free buffer and hands it to the consumer.
///
/// # Returns
/// * `Ok(id)` of the buffer now in the I/O slot
///
/// # Errors
/// * [`Error::WrongState`] if no I/O slot is attached
/// * [`Error::NoFormat`] if no format is negotiated
/// * [`Error::OutOfBuffers`] if every buffer is outstanding; the I/O slot is left untouched
pub(super) fn make_buffer(src: &mut VideoTestSrc) -> Result<u32> {
    let io = src.port.io.clone().ok_or(Error::WrongState("no io slot"))?;
    let info = src.port.format.ok_or(Error::NoFormat)?;
    let format = src.port.pixel_format;

    let id = match src.port.pool.acquire() {
        Ok(id) => id,
        Err(err) => {
            src.pacer.set_timer(false);
            error!("{} {}: out of buffers", src.name(), src.id);
            return Err(err);
        }
    };
    trace!("{} {}: dequeue buffer {}", src.name(), src.id, id);

    let stride = src.port.stride;
    let frame_count = src.pacer.frame_count;
    let pts = src.pacer.pts();
    let buffer = src
        .port
        .pool
        .get_mut(id)
        .ok_or(Error::InvalidBufferId(id))?;

    if let Some(data) = buffer.datas.first_mut() {
        if let Some(memory) = data.memory.as_mut() {
            src.painter.paint(Frame {
                data: memory,
                format,
                width: info.raw.size.width,
                height: info.raw.size.height,
                stride,
                pattern: src.props.pattern,
                frame_count,
            });
        }
        let frame_size = stride as u64 * info.raw.size.height as u64;
        data.chunk = Chunk {
            offset: 0,
            size: (data.maxsize as u64).min(frame_size) as u32,
            stride: stride as i32,
        };
    }

    if let Some(header) = buffer.header_mut() {
        header.seq = frame_count;
        header.pts = i64::try_from(pts).unwrap_or(i64::MAX);
        header.dts_offset = 0;
    }

    src.pacer.advance(info.raw.framerate);
    src.pacer.set_timer(true);

    trace!(buffer_id = id, seq = frame_count, pts, "Produced buffer");

    io.set(PortIo {
        status: Status::HaveBuffer,
        buffer_id: id,
    });
    Ok(id)
}
