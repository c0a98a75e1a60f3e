// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Timer-driven production: live pacing against a manual clock, async mode,
//! and buffer exhaustion on the timer path.

mod common;

use common::{EPOCH, setup_test};
use medianode::{
    Command, DataLoop, Direction, Fraction, NSEC_PER_SEC, Node, Object, PortIo, Status, Timeout,
    TimerSource, TypeMap, Value, types::names,
};

const MS: u64 = 1_000_000;

/// Deadline of frame `k` at 30000/1001 fps.
fn ntsc_deadline(k: u64) -> u64 {
    EPOCH + (k as u128 * 1001 * NSEC_PER_SEC as u128 / 30000) as u64
}

#[test]
fn live_frames_follow_the_clock_without_drift() {
    let mut h = setup_test(&[("node.live", "true")]);
    h.negotiate(64, 48, Fraction::new(30000, 1001), 4);
    let data_loop = DataLoop::new(h.clock.clone());

    h.src.send_command(Command::Start).unwrap();
    assert_eq!(h.src.start_time(), EPOCH);

    for k in 0..300u64 {
        let deadline = ntsc_deadline(k);
        assert_eq!(h.src.timeout(), Timeout::At(deadline), "frame {k}");

        if k > 0 {
            h.clock.set(deadline - 1);
            assert!(!data_loop.dispatch(&mut h.src));
        }

        // Wake up late by a varying amount; the next deadline must not move.
        h.clock.set(deadline + (k * 7919) % (10 * MS));
        assert!(data_loop.dispatch(&mut h.src));
        assert_eq!(h.outputs.get(), k as u32 + 1);

        let (id, seq, pts) = h.take();
        assert_eq!(seq, k);
        assert_eq!(pts as u64, deadline);
        h.src.port_reuse_buffer(0, id).unwrap();
    }
    assert_eq!(h.src.frame_count(), 300);
}

#[test]
fn pending_buffer_holds_back_the_timer() {
    let mut h = setup_test(&[("node.live", "true")]);
    h.negotiate(32, 32, Fraction::new(25, 1), 4);
    let data_loop = DataLoop::new(h.clock.clone());
    h.src.send_command(Command::Start).unwrap();

    assert!(data_loop.dispatch(&mut h.src));
    assert_eq!(h.io.status(), Status::HaveBuffer);

    // The consumer has not taken buffer 0 when the next frame is due.
    h.clock.set(EPOCH + 40 * MS);
    assert!(data_loop.dispatch(&mut h.src));
    assert_eq!(h.outputs.get(), 1);
    assert_eq!(h.io.buffer_id(), 0);
    assert_eq!(h.src.timeout(), Timeout::Disarmed);

    h.clock.set(EPOCH + 100 * MS);
    assert!(!data_loop.dispatch(&mut h.src));

    // Taking the buffer and processing re-arms at the missed deadline.
    let (id, _, _) = h.take();
    assert_eq!(h.src.process_output().unwrap(), Status::Ok);
    assert_eq!(h.src.timeout(), Timeout::At(EPOCH + 40 * MS));
    assert!(data_loop.dispatch(&mut h.src));

    let (_, seq, pts) = h.take();
    assert_eq!(seq, 1);
    assert_eq!(pts as u64, EPOCH + 40 * MS);
    assert_eq!(h.outputs.get(), 2);
    h.src.port_reuse_buffer(0, id).unwrap();
}

#[test]
fn timer_exhaustion_is_reported_in_the_slot() {
    let mut h = setup_test(&[("node.live", "true")]);
    h.negotiate(16, 16, Fraction::new(25, 1), 2);
    let data_loop = DataLoop::new(h.clock.clone());
    h.src.send_command(Command::Start).unwrap();

    assert!(data_loop.dispatch(&mut h.src));
    let (first, _, _) = h.take();
    h.clock.set(EPOCH + 40 * MS);
    assert!(data_loop.dispatch(&mut h.src));
    let (second, _, _) = h.take();
    assert_ne!(first, second);

    h.clock.set(EPOCH + 80 * MS);
    assert!(data_loop.dispatch(&mut h.src));
    assert_eq!(h.io.status(), Status::OutOfBuffers);
    assert_eq!(h.src.timeout(), Timeout::Disarmed);
    assert_eq!(h.outputs.get(), 2);

    // Returning a buffer resumes production at the pending deadline.
    h.src.port_reuse_buffer(0, first).unwrap();
    assert_eq!(h.src.timeout(), Timeout::At(EPOCH + 80 * MS));
    assert!(data_loop.dispatch(&mut h.src));
    let (id, seq, pts) = h.take();
    assert_eq!(id, first);
    assert_eq!(seq, 2);
    assert_eq!(pts as u64, EPOCH + 80 * MS);
}

#[test]
fn async_mode_runs_as_fast_as_buffers_return() {
    let mut h = setup_test(&[("node.async", "true")]);
    let rate = Fraction::new(25, 1);
    h.negotiate(16, 16, rate, 2);
    let data_loop = DataLoop::new(h.clock.clone());

    h.src.send_command(Command::Start).unwrap();
    assert_eq!(h.src.start_time(), 0);
    assert_eq!(h.src.timeout(), Timeout::Immediate);

    assert!(data_loop.dispatch(&mut h.src));
    assert_eq!(h.io.get(), PortIo { status: Status::HaveBuffer, buffer_id: 0 });
    assert_eq!(h.src.timeout(), Timeout::Immediate);

    // Nothing is produced while the slot is full.
    assert!(data_loop.dispatch(&mut h.src));
    assert_eq!(h.outputs.get(), 1);
    assert_eq!(h.src.timeout(), Timeout::Disarmed);

    // The consumer returns buffer 0 through the slot and asks for more.
    h.io.set(PortIo { status: Status::NeedBuffer, buffer_id: 0 });
    assert_eq!(h.src.process_output().unwrap(), Status::HaveBuffer);
    let (id, seq, pts) = h.take();
    assert_eq!((id, seq, pts), (1, 1, 40 * MS as i64));
    assert_eq!(h.src.timeout(), Timeout::Immediate);

    h.src.port_reuse_buffer(0, id).unwrap();
    assert!(data_loop.dispatch(&mut h.src));
    assert_eq!(h.outputs.get(), 2);
    let (id, seq, _) = h.take();
    assert_eq!((id, seq), (0, 2));
}

#[test]
fn pause_stops_the_timer_and_start_rebases() {
    let mut h = setup_test(&[("node.live", "true")]);
    h.negotiate(16, 16, Fraction::new(50, 1), 3);
    let data_loop = DataLoop::new(h.clock.clone());
    h.src.send_command(Command::Start).unwrap();
    assert!(data_loop.dispatch(&mut h.src));
    let (id, _, _) = h.take();

    h.src.send_command(Command::Pause).unwrap();
    assert_eq!(h.src.timeout(), Timeout::Disarmed);
    h.src.port_reuse_buffer(0, id).unwrap();
    h.clock.advance(NSEC_PER_SEC);
    assert!(!data_loop.dispatch(&mut h.src));
    assert_eq!(h.src.frame_count(), 1);

    h.src.send_command(Command::Start).unwrap();
    assert_eq!(h.src.frame_count(), 0);
    assert_eq!(h.src.start_time(), EPOCH + NSEC_PER_SEC);
    assert!(data_loop.dispatch(&mut h.src));
    let (_, seq, pts) = h.take();
    assert_eq!(seq, 0);
    assert_eq!(pts as u64, EPOCH + NSEC_PER_SEC);
}

#[test]
fn timer_without_io_slot_produces_nothing() {
    let mut h = setup_test(&[("node.live", "true")]);
    h.negotiate(16, 16, Fraction::new(25, 1), 2);
    h.src.port_set_io(Direction::Output, 0, None).unwrap();
    let data_loop = DataLoop::new(h.clock.clone());

    h.src.send_command(Command::Start).unwrap();
    assert!(data_loop.dispatch(&mut h.src));
    assert_eq!(h.outputs.get(), 0);
    assert_eq!(h.src.frame_count(), 0);

    // Attaching the slot re-arms the timer.
    h.src
        .port_set_io(Direction::Output, 0, Some(h.io.clone()))
        .unwrap();
    assert_eq!(h.src.timeout(), Timeout::At(EPOCH));
    assert!(data_loop.dispatch(&mut h.src));
    assert_eq!(h.outputs.get(), 1);
}

#[test]
fn toggling_live_mid_run_rebases_the_epoch() {
    let mut h = setup_test(&[]);
    h.negotiate(16, 16, Fraction::new(25, 1), 4);
    let data_loop = DataLoop::new(h.clock.clone());
    let live_key = h.registry.get_id(names::PROP_LIVE);
    let live = |on: bool| {
        Object::new(h.ids.param.id_props, h.ids.props_object).with(live_key, Value::Bool(on))
    };

    h.src.send_command(Command::Start).unwrap();
    assert_eq!(h.src.start_time(), 0);
    for _ in 0..3 {
        h.io.set_status(Status::NeedBuffer);
        assert_eq!(h.src.process_output().unwrap(), Status::HaveBuffer);
    }

    // Going live: the next frame is due now, and only once.
    h.src
        .set_param(h.ids.param.id_props, 0, Some(&live(true)))
        .unwrap();
    assert_eq!(h.src.timeout(), Timeout::At(EPOCH));
    let (id, _, _) = h.take();
    h.src.port_reuse_buffer(0, id).unwrap();

    let mut produced = Vec::new();
    for _ in 0..10 {
        data_loop.dispatch(&mut h.src);
        if h.io.status() == Status::HaveBuffer {
            let (id, seq, pts) = h.take();
            produced.push((seq, pts as u64));
            h.src.port_reuse_buffer(0, id).unwrap();
        }
    }
    assert_eq!(produced, vec![(3, EPOCH)]);
    assert_eq!(h.outputs.get(), 1);

    h.clock.set(EPOCH + 40 * MS);
    assert!(data_loop.dispatch(&mut h.src));
    let (id, seq, pts) = h.take();
    assert_eq!((seq, pts as u64), (4, EPOCH + 40 * MS));
    h.src.port_reuse_buffer(0, id).unwrap();

    // Back to demand: no timer, and timestamps carry on from the live run.
    h.src
        .set_param(h.ids.param.id_props, 0, Some(&live(false)))
        .unwrap();
    assert_eq!(h.src.timeout(), Timeout::Disarmed);
    assert_eq!(h.src.process_output().unwrap(), Status::HaveBuffer);
    let (_, seq, pts) = h.take();
    assert_eq!((seq, pts as u64), (5, EPOCH + 80 * MS));
}
