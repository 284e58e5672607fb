//! Tests for the receive/framing state machine and its recovery paths.

mod common;

use std::time::Instant;

use common::*;
use sensorhub::engine::ProtocolEngine;
use sensorhub::packet::{Command, Status};
use sensorhub::{Error, ErrorCode};

const RESET_OPCODE: u8 = 0x14;

#[test]
fn roundtrip_framing() {
    let mut bus = MockTransport::new();
    bus.push_frame(STATUS_SUCCESS, 0x09, b"Temp_Air,Humi_Air");

    let mut engine = ProtocolEngine::new(&mut bus, fast_config());
    let response = engine
        .exchange(Command::GetName, &[0x07])
        .expect("valid frame should decode");

    assert_eq!(response.status, Status::Success);
    assert_eq!(response.command, 0x09);
    assert_eq!(response.payload.as_ref(), b"Temp_Air,Humi_Air");
    drop(engine);

    // One command packet went out: opcode, LE length, argument.
    assert_eq!(bus.writes, vec![(ADDRESS, vec![0x09, 0x01, 0x00, 0x07])]);
}

#[test]
fn noise_before_frame_start_is_discarded() {
    let mut bus = MockTransport::new();
    bus.push_bytes(&[0x00, 0x11, 0x22]);
    bus.push_frame(STATUS_SUCCESS, 0x19, b"09:08:00");

    let mut engine = ProtocolEngine::new(&mut bus, fast_config());
    let response = engine
        .exchange(Command::Timestamp, &[])
        .expect("noise before the frame must not be fatal");

    assert_eq!(response.payload.as_ref(), b"09:08:00");
}

#[test]
fn timeout_sends_exactly_one_hard_reset() {
    let mut bus = MockTransport::new();
    // Nothing queued: the bus serves zeroes, never a frame start.

    let config = fast_config();
    let timeout = config.timeout;
    let poll = config.poll_interval;
    let mut engine = ProtocolEngine::new(&mut bus, config);

    let start = Instant::now();
    let err = engine
        .exchange(Command::GetValue, &[0x07])
        .expect_err("a silent bus must time out");
    let elapsed = start.elapsed();
    drop(engine);

    assert!(matches!(err, Error::Timeout(t) if t == timeout));
    assert_eq!(err.code(), ErrorCode::ResponseTimeout);
    // Deadline semantics: not before the timeout, at most one poll late
    // (plus scheduling slack).
    assert!(elapsed >= timeout, "returned before the deadline: {elapsed:?}");
    assert!(
        elapsed < timeout + poll * 10,
        "returned far past the deadline: {elapsed:?}"
    );

    // The command packet, then exactly one hard reset targeting the reset
    // opcode itself.
    assert_eq!(bus.writes.len(), 2);
    assert_eq!(
        bus.writes[1].1,
        vec![RESET_OPCODE, 0x01, 0x00, RESET_OPCODE]
    );
}

#[test]
fn command_mismatch_resyncs_immediately() {
    let mut bus = MockTransport::new();
    // Valid frame start, but the echo is a different command.
    bus.push_frame(STATUS_SUCCESS, 0x0A, b"28.65");

    let config = fast_config();
    let timeout = config.timeout;
    let mut engine = ProtocolEngine::new(&mut bus, config);

    let start = Instant::now();
    let err = engine
        .exchange(Command::GetName, &[0x07])
        .expect_err("wrong echoed command must fail the exchange");
    let elapsed = start.elapsed();
    drop(engine);

    assert!(matches!(
        err,
        Error::CommandMismatch {
            expected: 0x09,
            actual: 0x0A
        }
    ));
    assert_eq!(err.code(), ErrorCode::ResponsePacket);
    // No retry within the call: this returns long before the deadline.
    assert!(elapsed < timeout / 2, "resync waited: {elapsed:?}");

    // Exactly one resync reset, carrying the expected command as argument.
    assert_eq!(bus.writes.len(), 2);
    assert_eq!(bus.writes[1].1, vec![RESET_OPCODE, 0x01, 0x00, 0x09]);
}

#[test]
fn failed_status_passes_device_code_through() {
    let mut bus = MockTransport::new();
    bus.push_frame(STATUS_FAILED, 0x00, &[0x08]);

    let mut engine = ProtocolEngine::new(&mut bus, fast_config());
    let response = engine
        .exchange(Command::Port1, b"SEN9999")
        .expect("a FAILED frame is still a valid frame");

    assert_eq!(response.status, Status::Failed);
    let err = response.into_payload().expect_err("FAILED must surface a code");
    assert!(matches!(err, Error::Device(ErrorCode::UnknownSku)));
}

#[test]
fn identical_exchanges_decode_identically() {
    let mut bus = MockTransport::new();
    bus.push_frame(STATUS_SUCCESS, 0x0A, b"28.65,30.12");
    bus.push_frame(STATUS_SUCCESS, 0x0A, b"28.65,30.12");

    let mut engine = ProtocolEngine::new(&mut bus, fast_config());
    let first = engine.exchange(Command::GetValue, &[0x07]).unwrap();
    let second = engine.exchange(Command::GetValue, &[0x07]).unwrap();

    assert_eq!(first, second);
}

#[test]
fn length_field_is_little_endian() {
    // 300-byte payload: lenL=0x2C, lenH=0x01. The legacy `(high << 2) | low`
    // decode seen in one firmware-era host would read this as 48 bytes;
    // the wire contract is conventional little-endian.
    let payload: Vec<u8> = (0..300u16).map(|i| (i % 251) as u8).collect();
    let mut bus = MockTransport::new();
    bus.push_frame(STATUS_SUCCESS, 0x0D, &payload);

    let mut engine = ProtocolEngine::new(&mut bus, fast_config());
    let response = engine.exchange(Command::GetInfo, &[0x07, 0x00]).unwrap();

    assert_eq!(response.payload.len(), 300);
    assert_eq!(response.payload.as_ref(), payload.as_slice());
}

#[test]
fn read_failures_degrade_to_timeout() {
    let mut bus = MockTransport::new();
    bus.push_frame(STATUS_SUCCESS, 0x19, b"00:42.17");
    bus.fail_reads = true;

    let mut engine = ProtocolEngine::new(&mut bus, fast_config());
    let err = engine
        .exchange(Command::Timestamp, &[])
        .expect_err("zero-filled reads never form a frame");

    assert_eq!(err.code(), ErrorCode::ResponseTimeout);
}
