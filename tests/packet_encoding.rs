//! Tests for command-packet serialization and response status handling.

mod common;

use bytes::Bytes;
use common::*;
use sensorhub::packet::{Command, CommandPacket, Response, Status};
use sensorhub::{Error, ErrorCode};

#[test]
fn header_is_opcode_then_le_length() {
    let packet = CommandPacket::new(Command::GetSku, &[0x07]);
    assert_eq!(packet.encode().as_ref(), &[0x0C, 0x01, 0x00, 0x07]);
}

#[test]
fn empty_args_still_carry_a_length_field() {
    let packet = CommandPacket::new(Command::Version, &[]);
    assert_eq!(packet.encode().as_ref(), &[0x21, 0x00, 0x00]);
}

#[test]
fn length_field_splits_across_both_bytes() {
    let args = vec![0xAB; 300];
    let encoded = CommandPacket::new(Command::KeyValueAll, &args).encode();

    assert_eq!(encoded.len(), 3 + 300);
    assert_eq!(encoded[1], 0x2C);
    assert_eq!(encoded[2], 0x01);
    assert!(encoded[3..].iter().all(|&b| b == 0xAB));
}

#[test]
fn only_the_two_status_bytes_start_a_frame() {
    assert!(Status::from(STATUS_SUCCESS).is_frame_start());
    assert!(Status::from(STATUS_FAILED).is_frame_start());
    for noise in [0x00, 0x11, 0x52, 0x54, 0x62, 0x64, 0xFF] {
        assert!(
            !Status::from(noise).is_frame_start(),
            "{noise:#04x} must be treated as noise"
        );
    }
}

#[test]
fn successful_response_yields_its_payload() {
    let response = Response {
        status: Status::Success,
        command: 0x0B,
        payload: Bytes::from_static(b"C,%RH"),
    };
    assert_eq!(response.text(), "C,%RH");
    assert_eq!(response.into_payload().unwrap().as_ref(), b"C,%RH");
}

#[test]
fn failed_response_decodes_its_error_byte() {
    let response = Response {
        status: Status::Failed,
        command: 0x00,
        payload: Bytes::from_static(&[0x07]),
    };
    let err = response.into_payload().unwrap_err();
    assert!(matches!(err, Error::Device(ErrorCode::InvalidArgs)));
}

#[test]
fn failed_response_without_a_code_is_still_an_error() {
    let response = Response {
        status: Status::Failed,
        command: 0x00,
        payload: Bytes::new(),
    };
    let err = response.into_payload().unwrap_err();
    assert!(matches!(err, Error::Device(ErrorCode::ResponsePacket)));
}
