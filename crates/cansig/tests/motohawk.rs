use cansig::{
    CodecError, MessageDescriptor, RawFrame, RawValue, SignalDescriptor, status_code_of,
};

/// Enable: bit 7 of byte 0. AverageRadius: bits 6..1 of byte 0.
/// Temperature: bit 0 of byte 0, all of byte 1, bits 7..5 of byte 2.
fn example_message() -> MessageDescriptor {
    MessageDescriptor::builder("ExampleMessage", 0x1f0, 8)
        .signal(
            SignalDescriptor::builder("enable", 7, 1)
                .big_endian()
                .raw_max(RawValue::Unsigned(1))
                .build()
                .unwrap(),
        )
        .signal(
            SignalDescriptor::builder("average_radius", 6, 6)
                .big_endian()
                .scale(0.1)
                .raw_range(RawValue::Unsigned(0), RawValue::Unsigned(50))
                .unit("m")
                .build()
                .unwrap(),
        )
        .signal(
            SignalDescriptor::builder("temperature", 0, 12)
                .big_endian()
                .signed(true)
                .scale(0.01)
                .offset(250.0)
                .raw_range(RawValue::Signed(-2048), RawValue::Signed(2047))
                .unit("degK")
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[test]
fn test_encode_raw_values() {
    let message = example_message();
    let frame = message.encode(&[1.0, 2.0, 250.0]).unwrap();

    assert_eq!(
        frame.values(),
        [
            RawValue::Unsigned(1),
            RawValue::Unsigned(20),
            RawValue::Signed(0)
        ]
    );
}

#[test]
fn test_wrap_pack_layout() {
    let message = example_message();
    let mut buffer = [0xffu8; 8];

    message.wrap_pack(&mut buffer, &[1.0, 2.0, 250.0]).unwrap();
    assert_eq!(buffer, [0xa8, 0, 0, 0, 0, 0, 0, 0]);

    message.wrap_pack(&mut buffer, &[0.0, 2.0, 250.0]).unwrap();
    assert_eq!(buffer, [0x28, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_wrap_unpack_roundtrip() {
    let message = example_message();
    let mut buffer = [0u8; 8];
    message.wrap_pack(&mut buffer, &[1.0, 2.0, 250.0]).unwrap();

    let (mut enable, mut radius, mut temperature) = (0.0, 0.0, 0.0);
    let result = message.wrap_unpack(
        &buffer,
        &mut [
            Some(&mut enable),
            Some(&mut radius),
            Some(&mut temperature),
        ],
    );

    assert_eq!(result, Ok(()));
    assert_eq!((enable, radius, temperature), (1.0, 2.0, 250.0));
}

#[test]
fn test_negative_temperature_layout() {
    let message = example_message();
    let frame = RawFrame::from(vec![
        RawValue::Unsigned(0),
        RawValue::Unsigned(0),
        RawValue::Signed(-2048),
    ]);
    let mut buffer = [0u8; 8];

    message.pack(&mut buffer, &frame).unwrap();
    assert_eq!(buffer[..3], [0x01, 0x00, 0x00]);
    assert_eq!(message.unpack(&buffer).unwrap(), frame);

    let frame = RawFrame::from(vec![
        RawValue::Unsigned(1),
        RawValue::Unsigned(63),
        RawValue::Signed(2047),
    ]);
    message.pack(&mut buffer, &frame).unwrap();
    assert_eq!(buffer[..3], [0xfe, 0xff, 0xe0]);
    assert_eq!(message.unpack(&buffer).unwrap(), frame);
}

#[test]
fn test_radius_out_of_range() {
    let message = example_message();
    let mut buffer = [0u8; 8];

    let result = message.wrap_pack(&mut buffer, &[1.0, 5.5, 250.0]);
    assert_eq!(
        result,
        Err(CodecError::OutOfRange {
            index: 2,
            name: "average_radius".to_string()
        })
    );
    assert_eq!(buffer, [0u8; 8]);

    // 63 * 0.1 decodes fine but fails the range check; the value is still delivered.
    buffer[0] = 63 << 1;
    let mut radius = 0.0;
    let result = message.wrap_unpack(&buffer, &mut [None, Some(&mut radius), None]);
    assert_eq!(status_code_of(&result), 2);
    assert!((radius - 6.3).abs() < 1e-9);
}

#[test]
fn test_first_of_two_offenders() {
    let message = example_message();
    let mut buffer = [0u8; 8];

    // Enable and temperature are both out of range.
    let result = message.wrap_pack(&mut buffer, &[2.0, 1.0, 300.0]);
    assert_eq!(status_code_of(&result), 1);
}

#[test]
fn test_clamp() {
    let message = example_message();
    let radius = message.signal("average_radius").unwrap();
    let temperature = message.signal("temperature").unwrap();

    assert_eq!(radius.clamp(-1.0), 0.0);
    assert_eq!(radius.clamp(9.0), 5.0);
    assert!((temperature.clamp(0.0) - 229.52).abs() < 1e-9);
    assert!((temperature.clamp(1000.0) - 270.47).abs() < 1e-9);
}

#[test]
fn test_short_buffers() {
    let message = example_message();
    let mut buffer = [0x55u8; 7];

    let result = message.wrap_pack(&mut buffer, &[1.0, 2.0, 250.0]);
    assert_eq!(status_code_of(&result), -1);
    assert_eq!(buffer, [0x55u8; 7]);

    let result = message.wrap_unpack(&buffer, &mut [None, None, None]);
    assert_eq!(
        result,
        Err(CodecError::BufferTooSmall {
            needed: 8,
            actual: 7
        })
    );
}

#[test]
fn test_metadata() {
    let message = example_message();

    assert_eq!(message.frame_id(), 0x1f0);
    assert!(!message.is_extended());
    assert_eq!(message.dlc(), 8);
    assert!(message.overlapping_signals().is_empty());
}
