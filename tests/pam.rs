use thumbpick::sources::pam;
use thumbpick::ThumbError;

fn golden_header() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"P7\n");
    data.extend_from_slice(b"WIDTH 4\n");
    data.extend_from_slice(b"HEIGHT 2\n");
    data.extend_from_slice(b"DEPTH 4\n");
    data.extend_from_slice(b"MAXVAL 255\n");
    data.extend_from_slice(b"TUPLTYPE RGB_ALPHA\n");
    data.extend_from_slice(b"ENDHDR\n");
    data
}

#[test]
fn parses_well_formed_dump() {
    let mut data = golden_header();
    data.extend_from_slice(&[0xAB; 32]);

    let img = pam::parse(&data).unwrap();
    assert_eq!(img.width, 4);
    assert_eq!(img.height, 2);
    assert_eq!(img.depth, 4);
    assert_eq!(img.max_value, 255);
    assert_eq!(img.tuple_type, "RGB_ALPHA");
    assert_eq!(img.bytes.len(), 32);
}

#[test]
fn decodes_to_rgba_with_matching_stride() {
    let mut data = golden_header();
    data.extend_from_slice(&[0x7F; 32]);

    let image = pam::decode_rgba(&data).unwrap();
    assert_eq!(image.width(), 4);
    assert_eq!(image.height(), 2);
    assert_eq!(image.as_bytes().len(), 32);
}

#[test]
fn rejects_missing_magic() {
    let data = b"P6\nWIDTH 4\n";
    assert!(matches!(pam::parse(data), Err(ThumbError::Protocol(_))));
}

#[test]
fn rejects_unknown_key() {
    let data = b"P7\nWIDTH 4\nBOGUS 1\n";
    let err = pam::parse(data).unwrap_err();
    assert!(matches!(err, ThumbError::Protocol(ref msg) if msg.contains("BOGUS")));
}

#[test]
fn rejects_missing_end_marker() {
    let data = b"P7\nWIDTH 4\nHEIGHT 2\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nWHAT\n";
    assert!(matches!(pam::parse(data), Err(ThumbError::Protocol(_))));
}

#[test]
fn rejects_wrong_depth() {
    let data =
        b"P7\nWIDTH 1\nHEIGHT 1\nDEPTH 3\nMAXVAL 255\nTUPLTYPE RGB\nENDHDR\n\x00\x00\x00".to_vec();
    let err = pam::decode_rgba(&data).unwrap_err();
    assert!(matches!(err, ThumbError::Protocol(ref msg) if msg.contains("depth")));
}

#[test]
fn rejects_wrong_max_value() {
    let mut data = Vec::new();
    data.extend_from_slice(b"P7\nWIDTH 1\nHEIGHT 1\nDEPTH 4\nMAXVAL 65535\n");
    data.extend_from_slice(b"TUPLTYPE RGB_ALPHA\nENDHDR\n");
    data.extend_from_slice(&[0; 4]);
    let err = pam::decode_rgba(&data).unwrap_err();
    assert!(matches!(err, ThumbError::Protocol(ref msg) if msg.contains("max value")));
}

#[test]
fn rejects_negative_dimensions() {
    let mut data = Vec::new();
    data.extend_from_slice(b"P7\nWIDTH -4\nHEIGHT 2\nDEPTH 4\nMAXVAL 255\n");
    data.extend_from_slice(b"TUPLTYPE RGB_ALPHA\nENDHDR\n");
    let err = pam::decode_rgba(&data).unwrap_err();
    assert!(matches!(err, ThumbError::Protocol(ref msg) if msg.contains("size")));
}

#[test]
fn rejects_truncated_pixels() {
    let mut data = golden_header();
    data.extend_from_slice(&[0; 16]); // half the pixels
    let err = pam::decode_rgba(&data).unwrap_err();
    assert!(matches!(err, ThumbError::Protocol(ref msg) if msg.contains("pixel bytes")));
}

#[test]
fn rejects_truncated_header() {
    let data = b"P7\nWIDTH 4";
    assert!(matches!(pam::parse(data), Err(ThumbError::Protocol(_))));
}
