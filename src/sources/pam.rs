// thumbpick/src/sources/pam.rs
//! Parser for the PAM binary pixel dump that external decoders write to
//! their standard output: a 3-byte magic, a bounded textual header of
//! `KEY value` lines ending in `ENDHDR`, then raw pixel bytes.

use crate::core::{Result, ThumbError};
use image::{DynamicImage, RgbaImage};

const MAGIC: &[u8] = b"P7\n";
const HEADER_END: &[u8] = b"ENDHDR\n";
/// The header is text of a handful of short lines; anything past this
/// window is pixel data or garbage.
const HEADER_WINDOW: usize = 256;

#[derive(Debug, Default)]
pub struct PamImage {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
    pub max_value: i32,
    pub tuple_type: String,
    pub bytes: Vec<u8>,
}

fn protocol(msg: impl Into<String>) -> ThumbError {
    ThumbError::Protocol(msg.into())
}

fn find(haystack: &[u8], needle: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == needle)
}

fn parse_int(bytes: &[u8]) -> Result<i32> {
    let text = std::str::from_utf8(bytes).map_err(|_| protocol("non-ascii header value"))?;
    text.trim_end()
        .parse()
        .map_err(|_| protocol(format!("invalid integer: {:?}", text)))
}

/// Parses a PAM dump. TUPLTYPE must be the last key and must be
/// immediately followed by the end-of-header marker; an unrecognized
/// key or a missing marker is fatal for the whole response.
pub fn parse(data: &[u8]) -> Result<PamImage> {
    let body = data
        .strip_prefix(MAGIC)
        .ok_or_else(|| protocol("expected magic prefix P7"))?;
    let header = &body[..body.len().min(HEADER_WINDOW)];

    let mut img = PamImage::default();
    let mut pos = 0;
    loop {
        let space = find(&header[pos..], b' ').ok_or_else(|| protocol("truncated header"))?;
        let key = std::str::from_utf8(&header[pos..pos + space])
            .map_err(|_| protocol("non-ascii header key"))?;
        pos += space + 1;
        let newline = find(&header[pos..], b'\n').ok_or_else(|| protocol("truncated header"))?;
        let value = &header[pos..pos + newline];
        pos += newline + 1;

        match key {
            "WIDTH" => img.width = parse_int(value)?,
            "HEIGHT" => img.height = parse_int(value)?,
            "DEPTH" => img.depth = parse_int(value)?,
            "MAXVAL" => img.max_value = parse_int(value)?,
            "TUPLTYPE" => {
                img.tuple_type = String::from_utf8_lossy(value).into_owned();
                if !header[pos..].starts_with(HEADER_END) {
                    return Err(protocol("expected end of header marker"));
                }
                pos += HEADER_END.len();
                img.bytes = body[pos..].to_vec();
                return Ok(img);
            }
            other => return Err(protocol(format!("unexpected key: {}", other))),
        }
    }
}

/// Parses and validates a PAM dump as an 8-bit RGBA image with stride
/// `4 * width`.
pub fn decode_rgba(data: &[u8]) -> Result<DynamicImage> {
    let pam = parse(data)?;

    if pam.depth != 4 {
        return Err(protocol(format!("unexpected depth {}", pam.depth)));
    }
    if pam.max_value != 255 {
        return Err(protocol(format!("unexpected max value {}", pam.max_value)));
    }
    if pam.width < 0 || pam.height < 0 {
        return Err(protocol(format!(
            "unexpected size {} x {}",
            pam.width, pam.height
        )));
    }

    let width = pam.width as u32;
    let height = pam.height as u32;
    let expected = width as usize * height as usize * 4;
    if pam.bytes.len() < expected {
        return Err(protocol(format!(
            "expected {} pixel bytes, got {}",
            expected,
            pam.bytes.len()
        )));
    }
    let mut pixels = pam.bytes;
    pixels.truncate(expected);

    let rgba = RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| protocol("pixel buffer does not match dimensions"))?;
    Ok(DynamicImage::ImageRgba8(rgba))
}
