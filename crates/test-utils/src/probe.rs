//! Minimal PNG header probe for asserting on rendered output.

/// Fields of the IHDR chunk that tests care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
}

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Parse the signature and IHDR chunk of a PNG byte buffer.
///
/// Returns `None` for anything that is not a PNG with a leading IHDR
/// chunk (IHDR is required to come first in every valid PNG).
pub fn png_probe(bytes: &[u8]) -> Option<PngHeader> {
    if bytes.len() < 33 || bytes[0..8] != PNG_SIGNATURE {
        return None;
    }
    if &bytes[12..16] != b"IHDR" {
        return None;
    }

    Some(PngHeader {
        width: u32::from_be_bytes(bytes[16..20].try_into().ok()?),
        height: u32::from_be_bytes(bytes[20..24].try_into().ok()?),
        bit_depth: bytes[24],
        color_type: bytes[25],
    })
}
