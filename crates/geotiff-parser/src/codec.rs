//! Strip/tile decompression and predictor reversal.

use std::io::Read;

use crate::error::{TiffError, TiffResult};
use crate::reader::ByteOrder;

/// Compression schemes this reader handles.
///
/// Covers what satellite GeoTIFF exports actually use: uncompressed,
/// LZW (compression code 5) and zlib Deflate (8, plus the legacy
/// Adobe code 32946).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Lzw,
    Deflate,
}

impl Compression {
    pub fn from_code(code: u16) -> TiffResult<Self> {
        match code {
            1 => Ok(Compression::None),
            5 => Ok(Compression::Lzw),
            8 | 32946 => Ok(Compression::Deflate),
            other => Err(TiffError::UnsupportedCompression(other)),
        }
    }
}

/// Decompress one strip or tile to exactly `expected_len` bytes.
///
/// Writers may pad the final chunk; extra bytes are discarded. A chunk
/// that decompresses to fewer bytes than the layout requires is an error.
pub fn decompress(raw: &[u8], compression: Compression, expected_len: usize) -> TiffResult<Vec<u8>> {
    let mut out = match compression {
        Compression::None => raw.to_vec(),
        Compression::Lzw => {
            // TIFF LZW: MSB-first bit order, 8-bit codes, early code-size switch.
            weezl::decode::Decoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8)
                .decode(raw)
                .map_err(|err| TiffError::Codec(format!("LZW: {}", err)))?
        }
        Compression::Deflate => {
            let mut decoded = Vec::with_capacity(expected_len);
            flate2::read::ZlibDecoder::new(raw)
                .read_to_end(&mut decoded)
                .map_err(|e| TiffError::Codec(format!("deflate: {}", e)))?;
            decoded
        }
    };

    if out.len() < expected_len {
        return Err(TiffError::Codec(format!(
            "chunk decompressed to {} bytes, layout requires {}",
            out.len(),
            expected_len
        )));
    }
    out.truncate(expected_len);
    Ok(out)
}

/// Reverse TIFF predictor 2 (horizontal differencing) in place.
///
/// The predictor runs per scanline and per sample channel, so a chunk
/// holding `rows` rows of `row_width` interleaved pixels is processed
/// row by row. Differencing is defined on the integer sample values,
/// which for 16- and 32-bit samples means decoding in file byte order.
pub fn undo_horizontal_predictor(
    buf: &mut [u8],
    rows: usize,
    row_width: usize,
    samples_per_pixel: usize,
    bytes_per_sample: usize,
    order: ByteOrder,
) -> TiffResult<()> {
    let samples_per_row = row_width * samples_per_pixel;

    match bytes_per_sample {
        1 => {
            for row in 0..rows {
                let base = row * samples_per_row;
                for i in samples_per_pixel..samples_per_row {
                    buf[base + i] = buf[base + i].wrapping_add(buf[base + i - samples_per_pixel]);
                }
            }
        }
        2 => {
            for row in 0..rows {
                let base = row * samples_per_row * 2;
                for i in samples_per_pixel..samples_per_row {
                    let prev = read_u16_at(buf, base + (i - samples_per_pixel) * 2, order);
                    let cur = read_u16_at(buf, base + i * 2, order);
                    write_u16_at(buf, base + i * 2, cur.wrapping_add(prev), order);
                }
            }
        }
        4 => {
            for row in 0..rows {
                let base = row * samples_per_row * 4;
                for i in samples_per_pixel..samples_per_row {
                    let prev = read_u32_at(buf, base + (i - samples_per_pixel) * 4, order);
                    let cur = read_u32_at(buf, base + i * 4, order);
                    write_u32_at(buf, base + i * 4, cur.wrapping_add(prev), order);
                }
            }
        }
        other => {
            return Err(TiffError::Unsupported(format!(
                "predictor with {}-byte samples",
                other
            )))
        }
    }

    Ok(())
}

fn read_u16_at(buf: &[u8], offset: usize, order: ByteOrder) -> u16 {
    let bytes = [buf[offset], buf[offset + 1]];
    match order {
        ByteOrder::Little => u16::from_le_bytes(bytes),
        ByteOrder::Big => u16::from_be_bytes(bytes),
    }
}

fn write_u16_at(buf: &mut [u8], offset: usize, value: u16, order: ByteOrder) {
    let bytes = match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    };
    buf[offset..offset + 2].copy_from_slice(&bytes);
}

fn read_u32_at(buf: &[u8], offset: usize, order: ByteOrder) -> u32 {
    let bytes = [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]];
    match order {
        ByteOrder::Little => u32::from_le_bytes(bytes),
        ByteOrder::Big => u32::from_be_bytes(bytes),
    }
}

fn write_u32_at(buf: &mut [u8], offset: usize, value: u32, order: ByteOrder) {
    let bytes = match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    };
    buf[offset..offset + 4].copy_from_slice(&bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_compression_codes() {
        assert_eq!(Compression::from_code(1).unwrap(), Compression::None);
        assert_eq!(Compression::from_code(5).unwrap(), Compression::Lzw);
        assert_eq!(Compression::from_code(8).unwrap(), Compression::Deflate);
        assert_eq!(Compression::from_code(32946).unwrap(), Compression::Deflate);
        assert!(matches!(
            Compression::from_code(7),
            Err(TiffError::UnsupportedCompression(7))
        ));
    }

    #[test]
    fn test_deflate_roundtrip() {
        let original: Vec<u8> = (0..=255).collect();
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&original).unwrap();
        let compressed = encoder.finish().unwrap();

        let decoded = decompress(&compressed, Compression::Deflate, original.len()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_lzw_roundtrip() {
        let original = vec![7u8; 1000];
        let compressed = weezl::encode::Encoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8)
            .encode(&original)
            .unwrap();

        let decoded = decompress(&compressed, Compression::Lzw, original.len()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_short_chunk_rejected() {
        let result = decompress(&[1, 2, 3], Compression::None, 8);
        assert!(matches!(result, Err(TiffError::Codec(_))));
    }

    #[test]
    fn test_predictor_u8() {
        // Two pixels of two samples each, differenced: [10, 20, +5, -3]
        let mut buf = vec![10u8, 20, 5, 253];
        undo_horizontal_predictor(&mut buf, 1, 2, 2, 1, ByteOrder::Little).unwrap();
        assert_eq!(buf, vec![10, 20, 15, 17]);
    }

    #[test]
    fn test_predictor_u16_little_endian() {
        // One row, three single-sample pixels: 1000, +24, +1 (little-endian u16)
        let mut buf = Vec::new();
        for value in [1000u16, 24, 1] {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        undo_horizontal_predictor(&mut buf, 1, 3, 1, 2, ByteOrder::Little).unwrap();

        let decoded: Vec<u16> = buf
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(decoded, vec![1000, 1024, 1025]);
    }

    #[test]
    fn test_predictor_rows_independent() {
        // Two rows of two pixels; the second row starts fresh.
        let mut buf = vec![1u8, 1, 10, 10];
        undo_horizontal_predictor(&mut buf, 2, 2, 1, 1, ByteOrder::Little).unwrap();
        assert_eq!(buf, vec![1, 2, 10, 20]);
    }
}
