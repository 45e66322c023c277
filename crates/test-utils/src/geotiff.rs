//! Synthetic GeoTIFF fixtures.
//!
//! Builds small multi-band GeoTIFFs entirely in memory with predictable
//! sample values, so parser and endpoint tests can assert on exact
//! pixels. Supports both byte orders, strip and tile layouts, the three
//! compression schemes satellite exports use, and the horizontal
//! predictor.

use std::io::Write;

/// Deterministic sample value for `band` (1-based) at pixel (`x`, `y`).
///
/// Every (band, x, y) triple maps to a distinct small value, so a
/// misread band index or transposed axis shows up immediately.
pub fn band_sample(band: usize, x: usize, y: usize) -> u16 {
    (band * 1000 + x * 7 + y * 13) as u16
}

/// Bytes that are definitely not an image in any supported format.
pub fn malformed_image_bytes() -> Vec<u8> {
    b"this is not a raster image at all, in any format".to_vec()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffByteOrder {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    None,
    Lzw,
    Deflate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffLayout {
    Strips { rows_per_strip: usize },
    Tiles { tile_width: usize, tile_height: usize },
}

/// Builder for synthetic GeoTIFF files with 16-bit unsigned samples.
///
/// Defaults: little-endian, uncompressed, one strip holding the whole
/// image, georeferencing tags present (10 m/pixel UTM 33N grid with its
/// top-left corner pinned at easting 600000, northing 5700000).
pub struct GeoTiffBuilder {
    width: usize,
    height: usize,
    bands: usize,
    byte_order: TiffByteOrder,
    compression: TiffCompression,
    layout: TiffLayout,
    predictor: bool,
    geo_tags: bool,
}

impl GeoTiffBuilder {
    pub fn new(width: usize, height: usize, bands: usize) -> Self {
        Self {
            width,
            height,
            bands,
            byte_order: TiffByteOrder::Little,
            compression: TiffCompression::None,
            layout: TiffLayout::Strips {
                rows_per_strip: height,
            },
            predictor: false,
            geo_tags: true,
        }
    }

    pub fn byte_order(mut self, order: TiffByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn layout(mut self, layout: TiffLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn predictor(mut self, predictor: bool) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn geo_tags(mut self, geo_tags: bool) -> Self {
        self.geo_tags = geo_tags;
        self
    }

    /// Serialize the fixture to TIFF bytes.
    pub fn build(self) -> Vec<u8> {
        let big = self.byte_order == TiffByteOrder::Big;

        // Pixel data chunks, compressed and concatenated after the header.
        let chunks = self.build_chunks(big);

        let mut file = Vec::new();
        file.extend_from_slice(if big { b"MM" } else { b"II" });
        put_u16(&mut file, 42, big);
        put_u32(&mut file, 0, big); // IFD offset, patched below

        let mut offsets = Vec::with_capacity(chunks.len());
        let mut byte_counts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            offsets.push(file.len() as u32);
            byte_counts.push(chunk.len() as u32);
            file.extend_from_slice(chunk);
            if file.len() % 2 == 1 {
                file.push(0); // keep word alignment for the IFD
            }
        }

        let ifd_offset = file.len() as u32;
        file[4..8].copy_from_slice(&encode_u32(ifd_offset, big));

        let entries = self.build_entries(big, &offsets, &byte_counts);
        write_ifd(&mut file, ifd_offset, &entries, big);

        file
    }

    fn build_chunks(&self, big: bool) -> Vec<Vec<u8>> {
        let regions: Vec<(usize, usize, usize, usize)> = match self.layout {
            TiffLayout::Strips { rows_per_strip } => {
                let rows_per_strip = rows_per_strip.min(self.height).max(1);
                (0..self.height.div_ceil(rows_per_strip))
                    .map(|s| {
                        let row0 = s * rows_per_strip;
                        (0, row0, self.width, rows_per_strip.min(self.height - row0))
                    })
                    .collect()
            }
            TiffLayout::Tiles {
                tile_width,
                tile_height,
            } => {
                let across = self.width.div_ceil(tile_width);
                let down = self.height.div_ceil(tile_height);
                (0..across * down)
                    .map(|t| {
                        // Edge tiles keep their full size and are padded.
                        ((t % across) * tile_width, (t / across) * tile_height, tile_width, tile_height)
                    })
                    .collect()
            }
        };

        regions
            .into_iter()
            .map(|(col0, row0, cols, rows)| {
                let mut samples = Vec::with_capacity(cols * rows * self.bands);
                for row in 0..rows {
                    for col in 0..cols {
                        let (x, y) = (col0 + col, row0 + row);
                        for band in 1..=self.bands {
                            let inside = x < self.width && y < self.height;
                            samples.push(if inside { band_sample(band, x, y) } else { 0 });
                        }
                    }
                }

                if self.predictor {
                    forward_predictor(&mut samples, rows, cols, self.bands);
                }

                let mut bytes = Vec::with_capacity(samples.len() * 2);
                for sample in samples {
                    put_u16(&mut bytes, sample, big);
                }

                match self.compression {
                    TiffCompression::None => bytes,
                    TiffCompression::Lzw => {
                        weezl::encode::Encoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8)
                            .encode(&bytes)
                            .expect("LZW encoding of fixture data")
                    }
                    TiffCompression::Deflate => {
                        let mut encoder = flate2::write::ZlibEncoder::new(
                            Vec::new(),
                            flate2::Compression::default(),
                        );
                        encoder.write_all(&bytes).expect("deflate fixture data");
                        encoder.finish().expect("finish deflate stream")
                    }
                }
            })
            .collect()
    }

    fn build_entries(&self, big: bool, offsets: &[u32], byte_counts: &[u32]) -> Vec<Entry> {
        let compression_code = match self.compression {
            TiffCompression::None => 1,
            TiffCompression::Lzw => 5,
            TiffCompression::Deflate => 8,
        };

        let mut entries = vec![
            Entry::longs(256, &[self.width as u32], big),
            Entry::longs(257, &[self.height as u32], big),
            Entry::shorts(258, &vec![16; self.bands], big),
            Entry::shorts(259, &[compression_code], big),
            Entry::shorts(262, &[1], big), // BlackIsZero
            Entry::shorts(277, &[self.bands as u16], big),
            Entry::shorts(284, &[1], big), // chunky
            Entry::shorts(339, &vec![1; self.bands], big),
        ];

        match self.layout {
            TiffLayout::Strips { rows_per_strip } => {
                entries.push(Entry::longs(273, offsets, big));
                entries.push(Entry::longs(
                    278,
                    &[rows_per_strip.min(self.height).max(1) as u32],
                    big,
                ));
                entries.push(Entry::longs(279, byte_counts, big));
            }
            TiffLayout::Tiles {
                tile_width,
                tile_height,
            } => {
                entries.push(Entry::longs(322, &[tile_width as u32], big));
                entries.push(Entry::longs(323, &[tile_height as u32], big));
                entries.push(Entry::longs(324, offsets, big));
                entries.push(Entry::longs(325, byte_counts, big));
            }
        }

        if self.predictor {
            entries.push(Entry::shorts(317, &[2], big));
        }

        if self.geo_tags {
            entries.push(Entry::doubles(33550, &[10.0, 10.0, 0.0], big));
            entries.push(Entry::doubles(
                33922,
                &[0.0, 0.0, 0.0, 600000.0, 5700000.0, 0.0],
                big,
            ));
            // Version header + 3 keys: model type, raster type, projected CRS.
            entries.push(Entry::shorts(
                34735,
                &[1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 32633],
                big,
            ));
        }

        entries.sort_by_key(|e| e.tag);
        entries
    }
}

/// One serialized IFD entry awaiting layout.
struct Entry {
    tag: u16,
    type_code: u16,
    count: u32,
    payload: Vec<u8>,
}

impl Entry {
    fn shorts(tag: u16, values: &[u16], big: bool) -> Self {
        let mut payload = Vec::with_capacity(values.len() * 2);
        for &v in values {
            put_u16(&mut payload, v, big);
        }
        Self {
            tag,
            type_code: 3,
            count: values.len() as u32,
            payload,
        }
    }

    fn longs(tag: u16, values: &[u32], big: bool) -> Self {
        let mut payload = Vec::with_capacity(values.len() * 4);
        for &v in values {
            put_u32(&mut payload, v, big);
        }
        Self {
            tag,
            type_code: 4,
            count: values.len() as u32,
            payload,
        }
    }

    fn doubles(tag: u16, values: &[f64], big: bool) -> Self {
        let mut payload = Vec::with_capacity(values.len() * 8);
        for &v in values {
            let bytes = if big {
                v.to_be_bytes()
            } else {
                v.to_le_bytes()
            };
            payload.extend_from_slice(&bytes);
        }
        Self {
            tag,
            type_code: 12,
            count: values.len() as u32,
            payload,
        }
    }
}

/// Write the directory: entry table, next-IFD terminator, then the
/// out-of-line value area for payloads larger than 4 bytes.
fn write_ifd(file: &mut Vec<u8>, ifd_offset: u32, entries: &[Entry], big: bool) {
    let external_start = ifd_offset as usize + 2 + entries.len() * 12 + 4;
    let mut external = Vec::new();

    put_u16(file, entries.len() as u16, big);
    for entry in entries {
        put_u16(file, entry.tag, big);
        put_u16(file, entry.type_code, big);
        put_u32(file, entry.count, big);
        if entry.payload.len() <= 4 {
            // Inline, left-justified in the 4-byte value field.
            let mut field = entry.payload.clone();
            field.resize(4, 0);
            file.extend_from_slice(&field);
        } else {
            put_u32(file, (external_start + external.len()) as u32, big);
            external.extend_from_slice(&entry.payload);
        }
    }
    put_u32(file, 0, big); // no next IFD
    file.extend_from_slice(&external);
}

/// Apply TIFF predictor 2 (forward horizontal differencing) in place.
fn forward_predictor(samples: &mut [u16], rows: usize, row_width: usize, bands: usize) {
    let samples_per_row = row_width * bands;
    for row in 0..rows {
        let base = row * samples_per_row;
        for i in (bands..samples_per_row).rev() {
            samples[base + i] = samples[base + i].wrapping_sub(samples[base + i - bands]);
        }
    }
}

fn encode_u32(value: u32, big: bool) -> [u8; 4] {
    if big {
        value.to_be_bytes()
    } else {
        value.to_le_bytes()
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16, big: bool) {
    let bytes = if big {
        value.to_be_bytes()
    } else {
        value.to_le_bytes()
    };
    out.extend_from_slice(&bytes);
}

fn put_u32(out: &mut Vec<u8>, value: u32, big: bool) {
    out.extend_from_slice(&encode_u32(value, big));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_magic() {
        let le = GeoTiffBuilder::new(4, 4, 1).build();
        assert_eq!(&le[0..2], b"II");
        assert_eq!(le[2], 42);

        let be = GeoTiffBuilder::new(4, 4, 1)
            .byte_order(TiffByteOrder::Big)
            .build();
        assert_eq!(&be[0..2], b"MM");
        assert_eq!(be[3], 42);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = GeoTiffBuilder::new(16, 8, 4).build();
        let b = GeoTiffBuilder::new(16, 8, 4).build();
        assert_eq!(a, b);
    }

    #[test]
    fn test_compressed_smaller_than_raw() {
        let raw = GeoTiffBuilder::new(64, 64, 2).build();
        let deflated = GeoTiffBuilder::new(64, 64, 2)
            .compression(TiffCompression::Deflate)
            .build();
        assert!(deflated.len() < raw.len());
    }

    #[test]
    fn test_forward_predictor_rows_independent() {
        let mut samples = vec![5, 7, 9, 1, 1, 1];
        forward_predictor(&mut samples, 2, 3, 1);
        assert_eq!(samples, vec![5, 2, 2, 1, 0, 0]);
    }
}
