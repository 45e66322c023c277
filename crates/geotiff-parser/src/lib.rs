//! GeoTIFF reader for satellite imagery.
//!
//! This crate provides a pure Rust reader for the subset of TIFF 6.0 +
//! GeoTIFF that multi-band satellite exports use: classic (non-Big) TIFF
//! in either byte order, strip or tile layout, pixel-interleaved samples,
//! uncompressed / LZW / Deflate codecs with optional horizontal predictor,
//! and the georeferencing tags (pixel scale, tiepoint, GeoKey directory).
//!
//! Bands are read one at a time as `f32` grids in row-major order,
//! whatever the stored sample type, which is the shape the renderers
//! consume.

pub mod codec;
pub mod error;
pub mod geo;
pub mod ifd;
pub mod reader;

use bytes::Bytes;
use imagery_common::RasterBounds;

use codec::Compression;
use error::{TiffError, TiffResult};
use geo::GeoInfo;
use ifd::{tags, Ifd};
use reader::{ByteOrder, TiffReader};

/// Interpretation of the stored sample bits (SampleFormat tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Unsigned,
    Signed,
    Float,
}

/// Strip or tile arrangement of the pixel data.
#[derive(Debug)]
enum ChunkLayout {
    Strips {
        rows_per_strip: usize,
        offsets: Vec<u64>,
        byte_counts: Vec<u64>,
    },
    Tiles {
        tile_width: usize,
        tile_height: usize,
        offsets: Vec<u64>,
        byte_counts: Vec<u64>,
    },
}

/// An opened multi-band raster.
///
/// Owns the uploaded bytes for the duration of one request; band data is
/// decoded on demand by [`Dataset::read_band`].
pub struct Dataset {
    reader: TiffReader,
    width: usize,
    height: usize,
    samples_per_pixel: usize,
    bits_per_sample: u16,
    sample_format: SampleFormat,
    compression: Compression,
    predictor: u16,
    layout: ChunkLayout,
    geo: GeoInfo,
}

impl Dataset {
    /// Open a raster from raw bytes, validating the header and first IFD.
    pub fn from_bytes(data: Bytes) -> TiffResult<Self> {
        if data.len() < 8 {
            return Err(TiffError::Truncated("file header"));
        }

        let order = if &data[0..2] == b"II" {
            ByteOrder::Little
        } else if &data[0..2] == b"MM" {
            ByteOrder::Big
        } else {
            return Err(TiffError::InvalidHeader(format!(
                "bad byte-order mark {:?}",
                &data[0..2]
            )));
        };
        let reader = TiffReader::new(data, order);

        match reader.read_u16(2, "file header")? {
            42 => {}
            43 => return Err(TiffError::Unsupported("BigTIFF".into())),
            magic => {
                return Err(TiffError::InvalidHeader(format!(
                    "bad magic number {}",
                    magic
                )))
            }
        }

        let ifd_offset = reader.read_u32(4, "file header")? as usize;
        let ifd = Ifd::parse(&reader, ifd_offset)?;

        let width = ifd
            .u64_value(&reader, tags::IMAGE_WIDTH)?
            .ok_or(TiffError::MissingTag("ImageWidth"))? as usize;
        let height = ifd
            .u64_value(&reader, tags::IMAGE_LENGTH)?
            .ok_or(TiffError::MissingTag("ImageLength"))? as usize;
        if width == 0 || height == 0 {
            return Err(TiffError::InvalidTag {
                tag: "ImageWidth/ImageLength",
                message: "zero-sized image".into(),
            });
        }

        let samples_per_pixel = ifd
            .u64_value(&reader, tags::SAMPLES_PER_PIXEL)?
            .unwrap_or(1) as usize;
        if samples_per_pixel == 0 {
            return Err(TiffError::InvalidTag {
                tag: "SamplesPerPixel",
                message: "zero samples per pixel".into(),
            });
        }

        let bits_per_sample = uniform_value(
            ifd.u64_values(&reader, tags::BITS_PER_SAMPLE)?,
            1,
            "BitsPerSample",
        )? as u16;

        let sample_format = match uniform_value(
            ifd.u64_values(&reader, tags::SAMPLE_FORMAT)?,
            1,
            "SampleFormat",
        )? {
            1 => SampleFormat::Unsigned,
            2 => SampleFormat::Signed,
            3 => SampleFormat::Float,
            other => {
                return Err(TiffError::Unsupported(format!(
                    "sample format {}",
                    other
                )))
            }
        };

        match (sample_format, bits_per_sample) {
            (SampleFormat::Unsigned | SampleFormat::Signed, 8 | 16 | 32) => {}
            (SampleFormat::Float, 32 | 64) => {}
            (_, bits) => {
                return Err(TiffError::Unsupported(format!(
                    "{:?} samples at {} bits",
                    sample_format, bits
                )))
            }
        }

        let compression = Compression::from_code(
            ifd.u64_value(&reader, tags::COMPRESSION)?.unwrap_or(1) as u16,
        )?;

        let predictor = ifd.u64_value(&reader, tags::PREDICTOR)?.unwrap_or(1) as u16;
        match predictor {
            1 => {}
            2 if sample_format != SampleFormat::Float => {}
            other => {
                return Err(TiffError::Unsupported(format!(
                    "predictor {} with {:?} samples",
                    other, sample_format
                )))
            }
        }

        let planar = ifd
            .u64_value(&reader, tags::PLANAR_CONFIGURATION)?
            .unwrap_or(1);
        if planar != 1 {
            return Err(TiffError::Unsupported("planar configuration".into()));
        }

        // Guard the allocation the band reads will make.
        width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(samples_per_pixel))
            .and_then(|n| n.checked_mul(bits_per_sample as usize / 8))
            .ok_or_else(|| TiffError::InvalidTag {
                tag: "ImageWidth/ImageLength",
                message: "image dimensions overflow".into(),
            })?;

        let layout = Self::parse_layout(&ifd, &reader, width, height)?;
        let geo = GeoInfo::parse(&ifd, &reader)?;

        tracing::debug!(
            width,
            height,
            bands = samples_per_pixel,
            bits = bits_per_sample,
            ?compression,
            "opened raster"
        );

        Ok(Self {
            reader,
            width,
            height,
            samples_per_pixel,
            bits_per_sample,
            sample_format,
            compression,
            predictor,
            layout,
            geo,
        })
    }

    fn parse_layout(
        ifd: &Ifd,
        reader: &TiffReader,
        width: usize,
        height: usize,
    ) -> TiffResult<ChunkLayout> {
        if let Some(offsets) = ifd.u64_values(reader, tags::TILE_OFFSETS)? {
            let tile_width = ifd
                .u64_value(reader, tags::TILE_WIDTH)?
                .ok_or(TiffError::MissingTag("TileWidth"))? as usize;
            let tile_height = ifd
                .u64_value(reader, tags::TILE_LENGTH)?
                .ok_or(TiffError::MissingTag("TileLength"))? as usize;
            if tile_width == 0 || tile_height == 0 {
                return Err(TiffError::InvalidTag {
                    tag: "TileWidth/TileLength",
                    message: "zero-sized tiles".into(),
                });
            }

            let byte_counts = ifd
                .u64_values(reader, tags::TILE_BYTE_COUNTS)?
                .ok_or(TiffError::MissingTag("TileByteCounts"))?;

            let across = width.div_ceil(tile_width);
            let down = height.div_ceil(tile_height);
            if offsets.len() != across * down || byte_counts.len() != offsets.len() {
                return Err(TiffError::InvalidTag {
                    tag: "TileOffsets",
                    message: format!(
                        "expected {} tiles, found {} offsets / {} byte counts",
                        across * down,
                        offsets.len(),
                        byte_counts.len()
                    ),
                });
            }

            return Ok(ChunkLayout::Tiles {
                tile_width,
                tile_height,
                offsets,
                byte_counts,
            });
        }

        let offsets = ifd
            .u64_values(reader, tags::STRIP_OFFSETS)?
            .ok_or(TiffError::MissingTag("StripOffsets"))?;
        let byte_counts = ifd
            .u64_values(reader, tags::STRIP_BYTE_COUNTS)?
            .ok_or(TiffError::MissingTag("StripByteCounts"))?;

        // Default (no tag) is "all rows in one strip".
        let rows_per_strip = ifd
            .u64_value(reader, tags::ROWS_PER_STRIP)?
            .map(|r| r as usize)
            .unwrap_or(height)
            .min(height)
            .max(1);

        let strip_count = height.div_ceil(rows_per_strip);
        if offsets.len() != strip_count || byte_counts.len() != strip_count {
            return Err(TiffError::InvalidTag {
                tag: "StripOffsets",
                message: format!(
                    "expected {} strips, found {} offsets / {} byte counts",
                    strip_count,
                    offsets.len(),
                    byte_counts.len()
                ),
            });
        }

        Ok(ChunkLayout::Strips {
            rows_per_strip,
            offsets,
            byte_counts,
        })
    }

    /// Raster width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of spectral bands (samples per pixel).
    pub fn band_count(&self) -> usize {
        self.samples_per_pixel
    }

    /// CRS identifier in `EPSG:<code>` form, if the file declares one.
    pub fn crs(&self) -> Option<String> {
        self.geo.epsg.map(|code| format!("EPSG:{}", code))
    }

    /// Extent in the raster's native coordinate space.
    pub fn bounds(&self) -> RasterBounds {
        self.geo.bounds(self.width, self.height)
    }

    /// Read one band (1-based, the spectral-band convention) as a
    /// row-major `f32` grid of `width() * height()` values.
    pub fn read_band(&self, band: usize) -> TiffResult<Vec<f32>> {
        if band == 0 || band > self.samples_per_pixel {
            return Err(TiffError::BandOutOfRange {
                requested: band,
                available: self.samples_per_pixel,
            });
        }

        let mut out = vec![0.0f32; self.width * self.height];
        match &self.layout {
            ChunkLayout::Strips {
                rows_per_strip,
                offsets,
                byte_counts,
            } => {
                let rows_per_strip = *rows_per_strip;
                for (index, (&offset, &byte_count)) in
                    offsets.iter().zip(byte_counts.iter()).enumerate()
                {
                    let row0 = index * rows_per_strip;
                    let rows = rows_per_strip.min(self.height - row0);
                    let chunk = self.decode_chunk(offset, byte_count, self.width, rows)?;
                    self.scatter_rows(&chunk, band, row0, rows, self.width, 0, self.width, &mut out);
                }
            }
            ChunkLayout::Tiles {
                tile_width,
                tile_height,
                offsets,
                byte_counts,
            } => {
                let (tile_width, tile_height) = (*tile_width, *tile_height);
                let across = self.width.div_ceil(tile_width);
                for (index, (&offset, &byte_count)) in
                    offsets.iter().zip(byte_counts.iter()).enumerate()
                {
                    let col0 = (index % across) * tile_width;
                    let row0 = (index / across) * tile_height;
                    // Tiles are always full size; edge tiles carry padding.
                    let chunk = self.decode_chunk(offset, byte_count, tile_width, tile_height)?;
                    let rows = tile_height.min(self.height - row0);
                    let cols = tile_width.min(self.width - col0);
                    self.scatter_rows(&chunk, band, row0, rows, tile_width, col0, cols, &mut out);
                }
            }
        }

        Ok(out)
    }

    /// Decompress one chunk of `chunk_width` x `rows` pixels and undo the
    /// predictor if the file uses one.
    fn decode_chunk(
        &self,
        offset: u64,
        byte_count: u64,
        chunk_width: usize,
        rows: usize,
    ) -> TiffResult<Vec<u8>> {
        let bytes_per_sample = self.bits_per_sample as usize / 8;
        let expected = rows * chunk_width * self.samples_per_pixel * bytes_per_sample;
        let raw = self
            .reader
            .slice(offset as usize, byte_count as usize, "pixel data")?;
        let mut chunk = codec::decompress(raw, self.compression, expected)?;

        if self.predictor == 2 {
            codec::undo_horizontal_predictor(
                &mut chunk,
                rows,
                chunk_width,
                self.samples_per_pixel,
                bytes_per_sample,
                self.reader.order(),
            )?;
        }

        Ok(chunk)
    }

    /// Copy one band's samples out of a decoded interleaved chunk into the
    /// output grid at (`row0`, `col0`).
    #[allow(clippy::too_many_arguments)]
    fn scatter_rows(
        &self,
        chunk: &[u8],
        band: usize,
        row0: usize,
        rows: usize,
        chunk_width: usize,
        col0: usize,
        cols: usize,
        out: &mut [f32],
    ) {
        let bytes_per_sample = self.bits_per_sample as usize / 8;
        for row in 0..rows {
            for col in 0..cols {
                let sample = (row * chunk_width + col) * self.samples_per_pixel + (band - 1);
                let start = sample * bytes_per_sample;
                out[(row0 + row) * self.width + (col0 + col)] =
                    self.sample_to_f32(&chunk[start..start + bytes_per_sample]);
            }
        }
    }

    fn sample_to_f32(&self, bytes: &[u8]) -> f32 {
        let order = self.reader.order();
        match (self.sample_format, self.bits_per_sample) {
            (SampleFormat::Unsigned, 8) => bytes[0] as f32,
            (SampleFormat::Signed, 8) => bytes[0] as i8 as f32,
            (SampleFormat::Unsigned, 16) => u16_from(bytes, order) as f32,
            (SampleFormat::Signed, 16) => u16_from(bytes, order) as i16 as f32,
            (SampleFormat::Unsigned, 32) => u32_from(bytes, order) as f32,
            (SampleFormat::Signed, 32) => u32_from(bytes, order) as i32 as f32,
            (SampleFormat::Float, 32) => f32::from_bits(u32_from(bytes, order)),
            (SampleFormat::Float, 64) => {
                let bytes: [u8; 8] = bytes.try_into().unwrap();
                (match order {
                    ByteOrder::Little => f64::from_le_bytes(bytes),
                    ByteOrder::Big => f64::from_be_bytes(bytes),
                }) as f32
            }
            // from_bytes validated the combination already.
            _ => unreachable!("unvalidated sample layout"),
        }
    }
}

fn u16_from(bytes: &[u8], order: ByteOrder) -> u16 {
    let bytes: [u8; 2] = bytes.try_into().unwrap();
    match order {
        ByteOrder::Little => u16::from_le_bytes(bytes),
        ByteOrder::Big => u16::from_be_bytes(bytes),
    }
}

fn u32_from(bytes: &[u8], order: ByteOrder) -> u32 {
    let bytes: [u8; 4] = bytes.try_into().unwrap();
    match order {
        ByteOrder::Little => u32::from_le_bytes(bytes),
        ByteOrder::Big => u32::from_be_bytes(bytes),
    }
}

/// Collapse a per-sample tag (BitsPerSample, SampleFormat) to its single
/// value, requiring every sample to agree.
fn uniform_value(
    values: Option<Vec<u64>>,
    default: u64,
    tag: &'static str,
) -> TiffResult<u64> {
    match values {
        None => Ok(default),
        Some(values) => {
            let first = *values.first().ok_or(TiffError::InvalidTag {
                tag,
                message: "empty value list".into(),
            })?;
            if values.iter().any(|&v| v != first) {
                return Err(TiffError::Unsupported(format!(
                    "per-band {} values differ",
                    tag
                )));
            }
            Ok(first)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::geotiff::{GeoTiffBuilder, TiffByteOrder, TiffCompression, TiffLayout};
    use test_utils::{band_sample, malformed_image_bytes};

    fn open(bytes: Vec<u8>) -> Dataset {
        Dataset::from_bytes(Bytes::from(bytes)).unwrap()
    }

    #[test]
    fn test_open_basic_fixture() {
        let dataset = open(GeoTiffBuilder::new(24, 16, 12).build());
        assert_eq!(dataset.width(), 24);
        assert_eq!(dataset.height(), 16);
        assert_eq!(dataset.band_count(), 12);
        assert_eq!(dataset.crs().as_deref(), Some("EPSG:32633"));
    }

    #[test]
    fn test_bounds_from_geo_tags() {
        // Builder pins (0,0) to (600000, 5700000) at 10m/pixel.
        let dataset = open(GeoTiffBuilder::new(30, 20, 3).build());
        let bounds = dataset.bounds();
        assert_eq!(bounds.left, 600000.0);
        assert_eq!(bounds.top, 5700000.0);
        assert_eq!(bounds.right, 600300.0);
        assert_eq!(bounds.bottom, 5699800.0);
    }

    #[test]
    fn test_band_values_match_pattern() {
        let dataset = open(GeoTiffBuilder::new(24, 16, 4).build());
        for band in 1..=4 {
            let grid = dataset.read_band(band).unwrap();
            assert_eq!(grid.len(), 24 * 16);
            assert_eq!(grid[0], band_sample(band, 0, 0) as f32);
            assert_eq!(grid[5 * 24 + 7], band_sample(band, 7, 5) as f32);
        }
    }

    #[test]
    fn test_multiple_strips() {
        let dataset = open(
            GeoTiffBuilder::new(24, 16, 2)
                .layout(TiffLayout::Strips { rows_per_strip: 5 })
                .build(),
        );
        let grid = dataset.read_band(2).unwrap();
        // Row 15 lives in the final, short strip.
        assert_eq!(grid[15 * 24 + 3], band_sample(2, 3, 15) as f32);
    }

    #[test]
    fn test_tiled_layout() {
        let dataset = open(
            GeoTiffBuilder::new(40, 24, 3)
                .layout(TiffLayout::Tiles {
                    tile_width: 16,
                    tile_height: 16,
                })
                .build(),
        );
        let grid = dataset.read_band(3).unwrap();
        // Pixels from interior and edge tiles (edge tiles are padded).
        assert_eq!(grid[0], band_sample(3, 0, 0) as f32);
        assert_eq!(grid[10 * 40 + 20], band_sample(3, 20, 10) as f32);
        assert_eq!(grid[23 * 40 + 39], band_sample(3, 39, 23) as f32);
    }

    #[test]
    fn test_lzw_compression() {
        let dataset = open(
            GeoTiffBuilder::new(32, 10, 2)
                .compression(TiffCompression::Lzw)
                .build(),
        );
        let grid = dataset.read_band(1).unwrap();
        assert_eq!(grid[9 * 32 + 31], band_sample(1, 31, 9) as f32);
    }

    #[test]
    fn test_deflate_compression() {
        let dataset = open(
            GeoTiffBuilder::new(32, 10, 2)
                .compression(TiffCompression::Deflate)
                .build(),
        );
        let grid = dataset.read_band(2).unwrap();
        assert_eq!(grid[4 * 32 + 8], band_sample(2, 8, 4) as f32);
    }

    #[test]
    fn test_deflate_with_predictor() {
        let dataset = open(
            GeoTiffBuilder::new(32, 10, 3)
                .compression(TiffCompression::Deflate)
                .predictor(true)
                .build(),
        );
        let grid = dataset.read_band(2).unwrap();
        assert_eq!(grid[0], band_sample(2, 0, 0) as f32);
        assert_eq!(grid[7 * 32 + 30], band_sample(2, 30, 7) as f32);
    }

    #[test]
    fn test_big_endian_file() {
        let dataset = open(
            GeoTiffBuilder::new(16, 8, 2)
                .byte_order(TiffByteOrder::Big)
                .build(),
        );
        assert_eq!(dataset.width(), 16);
        let grid = dataset.read_band(1).unwrap();
        assert_eq!(grid[3 * 16 + 2], band_sample(1, 2, 3) as f32);
    }

    #[test]
    fn test_no_geo_tags_falls_back_to_pixel_space() {
        let dataset = open(GeoTiffBuilder::new(10, 6, 1).geo_tags(false).build());
        assert_eq!(dataset.crs(), None);
        let bounds = dataset.bounds();
        assert_eq!(bounds.top, 0.0);
        assert_eq!(bounds.bottom, 6.0);
        assert_eq!(bounds.right, 10.0);
    }

    #[test]
    fn test_band_out_of_range() {
        let dataset = open(GeoTiffBuilder::new(8, 8, 4).build());
        assert!(matches!(
            dataset.read_band(8),
            Err(TiffError::BandOutOfRange {
                requested: 8,
                available: 4
            })
        ));
        assert!(dataset.read_band(0).is_err());
    }

    #[test]
    fn test_malformed_input_rejected() {
        assert!(matches!(
            Dataset::from_bytes(Bytes::from(malformed_image_bytes())),
            Err(TiffError::InvalidHeader(_))
        ));
        assert!(Dataset::from_bytes(Bytes::from_static(b"II")).is_err());
    }

    #[test]
    fn test_truncated_pixel_data() {
        let mut bytes = GeoTiffBuilder::new(16, 16, 2).build();
        bytes.truncate(100);
        // Either the IFD or the pixel data is gone; must not panic.
        let result = Dataset::from_bytes(Bytes::from(bytes));
        assert!(result.is_err() || result.unwrap().read_band(1).is_err());
    }

    #[test]
    fn test_bigtiff_rejected() {
        let mut bytes = GeoTiffBuilder::new(8, 8, 1).build();
        bytes[2] = 43; // BigTIFF magic
        bytes[3] = 0;
        assert!(matches!(
            Dataset::from_bytes(Bytes::from(bytes)),
            Err(TiffError::Unsupported(_))
        ));
    }
}
