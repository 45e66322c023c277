//! Image File Directory parsing and typed tag access.

use crate::error::{TiffError, TiffResult};
use crate::reader::TiffReader;

/// Baseline and GeoTIFF tag codes used by this reader.
pub mod tags {
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const BITS_PER_SAMPLE: u16 = 258;
    pub const COMPRESSION: u16 = 259;
    pub const STRIP_OFFSETS: u16 = 273;
    pub const SAMPLES_PER_PIXEL: u16 = 277;
    pub const ROWS_PER_STRIP: u16 = 278;
    pub const STRIP_BYTE_COUNTS: u16 = 279;
    pub const PLANAR_CONFIGURATION: u16 = 284;
    pub const PREDICTOR: u16 = 317;
    pub const TILE_WIDTH: u16 = 322;
    pub const TILE_LENGTH: u16 = 323;
    pub const TILE_OFFSETS: u16 = 324;
    pub const TILE_BYTE_COUNTS: u16 = 325;
    pub const SAMPLE_FORMAT: u16 = 339;
    pub const MODEL_PIXEL_SCALE: u16 = 33550;
    pub const MODEL_TIEPOINT: u16 = 33922;
    pub const GEO_KEY_DIRECTORY: u16 = 34735;
}

/// TIFF field types (TIFF 6.0 section 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
}

impl FieldType {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            6 => Some(FieldType::SByte),
            7 => Some(FieldType::Undefined),
            8 => Some(FieldType::SShort),
            9 => Some(FieldType::SLong),
            10 => Some(FieldType::SRational),
            11 => Some(FieldType::Float),
            12 => Some(FieldType::Double),
            _ => None,
        }
    }

    /// Size of one value of this type in bytes.
    pub fn size(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => 1,
            FieldType::Short | FieldType::SShort => 2,
            FieldType::Long | FieldType::SLong | FieldType::Float => 4,
            FieldType::Rational | FieldType::SRational | FieldType::Double => 8,
        }
    }
}

/// One 12-byte directory entry.
///
/// `value_field_offset` is the absolute offset of the entry's 4-byte value
/// field; values whose total size fits in 4 bytes are stored there inline
/// (left-justified, in file byte order), otherwise the field holds an
/// offset to the value array.
#[derive(Debug, Clone, Copy)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: FieldType,
    pub count: usize,
    value_field_offset: usize,
}

impl IfdEntry {
    /// Absolute offset of the first value.
    fn data_offset(&self, reader: &TiffReader) -> TiffResult<usize> {
        let byte_len = self.count.saturating_mul(self.field_type.size());
        if byte_len <= 4 {
            Ok(self.value_field_offset)
        } else {
            Ok(reader.read_u32(self.value_field_offset, "tag value offset")? as usize)
        }
    }

    /// Read all values as unsigned integers.
    ///
    /// Accepts the unsigned integer field types; anything else is an
    /// error so a size or offset never comes from a misdeclared tag.
    pub fn values_u64(&self, reader: &TiffReader) -> TiffResult<Vec<u64>> {
        let start = self.data_offset(reader)?;
        let size = self.field_type.size();
        let mut values = Vec::with_capacity(self.count);
        for i in 0..self.count {
            let offset = start + i * size;
            let value = match self.field_type {
                FieldType::Byte => reader.read_u8(offset, "tag value")? as u64,
                FieldType::Short => reader.read_u16(offset, "tag value")? as u64,
                FieldType::Long => reader.read_u32(offset, "tag value")? as u64,
                other => {
                    return Err(TiffError::InvalidTag {
                        tag: "integer tag",
                        message: format!("unexpected field type {:?}", other),
                    })
                }
            };
            values.push(value);
        }
        Ok(values)
    }

    /// Read all values as floating point numbers.
    pub fn values_f64(&self, reader: &TiffReader) -> TiffResult<Vec<f64>> {
        let start = self.data_offset(reader)?;
        let size = self.field_type.size();
        let mut values = Vec::with_capacity(self.count);
        for i in 0..self.count {
            let offset = start + i * size;
            let value = match self.field_type {
                FieldType::Byte => reader.read_u8(offset, "tag value")? as f64,
                FieldType::Short => reader.read_u16(offset, "tag value")? as f64,
                FieldType::Long => reader.read_u32(offset, "tag value")? as f64,
                FieldType::Float => reader.read_f32(offset, "tag value")? as f64,
                FieldType::Double => reader.read_f64(offset, "tag value")?,
                FieldType::Rational => {
                    let num = reader.read_u32(offset, "tag value")? as f64;
                    let den = reader.read_u32(offset + 4, "tag value")? as f64;
                    num / den
                }
                other => {
                    return Err(TiffError::InvalidTag {
                        tag: "float tag",
                        message: format!("unexpected field type {:?}", other),
                    })
                }
            };
            values.push(value);
        }
        Ok(values)
    }
}

/// A parsed Image File Directory.
///
/// Only the first IFD of the file is walked; subsequent directories
/// (overviews, masks) are ignored.
pub struct Ifd {
    entries: Vec<IfdEntry>,
}

impl Ifd {
    /// Parse the directory at `offset`.
    pub fn parse(reader: &TiffReader, offset: usize) -> TiffResult<Self> {
        let entry_count = reader.read_u16(offset, "IFD entry count")? as usize;
        let mut entries = Vec::with_capacity(entry_count);

        for i in 0..entry_count {
            let entry_offset = offset + 2 + i * 12;
            let tag = reader.read_u16(entry_offset, "IFD entry")?;
            let type_code = reader.read_u16(entry_offset + 2, "IFD entry")?;
            let count = reader.read_u32(entry_offset + 4, "IFD entry")? as usize;

            // Entries with unknown field types are skipped, not fatal;
            // writers are allowed to emit private types.
            let Some(field_type) = FieldType::from_code(type_code) else {
                tracing::debug!(tag, type_code, "skipping entry with unknown field type");
                continue;
            };

            entries.push(IfdEntry {
                tag,
                field_type,
                count,
                value_field_offset: entry_offset + 8,
            });
        }

        Ok(Self { entries })
    }

    pub fn get(&self, tag: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// First value of an integer tag, if the tag is present.
    pub fn u64_value(&self, reader: &TiffReader, tag: u16) -> TiffResult<Option<u64>> {
        match self.get(tag) {
            Some(entry) => Ok(entry.values_u64(reader)?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// All values of an integer tag, if the tag is present.
    pub fn u64_values(&self, reader: &TiffReader, tag: u16) -> TiffResult<Option<Vec<u64>>> {
        match self.get(tag) {
            Some(entry) => Ok(Some(entry.values_u64(reader)?)),
            None => Ok(None),
        }
    }

    /// All values of a floating point tag, if the tag is present.
    pub fn f64_values(&self, reader: &TiffReader, tag: u16) -> TiffResult<Option<Vec<f64>>> {
        match self.get(tag) {
            Some(entry) => Ok(Some(entry.values_f64(reader)?)),
            None => Ok(None),
        }
    }
}
