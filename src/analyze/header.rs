//! Analyze 7.5 header parsing and representation.
//!
//! The Analyze header is a fixed 348-byte record. SPM reinterprets two of the
//! unused fields: `funused1` carries the scale slope (SPM99 and later) and
//! `funused2` carries the scale intercept (SPM2 only). The `originator` bytes
//! hold a 5-element i16 spatial origin, 1-based.

use crate::error::{AnlzError, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Analyze header field byte offsets.
///
/// Offsets past `ORIGIN` (scanner bookkeeping strings, `views`, `omax` and
/// friends) are not modeled as typed fields; their bytes are preserved
/// verbatim on round-trip.
pub(crate) mod offsets {
    pub const SIZEOF_HDR: usize = 0;
    pub const REGULAR: usize = 38;
    pub const DIM: usize = 40;
    pub const DATATYPE: usize = 70;
    pub const BITPIX: usize = 72;
    pub const PIXDIM: usize = 76;
    pub const VOX_OFFSET: usize = 108;
    pub const SCL_SLOPE: usize = 112;
    pub const SCL_INTER: usize = 116;
    pub const CAL_MAX: usize = 124;
    pub const CAL_MIN: usize = 128;
    pub const GLMAX: usize = 140;
    pub const GLMIN: usize = 144;
    pub const DESCRIP: usize = 148;
    pub const AUX_FILE: usize = 228;
    pub const ORIGIN: usize = 253;
}

pub(crate) fn read_i16_at(block: &[u8], little_endian: bool, off: usize) -> i16 {
    if little_endian {
        LittleEndian::read_i16(&block[off..off + 2])
    } else {
        BigEndian::read_i16(&block[off..off + 2])
    }
}

pub(crate) fn read_i32_at(block: &[u8], little_endian: bool, off: usize) -> i32 {
    if little_endian {
        LittleEndian::read_i32(&block[off..off + 4])
    } else {
        BigEndian::read_i32(&block[off..off + 4])
    }
}

pub(crate) fn read_f32_at(block: &[u8], little_endian: bool, off: usize) -> f32 {
    if little_endian {
        LittleEndian::read_f32(&block[off..off + 4])
    } else {
        BigEndian::read_f32(&block[off..off + 4])
    }
}

/// Format generation of an Analyze-family header.
///
/// The two SPM generations share the 348-byte layout but differ in scaling
/// capability: SPM99 headers carry a slope only, SPM2 headers carry slope and
/// intercept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderVariant {
    /// SPM99-style header: slope-only scaling.
    #[default]
    Spm99,
    /// SPM2-style header: slope + intercept scaling.
    Spm2,
}

impl HeaderVariant {
    /// Whether this generation can encode a nonzero scale intercept.
    pub const fn supports_intercept(self) -> bool {
        matches!(self, Self::Spm2)
    }
}

/// Analyze data type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum DataType {
    /// No datatype set
    None = 0,
    /// 1-bit packed binary
    Binary = 1,
    /// Unsigned 8-bit integer
    UInt8 = 2,
    /// Signed 16-bit integer
    Int16 = 4,
    /// Signed 32-bit integer
    Int32 = 8,
    /// 32-bit floating point
    Float32 = 16,
    /// Two 32-bit floats (real, imaginary)
    Complex64 = 32,
    /// 64-bit floating point
    Float64 = 64,
    /// Interleaved 8-bit RGB triple
    Rgb24 = 128,
}

impl DataType {
    /// Parse from an Analyze datatype code.
    pub fn from_code(code: i16) -> Result<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Binary),
            2 => Ok(Self::UInt8),
            4 => Ok(Self::Int16),
            8 => Ok(Self::Int32),
            16 => Ok(Self::Float32),
            32 => Ok(Self::Complex64),
            64 => Ok(Self::Float64),
            128 => Ok(Self::Rgb24),
            _ => Err(AnlzError::UnsupportedDataType(code)),
        }
    }

    /// The header's `bitpix` value for this datatype.
    pub const fn bitpix(self) -> i16 {
        match self {
            Self::None => 0,
            Self::Binary => 1,
            Self::UInt8 => 8,
            Self::Int16 => 16,
            Self::Int32 | Self::Float32 => 32,
            Self::Float64 => 64,
            Self::Complex64 => 64,
            Self::Rgb24 => 24,
        }
    }

    /// Size of each element in bytes, for types with whole-byte elements.
    pub const fn byte_size(self) -> usize {
        (self.bitpix() / 8) as usize
    }

    /// Representable range for the integer types the codec scales into.
    pub(crate) fn integer_range(self) -> Option<(f64, f64)> {
        match self {
            Self::UInt8 => Some((0.0, f64::from(u8::MAX))),
            Self::Int16 => Some((f64::from(i16::MIN), f64::from(i16::MAX))),
            Self::Int32 => Some((f64::from(i32::MIN), f64::from(i32::MAX))),
            _ => None,
        }
    }

    /// Get the Rust type name for documentation.
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Binary => "bit",
            Self::UInt8 => "u8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Float32 => "f32",
            Self::Complex64 => "complex64",
            Self::Float64 => "f64",
            Self::Rgb24 => "rgb24",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Fixed-layout Analyze 7.5 header record.
///
/// The raw 348-byte block is kept in place and typed accessors read and write
/// it at fixed offsets, so serializing returns the block byte-for-byte,
/// including reserved bytes this crate does not model. Field setters validate
/// fully before touching the block; a failed setter leaves the record
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeHeader {
    block: [u8; Self::SIZE],
    little_endian: bool,
    variant: HeaderVariant,
}

impl Default for AnalyzeHeader {
    fn default() -> Self {
        Self::new(HeaderVariant::Spm99)
    }
}

impl AnalyzeHeader {
    /// Size of the Analyze header in bytes.
    pub const SIZE: usize = 348;

    /// Maximum number of image dimensions.
    pub const MAX_NDIM: usize = 7;

    /// Create an empty header with canonical defaults.
    ///
    /// Notably `scl_slope` starts at 1.0 (scaling disabled) and the datatype
    /// is unset.
    pub fn new(variant: HeaderVariant) -> Self {
        let mut block = [0u8; Self::SIZE];
        LittleEndian::write_i32(&mut block[offsets::SIZEOF_HDR..offsets::SIZEOF_HDR + 4], 348);
        block[offsets::REGULAR] = b'r';
        for i in 0..8 {
            let off = offsets::PIXDIM + i * 4;
            LittleEndian::write_f32(&mut block[off..off + 4], 1.0);
        }
        LittleEndian::write_f32(&mut block[offsets::SCL_SLOPE..offsets::SCL_SLOPE + 4], 1.0);
        Self {
            block,
            little_endian: true,
            variant,
        }
    }

    /// Parse a header from a fixed-length byte block.
    ///
    /// Endianness is detected from the `sizeof_hdr` field. Anything beyond
    /// the block length and `sizeof_hdr` sanity is left to [`diagnose`]: a
    /// header with a strange slope or origin still parses.
    ///
    /// [`diagnose`]: crate::analyze::diagnose
    pub fn from_bytes(bytes: &[u8], variant: HeaderVariant) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(AnlzError::InvalidFormat(format!(
                "header block is {} bytes; expected {}",
                bytes.len(),
                Self::SIZE
            )));
        }

        let sizeof_le = LittleEndian::read_i32(&bytes[0..4]);
        let sizeof_be = BigEndian::read_i32(&bytes[0..4]);
        let little_endian = if sizeof_le == 348 {
            true
        } else if sizeof_be == 348 {
            false
        } else {
            return Err(AnlzError::InvalidFormat(format!(
                "sizeof_hdr is {sizeof_le}; expected 348 in either byte order"
            )));
        };

        let mut block = [0u8; Self::SIZE];
        block.copy_from_slice(bytes);
        Ok(Self {
            block,
            little_endian,
            variant,
        })
    }

    /// Serialize back to the exact 348-byte block.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        self.block
    }

    /// Borrow the raw header block.
    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.block
    }

    /// Format generation of this header.
    pub fn variant(&self) -> HeaderVariant {
        self.variant
    }

    /// Returns true if the on-disk byte order is little endian.
    pub fn is_little_endian(&self) -> bool {
        self.little_endian
    }

    fn read_i16(&self, off: usize) -> i16 {
        read_i16_at(&self.block, self.little_endian, off)
    }

    fn read_i32(&self, off: usize) -> i32 {
        read_i32_at(&self.block, self.little_endian, off)
    }

    fn read_f32(&self, off: usize) -> f32 {
        read_f32_at(&self.block, self.little_endian, off)
    }

    fn write_i16(&mut self, off: usize, value: i16) {
        let buf = &mut self.block[off..off + 2];
        if self.little_endian {
            LittleEndian::write_i16(buf, value);
        } else {
            BigEndian::write_i16(buf, value);
        }
    }

    fn write_i32(&mut self, off: usize, value: i32) {
        let buf = &mut self.block[off..off + 4];
        if self.little_endian {
            LittleEndian::write_i32(buf, value);
        } else {
            BigEndian::write_i32(buf, value);
        }
    }

    pub(crate) fn write_f32(&mut self, off: usize, value: f32) {
        let buf = &mut self.block[off..off + 4];
        if self.little_endian {
            LittleEndian::write_f32(buf, value);
        } else {
            BigEndian::write_f32(buf, value);
        }
    }

    /// Number of image dimensions (`dim[0]`).
    pub fn ndim(&self) -> usize {
        self.read_i16(offsets::DIM).clamp(0, Self::MAX_NDIM as i16) as usize
    }

    /// Image shape as a Vec<usize> (`dim[1..=ndim]`, negatives clamped to 0).
    pub fn data_shape(&self) -> Vec<usize> {
        (0..self.ndim())
            .map(|i| self.read_i16(offsets::DIM + 2 + i * 2).max(0) as usize)
            .collect()
    }

    /// Set the image shape.
    ///
    /// Fails with `InvalidDimensions` if there are more than 7 dimensions or
    /// an extent does not fit in the header's i16 fields; the record is left
    /// unchanged on failure.
    pub fn set_data_shape(&mut self, shape: &[usize]) -> Result<()> {
        if shape.len() > Self::MAX_NDIM {
            return Err(AnlzError::InvalidDimensions(format!(
                "shape has {} dimensions; the header holds at most {}",
                shape.len(),
                Self::MAX_NDIM
            )));
        }
        for (i, &extent) in shape.iter().enumerate() {
            if extent > i16::MAX as usize {
                return Err(AnlzError::InvalidDimensions(format!(
                    "dimension {} extent {} exceeds {}",
                    i,
                    extent,
                    i16::MAX
                )));
            }
        }

        self.write_i16(offsets::DIM, shape.len() as i16);
        for i in 0..Self::MAX_NDIM {
            let value = shape.get(i).map_or(0, |&e| e as i16);
            self.write_i16(offsets::DIM + 2 + i * 2, value);
        }
        Ok(())
    }

    /// On-disk datatype declared by the header.
    pub fn data_dtype(&self) -> Result<DataType> {
        DataType::from_code(self.read_i16(offsets::DATATYPE))
    }

    /// Set the on-disk datatype; `bitpix` is updated to match.
    pub fn set_data_dtype(&mut self, dtype: DataType) {
        self.write_i16(offsets::DATATYPE, dtype as i16);
        self.write_i16(offsets::BITPIX, dtype.bitpix());
    }

    /// Voxel sizes for the first three dimensions (`pixdim[1..=3]`).
    pub fn voxel_sizes(&self) -> [f32; 3] {
        [
            self.read_f32(offsets::PIXDIM + 4),
            self.read_f32(offsets::PIXDIM + 8),
            self.read_f32(offsets::PIXDIM + 12),
        ]
    }

    /// Set voxel sizes; each must be finite and positive.
    pub fn set_voxel_sizes(&mut self, sizes: [f32; 3]) -> Result<()> {
        for (i, &s) in sizes.iter().enumerate() {
            if !s.is_finite() || s <= 0.0 {
                return Err(AnlzError::InvalidValue(format!(
                    "voxel size {i} is {s}; should be finite and > 0"
                )));
            }
        }
        for (i, &s) in sizes.iter().enumerate() {
            self.write_f32(offsets::PIXDIM + 4 + i * 4, s);
        }
        Ok(())
    }

    /// Byte offset at which raw voxel data begins.
    pub fn data_offset(&self) -> u64 {
        let offset = self.read_f32(offsets::VOX_OFFSET);
        if offset.is_finite() && offset > 0.0 {
            offset as u64
        } else {
            0
        }
    }

    /// Set the voxel data byte offset.
    pub fn set_data_offset(&mut self, offset: u64) {
        self.write_f32(offsets::VOX_OFFSET, offset as f32);
    }

    /// Raw scale slope field (`funused1`).
    pub fn scl_slope(&self) -> f32 {
        self.read_f32(offsets::SCL_SLOPE)
    }

    /// Raw scale intercept field (`funused2`); meaningful for SPM2 headers.
    pub fn scl_inter(&self) -> f32 {
        self.read_f32(offsets::SCL_INTER)
    }

    /// Spatial origin, 1-based voxel indices (SPM `originator` field).
    pub fn origin(&self) -> [i16; 5] {
        let mut origin = [0i16; 5];
        for (i, o) in origin.iter_mut().enumerate() {
            *o = self.read_i16(offsets::ORIGIN + i * 2);
        }
        origin
    }

    /// Set the spatial origin. Up to 5 components; the rest are zeroed.
    pub fn set_origin(&mut self, origin: &[i16]) -> Result<()> {
        if origin.len() > 5 {
            return Err(AnlzError::InvalidValue(format!(
                "origin has {} components; the header holds at most 5",
                origin.len()
            )));
        }
        for i in 0..5 {
            self.write_i16(offsets::ORIGIN + i * 2, origin.get(i).copied().unwrap_or(0));
        }
        Ok(())
    }

    /// Calibration display maximum.
    pub fn cal_max(&self) -> f32 {
        self.read_f32(offsets::CAL_MAX)
    }

    /// Calibration display minimum.
    pub fn cal_min(&self) -> f32 {
        self.read_f32(offsets::CAL_MIN)
    }

    /// Set the calibration display range.
    pub fn set_cal_range(&mut self, min: f32, max: f32) -> Result<()> {
        if !min.is_finite() || !max.is_finite() {
            return Err(AnlzError::InvalidValue(format!(
                "calibration range ({min}, {max}) should be finite"
            )));
        }
        self.write_f32(offsets::CAL_MIN, min);
        self.write_f32(offsets::CAL_MAX, max);
        Ok(())
    }

    /// Global maximum of the stored (unscaled) values.
    pub fn glmax(&self) -> i32 {
        self.read_i32(offsets::GLMAX)
    }

    /// Global minimum of the stored (unscaled) values.
    pub fn glmin(&self) -> i32 {
        self.read_i32(offsets::GLMIN)
    }

    /// Record the stored-value extremes, updated on scaled writes.
    pub fn set_gl_range(&mut self, min: i32, max: i32) {
        self.write_i32(offsets::GLMIN, min);
        self.write_i32(offsets::GLMAX, max);
    }

    /// Free-text description, at most 79 bytes.
    pub fn descrip(&self) -> String {
        String::from_utf8_lossy(&self.block[offsets::DESCRIP..offsets::AUX_FILE])
            .trim_end_matches('\0')
            .to_string()
    }

    /// Set the description string (truncated to 79 bytes).
    pub fn set_descrip(&mut self, descrip: &str) {
        let field = &mut self.block[offsets::DESCRIP..offsets::AUX_FILE];
        field.fill(0);
        let bytes = descrip.as_bytes();
        let len = bytes.len().min(79);
        field[..len].copy_from_slice(&bytes[..len]);
    }

    /// Total number of voxels declared by the shape.
    pub fn num_elements(&self) -> usize {
        self.data_shape().iter().product()
    }

    /// Total size of the voxel data in bytes, with overflow checking.
    pub fn data_size(&self) -> Result<usize> {
        let mut total: usize = self.data_dtype()?.byte_size();
        for extent in self.data_shape() {
            total = total.checked_mul(extent).ok_or_else(|| {
                AnlzError::InvalidDimensions("data size overflows usize".into())
            })?;
        }
        Ok(total)
    }

    /// Derive the 4x4 voxel-to-physical affine from voxel sizes and origin.
    ///
    /// The stored origin is 1-based: physical = pixdim * (index - (origin - 1)).
    /// An unset or implausible origin (any component at or beyond `-dim` or
    /// `2*dim`) falls back to the volume center.
    pub fn get_origin_affine(&self) -> [[f32; 4]; 4] {
        let shape = self.data_shape();
        let dims = [
            shape.first().copied().unwrap_or(0) as f64,
            shape.get(1).copied().unwrap_or(0) as f64,
            shape.get(2).copied().unwrap_or(0) as f64,
        ];
        let origin = self.origin();
        let origin = [
            f64::from(origin[0]),
            f64::from(origin[1]),
            f64::from(origin[2]),
        ];

        let plausible = origin.iter().any(|&o| o != 0.0)
            && origin
                .iter()
                .zip(dims.iter())
                .all(|(&o, &d)| o > -d && o < 2.0 * d);

        // Effective 0-based origin index per axis.
        let effective: [f64; 3] = if plausible {
            [origin[0] - 1.0, origin[1] - 1.0, origin[2] - 1.0]
        } else {
            [
                (dims[0] - 1.0) / 2.0,
                (dims[1] - 1.0) / 2.0,
                (dims[2] - 1.0) / 2.0,
            ]
        };

        let vox = self.voxel_sizes();
        let mut affine = [
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        for i in 0..3 {
            affine[i][i] = vox[i];
            affine[i][3] = (-f64::from(vox[i]) * effective[i]) as f32;
        }
        affine
    }
}
