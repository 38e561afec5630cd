//! Advisory consistency checks over raw header bytes.
//!
//! Diagnosis is advisory, not enforcement: every check runs directly on the
//! byte block so that headers too broken for strict parsing can still be
//! inspected, and nothing here ever errors or mutates its input.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::header::{offsets, read_f32_at, read_i16_at, AnalyzeHeader, DataType, HeaderVariant};

/// One independent check: raw block + endianness in, zero or one problem out.
type CheckFn = fn(&[u8], bool) -> Option<String>;

/// Checks shared by every Analyze-family variant, in reporting order.
const BASE_CHECKS: &[CheckFn] = &[chk_data_shape, chk_bitpix, chk_scale_slope, chk_origin];

/// Checks only meaningful for slope+intercept (SPM2) headers.
const SPM2_CHECKS: &[CheckFn] = &[chk_scale_inter];

fn checks_for(variant: HeaderVariant) -> impl Iterator<Item = &'static CheckFn> {
    let extra = match variant {
        HeaderVariant::Spm99 => &[][..],
        HeaderVariant::Spm2 => SPM2_CHECKS,
    };
    BASE_CHECKS.iter().chain(extra.iter())
}

/// Report human-readable problems found in a raw header block.
///
/// Returns an empty Vec for a clean header. A block of the wrong length
/// produces a single length message rather than a panic; an undecidable byte
/// order is assumed little endian.
pub fn diagnose(bytes: &[u8], variant: HeaderVariant) -> Vec<String> {
    if bytes.len() != AnalyzeHeader::SIZE {
        return vec![format!(
            "binary block is {} bytes; should be {}",
            bytes.len(),
            AnalyzeHeader::SIZE
        )];
    }
    let little_endian = BigEndian::read_i32(&bytes[0..4]) != 348
        || LittleEndian::read_i32(&bytes[0..4]) == 348;

    checks_for(variant)
        .filter_map(|check| check(bytes, little_endian))
        .collect()
}

fn chk_data_shape(block: &[u8], le: bool) -> Option<String> {
    let ndim = read_i16_at(block, le, offsets::DIM);
    if !(0..=AnalyzeHeader::MAX_NDIM as i16).contains(&ndim) {
        return Some(format!(
            "number of dimensions is {ndim}; should be between 0 and {}",
            AnalyzeHeader::MAX_NDIM
        ));
    }
    for i in 0..ndim as usize {
        let extent = read_i16_at(block, le, offsets::DIM + 2 + i * 2);
        if extent < 0 {
            return Some(format!(
                "data shape entry {i} is {extent}; should be non-negative"
            ));
        }
    }
    None
}

fn chk_bitpix(block: &[u8], le: bool) -> Option<String> {
    let code = read_i16_at(block, le, offsets::DATATYPE);
    let dtype = DataType::from_code(code).ok()?;
    if dtype == DataType::None {
        return None;
    }
    let bitpix = read_i16_at(block, le, offsets::BITPIX);
    if bitpix != dtype.bitpix() {
        return Some("bitpix does not match datatype".to_string());
    }
    None
}

fn chk_scale_slope(block: &[u8], le: bool) -> Option<String> {
    let slope = read_f32_at(block, le, offsets::SCL_SLOPE);
    if slope != 0.0 && slope.is_finite() {
        return None;
    }
    Some(format!("scale slope is {slope:?}; should !=0 and be finite"))
}

fn chk_scale_inter(block: &[u8], le: bool) -> Option<String> {
    let inter = read_f32_at(block, le, offsets::SCL_INTER);
    if inter.is_finite() {
        return None;
    }
    Some(format!("scale intercept is {inter:?}; should be finite"))
}

fn chk_origin(block: &[u8], le: bool) -> Option<String> {
    let mut origin = [0f64; 3];
    let mut dims = [0f64; 3];
    for i in 0..3 {
        origin[i] = f64::from(read_i16_at(block, le, offsets::ORIGIN + i * 2));
        dims[i] = f64::from(read_i16_at(block, le, offsets::DIM + 2 + i * 2));
    }
    if origin.iter().all(|&o| o == 0.0) {
        return None;
    }
    // Generous margin: anything within (-dim, 2*dim) per axis passes.
    if origin
        .iter()
        .zip(dims.iter())
        .all(|(&o, &d)| o > -d && o < 2.0 * d)
    {
        return None;
    }
    Some("very large origin values relative to dims".to_string())
}
