//! Reading and writing scaled voxel data against seekable byte streams.
//!
//! The read path turns stored integers into calibrated f64 values by applying
//! the header's slope/intercept; the write path derives fresh coefficients
//! for the target datatype, records them in the header, then quantizes. Both
//! paths seek to the header's data offset, so repeated reads of the same
//! stream return equal arrays.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use num_traits::AsPrimitive;

use crate::error::{AnlzError, Result};

use super::diagnostics;
use super::header::{AnalyzeHeader, DataType};
use super::scaling;

/// Read the voxel data declared by `hdr` and return calibrated values.
///
/// Diagnostics are logged, never enforced. The stream is read with an
/// absolute seek to the header's data offset and exactly the declared number
/// of bytes are consumed, so calling this twice on the same stream yields
/// identical arrays. The result is in Fortran (column-major) order, matching
/// the on-disk layout.
pub fn read_data<R: Read + Seek>(hdr: &AnalyzeHeader, stream: &mut R) -> Result<ArrayD<f64>> {
    for problem in diagnostics::diagnose(hdr.as_bytes(), hdr.variant()) {
        log::warn!("header diagnostic: {problem}");
    }

    let dtype = hdr.data_dtype()?;
    let shape = hdr.data_shape();
    let nbytes = hdr.data_size()?;

    stream.seek(SeekFrom::Start(hdr.data_offset()))?;
    let mut raw = vec![0u8; nbytes];
    stream.read_exact(&mut raw)?;

    let mut values = if hdr.is_little_endian() {
        decode::<LittleEndian>(dtype, &raw)?
    } else {
        decode::<BigEndian>(dtype, &raw)?
    };

    let (slope, inter) = hdr.get_slope_inter();
    let (slope, inter) = (f64::from(slope), f64::from(inter));
    if (slope, inter) != (1.0, 0.0) {
        for v in &mut values {
            *v = slope * *v + inter;
        }
    }

    ArrayD::from_shape_vec(IxDyn(&shape).f(), values)
        .map_err(|e| AnlzError::InvalidDimensions(e.to_string()))
}

/// Write calibrated data as the header's declared integer datatype.
///
/// Scaling coefficients are derived from the data range so that no finite
/// input clips, stored into the header (the documented side effect), and the
/// quantized values `round((v - inter) / slope)` are written at the data
/// offset in Fortran order. `glmin`/`glmax` record the stored extremes for
/// integer targets. Non-finite input and shape mismatches are rejected
/// before any header field changes.
pub fn write_scaled_data<W: Write + Seek>(
    hdr: &mut AnalyzeHeader,
    data: &ArrayD<f64>,
    stream: &mut W,
) -> Result<()> {
    let shape = hdr.data_shape();
    if data.shape() != shape.as_slice() {
        return Err(AnlzError::InvalidDimensions(format!(
            "data shape {:?} does not match header shape {:?}",
            data.shape(),
            shape
        )));
    }
    let dtype = hdr.data_dtype()?;

    let mut mn = f64::INFINITY;
    let mut mx = f64::NEG_INFINITY;
    for &v in data.iter() {
        if !v.is_finite() {
            return Err(AnlzError::InvalidValue(format!(
                "data contains non-finite value {v}; cannot scale"
            )));
        }
        mn = mn.min(v);
        mx = mx.max(v);
    }

    if data.is_empty() {
        hdr.set_slope_inter(None, 0.0)?;
        stream.seek(SeekFrom::Start(hdr.data_offset()))?;
        return Ok(());
    }

    let with_inter = hdr.variant().supports_intercept();
    let (slope, inter) = scaling::calc_scale(mn, mx, dtype, with_inter)?;
    hdr.set_slope_inter(Some(slope as f32), inter as f32)?;

    // Quantize against the f32-rounded coefficients actually stored, so a
    // read-back applies exactly the inverse map.
    let (slope, inter) = hdr.get_slope_inter();
    let (slope, inter) = (f64::from(slope), f64::from(inter));

    let mut out = Vec::with_capacity(hdr.data_size()?);
    if hdr.is_little_endian() {
        encode::<LittleEndian>(dtype, data, slope, inter, &mut out)?;
    } else {
        encode::<BigEndian>(dtype, data, slope, inter, &mut out)?;
    }

    if dtype.integer_range().is_some() {
        let lo = quantize(mn, slope, inter, dtype);
        let hi = quantize(mx, slope, inter, dtype);
        hdr.set_gl_range(lo as i32, hi as i32);
    }

    stream.seek(SeekFrom::Start(hdr.data_offset()))?;
    stream.write_all(&out)?;
    Ok(())
}

fn widen<T: AsPrimitive<f64>>(it: impl Iterator<Item = T>) -> Vec<f64> {
    it.map(|v| v.as_()).collect()
}

fn decode<E: ByteOrder>(dtype: DataType, raw: &[u8]) -> Result<Vec<f64>> {
    let values = match dtype {
        DataType::UInt8 => widen(raw.iter().copied()),
        DataType::Int16 => widen(raw.chunks_exact(2).map(E::read_i16)),
        DataType::Int32 => widen(raw.chunks_exact(4).map(E::read_i32)),
        DataType::Float32 => widen(raw.chunks_exact(4).map(E::read_f32)),
        DataType::Float64 => raw.chunks_exact(8).map(E::read_f64).collect(),
        other => return Err(AnlzError::UnsupportedDataType(other as i16)),
    };
    Ok(values)
}

fn quantize(v: f64, slope: f64, inter: f64, dtype: DataType) -> f64 {
    // Caller guarantees an integer dtype here.
    let (tmin, tmax) = dtype.integer_range().unwrap_or((f64::MIN, f64::MAX));
    ((v - inter) / slope).round().clamp(tmin, tmax)
}

fn encode<E: ByteOrder>(
    dtype: DataType,
    data: &ArrayD<f64>,
    slope: f64,
    inter: f64,
    out: &mut Vec<u8>,
) -> Result<()> {
    // Iterating the transposed view walks elements in column-major order,
    // the on-disk layout.
    let elements = data.t();
    let elements = elements.iter().copied();
    match dtype {
        DataType::UInt8 => {
            for v in elements {
                out.push(quantize(v, slope, inter, dtype) as u8);
            }
        }
        DataType::Int16 => {
            for v in elements {
                let mut buf = [0u8; 2];
                E::write_i16(&mut buf, quantize(v, slope, inter, dtype) as i16);
                out.extend_from_slice(&buf);
            }
        }
        DataType::Int32 => {
            for v in elements {
                let mut buf = [0u8; 4];
                E::write_i32(&mut buf, quantize(v, slope, inter, dtype) as i32);
                out.extend_from_slice(&buf);
            }
        }
        DataType::Float32 => {
            for v in elements {
                let mut buf = [0u8; 4];
                E::write_f32(&mut buf, v as f32);
                out.extend_from_slice(&buf);
            }
        }
        DataType::Float64 => {
            for v in elements {
                let mut buf = [0u8; 8];
                E::write_f64(&mut buf, v);
                out.extend_from_slice(&buf);
            }
        }
        other => return Err(AnlzError::UnsupportedDataType(other as i16)),
    }
    Ok(())
}
