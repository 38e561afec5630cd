//! Slope/intercept scaling between stored integers and calibrated values.
//!
//! Stored and calibrated values relate by `calibrated = slope * stored + inter`.
//! The pair `(1.0, 0.0)` means scaling is disabled. SPM99 headers can encode
//! a slope only; SPM2 headers can also encode an intercept.

use crate::error::{AnlzError, Result};

use super::header::{offsets, AnalyzeHeader, DataType};

impl AnalyzeHeader {
    /// Scaling coefficients currently encoded in the header.
    ///
    /// `(1.0, 0.0)` marks "no scaling". On a slope-only header the intercept
    /// is always reported as 0.0 regardless of the raw field contents.
    pub fn get_slope_inter(&self) -> (f32, f32) {
        let inter = if self.variant().supports_intercept() {
            self.scl_inter()
        } else {
            0.0
        };
        (self.scl_slope(), inter)
    }

    /// Set new scaling coefficients.
    ///
    /// `slope = None` resets to `(1.0, 0.0)`. A zero or non-finite slope and
    /// a non-finite intercept are rejected with `InvalidValue`; a nonzero
    /// intercept on a slope-only header is rejected with `HeaderType`. No
    /// field is written until every check has passed.
    pub fn set_slope_inter(&mut self, slope: Option<f32>, inter: f32) -> Result<()> {
        let Some(slope) = slope else {
            self.write_f32(offsets::SCL_SLOPE, 1.0);
            if self.variant().supports_intercept() {
                self.write_f32(offsets::SCL_INTER, 0.0);
            }
            return Ok(());
        };

        if slope == 0.0 || !slope.is_finite() {
            return Err(AnlzError::InvalidValue(format!(
                "scale slope is {slope}; should !=0 and be finite"
            )));
        }
        if !inter.is_finite() {
            return Err(AnlzError::InvalidValue(format!(
                "scale intercept is {inter}; should be finite"
            )));
        }
        if inter != 0.0 && !self.variant().supports_intercept() {
            return Err(AnlzError::HeaderType(
                "this header variant encodes a scale slope only; \
                 cannot set a nonzero intercept"
                    .to_string(),
            ));
        }

        self.write_f32(offsets::SCL_SLOPE, slope);
        if self.variant().supports_intercept() {
            self.write_f32(offsets::SCL_INTER, inter);
        }
        Ok(())
    }
}

/// Choose `(slope, inter)` so that `round((v - inter) / slope)` stays inside
/// the target integer range for every `v` in `[mn, mx]`, with the smallest
/// quantization step the range allows.
///
/// Float targets need no scaling and get `(1.0, 0.0)`. All-constant input is
/// the degenerate case: with an intercept the constant moves into the
/// intercept; without one the slope maps the constant onto the range extreme.
pub(crate) fn calc_scale(
    mn: f64,
    mx: f64,
    dtype: DataType,
    with_intercept: bool,
) -> Result<(f64, f64)> {
    debug_assert!(mn <= mx);
    let Some((tmin, tmax)) = dtype.integer_range() else {
        return Ok((1.0, 0.0));
    };

    if with_intercept {
        if mx == mn {
            return Ok((1.0, mn));
        }
        let slope = (mx - mn) / (tmax - tmin);
        let inter = mn - tmin * slope;
        return Ok((slope, inter));
    }

    if mn < 0.0 && tmin == 0.0 {
        return Err(AnlzError::InvalidValue(format!(
            "cannot map minimum {mn} into unsigned type {dtype} without an intercept"
        )));
    }

    let mut slope = 0.0f64;
    if mx > 0.0 {
        slope = slope.max(mx / tmax);
    }
    if mn < 0.0 {
        slope = slope.max(mn / tmin);
    }
    if slope == 0.0 || !slope.is_finite() {
        // All-zero data, or a range the division collapsed.
        slope = 1.0;
    }
    Ok((slope, 0.0))
}
