//! Analyze 7.5 / SPM file format support.
//!
//! Analyze is the header/data format family used by SPM and other
//! neuroimaging tools: a fixed 348-byte binary header describing shape,
//! datatype and vendor scaling extensions, followed (usually in a sibling
//! file) by raw voxel data. This module provides the header record, advisory
//! diagnostics, the slope/intercept scaling codec and the origin affine
//! derivation.

pub(crate) mod diagnostics;
pub(crate) mod header;
pub(crate) mod scaling;
pub mod codec;
pub mod io;

pub use codec::{read_data, write_scaled_data};
pub use diagnostics::diagnose;
pub use header::{AnalyzeHeader, DataType, HeaderVariant};
pub use io::{load_header, save_header};
