//! Codec for the Analyze 7.5 neuroimaging header family with SPM scaling
//! extensions.
//!
//! The crate covers the parts of the format with real invariants: the fixed
//! 348-byte header record and its field validation, advisory diagnostics over
//! untrusted header bytes, the slope/intercept scaling between stored
//! integers and calibrated values, and the origin-to-affine derivation.
//!
//! # Example
//! ```
//! use anlz::analyze::{AnalyzeHeader, DataType};
//! use anlz::analyze::{read_data, write_scaled_data};
//! use ndarray::{ArrayD, IxDyn};
//! use std::io::Cursor;
//!
//! let mut hdr = AnalyzeHeader::default();
//! hdr.set_data_shape(&[2, 3]).unwrap();
//! hdr.set_data_dtype(DataType::Int16);
//!
//! let data = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! let mut stream = Cursor::new(Vec::new());
//! write_scaled_data(&mut hdr, &data, &mut stream).unwrap();
//! let back = read_data(&hdr, &mut stream).unwrap();
//! assert!(back.iter().zip(data.iter()).all(|(a, b)| (a - b).abs() < 1.5e-4));
//! ```

pub mod analyze;
pub mod error;

pub use error::{AnlzError, Result};
