//! Forward error correction codecs.
//!
//! Two independent schemes are provided:
//! - Convolutional codes with hard and soft decision Viterbi decoding
//! - Reed-Solomon block codes over GF(2^8) with error and erasure correction
//!
//! # Examples
//!
//! ```
//! use fec::ecc::reed_solomon::{primitive_polynomial, ReedSolomon};
//!
//! let rs = ReedSolomon::new(primitive_polynomial::X8_X4_X3_X2_1, 1, 1, 4).unwrap();
//! let mut encoded = rs.encode(b"abcdef").unwrap();
//! encoded[2] ^= 0x5a;
//!
//! let mut decoder = rs.decoder();
//! assert_eq!(decoder.decode(&encoded).unwrap(), b"abcdef");
//! ```

pub mod ecc;
pub mod error;

pub use ecc::{convolutional, reed_solomon, ErrorCorrection};
pub use error::{Error, Result};
