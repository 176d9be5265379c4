//! Error correction code implementations.
//!
//! This module provides two forward error correction schemes:
//! - Convolutional codes, decoded with a hard or soft decision Viterbi decoder
//! - Reed-Solomon codes over GF(2^8), with error and erasure correction
//!
//! Both schemes separate the cheap, immutable encoder from a decoder that owns
//! its working buffers. A decoder is built once from an encoder and then reused
//! for any number of blocks; it must not be shared between threads while
//! decoding, so concurrent workers should each build their own.
//!
//! # Examples
//!
//! ```rust
//! use fec::ecc::convolutional::{polynomial, ConvolutionalCode};
//!
//! let code = ConvolutionalCode::new(2, 9, &polynomial::R12_9).unwrap();
//! let encoded = code.encode(b"abcdef");
//!
//! let mut decoder = code.decoder();
//! let decoded = decoder.decode(&encoded, code.encode_len(6)).unwrap();
//! assert_eq!(decoded, b"abcdef");
//! ```

pub use crate::error::Result;

/// Trait for error correction code implementations
pub trait ErrorCorrection {
    /// Encode data with error correction symbols
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decode data and correct errors if possible
    fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Convolutional codes with Viterbi decoding
pub mod convolutional;
pub use convolutional::{
    convolutional_encode, viterbi_decode, ConvolutionalCode, SoftMeasurement, ViterbiDecoder,
};

/// Reed-Solomon block codes over GF(2^8)
pub mod reed_solomon;
pub use reed_solomon::{
    reed_solomon_decode, reed_solomon_encode, Field, Polynomial, ReedSolomon, ReedSolomonDecoder,
};
