//! Reed-Solomon error correction code implementation.
//!
//! Reed-Solomon codes are a group of error-correcting codes introduced by Irving S. Reed and
//! Gustave Solomon in 1960. They correct whole-symbol errors, which makes them a good fit for
//! bursty channels, and are used in many applications including:
//!
//! - Storage systems (CD, DVD, Blu-ray, QR codes)
//! - Data transmission (DSL, WiMAX, DVB)
//! - Deep-space telecommunications (CCSDS)
//!
//! This implementation provides:
//! - Finite field operations in GF(2^8) for any primitive polynomial
//! - Systematic encoding with a configurable number of parity symbols
//! - Decoding with Berlekamp-Massey, Chien search and the Forney algorithm
//! - Erasure decoding when corrupted positions are known in advance
//!
//! Blocks are at most 255 bytes. A code with `min_distance` parity bytes carries up to
//! `255 - min_distance` message bytes, and can correct `e` erasures plus `t` unknown errors
//! whenever `e + 2t <= min_distance`. Shorter messages are treated as if zero-padded at the
//! front; the padding is never transmitted.

pub mod field;
pub mod polynomial;

pub use field::{primitive_polynomial, Field};
pub use polynomial::Polynomial;

use crate::ecc::ErrorCorrection;
use crate::error::{Error, Result};
use log::{debug, trace};

/// Number of symbols in a full Reed-Solomon block over GF(2^8)
pub const BLOCK_LENGTH: usize = 255;

/// Configuration and generator polynomial of a Reed-Solomon code.
///
/// Encoding only needs this type; decoding needs the larger tables held by
/// [`ReedSolomonDecoder`], created with [`ReedSolomon::decoder`].
#[derive(Debug, Clone)]
pub struct ReedSolomon {
    field: Field,
    first_consecutive_root: u8,
    generator_root_gap: u8,
    min_distance: usize,
    message_length: usize,
    generator_roots: Vec<u8>,
    generator: Polynomial,
}

impl ReedSolomon {
    /// Creates a new Reed-Solomon code.
    ///
    /// # Arguments
    ///
    /// * `primitive_poly` - Field polynomial, see [`primitive_polynomial`]
    /// * `first_consecutive_root` - Exponent of the first generator root
    /// * `generator_root_gap` - Exponent step between generator roots, coprime with 255
    /// * `min_distance` - Number of parity bytes per block
    ///
    /// # Returns
    ///
    /// A new `ReedSolomon` instance or an error if the parameters are invalid
    pub fn new(
        primitive_poly: u16,
        first_consecutive_root: u8,
        generator_root_gap: u8,
        min_distance: usize,
    ) -> Result<Self> {
        if min_distance == 0 || min_distance >= BLOCK_LENGTH {
            return Err(Error::InvalidInput(format!(
                "min distance must be between 1 and {}, got {}",
                BLOCK_LENGTH - 1,
                min_distance
            )));
        }
        if gcd(generator_root_gap as usize, BLOCK_LENGTH) != 1 {
            return Err(Error::InvalidInput(format!(
                "generator root gap {} must be coprime with {}",
                generator_root_gap, BLOCK_LENGTH
            )));
        }

        let field = Field::new(primitive_poly)?;
        let generator_roots: Vec<u8> = (0..min_distance)
            .map(|i| {
                let power = generator_root_gap as usize * (i + first_consecutive_root as usize);
                field.exp(power % BLOCK_LENGTH)
            })
            .collect();
        let generator = Polynomial::from_roots(&field, &generator_roots);

        Ok(ReedSolomon {
            field,
            first_consecutive_root,
            generator_root_gap,
            min_distance,
            message_length: BLOCK_LENGTH - min_distance,
            generator_roots,
            generator,
        })
    }

    /// The (255,223) code used by CCSDS, in conventional (not dual) basis
    pub fn ccsds() -> Result<Self> {
        Self::new(primitive_polynomial::CCSDS, 112, 11, 32)
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn block_length(&self) -> usize {
        BLOCK_LENGTH
    }

    /// Maximum number of message bytes per block
    pub fn message_length(&self) -> usize {
        self.message_length
    }

    /// Number of parity bytes per block
    pub fn min_distance(&self) -> usize {
        self.min_distance
    }

    pub fn first_consecutive_root(&self) -> u8 {
        self.first_consecutive_root
    }

    pub fn generator_root_gap(&self) -> u8 {
        self.generator_root_gap
    }

    /// Roots of the generator polynomial, in order
    pub fn generator_roots(&self) -> &[u8] {
        &self.generator_roots
    }

    pub fn generator(&self) -> &Polynomial {
        &self.generator
    }

    /// Encodes a message into a block of `message.len() + min_distance` bytes.
    ///
    /// # Arguments
    ///
    /// * `message` - At most `message_length()` bytes
    ///
    /// # Returns
    ///
    /// The message followed by its parity bytes
    pub fn encode(&self, message: &[u8]) -> Result<Vec<u8>> {
        if message.len() > self.message_length {
            return Err(Error::InputTooLarge {
                length: message.len(),
                max_length: self.message_length,
            });
        }

        // the first message byte lands on the highest coefficient; absent
        // bytes of a short message are zeros above it
        let pad = self.message_length - message.len();
        let mut message_poly = Polynomial::with_order(BLOCK_LENGTH - 1);
        for (i, &byte) in message.iter().enumerate() {
            message_poly[BLOCK_LENGTH - 1 - (i + pad)] = byte;
        }

        let mut remainder = Polynomial::with_order(BLOCK_LENGTH - 1);
        Polynomial::rem_into(&self.field, &message_poly, &self.generator, &mut remainder)?;

        let mut encoded = Vec::with_capacity(message.len() + self.min_distance);
        encoded.extend_from_slice(message);
        encoded.extend((0..self.min_distance).map(|i| remainder[self.min_distance - 1 - i]));
        Ok(encoded)
    }

    /// Builds a decoder for this code, allocating its lookup tables
    pub fn decoder(&self) -> ReedSolomonDecoder {
        ReedSolomonDecoder::new(self.clone())
    }
}

/// Reed-Solomon decoder with cached power tables and scratch polynomials.
///
/// All buffers are allocated once here and reused by every decode call, so a
/// decoder must not be shared between concurrent callers.
#[derive(Debug, Clone)]
pub struct ReedSolomonDecoder {
    code: ReedSolomon,
    /// Powers `root^0 ..= root^254` of each generator root, in log form
    generator_root_exp: Vec<Vec<u8>>,
    /// Powers `x^0 ..= x^min_distance` of every field element, in log form
    element_exp: Vec<Vec<u8>>,
    received: Polynomial,
    syndromes: Polynomial,
    modified_syndromes: Polynomial,
    error_locator: Polynomial,
    last_error_locator: Polynomial,
    error_locator_log: Polynomial,
    erasure_locator: [Polynomial; 2],
    combined_locator: Polynomial,
    error_evaluator: Polynomial,
    locator_derivative: Polynomial,
    erasures: Vec<usize>,
    roots: Vec<u8>,
    locations: Vec<usize>,
}

impl ReedSolomonDecoder {
    /// Creates a decoder for `code`
    pub fn new(code: ReedSolomon) -> Self {
        let md = code.min_distance;
        let field = &code.field;

        let generator_root_exp = code
            .generator_roots
            .iter()
            .map(|&root| Polynomial::power_table(field, root, BLOCK_LENGTH - 1))
            .collect();
        let element_exp = (0..=255u8)
            .map(|element| Polynomial::power_table(field, element, md))
            .collect();

        debug!(
            "reed-solomon decoder: poly {:#x}, fcr {}, gap {}, {} parity bytes",
            field.primitive_poly(),
            code.first_consecutive_root,
            code.generator_root_gap,
            md
        );

        ReedSolomonDecoder {
            generator_root_exp,
            element_exp,
            received: Polynomial::with_order(BLOCK_LENGTH - 1),
            syndromes: Polynomial::with_order(md - 1),
            modified_syndromes: Polynomial::with_order(md - 1),
            error_locator: Polynomial::with_order(md),
            last_error_locator: Polynomial::with_order(md),
            error_locator_log: Polynomial::with_order(md),
            erasure_locator: [Polynomial::with_order(md), Polynomial::with_order(md)],
            combined_locator: Polynomial::with_order(md),
            error_evaluator: Polynomial::with_order(md - 1),
            locator_derivative: Polynomial::with_order(md),
            erasures: Vec::with_capacity(md),
            roots: Vec::with_capacity(md),
            locations: Vec::with_capacity(md),
            code,
        }
    }

    /// The code this decoder was built for
    pub fn code(&self) -> &ReedSolomon {
        &self.code
    }

    /// Decodes a block, correcting up to `min_distance / 2` corrupted bytes.
    ///
    /// # Arguments
    ///
    /// * `encoded` - A block of `min_distance..=255` bytes
    ///
    /// # Returns
    ///
    /// The message bytes, or [`Error::TooManyErrors`] if the block could not be corrected
    pub fn decode(&mut self, encoded: &[u8]) -> Result<Vec<u8>> {
        self.correct(encoded, &[])
    }

    /// Decodes a block in which the bytes at `erasures` are known to be unreliable.
    ///
    /// # Arguments
    ///
    /// * `encoded` - A block of `min_distance..=255` bytes
    /// * `erasures` - Byte positions within `encoded`, at most `min_distance` of them
    ///
    /// # Returns
    ///
    /// The message bytes, or [`Error::TooManyErrors`] if the block could not be corrected
    pub fn decode_with_erasures(&mut self, encoded: &[u8], erasures: &[usize]) -> Result<Vec<u8>> {
        if erasures.is_empty() {
            return self.decode(encoded);
        }
        if erasures.len() > self.code.min_distance {
            return Err(Error::InvalidInput(format!(
                "{} erasures exceed min distance {}",
                erasures.len(),
                self.code.min_distance
            )));
        }
        if let Some(&position) = erasures.iter().find(|&&e| e >= encoded.len()) {
            return Err(Error::InvalidInput(format!(
                "erasure position {} is outside a block of {} bytes",
                position,
                encoded.len()
            )));
        }
        self.correct(encoded, erasures)
    }

    fn correct(&mut self, encoded: &[u8], erasures: &[usize]) -> Result<Vec<u8>> {
        self.load_received(encoded)?;
        let block_len = encoded.len();
        let md = self.code.min_distance;

        self.erasures.clear();
        self.erasures.extend_from_slice(erasures);
        self.erasures.sort_unstable();
        self.erasures.dedup();
        let num_erasures = self.erasures.len();

        if self.compute_syndromes() {
            trace!("reed-solomon block of {} bytes is clean", block_len);
            return Ok(self.message(block_len));
        }

        let field = &self.code.field;
        let gap = i32::from(self.code.generator_root_gap);

        // erasure roots come first, Chien search appends error roots after them
        self.roots.clear();
        for &position in &self.erasures {
            let location = block_len - position - 1;
            let root = field.inverse(field.pow(field.exp(location), gap))?;
            self.roots.push(root);
        }
        let slot = Polynomial::from_roots_into(field, &self.roots, &mut self.erasure_locator);
        let erasure_locator = &self.erasure_locator[slot];

        Polynomial::mul_into(
            field,
            erasure_locator,
            &self.syndromes,
            &mut self.modified_syndromes,
        );

        let num_errors = berlekamp_massey(
            field,
            &self.modified_syndromes.coefficients()[num_erasures..],
            &mut self.error_locator,
            &mut self.last_error_locator,
        )?;
        if num_erasures + 2 * num_errors > md {
            debug!(
                "reed-solomon decode failed: {} errors and {} erasures exceed min distance {}",
                num_errors, num_erasures, md
            );
            return Err(Error::TooManyErrors);
        }

        self.error_locator
            .log_form_into(field, &mut self.error_locator_log);
        for (element, powers) in self.element_exp.iter().enumerate() {
            if self.error_locator_log.eval_log_with_powers(field, powers) == 0 {
                self.roots.push(element as u8);
            }
        }
        if self.roots.len() - num_erasures != num_errors {
            debug!(
                "reed-solomon decode failed: found {} roots for an error locator of order {}",
                self.roots.len() - num_erasures,
                num_errors
            );
            return Err(Error::TooManyErrors);
        }

        self.combined_locator.set_order(num_erasures + num_errors);
        Polynomial::mul_into(
            field,
            erasure_locator,
            &self.error_locator,
            &mut self.combined_locator,
        );

        self.find_locations(block_len)?;
        self.find_and_apply_error_values()?;

        trace!(
            "reed-solomon corrected {} bytes ({} erasures)",
            self.locations.len(),
            num_erasures
        );
        Ok(self.message(block_len))
    }

    /// Loads `encoded` into the received polynomial, last byte as the constant term
    fn load_received(&mut self, encoded: &[u8]) -> Result<()> {
        let md = self.code.min_distance;
        if encoded.len() > BLOCK_LENGTH || encoded.len() < md {
            return Err(Error::InvalidInput(format!(
                "encoded block must be between {} and {} bytes, got {}",
                md,
                BLOCK_LENGTH,
                encoded.len()
            )));
        }

        self.received.clear();
        for (i, &byte) in encoded.iter().rev().enumerate() {
            self.received[i] = byte;
        }
        Ok(())
    }

    /// Evaluates the received polynomial at every generator root.
    ///
    /// # Returns
    ///
    /// Whether every syndrome is zero
    fn compute_syndromes(&mut self) -> bool {
        let field = &self.code.field;
        let mut all_zero = true;
        for (i, powers) in self.generator_root_exp.iter().enumerate() {
            let syndrome = self.received.eval_with_powers(field, powers);
            self.syndromes[i] = syndrome;
            all_zero &= syndrome == 0;
        }
        all_zero
    }

    /// Maps every locator root back to a coefficient index of the received polynomial
    fn find_locations(&mut self, block_len: usize) -> Result<()> {
        let field = &self.code.field;
        let gap = i32::from(self.code.generator_root_gap);

        self.locations.clear();
        for &root in &self.roots {
            let target = field.inverse(root)?;
            let element = (1..=255u8)
                .find(|&j| field.pow(j, gap) == target)
                .ok_or(Error::TooManyErrors)?;
            let location = field.log(element) as usize % BLOCK_LENGTH;
            if location >= block_len {
                debug!(
                    "reed-solomon decode failed: error location {} outside block of {} bytes",
                    location, block_len
                );
                return Err(Error::TooManyErrors);
            }
            self.locations.push(location);
        }
        Ok(())
    }

    /// Forney algorithm: computes each error magnitude and corrects the received polynomial
    fn find_and_apply_error_values(&mut self) -> Result<()> {
        let field = &self.code.field;
        let fcr = i32::from(self.code.first_consecutive_root);

        Polynomial::mul_into(
            field,
            &self.combined_locator,
            &self.syndromes,
            &mut self.error_evaluator,
        );
        self.locator_derivative
            .set_order(self.combined_locator.order().saturating_sub(1));
        self.combined_locator
            .derivative_into(field, &mut self.locator_derivative);

        for (&root, &location) in self.roots.iter().zip(&self.locations) {
            let powers = &self.element_exp[root as usize];
            let numerator = self.error_evaluator.eval_with_powers(field, powers);
            let denominator = self.locator_derivative.eval_with_powers(field, powers);
            let magnitude = field.div(numerator, denominator).map_err(|_| {
                debug!("reed-solomon decode failed: locator derivative vanishes at a root");
                Error::TooManyErrors
            })?;
            self.received[location] ^= field.mul(field.pow(root, fcr - 1), magnitude);
        }
        Ok(())
    }

    fn message(&self, block_len: usize) -> Vec<u8> {
        let message_len = block_len - self.code.min_distance;
        (0..message_len)
            .map(|i| self.received[block_len - 1 - i])
            .collect()
    }
}

/// Berlekamp-Massey synthesis of the shortest LFSR generating `syndromes`.
///
/// The connection polynomial is left in `locator`; `last` is scratch space
/// holding the previous locator.
///
/// # Returns
///
/// The order of the locator, the number of errors it describes
fn berlekamp_massey(
    field: &Field,
    syndromes: &[u8],
    locator: &mut Polynomial,
    last: &mut Polynomial,
) -> Result<usize> {
    locator.clear();
    locator.set_order(0);
    locator[0] = 1;
    last.clear();
    last.set_order(0);
    last[0] = 1;

    let mut last_discrepancy = 1u8;
    let mut delay = 1usize;
    let mut num_errors = 0usize;

    for i in 0..syndromes.len() {
        let mut discrepancy = syndromes[i];
        for j in 1..=num_errors {
            discrepancy ^= field.mul(locator[j], syndromes[i - j]);
        }

        if discrepancy == 0 {
            delay += 1;
            continue;
        }

        let scale = field.div(discrepancy, last_discrepancy)?;
        let shifted_order = last.order() + delay;
        locator.reserve(shifted_order);
        last.reserve(shifted_order);

        if 2 * num_errors <= i {
            // lengthen: locator -= scale * x^delay * last, and the old locator becomes last
            for j in (0..=last.order()).rev() {
                last[j + delay] = field.mul(last[j], scale);
            }
            for j in 0..delay {
                last[j] = 0;
            }
            for j in 0..=shifted_order {
                let previous = locator[j];
                locator[j] ^= last[j];
                last[j] = previous;
            }

            let previous_order = locator.order();
            locator.set_order(shifted_order);
            last.set_order(previous_order);
            num_errors = i + 1 - num_errors;
            last_discrepancy = discrepancy;
            delay = 1;
            continue;
        }

        for j in 0..=last.order() {
            locator[j + delay] ^= field.mul(last[j], scale);
        }
        if shifted_order > locator.order() {
            locator.set_order(shifted_order);
        }
        delay += 1;
    }

    Ok(locator.order())
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl ErrorCorrection for ReedSolomonDecoder {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.code.encode(data)
    }

    fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        ReedSolomonDecoder::decode(self, data)
    }
}

/// Helper function to create a Reed-Solomon code with `min_distance` parity bytes over
/// the `0x11d` field, with generator roots alpha^1, alpha^2, ...
pub fn create_reed_solomon(min_distance: usize) -> Result<ReedSolomon> {
    ReedSolomon::new(primitive_polynomial::X8_X4_X3_X2_1, 1, 1, min_distance)
}

/// Helper function to encode a message with `min_distance` parity bytes
pub fn reed_solomon_encode(data: &[u8], min_distance: usize) -> Result<Vec<u8>> {
    create_reed_solomon(min_distance)?.encode(data)
}

/// Helper function to decode a block produced by [`reed_solomon_encode`]
pub fn reed_solomon_decode(encoded: &[u8], min_distance: usize) -> Result<Vec<u8>> {
    create_reed_solomon(min_distance)?.decoder().decode(encoded)
}
