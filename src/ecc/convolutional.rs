//! Convolutional error correction code implementation.
//!
//! A convolutional encoder feeds the message, one bit at a time, through a shift register of
//! `order` bits. After every input bit each of the `rate` generator polynomials is applied to the
//! register (the parity of `register & polynomial`) to produce `rate` output bits. The code is
//! therefore a rate `1/rate` code with constraint length `order`.
//!
//! Convolutional codes are a natural match for continuous, noisy channels and are used in:
//!
//! - Satellite and deep-space links (CCSDS, Voyager)
//! - Mobile telephony (GSM, IS-95)
//! - Digital video broadcasting
//! - 802.11 wireless networks
//!
//! This implementation provides:
//! - Rates 1/2 through 1/8 and orders 2 through 16
//! - Encoding with an `order + 1` bit zero flush so every message ends in the zero state
//! - Hard-decision Viterbi decoding over packed bits
//! - Soft-decision Viterbi decoding over one byte per bit, with linear or quadratic distances
//!
//! Decoding always produces output. The decoder returns the most likely message and has no way
//! to report that the channel was too noisy, so callers that need certainty must check the
//! result independently, for example with a CRC.

pub mod bit_io;
pub mod history;
pub mod metric;
pub mod pair_lookup;
pub mod path_metric;

pub use metric::{hamming_distance, soft_linear_distance, soft_quadratic_distance, SoftMeasurement};

use crate::ecc::ErrorCorrection;
use crate::error::{Error, Result};
use bit_io::{BitReader, BitWriter};
use bitvec::prelude::*;
use history::HistoryBuffer;
use log::{debug, trace};
use pair_lookup::PairLookup;
use path_metric::PathMetrics;
use std::iter;

/// Largest supported rate denominator
pub const MAX_RATE: usize = 8;

/// Largest supported shift register length
pub const MAX_ORDER: usize = 16;

/// Traceback depth, in multiples of the order, walked before any bit is emitted
pub const MIN_TRACEBACK_MULTIPLIER: usize = 5;

/// Bits emitted per traceback, in multiples of the order
pub const TRACEBACK_BURST_MULTIPLIER: usize = 15;

/// Well-known generator polynomials, written in octal.
///
/// Each constant names its rate and order: `R12_7` is the rate 1/2, order 7
/// code used by NASA and 802.11.
pub mod polynomial {
    pub const R12_6: [u16; 2] = [0o73, 0o61];
    pub const R12_7: [u16; 2] = [0o161, 0o127];
    pub const R12_8: [u16; 2] = [0o225, 0o373];
    pub const R12_9: [u16; 2] = [0o767, 0o545];
    pub const R13_6: [u16; 3] = [0o53, 0o75, 0o47];
    pub const R13_7: [u16; 3] = [0o137, 0o153, 0o121];
    pub const R13_8: [u16; 3] = [0o333, 0o257, 0o351];
    pub const R13_9: [u16; 3] = [0o417, 0o627, 0o675];
}

/// Configuration and output table of a convolutional code.
///
/// Encoding only needs this type. Decoding needs the trellis buffers held by
/// [`ViterbiDecoder`], created with [`ConvolutionalCode::decoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvolutionalCode {
    rate: usize,
    order: usize,
    polynomials: Vec<u16>,
    /// Output bits of every register value, polynomial 0 in bit 0
    table: Vec<u32>,
}

impl ConvolutionalCode {
    /// Creates a new convolutional code.
    ///
    /// # Arguments
    ///
    /// * `rate` - Output bits per input bit, 2 to 8
    /// * `order` - Shift register length, 2 to 16
    /// * `polynomials` - One nonzero generator polynomial per output bit, each below `2^order`
    ///
    /// # Returns
    ///
    /// A new `ConvolutionalCode` instance or an error if the parameters are invalid
    pub fn new(rate: usize, order: usize, polynomials: &[u16]) -> Result<Self> {
        if !(2..=MAX_RATE).contains(&rate) {
            return Err(Error::InvalidInput(format!(
                "rate must be between 2 and {}, got {}",
                MAX_RATE, rate
            )));
        }
        if !(2..=MAX_ORDER).contains(&order) {
            return Err(Error::InvalidInput(format!(
                "order must be between 2 and {}, got {}",
                MAX_ORDER, order
            )));
        }
        if polynomials.len() != rate {
            return Err(Error::InvalidInput(format!(
                "number of polynomials ({}) must match rate ({})",
                polynomials.len(),
                rate
            )));
        }
        for (i, &poly) in polynomials.iter().enumerate() {
            if poly == 0 || u32::from(poly) >= 1 << order {
                return Err(Error::InvalidInput(format!(
                    "polynomial {} ({:#o}) must be nonzero and fit in {} bits",
                    i, poly, order
                )));
            }
        }

        let table = (0..1u32 << order)
            .map(|register| {
                polynomials
                    .iter()
                    .enumerate()
                    .fold(0u32, |out, (j, &poly)| {
                        out | (((register & u32::from(poly)).count_ones() & 1) << j)
                    })
            })
            .collect();

        Ok(ConvolutionalCode {
            rate,
            order,
            polynomials: polynomials.to_vec(),
            table,
        })
    }

    pub fn rate(&self) -> usize {
        self.rate
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn polynomials(&self) -> &[u16] {
        &self.polynomials
    }

    /// Number of shift register values, `2^order`
    pub fn num_states(&self) -> usize {
        self.table.len()
    }

    /// Output bits produced when the shift register holds `register`
    pub fn output(&self, register: usize) -> u32 {
        self.table[register & (self.table.len() - 1)]
    }

    /// Number of encoded bits for a message of `message_len` bytes
    pub fn encode_len(&self, message_len: usize) -> usize {
        self.rate * (8 * message_len + self.order + 1)
    }

    /// Encodes a message, most significant bit of each byte first.
    ///
    /// The result holds [`encode_len`](Self::encode_len) bits, zero padded to
    /// a whole number of bytes.
    pub fn encode(&self, message: &[u8]) -> Vec<u8> {
        let mask = (1u32 << self.order) - 1;
        let mut writer = BitWriter::with_capacity(self.encode_len(message.len()));
        let mut register = 0u32;

        let flush = iter::repeat(false).take(self.order + 1);
        for bit in message.view_bits::<Msb0>().iter().by_vals().chain(flush) {
            register = ((register << 1) | u32::from(bit)) & mask;
            writer.write(self.table[register as usize], self.rate);
        }

        writer.padded_bytes()
    }

    /// Builds a decoder for this code, allocating its trellis buffers
    pub fn decoder(&self) -> ViterbiDecoder {
        ViterbiDecoder::new(self.clone())
    }
}

/// Received symbols, consumed one group of `rate` symbols per time slice
enum Symbols<'a> {
    Hard(BitReader<'a>),
    Soft { soft: &'a [u8], position: usize },
}

/// Viterbi decoder with preallocated path metrics, history and lookup tables.
///
/// The buffers are reset, not reallocated, on every decode call. A decoder
/// must not be shared between concurrent callers.
#[derive(Debug, Clone)]
pub struct ViterbiDecoder {
    code: ConvolutionalCode,
    soft_measurement: SoftMeasurement,
    pair_lookup: PairLookup,
    metrics: PathMetrics,
    history: HistoryBuffer,
    /// Branch distance of every possible output symbol in the current slice
    distances: Vec<u16>,
    output: BitWriter,
}

impl ViterbiDecoder {
    /// Creates a decoder for `code`
    pub fn new(code: ConvolutionalCode) -> Self {
        let soft_measurement = SoftMeasurement::default();
        let num_states = 1 << (code.order - 1);
        let min_traceback = MIN_TRACEBACK_MULTIPLIER * code.order;
        let traceback_group = TRACEBACK_BURST_MULTIPLIER * code.order;
        let interval = renormalize_interval(soft_measurement, code.rate);

        let pair_lookup = PairLookup::new(code.rate, code.order, &code.table);
        debug!(
            "viterbi decoder: rate 1/{}, order {}, {} states, {} output pairs, traceback {}+{}, renormalize every {} slices",
            code.rate,
            code.order,
            num_states,
            pair_lookup.len(),
            min_traceback,
            traceback_group,
            interval
        );

        ViterbiDecoder {
            soft_measurement,
            pair_lookup,
            metrics: PathMetrics::new(num_states),
            history: HistoryBuffer::new(code.order, min_traceback, traceback_group, interval),
            distances: vec![0; 1 << code.rate],
            output: BitWriter::new(),
            code,
        }
    }

    /// Selects the distance used by [`decode_soft`](Self::decode_soft)
    pub fn with_soft_measurement(mut self, soft_measurement: SoftMeasurement) -> Self {
        self.soft_measurement = soft_measurement;
        self.history
            .set_renormalize_interval(renormalize_interval(soft_measurement, self.code.rate));
        self
    }

    /// The code this decoder was built for
    pub fn code(&self) -> &ConvolutionalCode {
        &self.code
    }

    pub fn soft_measurement(&self) -> SoftMeasurement {
        self.soft_measurement
    }

    /// Decodes hard-decision bits, packed most significant bit first.
    ///
    /// # Arguments
    ///
    /// * `encoded` - The received bits
    /// * `num_encoded_bits` - Number of valid bits in `encoded`, a multiple of the rate
    ///
    /// # Returns
    ///
    /// The most likely message. Inputs shorter than the encoder flush decode
    /// to an empty message.
    pub fn decode(&mut self, encoded: &[u8], num_encoded_bits: usize) -> Result<Vec<u8>> {
        self.check_length(encoded.len() * 8, num_encoded_bits)?;
        self.run(
            Symbols::Hard(BitReader::new(encoded)),
            num_encoded_bits / self.code.rate,
        )
    }

    /// Decodes soft-decision symbols, one byte per encoded bit.
    ///
    /// A byte of 0 is a confident zero, 255 a confident one, and 128 an
    /// erased bit.
    ///
    /// # Arguments
    ///
    /// * `soft` - The received symbols
    /// * `num_encoded_bits` - Number of valid symbols in `soft`, a multiple of the rate
    ///
    /// # Returns
    ///
    /// The most likely message
    pub fn decode_soft(&mut self, soft: &[u8], num_encoded_bits: usize) -> Result<Vec<u8>> {
        self.check_length(soft.len(), num_encoded_bits)?;
        self.run(
            Symbols::Soft { soft, position: 0 },
            num_encoded_bits / self.code.rate,
        )
    }

    fn check_length(&self, available: usize, num_encoded_bits: usize) -> Result<()> {
        if num_encoded_bits % self.code.rate != 0 {
            return Err(Error::InvalidInput(format!(
                "{} encoded bits is not a multiple of rate {}",
                num_encoded_bits, self.code.rate
            )));
        }
        if available < num_encoded_bits {
            return Err(Error::InvalidInput(format!(
                "{} encoded bits declared but only {} received",
                num_encoded_bits, available
            )));
        }
        Ok(())
    }

    fn run(&mut self, mut symbols: Symbols<'_>, sets: usize) -> Result<Vec<u8>> {
        if sets < self.code.order + 1 {
            return Ok(Vec::new());
        }

        self.metrics.reset();
        self.history.reset();
        self.output.clear();

        self.warmup(&mut symbols);
        self.inner(&mut symbols, sets);
        self.tail(&mut symbols, sets);
        self.history.flush(&mut self.output);

        trace!(
            "viterbi decoded {} slices into {} bits",
            sets,
            self.output.len()
        );
        Ok(self.output.whole_bytes())
    }

    /// Fills the branch distances for the next group of received symbols
    fn fill_distances(&mut self, symbols: &mut Symbols<'_>) {
        let rate = self.code.rate;
        match symbols {
            Symbols::Hard(reader) => {
                let received = reader.read(rate);
                for (symbol, distance) in self.distances.iter_mut().enumerate() {
                    *distance = hamming_distance(symbol as u32, received);
                }
            }
            Symbols::Soft { soft, position } => {
                let group = &soft[*position..*position + rate];
                *position += rate;
                for (symbol, distance) in self.distances.iter_mut().enumerate() {
                    *distance = self.soft_measurement.distance(symbol as u32, group);
                }
            }
        }
        self.pair_lookup.fill_distances(&self.distances);
    }

    /// The first `order - 1` slices, while the register still holds start-up zeros
    fn warmup(&mut self, symbols: &mut Symbols<'_>) {
        for i in 0..self.code.order - 1 {
            self.fill_distances(symbols);
            let (read, write) = self.metrics.split();
            for (register, metric) in write.iter_mut().enumerate().take(1 << (i + 1)) {
                let output = self.code.table[register] as usize;
                *metric = self.distances[output].saturating_add(read[register >> 1]);
            }
            self.metrics.swap();
        }
    }

    /// Full add-compare-select over every state
    fn inner(&mut self, symbols: &mut Symbols<'_>, sets: usize) {
        let highbit = 1usize << (self.code.order - 1);
        let half = highbit >> 1;

        for _ in self.code.order - 1..sets - self.code.order + 1 {
            self.fill_distances(symbols);
            let (read, write) = self.metrics.split();
            let survivors = self.history.slice_mut();

            for base in 0..half {
                let (low_even, low_odd) = self.pair_lookup.pair(base);
                let (high_even, high_odd) = self.pair_lookup.pair(base + half);
                let low_metric = read[base];
                let high_metric = read[base + half];

                for (successor, low_branch, high_branch) in [
                    (2 * base, low_even, high_even),
                    (2 * base + 1, low_odd, high_odd),
                ] {
                    let low = low_branch.saturating_add(low_metric);
                    let high = high_branch.saturating_add(high_metric);
                    if high < low {
                        write[successor] = high;
                        survivors.set(successor, true);
                    } else {
                        write[successor] = low;
                    }
                }
            }

            self.history.process(write, &mut self.output);
            self.metrics.swap();
        }
    }

    /// The flush: only even registers are reachable, and the live state
    /// space halves with every slice
    fn tail(&mut self, symbols: &mut Symbols<'_>, sets: usize) {
        let order = self.code.order;
        let highbit = 1usize << (order - 1);
        let half = highbit >> 1;
        let start = (sets - order + 1).max(order - 1);

        for i in start..sets {
            self.fill_distances(symbols);
            let skip = 1usize << (order - (sets - i));
            let (read, write) = self.metrics.split();
            let survivors = self.history.slice_mut();

            for register in (0..highbit).step_by(skip) {
                let base = register >> 1;
                let (low_branch, _) = self.pair_lookup.pair(base);
                let (high_branch, _) = self.pair_lookup.pair(base + half);
                let low = low_branch.saturating_add(read[base]);
                let high = high_branch.saturating_add(read[base + half]);
                if high < low {
                    write[register] = high;
                    survivors.set(register, true);
                } else {
                    write[register] = low;
                }
            }

            self.history.process_skip(write, skip, &mut self.output);
            self.metrics.swap();
        }
    }
}

/// Slices between renormalizations such that no path metric can overflow
fn renormalize_interval(soft_measurement: SoftMeasurement, rate: usize) -> usize {
    let max_branch = soft_measurement.max_branch_metric(rate).max(1);
    (u32::from(u16::MAX) / max_branch).max(1) as usize
}

impl ErrorCorrection for ViterbiDecoder {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.code.encode(data))
    }

    /// Decodes every whole symbol group in `data` as hard-decision bits
    fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let rate = self.code.rate;
        let num_encoded_bits = data.len() * 8 / rate * rate;
        ViterbiDecoder::decode(self, data, num_encoded_bits)
    }
}

/// Helper function to create the rate 1/2, order 7 code
pub fn create_convolutional_code() -> Result<ConvolutionalCode> {
    ConvolutionalCode::new(2, 7, &polynomial::R12_7)
}

/// Helper function to encode data with the rate 1/2, order 7 code
pub fn convolutional_encode(data: &[u8]) -> Result<Vec<u8>> {
    Ok(create_convolutional_code()?.encode(data))
}

/// Helper function to decode data produced by [`convolutional_encode`]
pub fn viterbi_decode(encoded: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = create_convolutional_code()?.decoder();
    ErrorCorrection::decode(&mut decoder, encoded)
}
