//! Survivor history and traceback for the Viterbi decoder.
//!
//! Every time slice stores one bit per trellis state, set when the state was
//! reached from the upper half of the predecessor register space. Slices live
//! in a circular buffer of `min_traceback + traceback_group` entries. Once it
//! is full, the decoder walks back from the best state through the newest
//! `min_traceback` slices without emitting anything, then emits the bits of
//! the older `traceback_group` slices and retires them.

use super::bit_io::BitWriter;
use bitvec::prelude::*;

/// Circular survivor-bit buffer with bounded-depth traceback
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    /// Slices walked before any bit is trusted
    min_traceback: usize,
    /// Capacity in slices
    cap: usize,
    num_states: usize,
    /// Bit shifted into the register when a survivor bit is set
    highbit: usize,
    history: BitVec,
    /// Slot the next slice is written to
    index: usize,
    /// Slices currently held
    len: usize,
    /// Bits of one traceback, newest first
    fetched: BitVec,
    renormalize_interval: usize,
    renormalize_counter: usize,
}

impl HistoryBuffer {
    /// Creates a history for a register of `order` bits.
    ///
    /// # Arguments
    ///
    /// * `order` - Shift register length of the code
    /// * `min_traceback` - Slices walked back before bits are emitted
    /// * `traceback_group` - Slices emitted per traceback
    /// * `renormalize_interval` - Slices between path metric renormalizations
    pub fn new(
        order: usize,
        min_traceback: usize,
        traceback_group: usize,
        renormalize_interval: usize,
    ) -> Self {
        let num_states = 1usize << (order - 1);
        let cap = min_traceback + traceback_group;
        HistoryBuffer {
            min_traceback,
            cap,
            num_states,
            highbit: num_states,
            history: bitvec![0; cap * num_states],
            index: 0,
            len: 0,
            fetched: BitVec::with_capacity(cap),
            renormalize_interval: renormalize_interval.max(1),
            renormalize_counter: 0,
        }
    }

    /// Number of slices the buffer can hold
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Number of slices not yet emitted
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn renormalize_interval(&self) -> usize {
        self.renormalize_interval
    }

    pub fn set_renormalize_interval(&mut self, interval: usize) {
        self.renormalize_interval = interval.max(1);
    }

    /// Forgets all slices and restarts the renormalization countdown
    pub fn reset(&mut self) {
        self.index = 0;
        self.len = 0;
        self.renormalize_counter = 0;
    }

    /// The cleared survivor bits of the slice being built
    pub fn slice_mut(&mut self) -> &mut BitSlice {
        let start = self.index * self.num_states;
        let slice = &mut self.history[start..start + self.num_states];
        slice.fill(false);
        slice
    }

    /// Index of the lowest metric among every `skip`-th state, first one on ties
    pub fn search(&self, metrics: &[u16], skip: usize) -> usize {
        (0..self.num_states)
            .step_by(skip)
            .min_by_key(|&state| metrics[state])
            .unwrap_or(0)
    }

    /// Subtracts the metric of `best` from every state
    pub fn renormalize(metrics: &mut [u16], best: usize) {
        let min = metrics[best];
        for metric in metrics.iter_mut() {
            *metric = metric.saturating_sub(min);
        }
    }

    /// Commits the slice returned by [`slice_mut`](Self::slice_mut) for a full trellis step
    pub fn process(&mut self, metrics: &mut [u16], output: &mut BitWriter) {
        self.process_skip(metrics, 1, output);
    }

    /// Commits the current slice when only every `skip`-th state is live.
    ///
    /// Renormalizes `metrics` when the interval elapses, and traces back
    /// into `output` whenever the buffer is full.
    pub fn process_skip(&mut self, metrics: &mut [u16], skip: usize, output: &mut BitWriter) {
        self.index = (self.index + 1) % self.cap;
        self.len += 1;
        self.renormalize_counter += 1;

        if self.renormalize_counter == self.renormalize_interval {
            self.renormalize_counter = 0;
            let best = self.search(metrics, skip);
            Self::renormalize(metrics, best);
            if self.len == self.cap {
                self.traceback(best, self.min_traceback, output);
            }
        } else if self.len == self.cap {
            let best = self.search(metrics, skip);
            self.traceback(best, self.min_traceback, output);
        }
    }

    /// Emits every remaining slice, tracing back from `state` 0
    pub fn flush(&mut self, output: &mut BitWriter) {
        self.traceback(0, 0, output);
    }

    fn traceback(&mut self, best: usize, min_traceback: usize, output: &mut BitWriter) {
        let mut state = best;
        let mut slot = self.index;

        for _ in 0..min_traceback {
            slot = (slot + self.cap - 1) % self.cap;
            if self.history[slot * self.num_states + state] {
                state |= self.highbit;
            }
            state >>= 1;
        }

        let emitted = self.len - min_traceback;
        self.fetched.clear();
        for _ in 0..emitted {
            slot = (slot + self.cap - 1) % self.cap;
            let bit = self.history[slot * self.num_states + state];
            if bit {
                state |= self.highbit;
            }
            state >>= 1;
            self.fetched.push(bit);
        }

        output.write_bitlist_reversed(&self.fetched);
        self.len -= emitted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pushes the slice a decoder would record for the input `bit` when the
    /// trellis follows a single known path through an order-3 register.
    fn push_path_slice(
        history: &mut HistoryBuffer,
        register: &mut usize,
        bit: bool,
        output: &mut BitWriter,
    ) {
        // the survivor bit of a state is the bit leaving the register
        let leaving = (*register >> 1) & 1 == 1;
        *register = ((*register << 1) | usize::from(bit)) & 0b11;
        let state = *register;
        history.slice_mut().set(state, leaving);
        let mut metrics = vec![9u16; 4];
        metrics[state] = 0;
        history.process(&mut metrics, output);
    }

    #[test]
    fn test_capacity_and_reset() {
        let mut history = HistoryBuffer::new(3, 15, 45, 100);
        assert_eq!(history.capacity(), 60);
        assert!(history.is_empty());

        let mut output = BitWriter::new();
        let mut metrics = vec![0u16; 4];
        history.slice_mut();
        history.process(&mut metrics, &mut output);
        assert_eq!(history.len(), 1);
        history.reset();
        assert!(history.is_empty());
    }

    #[test]
    fn test_search_prefers_first_minimum() {
        let history = HistoryBuffer::new(4, 20, 60, 10);
        let metrics = [7u16, 3, 5, 3, 9, 1, 8, 1];
        assert_eq!(history.search(&metrics, 1), 5);
        assert_eq!(history.search(&metrics, 2), 2);
        assert_eq!(history.search(&metrics, 4), 0);
    }

    #[test]
    fn test_renormalize_saturates() {
        let mut metrics = [10u16, 4, 65535, 4];
        HistoryBuffer::renormalize(&mut metrics, 1);
        assert_eq!(metrics, [6, 0, 65531, 0]);
    }

    #[test]
    fn test_traceback_recovers_path() {
        let bits: Vec<bool> = (0..40).map(|i| (i * 7) % 5 < 2).collect();
        let mut history = HistoryBuffer::new(3, 4, 6, 1000);
        let mut output = BitWriter::new();
        let mut register = 0usize;

        for &bit in bits.iter().chain([false, false].iter()) {
            push_path_slice(&mut history, &mut register, bit, &mut output);
        }
        history.flush(&mut output);
        assert!(history.is_empty());

        // each slice emits the oldest register bit, two slices behind the input
        let mut expected = vec![false, false];
        expected.extend_from_slice(&bits);
        let bytes = output.padded_bytes();
        let emitted: Vec<bool> = bytes
            .view_bits::<Msb0>()
            .iter()
            .by_vals()
            .take(expected.len())
            .collect();
        assert_eq!(output.len(), expected.len());
        assert_eq!(emitted, expected);
    }

    #[test]
    fn test_renormalization_interval() {
        let mut history = HistoryBuffer::new(2, 100, 100, 3);
        assert_eq!(history.renormalize_interval(), 3);
        let mut output = BitWriter::new();
        let mut metrics = vec![5u16, 8];

        history.slice_mut();
        history.process(&mut metrics, &mut output);
        history.slice_mut();
        history.process(&mut metrics, &mut output);
        assert_eq!(metrics, vec![5, 8]);
        history.slice_mut();
        history.process(&mut metrics, &mut output);
        assert_eq!(metrics, vec![0, 3]);

        history.set_renormalize_interval(0);
        assert_eq!(history.renormalize_interval(), 1);
    }
}
