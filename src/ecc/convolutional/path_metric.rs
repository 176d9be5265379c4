//! Double-buffered path metrics.
//!
//! One buffer holds the accumulated cost of every trellis state after the
//! previous time slice, the other receives the costs for the current slice.
//! The roles flip after each slice.

/// Accumulated path cost per trellis state, for the previous and current slice
#[derive(Debug, Clone)]
pub struct PathMetrics {
    first: Vec<u16>,
    second: Vec<u16>,
    /// Whether `second` holds the previous slice
    flipped: bool,
}

impl PathMetrics {
    pub fn new(num_states: usize) -> Self {
        PathMetrics {
            first: vec![0; num_states],
            second: vec![0; num_states],
            flipped: false,
        }
    }

    /// Zeroes both buffers
    pub fn reset(&mut self) {
        self.first.iter_mut().for_each(|m| *m = 0);
        self.second.iter_mut().for_each(|m| *m = 0);
        self.flipped = false;
    }

    /// Metrics from the previous slice
    pub fn read(&self) -> &[u16] {
        if self.flipped {
            &self.second
        } else {
            &self.first
        }
    }

    /// Metrics being built for the current slice
    pub fn write(&mut self) -> &mut [u16] {
        if self.flipped {
            &mut self.first
        } else {
            &mut self.second
        }
    }

    /// Both buffers at once, `(read, write)`
    pub fn split(&mut self) -> (&[u16], &mut [u16]) {
        if self.flipped {
            (&self.second, &mut self.first)
        } else {
            (&self.first, &mut self.second)
        }
    }

    /// Makes the current slice the previous one
    pub fn swap(&mut self) {
        self.flipped = !self.flipped;
    }
}
