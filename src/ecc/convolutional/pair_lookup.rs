//! Paired branch distances for the add-compare-select loop.
//!
//! Each predecessor state `p` feeds the two registers `2p` and `2p + 1`. The
//! outputs of those two registers form a pair, and many predecessors share
//! the same pair. Every distinct pair gets a key, and once per time slice the
//! two branch distances of each key are packed into a single `u32`, low half
//! for the even register. The trellis loop then needs one lookup per
//! predecessor instead of two.

/// Table of distinct output pairs and their packed branch distances
#[derive(Debug, Clone)]
pub struct PairLookup {
    /// Key of each predecessor state
    keys: Vec<u32>,
    /// Concatenated outputs (`odd << rate | even`) of each key
    outputs: Vec<u32>,
    output_mask: u32,
    output_width: usize,
    /// Packed distances of each key, refreshed every slice
    distances: Vec<u32>,
}

impl PairLookup {
    /// Builds the lookup from the encoder output table of a code with the
    /// given `rate` and `order`
    pub fn new(rate: usize, order: usize, table: &[u32]) -> Self {
        let num_keys = 1usize << (order - 1);
        let mut key_of_output: Vec<Option<u32>> = vec![None; 1 << (2 * rate)];
        let mut outputs = Vec::new();

        let mut keys = Vec::with_capacity(num_keys);
        for state in 0..num_keys {
            let out = (table[2 * state + 1] << rate) | table[2 * state];
            let key = match key_of_output[out as usize] {
                Some(key) => key,
                None => {
                    let key = outputs.len() as u32;
                    outputs.push(out);
                    key_of_output[out as usize] = Some(key);
                    key
                }
            };
            keys.push(key);
        }

        PairLookup {
            keys,
            distances: vec![0; outputs.len()],
            outputs,
            output_mask: (1 << rate) - 1,
            output_width: rate,
        }
    }

    /// Number of distinct output pairs
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Packs the branch distances of every pair, given the distance of each
    /// possible output symbol
    pub fn fill_distances(&mut self, branch_distances: &[u16]) {
        for (packed, &out) in self.distances.iter_mut().zip(&self.outputs) {
            let even = branch_distances[(out & self.output_mask) as usize];
            let odd = branch_distances[(out >> self.output_width) as usize];
            *packed = (u32::from(odd) << 16) | u32::from(even);
        }
    }

    /// Branch distances into registers `2 * state` and `2 * state + 1`
    #[inline]
    pub fn pair(&self, state: usize) -> (u16, u16) {
        let packed = self.distances[self.keys[state] as usize];
        (packed as u16, (packed >> 16) as u16)
    }
}
