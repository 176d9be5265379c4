//! Branch metrics for the Viterbi decoder.
//!
//! A branch metric is the distance between the symbol a trellis transition
//! would have produced and the symbol actually received. Hard decisions use
//! the Hamming distance between bit groups. Soft decisions compare each
//! ideal bit (0 for a zero, 255 for a one) against a received byte, where
//! 128 means "no idea".

/// Distance measure applied to soft-decision input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoftMeasurement {
    /// Sum of absolute differences
    #[default]
    Linear,
    /// Sum of squared differences, scaled down by 8
    Quadratic,
}

impl SoftMeasurement {
    /// Distance between the hard output `hard` (bit 0 first) and the soft
    /// symbols in `soft`, one byte per output bit
    #[inline]
    pub fn distance(self, hard: u32, soft: &[u8]) -> u16 {
        match self {
            SoftMeasurement::Linear => soft_linear_distance(hard, soft),
            SoftMeasurement::Quadratic => soft_quadratic_distance(hard, soft),
        }
    }

    /// Largest value a single branch metric can take for `rate` output bits
    pub fn max_branch_metric(self, rate: usize) -> u32 {
        let rate = rate as u32;
        match self {
            SoftMeasurement::Linear => rate * 255,
            SoftMeasurement::Quadratic => ((rate * 255 * 255) >> 3).min(u32::from(u16::MAX)),
        }
    }
}

/// Number of differing bits between `x` and `y`
#[inline]
pub fn hamming_distance(x: u32, y: u32) -> u16 {
    (x ^ y).count_ones() as u16
}

#[inline]
fn ideal_soft_bit(hard: u32, bit: usize) -> i32 {
    if (hard >> bit) & 1 == 1 {
        255
    } else {
        0
    }
}

/// Sum of `|received - ideal|` over every output bit
#[inline]
pub fn soft_linear_distance(hard: u32, soft: &[u8]) -> u16 {
    soft.iter()
        .enumerate()
        .map(|(i, &y)| (i32::from(y) - ideal_soft_bit(hard, i)).unsigned_abs())
        .sum::<u32>() as u16
}

/// Sum of squared differences over every output bit, divided by 8 and
/// clamped to the 16-bit metric range
#[inline]
pub fn soft_quadratic_distance(hard: u32, soft: &[u8]) -> u16 {
    let squares: u32 = soft
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let d = i32::from(y) - ideal_soft_bit(hard, i);
            (d * d) as u32
        })
        .sum();
    (squares >> 3).min(u32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance(0b00, 0b00), 0);
        assert_eq!(hamming_distance(0b01, 0b10), 2);
        assert_eq!(hamming_distance(0b111, 0b101), 1);
        assert_eq!(hamming_distance(0xff, 0x00), 8);
    }

    #[test]
    fn test_soft_linear_distance() {
        // ideal output 0b10 is (0, 255) in transmission order
        assert_eq!(soft_linear_distance(0b10, &[0, 255]), 0);
        assert_eq!(soft_linear_distance(0b10, &[255, 0]), 510);
        assert_eq!(soft_linear_distance(0b10, &[128, 128]), 128 + 127);
        assert_eq!(soft_linear_distance(0b01, &[200, 10]), 55 + 10);
    }

    #[test]
    fn test_soft_quadratic_distance() {
        assert_eq!(soft_quadratic_distance(0b1, &[255]), 0);
        assert_eq!(soft_quadratic_distance(0b0, &[16]), 32);
        assert_eq!(soft_quadratic_distance(0b11, &[0, 0]), (2 * 255 * 255 / 8) as u16);
        // eight maximal errors overflow 16 bits before scaling, but not after
        assert_eq!(soft_quadratic_distance(0, &[255; 8]), 65025);
    }

    #[test]
    fn test_erased_symbols_are_neutral() {
        let erased = [128u8, 128, 128];
        let spread: Vec<u16> = (0..8)
            .map(|hard| soft_linear_distance(hard, &erased))
            .collect();
        assert!(spread.iter().max().unwrap() - spread.iter().min().unwrap() <= 3);
    }

    #[test]
    fn test_measurement_dispatch() {
        let soft = [30u8, 220];
        assert_eq!(
            SoftMeasurement::Linear.distance(0b10, &soft),
            soft_linear_distance(0b10, &soft)
        );
        assert_eq!(
            SoftMeasurement::Quadratic.distance(0b10, &soft),
            soft_quadratic_distance(0b10, &soft)
        );
        assert_eq!(SoftMeasurement::default(), SoftMeasurement::Linear);
    }

    #[test]
    fn test_max_branch_metric() {
        assert_eq!(SoftMeasurement::Linear.max_branch_metric(2), 510);
        assert_eq!(SoftMeasurement::Quadratic.max_branch_metric(2), 16256);
        assert_eq!(SoftMeasurement::Quadratic.max_branch_metric(8), 65025);
    }
}
