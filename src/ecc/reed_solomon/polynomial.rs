//! Polynomials over GF(2^8).
//!
//! A polynomial is a coefficient vector, lowest order first, plus an explicit
//! order. Coefficients above the order are ignored, so one allocation can be
//! reused as scratch space for results of varying order. Operations write
//! into caller-provided output polynomials instead of allocating.

use std::ops::{Index, IndexMut};

use super::field::Field;
use crate::error::{Error, Result};

/// Polynomial with GF(2^8) coefficients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial {
    coeff: Vec<u8>,
    order: usize,
}

impl Polynomial {
    /// Creates the zero polynomial with room for `order + 1` coefficients
    pub fn with_order(order: usize) -> Self {
        Polynomial {
            coeff: vec![0; order + 1],
            order,
        }
    }

    /// Creates a polynomial from coefficients ordered lowest power first
    pub fn from_coefficients(coeff: &[u8]) -> Self {
        if coeff.is_empty() {
            return Self::with_order(0);
        }
        Polynomial {
            coeff: coeff.to_vec(),
            order: coeff.len() - 1,
        }
    }

    /// Builds the monic polynomial `(x - roots[0]) * (x - roots[1]) * ...`
    pub fn from_roots(field: &Field, roots: &[u8]) -> Self {
        let mut scratch = [
            Self::with_order(roots.len()),
            Self::with_order(roots.len()),
        ];
        let index = Self::from_roots_into(field, roots, &mut scratch);
        let [first, second] = scratch;
        if index == 0 {
            first
        } else {
            second
        }
    }

    /// Builds the product of `(x - root)` factors by absorbing roots left to
    /// right, alternating between the two scratch polynomials.
    ///
    /// # Returns
    ///
    /// The index of the scratch slot holding the product
    pub fn from_roots_into(field: &Field, roots: &[u8], scratch: &mut [Polynomial; 2]) -> usize {
        let [first, second] = scratch;
        first.clear();
        first.set_order(0);
        first.coeff[0] = 1;

        let mut factor = Polynomial::with_order(1);
        let mut current = 0;
        for &root in roots {
            factor.coeff[0] = root;
            factor.coeff[1] = 1;
            let (src, dst) = if current == 0 {
                (&*first, &mut *second)
            } else {
                (&*second, &mut *first)
            };
            dst.set_order(src.order + 1);
            Self::mul_into(field, &factor, src, dst);
            current ^= 1;
        }
        current
    }

    /// Highest valid coefficient index
    pub fn order(&self) -> usize {
        self.order
    }

    /// Changes the order, growing the allocation if needed. Newly exposed
    /// coefficients keep whatever the buffer held before.
    pub fn set_order(&mut self, order: usize) {
        self.reserve(order);
        self.order = order;
    }

    /// Grows the allocation so coefficients up to `order` can be addressed,
    /// without changing the current order
    pub fn reserve(&mut self, order: usize) {
        if self.coeff.len() <= order {
            self.coeff.resize(order + 1, 0);
        }
    }

    /// The valid coefficients, lowest power first
    pub fn coefficients(&self) -> &[u8] {
        &self.coeff[..=self.order]
    }

    pub fn coefficients_mut(&mut self) -> &mut [u8] {
        &mut self.coeff[..=self.order]
    }

    /// Zeroes every coefficient in the allocation
    pub fn clear(&mut self) {
        self.coeff.iter_mut().for_each(|c| *c = 0);
    }

    /// Computes `l * r`, keeping only the terms up to `res.order()`
    pub fn mul_into(field: &Field, l: &Polynomial, r: &Polynomial, res: &mut Polynomial) {
        let res_order = res.order;
        res.coeff[..=res_order].iter_mut().for_each(|c| *c = 0);

        for (i, &lc) in l.coefficients().iter().enumerate() {
            if i > res_order {
                break;
            }
            if lc == 0 {
                continue;
            }
            for (j, &rc) in r.coefficients().iter().enumerate() {
                if i + j > res_order {
                    break;
                }
                res.coeff[i + j] ^= field.mul(lc, rc);
            }
        }
    }

    /// Computes the remainder of `dividend / divisor` by long division.
    ///
    /// `rem` must have an order at least that of `dividend`; the dividend is
    /// copied into it and reduced in place. Only the coefficients below the
    /// divisor's order are meaningful afterwards.
    pub fn rem_into(
        field: &Field,
        dividend: &Polynomial,
        divisor: &Polynomial,
        rem: &mut Polynomial,
    ) -> Result<()> {
        if rem.order < dividend.order {
            return Err(Error::InvalidInput(format!(
                "remainder order {} is smaller than dividend order {}",
                rem.order, dividend.order
            )));
        }
        let leading = divisor.coeff[divisor.order];
        if leading == 0 {
            return Err(Error::invalid_input("divisor has a zero leading coefficient"));
        }

        rem.coeff[..=dividend.order].copy_from_slice(dividend.coefficients());
        rem.coeff[dividend.order + 1..=rem.order]
            .iter_mut()
            .for_each(|c| *c = 0);

        let divisor_log = field.log(leading);
        for i in (1..=dividend.order).rev() {
            if i < divisor.order {
                break;
            }
            if rem.coeff[i] == 0 {
                continue;
            }
            let q = field.div_log(field.log(rem.coeff[i]), divisor_log);
            let q_order = i - divisor.order;
            for (j, &d) in divisor.coefficients().iter().enumerate() {
                if d == 0 {
                    continue;
                }
                rem.coeff[j + q_order] ^= field.mul_log_element(field.log(d), q);
            }
        }
        Ok(())
    }

    /// Writes the formal derivative into `der`, up to `der.order()`
    pub fn derivative_into(&self, field: &Field, der: &mut Polynomial) {
        for i in 0..=der.order {
            der.coeff[i] = if i < self.order {
                // i + 1 copies of the coefficient, summed
                field.sum(self.coeff[i + 1], i + 1)
            } else {
                0
            };
        }
    }

    /// Evaluates the polynomial at `x`
    pub fn eval(&self, field: &Field, x: u8) -> u8 {
        if x == 0 {
            return self.coeff[0];
        }

        let log_x = field.log(x) as usize;
        self.coefficients()
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c != 0)
            .fold(0, |acc, (i, &c)| {
                acc ^ field.exp(field.log(c) as usize + (log_x * i) % 255)
            })
    }

    /// Evaluates the polynomial at the point whose powers are given in log
    /// form by `powers` (see [`Polynomial::power_table`])
    pub fn eval_with_powers(&self, field: &Field, powers: &[u8]) -> u8 {
        if powers[0] == 0 {
            return self.coeff[0];
        }

        self.coefficients()
            .iter()
            .zip(powers)
            .filter(|&(&c, _)| c != 0)
            .fold(0, |acc, (&c, &p)| acc ^ field.mul_log_element(field.log(c), p))
    }

    /// Like [`Polynomial::eval_with_powers`], for a polynomial whose
    /// coefficients are already logarithms (0 marking a zero coefficient)
    pub fn eval_log_with_powers(&self, field: &Field, powers: &[u8]) -> u8 {
        if powers[0] == 0 {
            return if self.coeff[0] == 0 {
                0
            } else {
                field.exp(self.coeff[0] as usize)
            };
        }

        self.coefficients()
            .iter()
            .zip(powers)
            .filter(|&(&c, _)| c != 0)
            .fold(0, |acc, (&c, &p)| acc ^ field.mul_log_element(c, p))
    }

    /// Writes the coefficients of `self` as logarithms into `out`
    pub fn log_form_into(&self, field: &Field, out: &mut Polynomial) {
        out.set_order(self.order);
        for (dst, &c) in out.coeff.iter_mut().zip(self.coefficients()) {
            *dst = if c == 0 { 0 } else { field.log(c) };
        }
    }

    /// Logarithms of `x^0 ..= x^order`; all zero when `x` is zero
    pub fn power_table(field: &Field, x: u8, order: usize) -> Vec<u8> {
        let mut powers = vec![0; order + 1];
        if x == 0 {
            return powers;
        }

        let log_x = field.log(x);
        let mut power = field.log(1);
        for p in powers.iter_mut() {
            *p = power;
            power = field.mul_log(power, log_x);
        }
        powers
    }
}

impl Index<usize> for Polynomial {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.coeff[index]
    }
}

impl IndexMut<usize> for Polynomial {
    fn index_mut(&mut self, index: usize) -> &mut u8 {
        &mut self.coeff[index]
    }
}

#[cfg(test)]
mod tests {
    use super::super::field::primitive_polynomial;
    use super::*;

    fn field() -> Field {
        Field::new(primitive_polynomial::X8_X4_X3_X2_1).unwrap()
    }

    #[test]
    fn test_mul() {
        let gf = field();
        // (x + 1)(x + 1) = x^2 + 1 in characteristic 2
        let l = Polynomial::from_coefficients(&[1, 1]);
        let mut res = Polynomial::with_order(2);
        Polynomial::mul_into(&gf, &l, &l, &mut res);
        assert_eq!(res.coefficients(), &[1, 0, 1]);

        // (2x + 3)(x + 4) = 2x^2 + (8 ^ 3)x + 12
        let l = Polynomial::from_coefficients(&[3, 2]);
        let r = Polynomial::from_coefficients(&[4, 1]);
        Polynomial::mul_into(&gf, &l, &r, &mut res);
        assert_eq!(res.coefficients(), &[gf.mul(3, 4), 8 ^ 3, 2]);
    }

    #[test]
    fn test_mul_truncates_to_result_order() {
        let gf = field();
        let l = Polynomial::from_coefficients(&[5, 7, 9]);
        let r = Polynomial::from_coefficients(&[1, 2, 3]);
        let mut full = Polynomial::with_order(4);
        let mut truncated = Polynomial::with_order(4);
        truncated.set_order(1);
        Polynomial::mul_into(&gf, &l, &r, &mut full);
        Polynomial::mul_into(&gf, &l, &r, &mut truncated);
        assert_eq!(truncated.coefficients(), &full.coefficients()[..2]);
    }

    #[test]
    fn test_rem_of_multiple_is_zero() {
        let gf = field();
        let divisor = Polynomial::from_roots(&gf, &[gf.exp(1), gf.exp(2), gf.exp(3)]);
        let q = Polynomial::from_coefficients(&[0x10, 0x22, 0, 0x7f, 1]);
        let mut product = Polynomial::with_order(q.order() + divisor.order());
        Polynomial::mul_into(&gf, &q, &divisor, &mut product);

        let mut rem = Polynomial::with_order(product.order());
        Polynomial::rem_into(&gf, &product, &divisor, &mut rem).unwrap();
        assert!(rem.coefficients()[..divisor.order()].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_rem_matches_evaluation_at_roots() {
        let gf = field();
        let roots = [gf.exp(1), gf.exp(2)];
        let divisor = Polynomial::from_roots(&gf, &roots);
        let dividend = Polynomial::from_coefficients(&[9, 8, 7, 6, 5, 4, 3]);
        let mut rem = Polynomial::with_order(dividend.order());
        Polynomial::rem_into(&gf, &dividend, &divisor, &mut rem).unwrap();
        rem.set_order(divisor.order() - 1);

        // dividend and remainder agree wherever the divisor vanishes
        for &root in &roots {
            assert_eq!(dividend.eval(&gf, root), rem.eval(&gf, root));
        }
    }

    #[test]
    fn test_rem_requires_headroom() {
        let gf = field();
        let dividend = Polynomial::from_coefficients(&[1, 2, 3, 4]);
        let divisor = Polynomial::from_coefficients(&[1, 1]);
        let mut rem = Polynomial::with_order(2);
        assert!(Polynomial::rem_into(&gf, &dividend, &divisor, &mut rem).is_err());

        let zero_lead = Polynomial::from_coefficients(&[1, 0]);
        let mut rem = Polynomial::with_order(3);
        assert!(Polynomial::rem_into(&gf, &dividend, &zero_lead, &mut rem).is_err());
    }

    #[test]
    fn test_derivative() {
        let gf = field();
        // only the odd powers survive differentiation
        let p = Polynomial::from_coefficients(&[0x11, 0x22, 0x33, 0x44]);
        let mut der = Polynomial::with_order(2);
        p.derivative_into(&gf, &mut der);
        assert_eq!(der.coefficients(), &[0x22, 0, 0x44]);
    }

    #[test]
    fn test_eval_variants_agree() {
        let gf = field();
        let p = Polynomial::from_coefficients(&[0x01, 0x00, 0xa5, 0x3c, 0x00, 0xff]);
        let mut log_p = Polynomial::with_order(0);
        p.log_form_into(&gf, &mut log_p);

        for x in 0..=255u8 {
            // Horner's rule as the reference
            let expected = p
                .coefficients()
                .iter()
                .rev()
                .fold(0, |acc, &c| gf.mul(acc, x) ^ c);
            let powers = Polynomial::power_table(&gf, x, p.order());
            assert_eq!(p.eval(&gf, x), expected);
            assert_eq!(p.eval_with_powers(&gf, &powers), expected);
            assert_eq!(log_p.eval_log_with_powers(&gf, &powers), expected);
        }
    }

    #[test]
    fn test_power_table() {
        let gf = field();
        let powers = Polynomial::power_table(&gf, 3, 4);
        for (i, &p) in powers.iter().enumerate() {
            assert_eq!(gf.exp(p as usize), gf.pow(3, i as i32));
        }
        assert_eq!(Polynomial::power_table(&gf, 0, 3), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_from_roots() {
        let gf = field();
        let roots = [0x02, 0x17, 0x80, 0xe1];
        let p = Polynomial::from_roots(&gf, &roots);
        assert_eq!(p.order(), 4);
        assert_eq!(p[4], 1);
        for &root in &roots {
            assert_eq!(p.eval(&gf, root), 0);
        }
        assert_ne!(p.eval(&gf, 0x03), 0);
    }

    #[test]
    fn test_from_roots_alternates_slots() {
        let gf = field();
        let mut scratch = [Polynomial::with_order(3), Polynomial::with_order(3)];
        assert_eq!(Polynomial::from_roots_into(&gf, &[], &mut scratch), 0);
        assert_eq!(scratch[0].coefficients(), &[1]);
        assert_eq!(Polynomial::from_roots_into(&gf, &[5], &mut scratch), 1);
        assert_eq!(scratch[1].coefficients(), &[5, 1]);
        assert_eq!(Polynomial::from_roots_into(&gf, &[5, 6], &mut scratch), 0);
        assert_eq!(scratch[0].coefficients(), &[gf.mul(5, 6), 5 ^ 6, 1]);
    }

    #[test]
    fn test_set_order_grows() {
        let mut p = Polynomial::from_coefficients(&[1, 2]);
        p.set_order(5);
        assert_eq!(p.coefficients(), &[1, 2, 0, 0, 0, 0]);
        p.set_order(1);
        assert_eq!(p.coefficients(), &[1, 2]);
    }
}
