//! Finite field arithmetic in GF(2^8).
//!
//! Elements are bytes. Addition is XOR; multiplication and division go
//! through exponent/logarithm tables built from a primitive polynomial.
//! The exponent table holds 512 entries so that the sum of two logarithms
//! (at most 510) can index it without a modulo reduction.
//!
//! Logarithms are stored in `1..=255`, with `log(1) == 255` rather than 0.
//! A logarithm of 0 therefore never names a real element, which lets
//! log-form polynomials use 0 for "zero coefficient".

use std::fmt;

use crate::error::{Error, Result};

/// Degree-8 primitive polynomials, written with the x^8 term included.
pub mod primitive_polynomial {
    /// x^8 + x^4 + x^3 + x^2 + 1
    pub const X8_X4_X3_X2_1: u16 = 0x11d;
    /// x^8 + x^5 + x^3 + x + 1
    pub const X8_X5_X3_X_1: u16 = 0x12b;
    /// x^8 + x^5 + x^3 + x^2 + 1
    pub const X8_X5_X3_X2_1: u16 = 0x12d;
    /// x^8 + x^6 + x^3 + x^2 + 1
    pub const X8_X6_X3_X2_1: u16 = 0x14d;
    /// x^8 + x^6 + x^4 + x^3 + x^2 + x + 1
    pub const X8_X6_X4_X3_X2_X_1: u16 = 0x15f;
    /// x^8 + x^6 + x^5 + x + 1
    pub const X8_X6_X5_X_1: u16 = 0x163;
    /// x^8 + x^6 + x^5 + x^2 + 1
    pub const X8_X6_X5_X2_1: u16 = 0x165;
    /// x^8 + x^6 + x^5 + x^3 + 1
    pub const X8_X6_X5_X3_1: u16 = 0x169;
    /// x^8 + x^6 + x^5 + x^4 + 1
    pub const X8_X6_X5_X4_1: u16 = 0x171;
    /// x^8 + x^7 + x^2 + x + 1
    pub const X8_X7_X2_X_1: u16 = 0x187;
    /// x^8 + x^7 + x^3 + x^2 + 1
    pub const X8_X7_X3_X2_1: u16 = 0x18d;
    /// x^8 + x^7 + x^5 + x^3 + 1
    pub const X8_X7_X5_X3_1: u16 = 0x1a9;
    /// x^8 + x^7 + x^6 + x + 1
    pub const X8_X7_X6_X_1: u16 = 0x1c3;
    /// x^8 + x^7 + x^6 + x^3 + x^2 + x + 1
    pub const X8_X7_X6_X3_X2_X_1: u16 = 0x1cf;
    /// x^8 + x^7 + x^6 + x^5 + x^2 + x + 1
    pub const X8_X7_X6_X5_X2_X_1: u16 = 0x1e7;
    /// x^8 + x^7 + x^6 + x^5 + x^4 + x^2 + 1
    pub const X8_X7_X6_X5_X4_X2_1: u16 = 0x1f5;

    /// The polynomial used by the CCSDS (255,223) code
    pub const CCSDS: u16 = X8_X7_X2_X_1;

    /// Every primitive polynomial listed above
    pub const ALL: [u16; 16] = [
        X8_X4_X3_X2_1,
        X8_X5_X3_X_1,
        X8_X5_X3_X2_1,
        X8_X6_X3_X2_1,
        X8_X6_X4_X3_X2_X_1,
        X8_X6_X5_X_1,
        X8_X6_X5_X2_1,
        X8_X6_X5_X3_1,
        X8_X6_X5_X4_1,
        X8_X7_X2_X_1,
        X8_X7_X3_X2_1,
        X8_X7_X5_X3_1,
        X8_X7_X6_X_1,
        X8_X7_X6_X3_X2_X_1,
        X8_X7_X6_X5_X2_X_1,
        X8_X7_X6_X5_X4_X2_1,
    ];
}

/// Number of nonzero elements, the order of the multiplicative group
const GROUP_ORDER: usize = 255;

/// Exponent and logarithm tables for GF(2^8) under one primitive polynomial
#[derive(Clone, PartialEq, Eq)]
pub struct Field {
    exp: [u8; 2 * GROUP_ORDER + 2],
    log: [u8; GROUP_ORDER + 1],
    primitive_poly: u16,
}

impl Field {
    /// Builds the field tables for `primitive_poly`.
    ///
    /// # Arguments
    ///
    /// * `primitive_poly` - Degree-8 polynomial including the x^8 term, e.g. `0x11d`
    ///
    /// # Returns
    ///
    /// The field, or an error if the polynomial is not degree 8 or not primitive
    pub fn new(primitive_poly: u16) -> Result<Self> {
        if !(0x100..=0x1ff).contains(&primitive_poly) {
            return Err(Error::InvalidInput(format!(
                "primitive polynomial {:#x} is not of degree 8",
                primitive_poly
            )));
        }

        let mut exp = [0u8; 2 * GROUP_ORDER + 2];
        let mut log = [0u8; GROUP_ORDER + 1];

        let mut element: u16 = 1;
        exp[0] = 1;
        for i in 1..exp.len() {
            element <<= 1;
            if element > 0xff {
                element ^= primitive_poly;
            }
            exp[i] = element as u8;
            if i <= GROUP_ORDER {
                log[element as usize] = i as u8;
            }
        }

        // alpha must cycle through every nonzero element before returning to 1
        if exp[GROUP_ORDER] != 1 || exp[1..GROUP_ORDER].contains(&1) {
            return Err(Error::InvalidInput(format!(
                "polynomial {:#x} is not primitive",
                primitive_poly
            )));
        }

        Ok(Field {
            exp,
            log,
            primitive_poly,
        })
    }

    /// The polynomial this field was built from
    pub fn primitive_poly(&self) -> u16 {
        self.primitive_poly
    }

    /// alpha raised to `power`, valid for `power < 512`
    #[inline]
    pub fn exp(&self, power: usize) -> u8 {
        self.exp[power]
    }

    /// Discrete logarithm of `element`; 0 for the zero element
    #[inline]
    pub fn log(&self, element: u8) -> u8 {
        self.log[element as usize]
    }

    #[inline]
    pub fn add(&self, l: u8, r: u8) -> u8 {
        l ^ r
    }

    #[inline]
    pub fn sub(&self, l: u8, r: u8) -> u8 {
        l ^ r
    }

    /// Adds `element` to itself `n` times
    #[inline]
    pub fn sum(&self, element: u8, n: usize) -> u8 {
        if n % 2 == 1 {
            element
        } else {
            0
        }
    }

    #[inline]
    pub fn mul(&self, l: u8, r: u8) -> u8 {
        if l == 0 || r == 0 {
            return 0;
        }
        self.exp[self.log(l) as usize + self.log(r) as usize]
    }

    /// Divides `l` by `r`
    ///
    /// # Returns
    ///
    /// The quotient, or an error if `r` is zero
    #[inline]
    pub fn div(&self, l: u8, r: u8) -> Result<u8> {
        if r == 0 {
            return Err(Error::invalid_input("division by zero in GF(2^8)"));
        }
        if l == 0 {
            return Ok(0);
        }
        Ok(self.exp[GROUP_ORDER + self.log(l) as usize - self.log(r) as usize])
    }

    /// Multiplicative inverse of `element`
    pub fn inverse(&self, element: u8) -> Result<u8> {
        self.div(1, element)
    }

    /// Raises `element` to a possibly negative `power`.
    ///
    /// Zero to the power zero is one; zero to any other power is zero.
    pub fn pow(&self, element: u8, power: i32) -> u8 {
        if element == 0 {
            return if power == 0 { 1 } else { 0 };
        }
        let log = (i64::from(self.log(element)) * i64::from(power)).rem_euclid(GROUP_ORDER as i64);
        self.exp[log as usize]
    }

    /// Multiplies two elements given by their logarithms, returning a logarithm
    #[inline]
    pub fn mul_log(&self, l: u8, r: u8) -> u8 {
        let res = l as usize + r as usize;
        if res > GROUP_ORDER {
            (res - GROUP_ORDER) as u8
        } else {
            res as u8
        }
    }

    /// Divides two elements given by their logarithms, returning a logarithm
    #[inline]
    pub fn div_log(&self, l: u8, r: u8) -> u8 {
        let res = GROUP_ORDER + l as usize - r as usize;
        if res > GROUP_ORDER {
            (res - GROUP_ORDER) as u8
        } else {
            res as u8
        }
    }

    /// Multiplies two elements given by their logarithms, returning an element
    #[inline]
    pub fn mul_log_element(&self, l: u8, r: u8) -> u8 {
        self.exp[l as usize + r as usize]
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("primitive_poly", &format_args!("{:#x}", self.primitive_poly))
            .finish()
    }
}
