//! GF(2^8) arithmetic
//!
//! Elements are bytes. Addition and subtraction are XOR; multiplication and
//! division go through log/exp tables built at compile time over the AES
//! polynomial `x^8 + x^4 + x^3 + x + 1` with generator 3.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Sub};

/// The AES irreducible polynomial
const MODULUS: u16 = 0x11B;

/// exp[i] = 3^i; doubled so `log a + log b` never needs a reduction
static EXP: [u8; 512] = build_exp();

/// log[3^i] = i; log[0] is unused
static LOG: [u8; 256] = build_log();

const fn mul_by_generator(x: u16) -> u16 {
    let mut doubled = x << 1;
    if doubled & 0x100 != 0 {
        doubled ^= MODULUS;
    }
    doubled ^ x
}

const fn build_exp() -> [u8; 512] {
    let mut exp = [0u8; 512];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        exp[i + 255] = x as u8;
        x = mul_by_generator(x);
        i += 1;
    }
    exp[510] = exp[0];
    exp[511] = exp[1];
    exp
}

const fn build_log() -> [u8; 256] {
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        log[x as usize] = i as u8;
        x = mul_by_generator(x);
        i += 1;
    }
    log
}

/// An element of GF(2^8)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Gf256(pub u8);

impl Gf256 {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    /// Multiplicative inverse
    ///
    /// # Panics
    /// Panics on zero, which has no inverse.
    #[must_use]
    pub fn inv(self) -> Self {
        assert!(self.0 != 0, "zero has no multiplicative inverse in GF(2^8)");
        Self(EXP[255 - LOG[self.0 as usize] as usize])
    }
}

impl From<u8> for Gf256 {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<Gf256> for u8 {
    fn from(value: Gf256) -> Self {
        value.0
    }
}

impl Add for Gf256 {
    type Output = Self;

    #[inline]
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl AddAssign for Gf256 {
    #[inline]
    #[allow(clippy::suspicious_op_assign_impl)]
    fn add_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Sub for Gf256 {
    type Output = Self;

    #[inline]
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Mul for Gf256 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        if self.0 == 0 || rhs.0 == 0 {
            return Self::ZERO;
        }
        Self(EXP[LOG[self.0 as usize] as usize + LOG[rhs.0 as usize] as usize])
    }
}

impl MulAssign for Gf256 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Div for Gf256 {
    type Output = Self;

    /// # Panics
    /// Panics when dividing by zero.
    #[inline]
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: Self) -> Self {
        assert!(rhs.0 != 0, "division by zero in GF(2^8)");
        self * rhs.inv()
    }
}
