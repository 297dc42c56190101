//! 256-bit unsigned integer for wide intermediate products
//!
//! Only what the fixed-point helpers need: exact 128x128 multiplication,
//! scaling by u128 and full long division.

use borsh::{BorshDeserialize, BorshSerialize};
use std::cmp::Ordering;

/// 256-bit unsigned integer represented as two u128 values
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct U256 {
    /// Low 128 bits
    pub lo: u128,
    /// High 128 bits
    pub hi: u128,
}

const LOW_64: u128 = u64::MAX as u128;

impl U256 {
    pub const ZERO: Self = Self { lo: 0, hi: 0 };
    pub const ONE: Self = Self { lo: 1, hi: 0 };
    pub const MAX: Self = Self { lo: u128::MAX, hi: u128::MAX };

    pub const fn from_u128(val: u128) -> Self {
        Self { lo: val, hi: 0 }
    }

    pub const fn new(hi: u128, lo: u128) -> Self {
        Self { lo, hi }
    }

    pub fn is_zero(&self) -> bool {
        self.lo == 0 && self.hi == 0
    }

    /// Narrow back to u128, None if the high half is set
    pub fn to_u128(&self) -> Option<u128> {
        if self.hi == 0 {
            Some(self.lo)
        } else {
            None
        }
    }

    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        let (lo, carry) = self.lo.overflowing_add(other.lo);
        let hi = self.hi.checked_add(other.hi)?.checked_add(carry as u128)?;
        Some(Self { lo, hi })
    }

    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if self < other {
            return None;
        }
        Some(self.wrapping_sub(other))
    }

    fn wrapping_sub(&self, other: &Self) -> Self {
        let (lo, borrow) = self.lo.overflowing_sub(other.lo);
        let hi = self.hi.wrapping_sub(other.hi).wrapping_sub(borrow as u128);
        Self { lo, hi }
    }

    /// Exact product of two u128 values
    pub fn mul_u128(a: u128, b: u128) -> Self {
        let a0 = a & LOW_64;
        let a1 = a >> 64;
        let b0 = b & LOW_64;
        let b1 = b >> 64;

        let p00 = a0 * b0;
        let p01 = a0 * b1;
        let p10 = a1 * b0;
        let p11 = a1 * b1;

        // Each term is below 2^64, so three of them fit
        let mid = (p00 >> 64) + (p01 & LOW_64) + (p10 & LOW_64);

        let lo = (p00 & LOW_64) | ((mid & LOW_64) << 64);
        let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);

        Self { lo, hi }
    }

    /// Multiply by a u128, None on overflow past 256 bits
    pub fn checked_mul_u128(&self, other: u128) -> Option<Self> {
        let low = Self::mul_u128(self.lo, other);
        let high = Self::mul_u128(self.hi, other);
        if high.hi != 0 {
            return None;
        }
        let hi = low.hi.checked_add(high.lo)?;
        Some(Self { lo: low.lo, hi })
    }

    fn bit(&self, index: u32) -> bool {
        if index < 128 {
            (self.lo >> index) & 1 == 1
        } else {
            (self.hi >> (index - 128)) & 1 == 1
        }
    }

    fn set_bit(&mut self, index: u32) {
        if index < 128 {
            self.lo |= 1 << index;
        } else {
            self.hi |= 1 << (index - 128);
        }
    }

    fn bits(&self) -> u32 {
        if self.hi != 0 {
            256 - self.hi.leading_zeros()
        } else {
            128 - self.lo.leading_zeros()
        }
    }

    /// Quotient and remainder, None when dividing by zero
    pub fn div_rem(&self, divisor: &Self) -> Option<(Self, Self)> {
        if divisor.is_zero() {
            return None;
        }
        if self < divisor {
            return Some((Self::ZERO, *self));
        }
        if self.hi == 0 && divisor.hi == 0 {
            return Some((
                Self::from_u128(self.lo / divisor.lo),
                Self::from_u128(self.lo % divisor.lo),
            ));
        }

        let mut quotient = Self::ZERO;
        let mut remainder = Self::ZERO;
        for index in (0..self.bits()).rev() {
            let carry = remainder.hi >> 127 == 1;
            remainder = remainder.shl(1);
            if self.bit(index) {
                remainder.lo |= 1;
            }
            if carry || remainder >= *divisor {
                remainder = remainder.wrapping_sub(divisor);
                quotient.set_bit(index);
            }
        }
        Some((quotient, remainder))
    }

    pub fn checked_div(&self, divisor: &Self) -> Option<Self> {
        self.div_rem(divisor).map(|(q, _)| q)
    }

    /// Shift right by n bits
    pub fn shr(&self, n: u32) -> Self {
        if n == 0 {
            return *self;
        }
        if n >= 256 {
            return Self::ZERO;
        }
        if n >= 128 {
            return Self { lo: self.hi >> (n - 128), hi: 0 };
        }

        Self {
            lo: (self.lo >> n) | (self.hi << (128 - n)),
            hi: self.hi >> n,
        }
    }

    /// Shift left by n bits
    pub fn shl(&self, n: u32) -> Self {
        if n == 0 {
            return *self;
        }
        if n >= 256 {
            return Self::ZERO;
        }
        if n >= 128 {
            return Self { lo: 0, hi: self.lo << (n - 128) };
        }

        Self {
            lo: self.lo << n,
            hi: (self.hi << n) | (self.lo >> (128 - n)),
        }
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.hi.cmp(&other.hi) {
            Ordering::Equal => self.lo.cmp(&other.lo),
            other => other,
        }
    }
}
