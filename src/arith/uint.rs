// NØNOS Operating System
// Copyright (C) 2026 NØNOS Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! 256-bit unsigned integer on four little-endian 64-bit limbs.
//!
//! Storage layout matches the engine's register banks: big-endian byte and
//! word conversions, least-significant limb first in memory.

use core::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct U256(pub(crate) [u64; 4]);

impl U256 {
    pub const ZERO: Self = Self([0, 0, 0, 0]);
    pub const ONE: Self = Self([1, 0, 0, 0]);

    pub const fn from_u64(val: u64) -> Self {
        Self([val, 0, 0, 0])
    }

    pub fn from_bytes_be(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let offset = (3 - i) * 8;
            limbs[i] = u64::from_be_bytes([
                bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3],
                bytes[offset + 4], bytes[offset + 5], bytes[offset + 6], bytes[offset + 7],
            ]);
        }
        Self(limbs)
    }

    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for i in 0..4 {
            let offset = (3 - i) * 8;
            bytes[offset..offset + 8].copy_from_slice(&self.0[i].to_be_bytes());
        }
        bytes
    }

    /// Load from eight 32-bit register words, word 0 most significant.
    pub fn from_words_be(words: &[u32; 8]) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let hi = words[(3 - i) * 2] as u64;
            let lo = words[(3 - i) * 2 + 1] as u64;
            limbs[i] = (hi << 32) | lo;
        }
        Self(limbs)
    }

    /// Store into eight 32-bit register words, word 0 most significant.
    pub fn to_words_be(&self) -> [u32; 8] {
        let mut words = [0u32; 8];
        for i in 0..4 {
            words[(3 - i) * 2] = (self.0[i] >> 32) as u32;
            words[(3 - i) * 2 + 1] = self.0[i] as u32;
        }
        words
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0, 0]
    }

    pub fn is_even(&self) -> bool {
        self.0[0] & 1 == 0
    }

    /// Bit i, counted from the least significant bit.
    pub fn bit(&self, i: usize) -> bool {
        (self.0[i / 64] >> (i % 64)) & 1 == 1
    }

    pub fn add_with_carry(&self, other: &Self) -> (Self, bool) {
        let mut result = [0u64; 4];
        let mut carry = 0u128;
        for i in 0..4 {
            carry += self.0[i] as u128 + other.0[i] as u128;
            result[i] = carry as u64;
            carry >>= 64;
        }
        (Self(result), carry != 0)
    }

    pub fn sub_with_borrow(&self, other: &Self) -> (Self, bool) {
        let mut result = [0u64; 4];
        let mut borrow = 0u64;
        for i in 0..4 {
            let (d, b1) = self.0[i].overflowing_sub(other.0[i]);
            let (d, b2) = d.overflowing_sub(borrow);
            result[i] = d;
            borrow = (b1 as u64) | (b2 as u64);
        }
        (Self(result), borrow != 0)
    }

    /// Wrapping subtraction modulo 2^256.
    pub fn wrapping_sub(&self, other: &Self) -> Self {
        self.sub_with_borrow(other).0
    }

    /// Full 512-bit schoolbook product, little-endian limbs.
    pub fn mul_wide(&self, other: &Self) -> [u64; 8] {
        let mut w = [0u64; 8];
        for i in 0..4 {
            let mut carry = 0u128;
            for j in 0..4 {
                let t = w[i + j] as u128 + self.0[i] as u128 * other.0[j] as u128 + carry;
                w[i + j] = t as u64;
                carry = t >> 64;
            }
            w[i + 4] = carry as u64;
        }
        w
    }

    /// Left shift by one bit; the carry is the bit shifted out of bit 255.
    pub fn shl1_with_carry(&self) -> (Self, bool) {
        let carry = self.0[3] >> 63 == 1;
        let mut result = [0u64; 4];
        let mut prev = 0u64;
        for i in 0..4 {
            result[i] = (self.0[i] << 1) | prev;
            prev = self.0[i] >> 63;
        }
        (Self(result), carry)
    }

    pub fn shr1(&self) -> Self {
        let mut result = [0u64; 4];
        let mut prev = 0u64;
        for i in (0..4).rev() {
            result[i] = (self.0[i] >> 1) | (prev << 63);
            prev = self.0[i] & 1;
        }
        Self(result)
    }

    /// Volatile zeroization for staged secrets.
    pub fn wipe(&mut self) {
        for limb in &mut self.0 {
            unsafe { core::ptr::write_volatile(limb, 0) };
        }
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
