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

//! Fixed-width modular arithmetic over an explicit 256-bit modulus.
//!
//! These are the leaf operations every other unit is built on. They are pure
//! functions; the latency contract is the documented step bound of each
//! algorithm (one correction for add/sub, 512 shift-subtract steps for the
//! wide reduction, 512 outer iterations for the binary inverse).

mod uint;

pub use uint::U256;

use crate::error::{EngineError, EngineResult};

/// Outer-iteration bound for the binary extended GCD: 2 * bitlength(m).
/// Exceeding it means the internal invariants are broken, not that the input
/// was merely unlucky.
pub const INVERSE_STEP_BOUND: usize = 512;

/// (a + b) mod m for canonical residues a, b in [0, m-1].
pub fn mod_add(a: &U256, b: &U256, m: &U256) -> U256 {
    let (sum, carry) = a.add_with_carry(b);
    if carry || sum >= *m {
        sum.wrapping_sub(m)
    } else {
        sum
    }
}

/// (a - b) mod m for canonical residues a, b in [0, m-1].
pub fn mod_sub(a: &U256, b: &U256, m: &U256) -> U256 {
    let (diff, borrow) = a.sub_with_borrow(b);
    if borrow {
        diff.add_with_carry(m).0
    } else {
        diff
    }
}

/// Canonicalize an arbitrary 256-bit value into [0, m-1].
///
/// Bit-serial shift-subtract over all 256 bits; used for digest reduction
/// mod N and for R.x mod N where the input may exceed the modulus.
pub fn reduce(a: &U256, m: &U256) -> U256 {
    if a < m {
        return *a;
    }
    let mut r = U256::ZERO;
    for i in (0..256).rev() {
        let (mut shifted, carry) = r.shl1_with_carry();
        if a.bit(i) {
            shifted.0[0] |= 1;
        }
        if carry || shifted >= *m {
            shifted = shifted.wrapping_sub(m);
        }
        r = shifted;
    }
    r
}

/// (a * b) mod m. Full 512-bit schoolbook product followed by bit-serial
/// reduction (512 shift-subtract steps).
pub fn mod_mul(a: &U256, b: &U256, m: &U256) -> U256 {
    let a = reduce(a, m);
    let b = reduce(b, m);
    let wide = a.mul_wide(&b);

    let mut r = U256::ZERO;
    for i in (0..512).rev() {
        let (mut shifted, carry) = r.shl1_with_carry();
        if (wide[i / 64] >> (i % 64)) & 1 == 1 {
            shifted.0[0] |= 1;
        }
        if carry || shifted >= *m {
            shifted = shifted.wrapping_sub(m);
        }
        r = shifted;
    }
    r
}

/// x / 2 mod m for odd m: halve directly when even, else halve x + m,
/// keeping the carry out of bit 255.
fn div2_mod(x: &U256, m: &U256) -> U256 {
    if x.is_even() {
        x.shr1()
    } else {
        let (sum, carry) = x.add_with_carry(m);
        let mut half = sum.shr1();
        if carry {
            half.0[3] |= 1 << 63;
        }
        half
    }
}

/// a^-1 mod m via the binary extended GCD, m odd.
///
/// Fails with `ArithmeticFailure` when a = 0, m is even, or gcd(a, m) != 1.
/// Each outer iteration strips at least one bit from u or v, so the loop is
/// bounded by `INVERSE_STEP_BOUND`; running past the bound is surfaced as
/// `Timeout`.
pub fn mod_inverse(a: &U256, m: &U256) -> EngineResult<U256> {
    if m.is_zero() || m.is_even() {
        return Err(EngineError::ArithmeticFailure);
    }
    let a = reduce(a, m);
    if a.is_zero() {
        return Err(EngineError::ArithmeticFailure);
    }

    // Invariants: x1 * a == u (mod m), x2 * a == v (mod m).
    let mut u = a;
    let mut v = *m;
    let mut x1 = U256::ONE;
    let mut x2 = U256::ZERO;

    let mut steps = 0usize;
    while u != U256::ONE && v != U256::ONE {
        steps += 1;
        if steps > INVERSE_STEP_BOUND {
            return Err(EngineError::Timeout);
        }
        while u.is_even() {
            u = u.shr1();
            x1 = div2_mod(&x1, m);
        }
        while v.is_even() {
            v = v.shr1();
            x2 = div2_mod(&x2, m);
        }
        if u >= v {
            u = u.wrapping_sub(&v);
            if u.is_zero() {
                // u == v != 1: gcd(a, m) != 1
                return Err(EngineError::ArithmeticFailure);
            }
            x1 = mod_sub(&x1, &x2, m);
        } else {
            v = v.wrapping_sub(&u);
            x2 = mod_sub(&x2, &x1, m);
        }
    }

    if u == U256::ONE {
        Ok(x1)
    } else {
        Ok(x2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(v: u64) -> U256 {
        U256::from_u64(v)
    }

    #[test]
    fn add_sub_with_correction() {
        let m = small(7);
        assert_eq!(mod_add(&small(5), &small(4), &m), small(2));
        assert_eq!(mod_sub(&small(2), &small(5), &m), small(4));
        assert_eq!(mod_sub(&small(5), &small(2), &m), small(3));
    }

    #[test]
    fn add_handles_carry_out() {
        // m = 2^255 + 1, a = m - 1: the sum a + a wraps past 2^256 before
        // the correction, and (2m - 2) mod m == m - 2
        let m = U256([1, 0, 0, 0x8000_0000_0000_0000]);
        let a = m.wrapping_sub(&U256::ONE);
        let sum = mod_add(&a, &a, &m);
        assert_eq!(sum, m.wrapping_sub(&U256::from_u64(2)));
    }

    #[test]
    fn reduce_canonicalizes() {
        let m = small(7);
        assert_eq!(reduce(&small(23), &m), small(2));
        assert_eq!(reduce(&small(6), &m), small(6));
        let big = U256([u64::MAX; 4]);
        assert!(reduce(&big, &m) < m);
    }

    #[test]
    fn mul_small_cases() {
        let m = small(7);
        assert_eq!(mod_mul(&small(3), &small(5), &m), small(1));
        assert_eq!(mod_mul(&small(6), &small(6), &m), small(1));
        assert_eq!(mod_mul(&small(0), &small(5), &m), small(0));
    }

    #[test]
    fn mul_full_width() {
        // (2^256 - 1)^2 mod (2^255 + 1) sanity: result is canonical
        let m = U256([1, 0, 0, 0x8000_0000_0000_0000]);
        let a = U256([u64::MAX; 4]);
        let r = mod_mul(&a, &a, &m);
        assert!(r < m);
        // multiplying by one is the identity on canonical residues
        let a_red = reduce(&a, &m);
        assert_eq!(mod_mul(&a, &U256::ONE, &m), a_red);
    }

    #[test]
    fn inverse_small_cases() {
        let m = small(7);
        assert_eq!(mod_inverse(&small(3), &m).unwrap(), small(5));
        assert_eq!(mod_inverse(&small(1), &m).unwrap(), small(1));
        assert_eq!(mod_inverse(&small(6), &m).unwrap(), small(6));
    }

    #[test]
    fn inverse_rejects_zero_and_non_coprime() {
        assert_eq!(
            mod_inverse(&U256::ZERO, &small(7)),
            Err(EngineError::ArithmeticFailure)
        );
        assert_eq!(
            mod_inverse(&small(3), &small(9)),
            Err(EngineError::ArithmeticFailure)
        );
        assert_eq!(
            mod_inverse(&small(3), &small(8)),
            Err(EngineError::ArithmeticFailure)
        );
        // a multiple of m reduces to zero
        assert_eq!(
            mod_inverse(&small(14), &small(7)),
            Err(EngineError::ArithmeticFailure)
        );
    }

    #[test]
    fn inverse_round_trips_mod_curve_order() {
        let n = crate::curve::N;
        let a = U256::from_u64(0xDEAD_BEEF_1234_5678);
        let inv = mod_inverse(&a, &n).unwrap();
        assert_eq!(mod_mul(&a, &inv, &n), U256::ONE);

        let two_inv = mod_inverse(&small(2), &n).unwrap();
        assert_eq!(mod_mul(&small(2), &two_inv, &n), U256::ONE);
    }
}
