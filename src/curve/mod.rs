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

//! secp256k1 curve constants and affine point arithmetic.

mod mul;
mod point;

pub use mul::{multiply, ScalarMul, SCALAR_MUL_STEPS};
pub use point::{point_add, point_double, Point};

use crate::arith::{mod_add, mod_mul, U256};

/// Field prime P = 2^256 - 2^32 - 977.
pub const P: U256 = U256([
    0xFFFFFFFEFFFFFC2F, 0xFFFFFFFFFFFFFFFF,
    0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF,
]);

/// Curve order N.
pub const N: U256 = U256([
    0xBFD25E8CD0364141, 0xBAAEDCE6AF48A03B,
    0xFFFFFFFFFFFFFFFE, 0xFFFFFFFFFFFFFFFF,
]);

/// floor(N / 2); signatures with s above this are canonicalized to N - s.
pub const N_HALF: U256 = U256([
    0xDFE92F46681B20A0, 0x5D576E7357A4501D,
    0xFFFFFFFFFFFFFFFF, 0x7FFFFFFFFFFFFFFF,
]);

/// Generator point G.
pub const G: Point = Point {
    x: U256([
        0x59F2815B16F81798, 0x029BFCDB2DCE28D9,
        0x55A06295CE870B07, 0x79BE667EF9DCBBAC,
    ]),
    y: U256([
        0x9C47D08FFB10D4B8, 0xFD17B448A6855419,
        0x5DA4FBFC0E1108A8, 0x483ADA7726A3C465,
    ]),
    infinity: false,
};

/// True for scalars valid as private key, nonce, or signature component.
pub fn in_scalar_range(v: &U256) -> bool {
    !v.is_zero() && *v < N
}

/// True for field elements in [0, P-1].
pub fn in_field_range(v: &U256) -> bool {
    *v < P
}

/// y^2 == x^3 + 7 (mod P). The point at infinity is on the curve by
/// convention.
pub fn is_on_curve(p: &Point) -> bool {
    if p.infinity {
        return true;
    }
    let y2 = mod_mul(&p.y, &p.y, &P);
    let x2 = mod_mul(&p.x, &p.x, &P);
    let x3 = mod_mul(&x2, &p.x, &P);
    let rhs = mod_add(&x3, &U256::from_u64(7), &P);
    y2 == rhs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(is_on_curve(&G));
        assert!(is_on_curve(&Point::INFINITY));
    }

    #[test]
    fn constants_relate() {
        // N is odd, and 2 * N_HALF + 1 == N
        assert!(!N.is_even());
        let (doubled, carry) = N_HALF.add_with_carry(&N_HALF);
        assert!(!carry);
        assert_eq!(doubled.add_with_carry(&U256::ONE).0, N);
        // P and N fit the curve: both above 2^255
        assert!(P.bit(255));
        assert!(N.bit(255));
    }

    #[test]
    fn range_predicates() {
        assert!(!in_scalar_range(&U256::ZERO));
        assert!(in_scalar_range(&U256::ONE));
        assert!(!in_scalar_range(&N));
        assert!(in_scalar_range(&N_HALF));
        assert!(in_field_range(&U256::ZERO));
        assert!(!in_field_range(&P));
    }

    #[test]
    fn off_curve_point_detected() {
        let bogus = Point {
            x: G.x,
            y: mod_add(&G.y, &U256::ONE, &P),
            infinity: false,
        };
        assert!(!is_on_curve(&bogus));
    }
}
