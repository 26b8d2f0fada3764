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

//! Affine point addition and doubling with explicit point-at-infinity
//! handling. Slope inverses go through the modular arithmetic unit; a failed
//! inverse here means a broken invariant, every legitimate special case is
//! branched out first.

use crate::arith::{mod_add, mod_inverse, mod_mul, mod_sub, U256};
use crate::curve::P;
use crate::error::EngineResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: U256,
    pub y: U256,
    pub infinity: bool,
}

impl Point {
    /// Additive identity of the group.
    pub const INFINITY: Self = Self {
        x: U256::ZERO,
        y: U256::ZERO,
        infinity: true,
    };

    pub fn new(x: U256, y: U256) -> Self {
        Self { x, y, infinity: false }
    }
}

/// 2 * p. Doubling the identity, or a point with y = 0, yields the identity.
pub fn point_double(p: &Point) -> EngineResult<Point> {
    if p.infinity || p.y.is_zero() {
        return Ok(Point::INFINITY);
    }

    // lambda = 3 * x^2 / (2 * y)
    let xx = mod_mul(&p.x, &p.x, &P);
    let num = mod_mul(&U256::from_u64(3), &xx, &P);
    let two_y = mod_add(&p.y, &p.y, &P);
    let lambda = mod_mul(&num, &mod_inverse(&two_y, &P)?, &P);

    let lambda2 = mod_mul(&lambda, &lambda, &P);
    let x3 = mod_sub(&lambda2, &mod_add(&p.x, &p.x, &P), &P);
    let y3 = mod_sub(&mod_mul(&lambda, &mod_sub(&p.x, &x3, &P), &P), &p.y, &P);

    Ok(Point::new(x3, y3))
}

/// a + b. The identity is absorbed, equal points double, and mirror points
/// (x1 = x2, y1 = -y2) yield the identity rather than an error.
pub fn point_add(a: &Point, b: &Point) -> EngineResult<Point> {
    if a.infinity {
        return Ok(*b);
    }
    if b.infinity {
        return Ok(*a);
    }
    if a.x == b.x {
        if a.y == b.y {
            return point_double(a);
        }
        return Ok(Point::INFINITY);
    }

    // lambda = (y2 - y1) / (x2 - x1)
    let dy = mod_sub(&b.y, &a.y, &P);
    let dx = mod_sub(&b.x, &a.x, &P);
    let lambda = mod_mul(&dy, &mod_inverse(&dx, &P)?, &P);

    let lambda2 = mod_mul(&lambda, &lambda, &P);
    let x3 = mod_sub(&mod_sub(&lambda2, &a.x, &P), &b.x, &P);
    let y3 = mod_sub(&mod_mul(&lambda, &mod_sub(&a.x, &x3, &P), &P), &a.y, &P);

    Ok(Point::new(x3, y3))
}
