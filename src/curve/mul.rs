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

//! Double-and-add scalar multiplication as an explicit 256-step state
//! machine, MSB first. One doubling plus conditional addition per step; this
//! is the dominant latency of both signing and verification.

use crate::arith::U256;
use crate::curve::point::{point_add, point_double, Point};
use crate::engine::Phase;
use crate::error::{EngineError, EngineResult};

/// One step per scalar bit.
pub const SCALAR_MUL_STEPS: usize = 256;

enum MulState {
    Idle,
    Run { bit: usize },
    Done,
    Error,
}

pub struct ScalarMul {
    state: MulState,
    k: U256,
    base: Point,
    acc: Point,
    error: Option<EngineError>,
}

impl ScalarMul {
    pub fn new() -> Self {
        Self {
            state: MulState::Idle,
            k: U256::ZERO,
            base: Point::INFINITY,
            acc: Point::INFINITY,
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            MulState::Idle => Phase::Idle,
            MulState::Run { .. } => Phase::Busy,
            MulState::Done => Phase::Done,
            MulState::Error => Phase::Error,
        }
    }

    pub fn error(&self) -> Option<EngineError> {
        self.error
    }

    /// Result of the last completed multiplication. May legitimately be the
    /// point at infinity (k a multiple of the group order).
    pub fn result(&self) -> Option<Point> {
        match self.state {
            MulState::Done => Some(self.acc),
            _ => None,
        }
    }

    /// Latch k and the base point. k = 0 has no defined result and parks the
    /// unit in the error state. Returns false (dropped) while busy.
    pub fn start(&mut self, k: &U256, base: &Point) -> bool {
        if !self.phase().is_terminal() {
            return false;
        }
        self.error = None;
        self.acc = Point::INFINITY;
        self.base = *base;
        self.k = *k;
        if k.is_zero() {
            self.error = Some(EngineError::ArithmeticFailure);
            self.state = MulState::Error;
        } else {
            self.state = MulState::Run { bit: SCALAR_MUL_STEPS - 1 };
        }
        true
    }

    /// Process one scalar bit.
    pub fn step(&mut self) {
        let bit = match self.state {
            MulState::Run { bit } => bit,
            _ => return,
        };

        let doubled = match point_double(&self.acc) {
            Ok(p) => p,
            Err(e) => return self.fail(e),
        };
        self.acc = doubled;

        if self.k.bit(bit) {
            match point_add(&self.acc, &self.base) {
                Ok(p) => self.acc = p,
                Err(e) => return self.fail(e),
            }
        }

        self.state = if bit == 0 {
            MulState::Done
        } else {
            MulState::Run { bit: bit - 1 }
        };
    }

    fn fail(&mut self, e: EngineError) {
        self.error = Some(e);
        self.state = MulState::Error;
    }

    /// Blocking bounded run of a whole multiplication.
    pub fn run(&mut self) -> EngineResult<Point> {
        let mut steps = 0usize;
        loop {
            match self.state {
                MulState::Done => return Ok(self.acc),
                MulState::Error => {
                    return Err(self.error.unwrap_or(EngineError::ArithmeticFailure))
                }
                MulState::Idle => return Err(EngineError::ArithmeticFailure),
                MulState::Run { .. } => {
                    if steps >= SCALAR_MUL_STEPS {
                        self.fail(EngineError::Timeout);
                        return Err(EngineError::Timeout);
                    }
                    self.step();
                    steps += 1;
                }
            }
        }
    }
}

/// k * base as a single blocking call.
pub fn multiply(k: &U256, base: &Point) -> EngineResult<Point> {
    let mut unit = ScalarMul::new();
    unit.start(k, base);
    unit.run()
}
