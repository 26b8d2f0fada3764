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

//! ECDSA verifier state machine.
//!
//! Checks u1*G + u2*Q against r with genuine point addition on the two
//! scaled points. Read-only with respect to signer state; shares nothing but
//! the curve constants.

use crate::arith::{mod_inverse, mod_mul, reduce, U256};
use crate::curve::{
    in_field_range, in_scalar_range, is_on_curve, multiply, point_add, Point, G, N,
};
use crate::engine::Phase;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerifierState {
    Idle,
    ValidateInputs,
    ComputeW,
    ComputeU1U2,
    ComputePoint,
    CheckResult,
    Complete,
    Error,
}

/// Six control states, one per tick.
const VERIFIER_TICK_BOUND: usize = 6;

pub struct Verifier {
    state: VerifierState,
    q: Point,
    z: U256,
    r: U256,
    s: U256,
    w: U256,
    u1: U256,
    u2: U256,
    candidate: Point,
    valid: bool,
    error: Option<EngineError>,
}

impl Verifier {
    pub fn new() -> Self {
        Self {
            state: VerifierState::Idle,
            q: Point::INFINITY,
            z: U256::ZERO,
            r: U256::ZERO,
            s: U256::ZERO,
            w: U256::ZERO,
            u1: U256::ZERO,
            u2: U256::ZERO,
            candidate: Point::INFINITY,
            valid: false,
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            VerifierState::Idle => Phase::Idle,
            VerifierState::Complete => Phase::Done,
            VerifierState::Error => Phase::Error,
            _ => Phase::Busy,
        }
    }

    pub fn error(&self) -> Option<EngineError> {
        self.error
    }

    /// True only after a completed run whose equation held.
    pub fn is_valid(&self) -> bool {
        self.state == VerifierState::Complete && self.valid
    }

    /// Latch public key, digest, and signature. Returns false (dropped)
    /// while busy.
    pub fn start(&mut self, q: &Point, digest: &[u8; 32], r: &U256, s: &U256) -> bool {
        if !self.phase().is_terminal() {
            return false;
        }
        self.error = None;
        self.valid = false;
        self.q = *q;
        self.z = reduce(&U256::from_bytes_be(digest), &N);
        self.r = *r;
        self.s = *s;
        self.w = U256::ZERO;
        self.u1 = U256::ZERO;
        self.u2 = U256::ZERO;
        self.candidate = Point::INFINITY;
        self.state = VerifierState::ValidateInputs;
        true
    }

    /// Advance one control state.
    pub fn tick(&mut self) {
        let step = match self.state {
            VerifierState::ValidateInputs => Self::validate_inputs,
            VerifierState::ComputeW => Self::compute_w,
            VerifierState::ComputeU1U2 => Self::compute_u1_u2,
            VerifierState::ComputePoint => Self::compute_point,
            VerifierState::CheckResult => Self::check_result,
            _ => return,
        };
        if let Err(e) = step(self) {
            self.error = Some(e);
            self.state = VerifierState::Error;
        }
    }

    fn validate_inputs(&mut self) -> EngineResult<()> {
        if !in_scalar_range(&self.r) || !in_scalar_range(&self.s) {
            return Err(EngineError::InvalidRange);
        }
        if self.q.infinity
            || !in_field_range(&self.q.x)
            || !in_field_range(&self.q.y)
            || !is_on_curve(&self.q)
        {
            return Err(EngineError::InvalidRange);
        }
        self.state = VerifierState::ComputeW;
        Ok(())
    }

    fn compute_w(&mut self) -> EngineResult<()> {
        self.w = mod_inverse(&self.s, &N)?;
        self.state = VerifierState::ComputeU1U2;
        Ok(())
    }

    fn compute_u1_u2(&mut self) -> EngineResult<()> {
        self.u1 = mod_mul(&self.z, &self.w, &N);
        self.u2 = mod_mul(&self.r, &self.w, &N);
        self.state = VerifierState::ComputePoint;
        Ok(())
    }

    fn compute_point(&mut self) -> EngineResult<()> {
        // u1 = 0 (digest a multiple of N) contributes the identity; the
        // multiplier itself refuses a zero scalar. u2 is a product of two
        // invertible residues and cannot be zero here.
        let p1 = if self.u1.is_zero() {
            Point::INFINITY
        } else {
            multiply(&self.u1, &G)?
        };
        let p2 = multiply(&self.u2, &self.q)?;
        self.candidate = point_add(&p1, &p2)?;
        self.state = VerifierState::CheckResult;
        Ok(())
    }

    fn check_result(&mut self) -> EngineResult<()> {
        if self.candidate.infinity {
            return Err(EngineError::InvalidSignature);
        }
        if reduce(&self.candidate.x, &N) != self.r {
            return Err(EngineError::InvalidSignature);
        }
        self.valid = true;
        self.state = VerifierState::Complete;
        Ok(())
    }

    /// Blocking bounded run; Ok(true) means the signature verified.
    pub fn run(&mut self) -> EngineResult<bool> {
        let mut ticks = 0usize;
        loop {
            match self.phase() {
                Phase::Done => return Ok(self.valid),
                Phase::Error => {
                    let e = self.error.unwrap_or(EngineError::InvalidSignature);
                    if e == EngineError::InvalidSignature {
                        // A mismatch is a negative answer, not a fault
                        return Ok(false);
                    }
                    return Err(e);
                }
                Phase::Idle => return Err(EngineError::InvalidSignature),
                Phase::Busy => {
                    if ticks >= VERIFIER_TICK_BOUND {
                        self.error = Some(EngineError::Timeout);
                        self.state = VerifierState::Error;
                        return Err(EngineError::Timeout);
                    }
                    self.tick();
                    ticks += 1;
                }
            }
        }
    }
}
