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

//! ECDSA signer state machine.
//!
//! One control state per tick; each state performs a single blocking,
//! step-bounded sub-unit run (scalar multiply, modular inverse, modular
//! multiply/add). r = (k*G).x mod N, s = k^-1 * (z + r*d) mod N.

use crate::arith::{mod_add, mod_inverse, mod_mul, reduce, U256};
use crate::curve::{in_scalar_range, multiply, Point, G, N};
use crate::engine::nonce::NonceHandler;
use crate::engine::Phase;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignerState {
    Idle,
    ComputeR,
    ComputeKInverse,
    ComputeS,
    ComputeRecoveryId,
    Validate,
    Complete,
    Error,
}

/// Raw signature components before canonicalization.
#[derive(Clone, Copy, Debug)]
pub struct SignatureParts {
    pub r: U256,
    pub s: U256,
    /// Parity of the ephemeral point's y coordinate (1 = odd).
    pub y_parity: u8,
}

/// Upper bound on signer ticks: six states per attempt, every attempt after
/// the first caused by the vanishing r=0/s=0 event.
const SIGNER_TICK_BOUND: usize = 6 * (1 + crate::engine::nonce::NONCE_RETRY_LIMIT as usize);

pub struct Signer {
    state: SignerState,
    nonce: NonceHandler,
    digest: [u8; 32],
    d: U256,
    z: U256,
    k: U256,
    k_inv: U256,
    r_point: Point,
    r: U256,
    s: U256,
    y_parity: u8,
    error: Option<EngineError>,
}

impl Signer {
    pub fn new() -> Self {
        Self {
            state: SignerState::Idle,
            nonce: NonceHandler::new(),
            digest: [0u8; 32],
            d: U256::ZERO,
            z: U256::ZERO,
            k: U256::ZERO,
            k_inv: U256::ZERO,
            r_point: Point::INFINITY,
            r: U256::ZERO,
            s: U256::ZERO,
            y_parity: 0,
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            SignerState::Idle => Phase::Idle,
            SignerState::Complete => Phase::Done,
            SignerState::Error => Phase::Error,
            _ => Phase::Busy,
        }
    }

    pub fn error(&self) -> Option<EngineError> {
        self.error
    }

    pub fn signature(&self) -> Option<SignatureParts> {
        match self.state {
            SignerState::Complete => Some(SignatureParts {
                r: self.r,
                s: self.s,
                y_parity: self.y_parity,
            }),
            _ => None,
        }
    }

    /// Latch private key, nonce, and digest. Range failures park the unit in
    /// the error state, observed on the next tick through the handshake.
    /// Returns false (dropped) while busy.
    pub fn start(&mut self, d: &U256, k: &U256, digest: &[u8; 32]) -> bool {
        if !self.phase().is_terminal() {
            return false;
        }
        self.error = None;
        self.digest = *digest;
        self.d = *d;
        self.z = reduce(&U256::from_bytes_be(digest), &N);
        self.k = U256::ZERO;
        self.k_inv = U256::ZERO;
        self.r_point = Point::INFINITY;
        self.r = U256::ZERO;
        self.s = U256::ZERO;
        self.y_parity = 0;

        if !in_scalar_range(d) {
            self.fail(EngineError::InvalidRange);
            return true;
        }
        if let Err(e) = self.nonce.stage(k) {
            self.fail(e);
            return true;
        }
        self.state = SignerState::ComputeR;
        true
    }

    /// Advance one control state.
    pub fn tick(&mut self) {
        let step = match self.state {
            SignerState::ComputeR => Self::compute_r,
            SignerState::ComputeKInverse => Self::compute_k_inverse,
            SignerState::ComputeS => Self::compute_s,
            SignerState::ComputeRecoveryId => Self::compute_recovery_id,
            SignerState::Validate => Self::validate,
            _ => return,
        };
        if let Err(e) = step(self) {
            self.fail(e);
        }
    }

    fn compute_r(&mut self) -> EngineResult<()> {
        self.k = self.nonce.current()?;
        self.r_point = multiply(&self.k, &G)?;
        if self.r_point.infinity {
            // k was a multiple of N; staging should have rejected it
            return Err(EngineError::ArithmeticFailure);
        }
        self.r = reduce(&self.r_point.x, &N);
        self.state = SignerState::ComputeKInverse;
        Ok(())
    }

    fn compute_k_inverse(&mut self) -> EngineResult<()> {
        self.k_inv = mod_inverse(&self.k, &N)?;
        self.state = SignerState::ComputeS;
        Ok(())
    }

    fn compute_s(&mut self) -> EngineResult<()> {
        let rd = mod_mul(&self.r, &self.d, &N);
        self.s = mod_mul(&self.k_inv, &mod_add(&self.z, &rd, &N), &N);
        self.state = SignerState::ComputeRecoveryId;
        Ok(())
    }

    fn compute_recovery_id(&mut self) -> EngineResult<()> {
        self.y_parity = if self.r_point.y.is_even() { 0 } else { 1 };
        self.state = SignerState::Validate;
        Ok(())
    }

    fn validate(&mut self) -> EngineResult<()> {
        if self.r.is_zero() || self.s.is_zero() {
            // Mandatory retry with a rederived nonce; the handler enforces
            // the attempt budget and fails with InvalidSignature past it.
            self.nonce.rederive(&self.digest)?;
            self.state = SignerState::ComputeR;
            return Ok(());
        }
        self.state = SignerState::Complete;
        self.wipe_secrets();
        Ok(())
    }

    fn fail(&mut self, e: EngineError) {
        self.error = Some(e);
        self.state = SignerState::Error;
        self.wipe_secrets();
    }

    fn wipe_secrets(&mut self) {
        self.d.wipe();
        self.k.wipe();
        self.k_inv.wipe();
        self.nonce.wipe();
    }

    /// Blocking bounded run of a whole signing operation.
    pub fn run(&mut self) -> EngineResult<SignatureParts> {
        let mut ticks = 0usize;
        loop {
            match self.phase() {
                Phase::Done => {
                    return self.signature().ok_or(EngineError::InvalidSignature)
                }
                Phase::Error => {
                    return Err(self.error.unwrap_or(EngineError::InvalidSignature))
                }
                Phase::Idle => return Err(EngineError::InvalidSignature),
                Phase::Busy => {
                    if ticks >= SIGNER_TICK_BOUND {
                        self.fail(EngineError::Timeout);
                        return Err(EngineError::Timeout);
                    }
                    self.tick();
                    ticks += 1;
                }
            }
        }
    }
}
