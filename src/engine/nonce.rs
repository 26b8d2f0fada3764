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

//! Nonce staging and validation.
//!
//! Nonce generation is the caller's responsibility (RFC 6979 or a CSPRNG);
//! this unit only gatekeeps the supplied scalar. The deterministic rederive
//! path exists solely for the signer's mandatory r=0/s=0 retry.

use crate::arith::{reduce, U256};
use crate::curve::{in_scalar_range, N};
use crate::error::{EngineError, EngineResult};
use crate::keccak::keccak256;

/// Retry budget for the r=0/s=0 path. Each retry failing again has
/// probability around 2^-256, so hitting the limit means corrupted state.
pub const NONCE_RETRY_LIMIT: u8 = 8;

pub struct NonceHandler {
    staged: Option<U256>,
    retries: u8,
}

impl NonceHandler {
    pub fn new() -> Self {
        Self { staged: None, retries: 0 }
    }

    /// Validate and stage an externally supplied nonce.
    pub fn stage(&mut self, k: &U256) -> EngineResult<()> {
        if !in_scalar_range(k) {
            return Err(EngineError::InvalidRange);
        }
        self.staged = Some(*k);
        self.retries = 0;
        Ok(())
    }

    pub fn current(&self) -> EngineResult<U256> {
        self.staged.ok_or(EngineError::ArithmeticFailure)
    }

    /// Derive a replacement nonce: k' = Keccak-256(k || z) mod N, ratcheted
    /// until the result lands in [1, N-1]. Fails with `InvalidSignature`
    /// once the retry budget is spent.
    pub fn rederive(&mut self, digest: &[u8; 32]) -> EngineResult<U256> {
        if self.retries >= NONCE_RETRY_LIMIT {
            return Err(EngineError::InvalidSignature);
        }
        self.retries += 1;

        let mut seed = self.current()?.to_bytes_be();
        for _ in 0..NONCE_RETRY_LIMIT {
            let mut material = [0u8; 64];
            material[..32].copy_from_slice(&seed);
            material[32..].copy_from_slice(digest);
            seed = keccak256(&material);
            let candidate = reduce(&U256::from_bytes_be(&seed), &N);
            if in_scalar_range(&candidate) {
                self.staged = Some(candidate);
                return Ok(candidate);
            }
        }
        Err(EngineError::ArithmeticFailure)
    }

    pub fn retries(&self) -> u8 {
        self.retries
    }

    /// Volatile-zero the staged secret.
    pub fn wipe(&mut self) {
        if let Some(k) = self.staged.as_mut() {
            k.wipe();
        }
        self.staged = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::N_HALF;

    #[test]
    fn stage_enforces_scalar_range() {
        let mut handler = NonceHandler::new();
        assert_eq!(handler.stage(&U256::ZERO), Err(EngineError::InvalidRange));
        assert_eq!(handler.stage(&N), Err(EngineError::InvalidRange));
        assert!(handler.stage(&U256::ONE).is_ok());
        assert_eq!(handler.current().unwrap(), U256::ONE);
    }

    #[test]
    fn rederive_produces_fresh_valid_nonce() {
        let mut handler = NonceHandler::new();
        handler.stage(&N_HALF).unwrap();
        let digest = keccak256(b"retry");
        let fresh = handler.rederive(&digest).unwrap();
        assert!(in_scalar_range(&fresh));
        assert_ne!(fresh, N_HALF);
        assert_eq!(handler.current().unwrap(), fresh);
        assert_eq!(handler.retries(), 1);
    }

    #[test]
    fn rederive_budget_is_enforced() {
        let mut handler = NonceHandler::new();
        handler.stage(&U256::ONE).unwrap();
        let digest = [0u8; 32];
        for _ in 0..NONCE_RETRY_LIMIT {
            handler.rederive(&digest).unwrap();
        }
        assert_eq!(
            handler.rederive(&digest),
            Err(EngineError::InvalidSignature)
        );
    }

    #[test]
    fn wipe_discards_staged_nonce() {
        let mut handler = NonceHandler::new();
        handler.stage(&U256::ONE).unwrap();
        handler.wipe();
        assert!(handler.current().is_err());
    }
}
