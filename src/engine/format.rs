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

//! Output formatting: low-s canonicalization, recovery id, 65-byte packing,
//! and the transaction-metadata record consumed downstream.

use crate::arith::U256;
use crate::curve::{in_scalar_range, N, N_HALF};
use crate::engine::signer::SignatureParts;
use crate::error::EngineError;

/// Canonicalize s to the lower half of N, flipping the recovery parity when
/// s is replaced by N - s. Idempotent: a low s passes through unchanged.
pub fn canonicalize(s: &U256, y_parity: u8) -> (U256, u8) {
    if *s > N_HALF {
        (N.wrapping_sub(s), y_parity ^ 1)
    } else {
        (*s, y_parity)
    }
}

/// Canonical signature plus packed wire form. `error` is a flag, not a
/// thrown condition: a formatter self-check failure still yields a record.
#[derive(Clone, Copy, Debug)]
pub struct FormattedSignature {
    pub r: U256,
    pub s: U256,
    pub recovery_id: u8,
    pub packed: [u8; 65],
    pub error: Option<EngineError>,
}

impl FormattedSignature {
    pub fn from_parts(parts: &SignatureParts) -> Self {
        let (s, recovery_id) = canonicalize(&parts.s, parts.y_parity);

        let mut packed = [0u8; 65];
        packed[..32].copy_from_slice(&parts.r.to_bytes_be());
        packed[32..64].copy_from_slice(&s.to_bytes_be());
        packed[64] = recovery_id;

        let error = if !in_scalar_range(&parts.r)
            || !in_scalar_range(&s)
            || recovery_id > 1
        {
            Some(EngineError::InvalidSignature)
        } else {
            None
        };

        Self { r: parts.r, s, recovery_id, packed, error }
    }
}

/// Metadata record for a downstream submitter; legacy v = 27 + recovery id.
#[derive(Clone, Copy, Debug)]
pub struct TxMetadata {
    pub digest: [u8; 32],
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl TxMetadata {
    pub fn new(digest: &[u8; 32], sig: &FormattedSignature) -> Self {
        Self {
            digest: *digest,
            r: sig.r.to_bytes_be(),
            s: sig.s.to_bytes_be(),
            v: 27 + sig.recovery_id,
        }
    }
}
