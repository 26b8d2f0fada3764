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

//! Orchestrator units: nonce staging, signer, verifier, output formatting.

mod format;
mod nonce;
mod signer;
mod verifier;

pub use format::{canonicalize, FormattedSignature, TxMetadata};
pub use nonce::{NonceHandler, NONCE_RETRY_LIMIT};
pub use signer::{SignatureParts, Signer};
pub use verifier::Verifier;

/// Handshake phase shared by every unit.
///
/// A unit accepts a new start only from a terminal phase (`Idle`, `Done`,
/// `Error`); a start pulse while `Busy` is dropped. This is the backpressure
/// mechanism, there is no queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Busy,
    Done,
    Error,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::Busy)
    }
}
