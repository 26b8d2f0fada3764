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

//! Engine-wide error taxonomy.
//!
//! Every unit reports failure as one of four kinds. The register interface
//! surfaces the kind through the ERRCODE register next to the status error
//! bit; nothing is ever thrown past a unit boundary.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Scalar outside [1, N-1], or coordinate outside [0, P-1].
    InvalidRange,
    /// Non-invertible modular inverse or zero scalar multiplication.
    ArithmeticFailure,
    /// Verification mismatch or signer/formatter self-check failure.
    InvalidSignature,
    /// A state machine exceeded its step bound.
    Timeout,
}

impl EngineError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRange => "Scalar out of range",
            Self::ArithmeticFailure => "Arithmetic failure",
            Self::InvalidSignature => "Invalid signature",
            Self::Timeout => "Step bound exceeded",
        }
    }

    /// Stable value for the ERRCODE register. Zero is reserved for "no error".
    pub const fn code(&self) -> u32 {
        match self {
            Self::InvalidRange => 1,
            Self::ArithmeticFailure => 2,
            Self::InvalidSignature => 3,
            Self::Timeout => 4,
        }
    }
}

pub type EngineResult<T> = core::result::Result<T, EngineError>;
