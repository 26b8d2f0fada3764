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

//! Clock-synchronous secp256k1 signing/verification engine.
//!
//! A deterministic ECDSA sign/verify core plus a Keccak-256 sponge unit,
//! driven through an address-mapped register file with a start/busy/done/
//! error handshake. Every unit is an explicit state machine advanced one
//! step per tick; sub-unit invocations are blocking, step-bounded runs.
//! Nonce generation and side-channel hardening are out of scope.

#![cfg_attr(not(test), no_std)]
#![deny(warnings)]
#![deny(unused_must_use, unused_imports, unused_variables, unused_mut)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod arith;
pub mod curve;
pub mod engine;
pub mod error;
pub mod keccak;
pub mod log;
pub mod regmap;

pub use error::{EngineError, EngineResult};
pub use regmap::RegisterFile;
