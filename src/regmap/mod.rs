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

//! Address-mapped control/status register file.
//!
//! The engine's external protocol: a caller writes operand banks, then the
//! control register with the start bit; polls the status register while
//! calling `tick()`; reads results back once done is set. A start pulse is
//! honored only when busy is clear; every write while busy is dropped, not
//! queued. 256-bit banks are eight 32-bit words, word 0 most significant.

use crate::arith::U256;
use crate::curve::Point;
use crate::engine::{FormattedSignature, Phase, Signer, Verifier};
use crate::error::EngineError;
use crate::keccak::KeccakUnit;
use crate::log::{self, Severity};

pub const REG_CTRL: usize = 0x000;
pub const REG_STATUS: usize = 0x004;
pub const REG_ERRCODE: usize = 0x008;
pub const REG_MSG_LEN: usize = 0x00C;
pub const REG_DIGEST: usize = 0x010;
pub const REG_PRIVKEY: usize = 0x030;
pub const REG_NONCE: usize = 0x050;
pub const REG_PUBKEY_X: usize = 0x070;
pub const REG_PUBKEY_Y: usize = 0x090;
pub const REG_SIG_R: usize = 0x0B0;
pub const REG_SIG_S: usize = 0x0D0;
pub const REG_SIG_V: usize = 0x0F0;
pub const REG_MSG: usize = 0x100;

/// Message buffer capacity for the Hash opcode, in bytes.
pub const MSG_CAPACITY: usize = 128;

pub const CTRL_START: u32 = 1 << 0;
pub const CTRL_OP_SHIFT: u32 = 1;
pub const CTRL_OP_MASK: u32 = 0b11 << CTRL_OP_SHIFT;

pub const STATUS_BUSY: u32 = 1 << 0;
pub const STATUS_DONE: u32 = 1 << 1;
pub const STATUS_ERROR: u32 = 1 << 2;
pub const STATUS_VALID: u32 = 1 << 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Sign = 0,
    Verify = 1,
    Hash = 2,
}

impl Opcode {
    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Opcode::Sign),
            1 => Some(Opcode::Verify),
            2 => Some(Opcode::Hash),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Opcode::Sign => "sign",
            Opcode::Verify => "verify",
            Opcode::Hash => "hash",
        }
    }
}

pub struct RegisterFile {
    digest: [u32; 8],
    privkey: [u32; 8],
    nonce: [u32; 8],
    pubkey_x: [u32; 8],
    pubkey_y: [u32; 8],
    sig_r: [u32; 8],
    sig_s: [u32; 8],
    sig_v: u32,
    msg: [u8; MSG_CAPACITY],
    msg_len: u32,
    status: u32,
    errcode: u32,
    signer: Signer,
    verifier: Verifier,
    hasher: KeccakUnit,
    active: Option<Opcode>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            digest: [0; 8],
            privkey: [0; 8],
            nonce: [0; 8],
            pubkey_x: [0; 8],
            pubkey_y: [0; 8],
            sig_r: [0; 8],
            sig_s: [0; 8],
            sig_v: 0,
            msg: [0; MSG_CAPACITY],
            msg_len: 0,
            status: 0,
            errcode: 0,
            signer: Signer::new(),
            verifier: Verifier::new(),
            hasher: KeccakUnit::new(),
            active: None,
        }
    }

    pub fn busy(&self) -> bool {
        self.status & STATUS_BUSY != 0
    }

    pub fn done(&self) -> bool {
        self.status & STATUS_DONE != 0
    }

    pub fn error(&self) -> bool {
        self.status & STATUS_ERROR != 0
    }

    /// Register write. Dropped entirely while busy.
    pub fn write(&mut self, offset: usize, value: u32) {
        if self.busy() {
            return;
        }
        match offset {
            REG_CTRL => {
                if value & CTRL_START != 0 {
                    let bits = (value & CTRL_OP_MASK) >> CTRL_OP_SHIFT;
                    self.begin(bits);
                }
            }
            REG_MSG_LEN => self.msg_len = value,
            _ => {
                if let Some((bank, word)) = Self::bank_for(offset) {
                    match bank {
                        Bank::Digest => self.digest[word] = value,
                        Bank::Privkey => self.privkey[word] = value,
                        Bank::Nonce => self.nonce[word] = value,
                        Bank::PubkeyX => self.pubkey_x[word] = value,
                        Bank::PubkeyY => self.pubkey_y[word] = value,
                        Bank::SigR => self.sig_r[word] = value,
                        Bank::SigS => self.sig_s[word] = value,
                    }
                } else if offset >= REG_MSG && offset < REG_MSG + MSG_CAPACITY {
                    let byte = offset - REG_MSG;
                    if byte % 4 == 0 {
                        self.msg[byte..byte + 4].copy_from_slice(&value.to_le_bytes());
                    }
                }
                // unmapped offsets are ignored
            }
        }
    }

    /// Register read. Always permitted.
    pub fn read(&self, offset: usize) -> u32 {
        match offset {
            REG_CTRL => 0,
            REG_STATUS => self.status,
            REG_ERRCODE => self.errcode,
            REG_MSG_LEN => self.msg_len,
            REG_SIG_V => self.sig_v,
            _ => {
                if let Some((bank, word)) = Self::bank_for(offset) {
                    match bank {
                        Bank::Digest => self.digest[word],
                        Bank::Privkey => self.privkey[word],
                        Bank::Nonce => self.nonce[word],
                        Bank::PubkeyX => self.pubkey_x[word],
                        Bank::PubkeyY => self.pubkey_y[word],
                        Bank::SigR => self.sig_r[word],
                        Bank::SigS => self.sig_s[word],
                    }
                } else if offset >= REG_MSG && offset < REG_MSG + MSG_CAPACITY {
                    let byte = offset - REG_MSG;
                    if byte % 4 == 0 {
                        u32::from_le_bytes([
                            self.msg[byte], self.msg[byte + 1],
                            self.msg[byte + 2], self.msg[byte + 3],
                        ])
                    } else {
                        0
                    }
                } else {
                    0
                }
            }
        }
    }

    fn bank_for(offset: usize) -> Option<(Bank, usize)> {
        let banks = [
            (REG_DIGEST, Bank::Digest),
            (REG_PRIVKEY, Bank::Privkey),
            (REG_NONCE, Bank::Nonce),
            (REG_PUBKEY_X, Bank::PubkeyX),
            (REG_PUBKEY_Y, Bank::PubkeyY),
            (REG_SIG_R, Bank::SigR),
            (REG_SIG_S, Bank::SigS),
        ];
        for (base, bank) in banks {
            if offset >= base && offset < base + 32 && (offset - base) % 4 == 0 {
                return Some((bank, (offset - base) / 4));
            }
        }
        None
    }

    fn begin(&mut self, opcode_bits: u32) {
        self.status &= !(STATUS_DONE | STATUS_ERROR | STATUS_VALID);
        self.errcode = 0;

        let opcode = match Opcode::from_bits(opcode_bits) {
            Some(op) => op,
            None => {
                self.raise(EngineError::InvalidRange);
                return;
            }
        };

        log::log(Severity::Debug, opcode.name());

        match opcode {
            Opcode::Sign => {
                let d = U256::from_words_be(&self.privkey);
                let k = U256::from_words_be(&self.nonce);
                let digest = U256::from_words_be(&self.digest).to_bytes_be();
                self.signer.start(&d, &k, &digest);
            }
            Opcode::Verify => {
                let q = Point::new(
                    U256::from_words_be(&self.pubkey_x),
                    U256::from_words_be(&self.pubkey_y),
                );
                let digest = U256::from_words_be(&self.digest).to_bytes_be();
                let r = U256::from_words_be(&self.sig_r);
                let s = U256::from_words_be(&self.sig_s);
                self.verifier.start(&q, &digest, &r, &s);
            }
            Opcode::Hash => {
                let len = self.msg_len as usize;
                if len > MSG_CAPACITY {
                    self.raise(EngineError::InvalidRange);
                    return;
                }
                self.hasher.start(&self.msg[..len]);
            }
        }

        self.active = Some(opcode);
        self.status |= STATUS_BUSY;
    }

    /// Advance the active operation by one step. A no-op when idle.
    pub fn tick(&mut self) {
        let opcode = match self.active {
            Some(op) => op,
            None => return,
        };
        match opcode {
            Opcode::Sign => {
                self.signer.tick();
                match self.signer.phase() {
                    Phase::Done => self.finish_sign(),
                    Phase::Error => {
                        let e = self
                            .signer
                            .error()
                            .unwrap_or(EngineError::InvalidSignature);
                        self.finish_error(e);
                    }
                    _ => {}
                }
            }
            Opcode::Verify => {
                self.verifier.tick();
                match self.verifier.phase() {
                    Phase::Done => {
                        if self.verifier.is_valid() {
                            self.status |= STATUS_VALID;
                        }
                        self.finish_done();
                    }
                    Phase::Error => {
                        let e = self
                            .verifier
                            .error()
                            .unwrap_or(EngineError::InvalidSignature);
                        self.finish_error(e);
                    }
                    _ => {}
                }
            }
            Opcode::Hash => {
                self.hasher.step();
                match self.hasher.phase() {
                    Phase::Done => {
                        if let Some(digest) = self.hasher.digest() {
                            self.digest = U256::from_bytes_be(&digest).to_words_be();
                        }
                        self.finish_done();
                    }
                    Phase::Error => self.finish_error(EngineError::Timeout),
                    _ => {}
                }
            }
        }
    }

    /// Drive the active operation to a terminal status, bounded by the
    /// worst-case tick count of any opcode.
    pub fn run_to_completion(&mut self) -> u32 {
        // signer retry budget dominates; generous fixed ceiling
        const TICK_CEILING: usize = 4096;
        let mut ticks = 0;
        while self.busy() && ticks < TICK_CEILING {
            self.tick();
            ticks += 1;
        }
        if self.busy() {
            self.finish_error(EngineError::Timeout);
        }
        self.status
    }

    fn finish_sign(&mut self) {
        let parts = match self.signer.signature() {
            Some(p) => p,
            None => {
                self.finish_error(EngineError::InvalidSignature);
                return;
            }
        };
        let formatted = FormattedSignature::from_parts(&parts);
        if let Some(e) = formatted.error {
            self.finish_error(e);
            return;
        }
        self.sig_r = formatted.r.to_words_be();
        self.sig_s = formatted.s.to_words_be();
        self.sig_v = formatted.recovery_id as u32;
        self.finish_done();
    }

    fn finish_done(&mut self) {
        self.active = None;
        self.status &= !STATUS_BUSY;
        self.status |= STATUS_DONE;
        log::log(Severity::Info, "operation complete");
    }

    fn finish_error(&mut self, e: EngineError) {
        self.active = None;
        self.raise(e);
    }

    fn raise(&mut self, e: EngineError) {
        self.status &= !STATUS_BUSY;
        self.status |= STATUS_ERROR;
        self.errcode = e.code();
        log::log(Severity::Error, e.as_str());
    }
}

enum Bank {
    Digest,
    Privkey,
    Nonce,
    PubkeyX,
    PubkeyY,
    SigR,
    SigS,
}
