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

//! Keccak-256 sponge built on Keccak-f[1600].
//!
//! `keccak256` is the pure one-shot digest. `KeccakUnit` is the tick-driven
//! face of the same permutation: one round per step, 24 steps per absorbed
//! block, so latency is exactly 24 * ceil((len + 1) / RATE) steps.

use alloc::vec::Vec;

use crate::engine::Phase;
use crate::error::{EngineError, EngineResult};

/// Rate of Keccak-256 in bytes (capacity 512 bits of the 1600-bit state).
pub const RATE: usize = 136;

pub const ROUNDS: usize = 24;

const ROUND_CONSTANTS: [u64; 24] = [
    0x0000000000000001, 0x0000000000008082, 0x800000000000808a, 0x8000000080008000,
    0x000000000000808b, 0x0000000080000001, 0x8000000080008081, 0x8000000000008009,
    0x000000000000008a, 0x0000000000000088, 0x0000000080008009, 0x000000008000000a,
    0x000000008000808b, 0x800000000000008b, 0x8000000000008089, 0x8000000000008003,
    0x8000000000008002, 0x8000000000000080, 0x000000000000800a, 0x800000008000000a,
    0x8000000080008081, 0x8000000000008080, 0x0000000080000001, 0x8000000080008008,
];

const RHO_OFFSETS: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

const PI_LANE: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// One round of theta/rho/pi/chi/iota.
fn keccak_round(state: &mut [u64; 25], round: usize) {
    let mut c = [0u64; 5];
    for x in 0..5 {
        c[x] = state[x] ^ state[x + 5] ^ state[x + 10] ^ state[x + 15] ^ state[x + 20];
    }

    let mut d = [0u64; 5];
    for x in 0..5 {
        d[x] = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
    }

    for x in 0..5 {
        for y in 0..5 {
            state[y * 5 + x] ^= d[x];
        }
    }

    let mut current = state[1];
    for i in 0..24 {
        let j = PI_LANE[i];
        let temp = state[j];
        state[j] = current.rotate_left(RHO_OFFSETS[i]);
        current = temp;
    }

    for y in 0..5 {
        let t = [
            state[y * 5], state[y * 5 + 1], state[y * 5 + 2],
            state[y * 5 + 3], state[y * 5 + 4],
        ];
        for x in 0..5 {
            state[y * 5 + x] = t[x] ^ ((!t[(x + 1) % 5]) & t[(x + 2) % 5]);
        }
    }

    state[0] ^= ROUND_CONSTANTS[round];
}

/// The full 24-round permutation.
pub fn keccak_f(state: &mut [u64; 25]) {
    for round in 0..ROUNDS {
        keccak_round(state, round);
    }
}

/// Keccak padding: 0x01 domain byte, zero fill, 0x80 on the final byte.
/// The two markers share a byte (0x81) when the message fills the block to
/// one byte short of the rate.
fn pad(data: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(data.len() + RATE);
    buffer.extend_from_slice(data);
    buffer.push(0x01);
    while buffer.len() % RATE != 0 {
        buffer.push(0);
    }
    let last = buffer.len() - 1;
    buffer[last] |= 0x80;
    buffer
}

fn xor_block(state: &mut [u64; 25], block: &[u8]) {
    for (i, &byte) in block.iter().enumerate() {
        state[i / 8] ^= (byte as u64) << ((i % 8) * 8);
    }
}

fn extract_digest(state: &[u64; 25]) -> [u8; 32] {
    let mut digest = [0u8; 32];
    for lane in 0..4 {
        digest[lane * 8..lane * 8 + 8].copy_from_slice(&state[lane].to_le_bytes());
    }
    digest
}

/// One-shot Keccak-256 digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut state = [0u64; 25];
    let buffer = pad(data);
    for block in buffer.chunks_exact(RATE) {
        xor_block(&mut state, block);
        keccak_f(&mut state);
    }
    extract_digest(&state)
}

/// Tick-driven sponge unit: start/busy/done handshake, one permutation round
/// per step.
pub struct KeccakUnit {
    state: [u64; 25],
    buffer: Vec<u8>,
    block: usize,
    round: usize,
    phase: Phase,
    digest: [u8; 32],
}

impl KeccakUnit {
    pub fn new() -> Self {
        Self {
            state: [0u64; 25],
            buffer: Vec::new(),
            block: 0,
            round: 0,
            phase: Phase::Idle,
            digest: [0u8; 32],
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Latch a message and begin absorbing. Returns false (dropped) while busy.
    pub fn start(&mut self, data: &[u8]) -> bool {
        if !self.phase.is_terminal() {
            return false;
        }
        self.state = [0u64; 25];
        self.buffer = pad(data);
        self.block = 0;
        self.round = 0;
        self.digest = [0u8; 32];
        xor_block(&mut self.state, &self.buffer[..RATE]);
        self.phase = Phase::Busy;
        true
    }

    /// Advance one permutation round.
    pub fn step(&mut self) {
        if self.phase != Phase::Busy {
            return;
        }
        keccak_round(&mut self.state, self.round);
        self.round += 1;
        if self.round == ROUNDS {
            self.round = 0;
            self.block += 1;
            if (self.block + 1) * RATE <= self.buffer.len() {
                let offset = self.block * RATE;
                xor_block(&mut self.state, &self.buffer[offset..offset + RATE]);
            } else {
                self.digest = extract_digest(&self.state);
                self.phase = Phase::Done;
            }
        }
    }

    pub fn digest(&self) -> Option<[u8; 32]> {
        if self.phase == Phase::Done {
            Some(self.digest)
        } else {
            None
        }
    }

    /// Blocking bounded run; `Timeout` if the step bound is exceeded.
    pub fn run(&mut self) -> EngineResult<[u8; 32]> {
        let bound = (self.buffer.len() / RATE) * ROUNDS;
        let mut steps = 0usize;
        loop {
            match self.phase {
                Phase::Done => return Ok(self.digest),
                Phase::Busy => {
                    if steps > bound {
                        self.phase = Phase::Error;
                        return Err(EngineError::Timeout);
                    }
                    self.step();
                    steps += 1;
                }
                Phase::Idle | Phase::Error => return Err(EngineError::Timeout),
            }
        }
    }
}

impl Drop for KeccakUnit {
    fn drop(&mut self) {
        for lane in &mut self.state {
            unsafe { core::ptr::write_volatile(lane, 0) };
        }
        for byte in &mut self.buffer {
            unsafe { core::ptr::write_volatile(byte, 0) };
        }
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }
}
