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

//! Chain-hashed event log.
//!
//! Ring buffer of engine events, each entry cryptographically linked to its
//! predecessor through the crate's own Keccak-256 unit for tamper evidence.
//! Severities below the floor are discarded at the call site.

use alloc::vec::Vec;

use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

use crate::keccak::keccak256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

#[derive(Clone)]
pub struct LogEntry {
    pub sequence: u64,
    pub severity: Severity,
    pub message: heapless::String<128>,
    pub hash: [u8; 32],
    pub prev_hash: [u8; 32],
}

const LOG_CAPACITY: usize = 64;

pub struct EventLog {
    entries: Mutex<heapless::Deque<LogEntry, LOG_CAPACITY>>,
    prev_hash: Mutex<[u8; 32]>,
    sequence: AtomicU64,
    min_level: Mutex<Severity>,
}

static EVENT_LOG: EventLog = EventLog {
    entries: Mutex::new(heapless::Deque::new()),
    prev_hash: Mutex::new([0; 32]),
    sequence: AtomicU64::new(0),
    min_level: Mutex::new(Severity::Warn),
};

fn entry_hash(sequence: u64, severity: Severity, message: &str, prev: &[u8; 32]) -> [u8; 32] {
    let mut data = Vec::with_capacity(message.len() + 41);
    data.extend_from_slice(&sequence.to_le_bytes());
    data.push(severity as u8);
    data.extend_from_slice(message.as_bytes());
    data.extend_from_slice(prev);
    keccak256(&data)
}

/// Record an event. Messages longer than the entry capacity are truncated.
pub fn log(severity: Severity, msg: &str) {
    if severity < *EVENT_LOG.min_level.lock() {
        return;
    }

    let sequence = EVENT_LOG.sequence.fetch_add(1, Ordering::SeqCst);

    let mut message: heapless::String<128> = heapless::String::new();
    let mut take = core::cmp::min(msg.len(), 128);
    while !msg.is_char_boundary(take) {
        take -= 1;
    }
    let _ = message.push_str(&msg[..take]);

    let prev_hash = *EVENT_LOG.prev_hash.lock();
    let hash = entry_hash(sequence, severity, &message, &prev_hash);

    let entry = LogEntry { sequence, severity, message, hash, prev_hash };

    {
        let mut entries = EVENT_LOG.entries.lock();
        if entries.is_full() {
            let _ = entries.pop_front();
        }
        let _ = entries.push_back(entry);
    }

    *EVENT_LOG.prev_hash.lock() = hash;
}

pub fn set_min_level(severity: Severity) {
    *EVENT_LOG.min_level.lock() = severity;
}

/// Head of the hash chain.
pub fn chain_hash() -> [u8; 32] {
    *EVENT_LOG.prev_hash.lock()
}

pub fn export_recent(count: usize) -> Vec<LogEntry> {
    let entries = EVENT_LOG.entries.lock();
    let skip = entries.len().saturating_sub(count);
    entries.iter().skip(skip).cloned().collect()
}

/// Recompute every stored hash link.
pub fn verify_chain() -> bool {
    let entries = EVENT_LOG.entries.lock();
    for entry in entries.iter() {
        let expected = entry_hash(
            entry.sequence,
            entry.severity,
            &entry.message,
            &entry.prev_hash,
        );
        if expected != entry.hash {
            return false;
        }
    }
    true
}
