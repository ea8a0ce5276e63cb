// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node table: everything this DANP knows about its peers.
//!
//! A fixed-bucket hash map keyed by MAC address. The RX path is the hot
//! writer (it refreshes liveness and may reclassify), TX is a read-only
//! consumer, and the pruner sweeps stale entries; a single
//! reader-writer lock over the bucket array gives each of them a
//! consistent view - an entry can never disappear or change shape while
//! a guard is held.

pub mod entry;
pub mod window;

pub use entry::{NodeEntry, NodeSnapshot};
pub use window::{Accept, DuplicateWindow};

use crate::config::NODE_TABLE_BUCKETS;
use crate::protocol::{LanId, MacAddr};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Seed for the bucket hash; fixed so entries stay put for the table's
/// lifetime.
const HASH_SEED: u64 = 0x533d_15de_adbe_ef11;

// ---------------------------------------------------------------------
// XXH64 (64-bit xxHash). Implemented locally: the 6-octet keys make a
// dependency pointless, and the seed must match across lookups only.
// ---------------------------------------------------------------------

const PRIME64_1: u64 = 0x9E37_79B1_85EB_CA87;
const PRIME64_2: u64 = 0xC2B2_AE3D_27D4_EB4F;
const PRIME64_3: u64 = 0x1656_67B1_9E37_79F9;
const PRIME64_4: u64 = 0x85EB_CA77_C2B2_AE63;
const PRIME64_5: u64 = 0x27D4_EB2F_1656_67C5;

fn xxh64_round(acc: u64, input: u64) -> u64 {
    acc.wrapping_add(input.wrapping_mul(PRIME64_2))
        .rotate_left(31)
        .wrapping_mul(PRIME64_1)
}

fn xxh64_merge_round(acc: u64, val: u64) -> u64 {
    (acc ^ xxh64_round(0, val))
        .wrapping_mul(PRIME64_1)
        .wrapping_add(PRIME64_4)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

/// Seeded XXH64 over `data`.
fn xxh64(data: &[u8], seed: u64) -> u64 {
    let mut rest = data;
    let mut h: u64;

    if data.len() >= 32 {
        let mut v1 = seed.wrapping_add(PRIME64_1).wrapping_add(PRIME64_2);
        let mut v2 = seed.wrapping_add(PRIME64_2);
        let mut v3 = seed;
        let mut v4 = seed.wrapping_sub(PRIME64_1);
        while rest.len() >= 32 {
            v1 = xxh64_round(v1, read_u64(&rest[0..8]));
            v2 = xxh64_round(v2, read_u64(&rest[8..16]));
            v3 = xxh64_round(v3, read_u64(&rest[16..24]));
            v4 = xxh64_round(v4, read_u64(&rest[24..32]));
            rest = &rest[32..];
        }
        h = v1
            .rotate_left(1)
            .wrapping_add(v2.rotate_left(7))
            .wrapping_add(v3.rotate_left(12))
            .wrapping_add(v4.rotate_left(18));
        h = xxh64_merge_round(h, v1);
        h = xxh64_merge_round(h, v2);
        h = xxh64_merge_round(h, v3);
        h = xxh64_merge_round(h, v4);
    } else {
        h = seed.wrapping_add(PRIME64_5);
    }

    h = h.wrapping_add(data.len() as u64);

    while rest.len() >= 8 {
        h ^= xxh64_round(0, read_u64(rest));
        h = h.rotate_left(27).wrapping_mul(PRIME64_1).wrapping_add(PRIME64_4);
        rest = &rest[8..];
    }
    if rest.len() >= 4 {
        h ^= u64::from(read_u32(rest)).wrapping_mul(PRIME64_1);
        h = h.rotate_left(23).wrapping_mul(PRIME64_2).wrapping_add(PRIME64_3);
        rest = &rest[4..];
    }
    for &byte in rest {
        h ^= u64::from(byte).wrapping_mul(PRIME64_5);
        h = h.rotate_left(11).wrapping_mul(PRIME64_1);
    }

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME64_2);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME64_3);
    h ^= h >> 32;
    h
}

fn bucket_index(mac: MacAddr, mask: usize) -> usize {
    xxh64(&mac.octets(), HASH_SEED) as usize & mask
}

/// Concurrent MAC -> [`NodeEntry`] map with fixed bucket count.
pub struct NodeTable {
    buckets: RwLock<Vec<Vec<NodeEntry>>>,
    mask: usize,
}

impl NodeTable {
    /// Table with the default bucket count.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buckets(NODE_TABLE_BUCKETS)
    }

    /// Table with an explicit power-of-two bucket count.
    #[must_use]
    pub fn with_buckets(buckets: usize) -> Self {
        debug_assert!(buckets.is_power_of_two());
        Self {
            buckets: RwLock::new((0..buckets).map(|_| Vec::new()).collect()),
            mask: buckets - 1,
        }
    }

    /// Shared view for the TX fast path.
    pub fn read(&self) -> NodeTableReader<'_> {
        NodeTableReader {
            buckets: self.buckets.read(),
            mask: self.mask,
        }
    }

    /// Exclusive view for the RX / supervision paths.
    pub fn write(&self) -> NodeTableWriter<'_> {
        NodeTableWriter {
            buckets: self.buckets.write(),
            mask: self.mask,
        }
    }

    /// LAN of `mac` if it is a confirmed SAN, else `None`.
    pub fn classify_san(&self, mac: MacAddr) -> Option<LanId> {
        self.read().lookup(mac).and_then(NodeEntry::confirmed_san)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.buckets.read().iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove entries silent on both LANs beyond `forget_ms`. Returns the
    /// number of removed entries.
    pub fn prune(&self, now_ms: u64, forget_ms: u64) -> usize {
        let mut buckets = self.buckets.write();
        let mut removed = 0;
        for bucket in buckets.iter_mut() {
            let before = bucket.len();
            bucket.retain(|entry| !entry.expired(now_ms, forget_ms));
            removed += before - bucket.len();
        }
        removed
    }

    /// Copy of every entry for introspection.
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.buckets
            .read()
            .iter()
            .flat_map(|bucket| bucket.iter().map(NodeSnapshot::of))
            .collect()
    }

    /// Drop all entries (master teardown).
    pub fn clear(&self) {
        for bucket in self.buckets.write().iter_mut() {
            bucket.clear();
        }
    }
}

impl Default for NodeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Read guard over the table; entries are stable while it is held.
pub struct NodeTableReader<'a> {
    buckets: RwLockReadGuard<'a, Vec<Vec<NodeEntry>>>,
    mask: usize,
}

impl NodeTableReader<'_> {
    pub fn lookup(&self, mac: MacAddr) -> Option<&NodeEntry> {
        self.buckets[bucket_index(mac, self.mask)]
            .iter()
            .find(|entry| entry.mac() == mac)
    }
}

/// Write guard over the table.
pub struct NodeTableWriter<'a> {
    buckets: RwLockWriteGuard<'a, Vec<Vec<NodeEntry>>>,
    mask: usize,
}

impl NodeTableWriter<'_> {
    /// Find the entry for `mac`, creating it (first heard on `lan` at
    /// `now_ms`, both SAN flags set) when missing.
    pub fn get_or_create(&mut self, mac: MacAddr, lan: LanId, now_ms: u64) -> &mut NodeEntry {
        let idx = bucket_index(mac, self.mask);
        let bucket = &mut self.buckets[idx];
        let pos = match bucket.iter().position(|entry| entry.mac() == mac) {
            Some(pos) => pos,
            None => {
                log::debug!("[node_table] learned new node {} on LAN {}", mac, lan);
                bucket.push(NodeEntry::new(mac, lan, now_ms));
                bucket.len() - 1
            }
        };
        &mut bucket[pos]
    }

    pub fn lookup_mut(&mut self, mac: MacAddr) -> Option<&mut NodeEntry> {
        let idx = bucket_index(mac, self.mask);
        self.buckets[idx]
            .iter_mut()
            .find(|entry| entry.mac() == mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(last: u8) -> MacAddr {
        MacAddr::new([0x02, 0x42, 0x00, 0x00, 0x00, last])
    }

    #[test]
    fn test_xxh64_deterministic_and_seeded() {
        let a = xxh64(&mac(1).octets(), HASH_SEED);
        let b = xxh64(&mac(1).octets(), HASH_SEED);
        assert_eq!(a, b);
        assert_ne!(a, xxh64(&mac(1).octets(), HASH_SEED ^ 1));
        assert_ne!(a, xxh64(&mac(2).octets(), HASH_SEED));
    }

    #[test]
    fn test_xxh64_covers_all_tail_paths() {
        // 6-byte keys take the 4+2 tail; exercise the other widths too
        let long = [0xABu8; 40];
        let mid = [0xCDu8; 12];
        assert_ne!(xxh64(&long, 0), xxh64(&long[..39], 0));
        assert_ne!(xxh64(&mid, 0), xxh64(&mid[..11], 0));
        assert_ne!(xxh64(&[], 0), xxh64(&[0], 0));
    }

    #[test]
    fn test_hash_spreads_across_buckets() {
        let mut used = std::collections::HashSet::new();
        for last in 0..=255u8 {
            used.insert(bucket_index(mac(last), NODE_TABLE_BUCKETS - 1));
        }
        // 256 sequential MACs must not collapse onto a handful of buckets
        assert!(used.len() > 128, "only {} buckets used", used.len());
    }

    #[test]
    fn test_get_or_create_is_singleton() {
        let table = NodeTable::new();
        {
            let mut guard = table.write();
            guard.get_or_create(mac(1), LanId::A, 100);
            guard.get_or_create(mac(1), LanId::B, 200);
        }
        assert_eq!(table.len(), 1);
        let snap = table.snapshot();
        assert_eq!(snap[0].mac, mac(1));
        // second call did not reset the fresh-entry state
        assert!(snap[0].san_a && snap[0].san_b);
    }

    #[test]
    fn test_singleton_under_random_churn() {
        let table = NodeTable::new();
        let mut macs = Vec::new();
        for _ in 0..500 {
            let m = MacAddr::new([
                0x02,
                fastrand::u8(..),
                fastrand::u8(..),
                fastrand::u8(..),
                fastrand::u8(..),
                fastrand::u8(..),
            ]);
            macs.push(m);
        }
        let mut guard = table.write();
        for _ in 0..3 {
            for &m in &macs {
                guard.get_or_create(m, LanId::A, 1);
            }
        }
        drop(guard);
        let distinct: std::collections::HashSet<_> =
            macs.iter().map(|m| m.octets()).collect();
        assert_eq!(table.len(), distinct.len());
    }

    #[test]
    fn test_classify_san_paths() {
        let table = NodeTable::new();
        assert_eq!(table.classify_san(mac(9)), None); // unknown peer

        {
            let mut guard = table.write();
            let entry = guard.get_or_create(mac(9), LanId::A, 1);
            entry.mark_san(LanId::A);
        }
        assert_eq!(table.classify_san(mac(9)), Some(LanId::A));

        {
            let mut guard = table.write();
            let entry = guard.get_or_create(mac(9), LanId::B, 2);
            entry.upgrade_to_danp();
        }
        assert_eq!(table.classify_san(mac(9)), None); // DANP, dual-send
    }

    #[test]
    fn test_prune_then_recreate_fresh() {
        let table = NodeTable::new();
        {
            let mut guard = table.write();
            let entry = guard.get_or_create(mac(5), LanId::A, 1_000);
            entry.mark_san(LanId::A);
        }

        // not yet expired
        assert_eq!(table.prune(30_000, 60_000), 0);
        assert_eq!(table.len(), 1);

        // both LANs silent beyond NODE_FORGET_TIME
        assert_eq!(table.prune(62_000, 60_000), 1);
        assert!(table.is_empty());

        // traffic re-creates the entry with the unknown sentinel
        {
            let mut guard = table.write();
            guard.get_or_create(mac(5), LanId::B, 63_000);
        }
        let snap = table.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(snap[0].san_a && snap[0].san_b);
        assert!(!snap[0].has_window);
    }

    #[test]
    fn test_clear() {
        let table = NodeTable::new();
        {
            let mut guard = table.write();
            guard.get_or_create(mac(1), LanId::A, 1);
            guard.get_or_create(mac(2), LanId::A, 1);
        }
        table.clear();
        assert!(table.is_empty());
    }
}
