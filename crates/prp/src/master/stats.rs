// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-master frame counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters bumped on the hot paths; read via [`MasterStats::snapshot`].
#[derive(Default)]
pub struct MasterStats {
    /// Per-port data transmissions that the lower device accepted.
    pub tx_data: AtomicU64,
    /// Supervision frames built (each is then dual-sent like data).
    pub tx_supervision: AtomicU64,
    /// Per-port transmissions the lower device refused.
    pub tx_errors: AtomicU64,
    /// Frames seen by the RX hooks (before any classification).
    pub rx_frames: AtomicU64,
    /// Frames delivered upstream.
    pub rx_delivered: AtomicU64,
    /// Supervision frames consumed.
    pub rx_supervision: AtomicU64,
    /// Tagged frames dropped as duplicates.
    pub duplicates: AtomicU64,
    /// Frames on port A whose RCT named the other LAN.
    pub wrong_lan_a: AtomicU64,
    /// Frames on port B whose RCT named the other LAN.
    pub wrong_lan_b: AtomicU64,
    /// Trailers whose LSDU size disagreed with the frame length.
    pub bad_lsdu: AtomicU64,
    /// Malformed receptions (no Ethernet header).
    pub rx_errors: AtomicU64,
}

impl MasterStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            tx_data: self.tx_data.load(Ordering::Relaxed),
            tx_supervision: self.tx_supervision.load(Ordering::Relaxed),
            tx_errors: self.tx_errors.load(Ordering::Relaxed),
            rx_frames: self.rx_frames.load(Ordering::Relaxed),
            rx_delivered: self.rx_delivered.load(Ordering::Relaxed),
            rx_supervision: self.rx_supervision.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            wrong_lan_a: self.wrong_lan_a.load(Ordering::Relaxed),
            wrong_lan_b: self.wrong_lan_b.load(Ordering::Relaxed),
            bad_lsdu: self.bad_lsdu.load(Ordering::Relaxed),
            rx_errors: self.rx_errors.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`MasterStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub tx_data: u64,
    pub tx_supervision: u64,
    pub tx_errors: u64,
    pub rx_frames: u64,
    pub rx_delivered: u64,
    pub rx_supervision: u64,
    pub duplicates: u64,
    pub wrong_lan_a: u64,
    pub wrong_lan_b: u64,
    pub bad_lsdu: u64,
    pub rx_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = MasterStats::new();
        stats.tx_data.fetch_add(3, Ordering::Relaxed);
        stats.duplicates.fetch_add(1, Ordering::Relaxed);
        let snap = stats.snapshot();
        assert_eq!(snap.tx_data, 3);
        assert_eq!(snap.duplicates, 1);
        assert_eq!(snap.rx_delivered, 0);
    }
}
