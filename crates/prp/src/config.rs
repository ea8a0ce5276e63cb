// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PRP Global Configuration - Single Source of Truth
//!
//! This module centralizes the protocol timing constants and runtime
//! configuration. **NEVER hardcode these values elsewhere!**
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: Compile-time constants (IEC 62439-3 defaults)
//! - **Level 2 (Dynamic)**: [`RuntimeConfig`] for load-time overrides
//!
//! # Performance
//!
//! - **Atomic swap**: `ArcSwap` for [`Timings`] (no lock)
//! - Hot paths read a [`Timings`] snapshot once per frame; changing the
//!   configuration never stalls RX or TX.

use arc_swap::ArcSwap;
use std::sync::Arc;

// =======================================================================
// Timing constants (IEC 62439-3:2016 Table 8 defaults)
// =======================================================================

/// Supervision frame emission period (milliseconds).
///
/// A DANP announces itself on both LANs every `LIFE_CHECK_INTERVAL_MS`
/// while its master interface is operationally up.
pub const LIFE_CHECK_INTERVAL_MS: u64 = 2_000;

/// Node forget time (milliseconds).
///
/// A node-table entry whose `last_seen` on **both** LANs is older than
/// this is removed by the pruner. Default: 60 seconds.
pub const NODE_FORGET_TIME_MS: u64 = 60_000;

/// Duplicate-entry forget time (milliseconds).
///
/// A remembered sequence number older than this no longer counts as a
/// duplicate; the two LAN copies of a frame are expected to arrive well
/// within this horizon.
pub const ENTRY_FORGET_TIME_MS: u64 = 400;

/// Node reboot interval (milliseconds).
///
/// After this much silence from a peer, its duplicate-discard window is
/// considered reset: a rebooted peer reuses sequence number 0 and must
/// not have its first frames discarded.
pub const NODE_REBOOT_INTERVAL_MS: u64 = 500;

// =======================================================================
// Structure sizing
// =======================================================================

/// Number of hash buckets in the node table. Must be a power of two.
pub const NODE_TABLE_BUCKETS: usize = 256;

/// Number of sequence numbers remembered per peer for duplicate discard.
pub const DUP_WINDOW_SIZE: usize = 128;

/// Default destination address of PRP_Supervision frames
/// (IEC 62439-3:2016 Sec.5.5: `01-15-4E-00-01-XX`, XX = 0).
pub const SUP_MULTICAST_DEFAULT: [u8; 6] = [0x01, 0x15, 0x4E, 0x00, 0x01, 0x00];

/// Timing knobs configurable at load time (module-parameter analog).
///
/// Defaults mirror the constants above. All values are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Supervision emission period.
    pub life_check_interval_ms: u64,
    /// Node-table entry lifetime without traffic.
    pub node_forget_time_ms: u64,
    /// Duplicate memory horizon.
    pub entry_forget_time_ms: u64,
    /// Silence after which a peer's window is treated as rebooted.
    pub node_reboot_interval_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            life_check_interval_ms: LIFE_CHECK_INTERVAL_MS,
            node_forget_time_ms: NODE_FORGET_TIME_MS,
            entry_forget_time_ms: ENTRY_FORGET_TIME_MS,
            node_reboot_interval_ms: NODE_REBOOT_INTERVAL_MS,
        }
    }
}

/// Runtime configuration shared by every master created from it.
///
/// `ArcSwap` allows atomically replacing the timings without a lock;
/// readers on the RX/TX hot paths take a point-in-time snapshot.
pub struct RuntimeConfig {
    timings: ArcSwap<Timings>,
}

impl RuntimeConfig {
    /// Create a configuration with default timings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timings: ArcSwap::from_pointee(Timings::default()),
        }
    }

    /// Create a configuration with explicit timings.
    #[must_use]
    pub fn with_timings(timings: Timings) -> Self {
        Self {
            timings: ArcSwap::from_pointee(timings),
        }
    }

    /// Snapshot of the current timings.
    pub fn timings(&self) -> Timings {
        **self.timings.load()
    }

    /// Replace the timings. Takes effect on the next frame / timer tick.
    pub fn set_timings(&self, timings: Timings) {
        self.timings.store(Arc::new(timings));
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}
