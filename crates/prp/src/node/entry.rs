// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One remote node as seen from this DANP.

use super::window::DuplicateWindow;
use crate::protocol::{LanId, MacAddr};

/// Node-table entry for one remote MAC.
///
/// Classification state machine:
/// - fresh entry: `san_a && san_b` ("unknown", treated as DANP on TX);
/// - confirmed SAN: exactly one flag set, learned from untagged traffic;
/// - DANP: both flags clear, learned from a supervision frame or valid
///   RCT-tagged data; only DANP entries carry a duplicate window.
pub struct NodeEntry {
    mac: MacAddr,
    /// Monotonic ms of the last frame per LAN; 0 = never seen there.
    pub last_seen: [u64; 2],
    pub san_a: bool,
    pub san_b: bool,
    /// Present exactly while the node is classified DANP.
    pub window: Option<DuplicateWindow>,
    /// Last supervision sequence number accepted from this node.
    pub sup_seqnr_last: Option<u16>,
}

impl NodeEntry {
    /// Fresh entry, first heard on `lan` at `now_ms`.
    #[must_use]
    pub fn new(mac: MacAddr, lan: LanId, now_ms: u64) -> Self {
        let mut last_seen = [0u64; 2];
        last_seen[lan.index()] = now_ms;
        Self {
            mac,
            last_seen,
            san_a: true,
            san_b: true,
            window: None,
            sup_seqnr_last: None,
        }
    }

    #[must_use]
    pub fn mac(&self) -> MacAddr {
        self.mac
    }

    /// Refresh liveness on `lan`.
    pub fn touch(&mut self, lan: LanId, now_ms: u64) {
        self.last_seen[lan.index()] = now_ms;
    }

    /// Record untagged traffic: the node reaches us on `lan` only.
    pub fn mark_san(&mut self, lan: LanId) {
        match lan {
            LanId::A => {
                self.san_a = true;
                self.san_b = false;
            }
            LanId::B => {
                self.san_b = true;
                self.san_a = false;
            }
        }
        // a SAN never carries a duplicate window
        self.window = None;
    }

    /// Record PRP capability: clears both SAN flags and allocates the
    /// duplicate window. Idempotent.
    pub fn upgrade_to_danp(&mut self) {
        self.san_a = false;
        self.san_b = false;
        if self.window.is_none() {
            self.window = Some(DuplicateWindow::new());
        }
    }

    /// Both SAN flags clear: node speaks PRP.
    #[must_use]
    pub fn is_danp(&self) -> bool {
        !self.san_a && !self.san_b
    }

    /// LAN of a confirmed SAN (exactly one flag set), else `None`.
    #[must_use]
    pub fn confirmed_san(&self) -> Option<LanId> {
        match (self.san_a, self.san_b) {
            (true, false) => Some(LanId::A),
            (false, true) => Some(LanId::B),
            _ => None,
        }
    }

    /// Silent on both LANs for longer than `forget_ms`.
    #[must_use]
    pub fn expired(&self, now_ms: u64, forget_ms: u64) -> bool {
        self.last_seen
            .iter()
            .all(|&seen| seen + forget_ms < now_ms)
    }
}

/// Point-in-time copy of an entry for introspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub mac: MacAddr,
    pub last_seen: [u64; 2],
    pub san_a: bool,
    pub san_b: bool,
    pub has_window: bool,
    pub sup_seqnr_last: Option<u16>,
}

impl NodeSnapshot {
    pub(crate) fn of(entry: &NodeEntry) -> Self {
        Self {
            mac: entry.mac(),
            last_seen: entry.last_seen,
            san_a: entry.san_a,
            san_b: entry.san_b,
            has_window: entry.window.is_some(),
            sup_seqnr_last: entry.sup_seqnr_last,
        }
    }
}
