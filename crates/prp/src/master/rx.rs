// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Receive engine, installed as the per-port RX hook.
//!
//! Each inbound frame refreshes the sender's node entry, then takes one
//! of three paths: untagged traffic marks the sender SAN and goes
//! upstream; supervision frames promote their announced DANP and are
//! consumed; tagged data runs duplicate discard and goes upstream only
//! for the first copy.

use super::MasterCore;
use crate::device::{FrameBuf, PacketKind, RxFrame, RxHook, UpstreamFrame};
use crate::node::Accept;
use crate::protocol::constants::{ETH_HLEN, ETH_P_PRP, PRP_RCT_LEN};
use crate::protocol::{supervision, EthHeader, LanId, Rct};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

/// Hook context bound to one port: the LAN identity plus a weak path
/// back to the master (the master owns the ports, never the reverse).
pub(crate) struct PortRx {
    pub(crate) core: Weak<MasterCore>,
    pub(crate) lan: LanId,
}

impl RxHook for PortRx {
    fn on_frame(&self, frame: RxFrame) {
        if let Some(core) = self.core.upgrade() {
            handle_frame(&core, self.lan, frame);
        }
    }
}

enum Tagging {
    Tagged(Rct),
    Untagged,
}

fn handle_frame(core: &Arc<MasterCore>, lan: LanId, rx: RxFrame) {
    if rx.kind == PacketKind::Loopback {
        return;
    }
    let frame = rx.buf;
    core.stats.rx_frames.fetch_add(1, Ordering::Relaxed);

    let eth = match EthHeader::parse(frame.as_slice()) {
        Some(eth) => eth,
        None => {
            core.stats.rx_errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };
    let now_ms = core.clock.now_ms();
    let timings = core.config.timings();

    let tagging = match Rct::parse_trailer(frame.as_slice()) {
        None => Tagging::Untagged,
        Some(rct) if rct.lan_id != lan => {
            match lan {
                LanId::A => core.stats.wrong_lan_a.fetch_add(1, Ordering::Relaxed),
                LanId::B => core.stats.wrong_lan_b.fetch_add(1, Ordering::Relaxed),
            };
            log::debug!(
                "[prp_rx] {}: RCT for LAN {} arrived on LAN {} from {}",
                core.name,
                rct.lan_id,
                lan,
                eth.src
            );
            Tagging::Untagged
        }
        Some(rct) if !rct.lsdu_matches(frame.len()) => {
            core.stats.bad_lsdu.fetch_add(1, Ordering::Relaxed);
            Tagging::Untagged
        }
        Some(rct) => Tagging::Tagged(rct),
    };

    match tagging {
        Tagging::Untagged => {
            {
                let mut nodes = core.nodes.write();
                let entry = nodes.get_or_create(eth.src, lan, now_ms);
                entry.touch(lan, now_ms);
                entry.mark_san(lan);
            }
            deliver_upstream(core, frame, eth, false);
        }
        Tagging::Tagged(rct) => {
            // Supervision? (multicast match, PRP ethertype, body parses)
            if eth.dest == core.sup_multicast && eth.ethertype == ETH_P_PRP {
                if let Ok(sup) = supervision::parse(&frame.as_slice()[ETH_HLEN..]) {
                    let mut nodes = core.nodes.write();
                    // refresh the outer sender, then promote the DANP the
                    // frame announces (a RedBox may have translated it)
                    nodes.get_or_create(eth.src, lan, now_ms).touch(lan, now_ms);
                    let entry = nodes.get_or_create(sup.mac, lan, now_ms);
                    entry.touch(lan, now_ms);
                    entry.upgrade_to_danp();
                    entry.sup_seqnr_last = Some(sup.sup_seqnr);
                    core.stats.rx_supervision.fetch_add(1, Ordering::Relaxed);
                    log::debug!(
                        "[prp_rx] {}: supervision from {} (sup_seqnr {}) on LAN {}",
                        core.name,
                        sup.mac,
                        sup.sup_seqnr,
                        lan
                    );
                    // supervision frames are consumed, never delivered
                    return;
                }
            }

            let verdict = {
                let mut nodes = core.nodes.write();
                let entry = nodes.get_or_create(eth.src, lan, now_ms);
                entry.touch(lan, now_ms);
                // a valid RCT proves the sender speaks PRP
                entry.upgrade_to_danp();
                match entry.window.as_mut() {
                    Some(window) => window.accept(rct.seqnr, now_ms, &timings),
                    // window allocation unavailable: accept-all
                    None => Accept::Fresh,
                }
            };

            match verdict {
                Accept::Duplicate => {
                    core.stats.duplicates.fetch_add(1, Ordering::Relaxed);
                    log::trace!(
                        "[prp_rx] {}: duplicate seqnr {} from {} on LAN {}",
                        core.name,
                        rct.seqnr,
                        eth.src,
                        lan
                    );
                }
                Accept::Fresh => {
                    let mut frame = frame;
                    frame.trim_tail(PRP_RCT_LEN);
                    deliver_upstream(core, frame, eth, true);
                }
            }
        }
    }
}

fn deliver_upstream(core: &Arc<MasterCore>, mut frame: FrameBuf, eth: EthHeader, tagged: bool) {
    if !frame.pull(ETH_HLEN) {
        core.stats.rx_errors.fetch_add(1, Ordering::Relaxed);
        return;
    }
    core.stats.rx_delivered.fetch_add(1, Ordering::Relaxed);
    log::trace!(
        "[prp_rx] {}: delivering {} octets from {} ({})",
        core.name,
        frame.len(),
        eth.src,
        if tagged { "tagged" } else { "untagged" }
    );
    core.upper.deliver(UpstreamFrame {
        src: eth.src,
        dest: eth.dest,
        ethertype: eth.ethertype,
        payload: frame,
    });
}
