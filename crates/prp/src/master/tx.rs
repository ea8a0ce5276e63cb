// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transmit engine.
//!
//! Every outbound frame leaves with the master's MAC as source. A
//! confirmed SAN gets a single untagged copy on its own LAN; everything
//! else (DANPs, unknown peers, multicast) is padded, sequenced and sent
//! once per port with a per-LAN RCT. A failing port never stops the
//! other one.

use super::MasterCore;
use crate::device::FrameBuf;
use crate::protocol::constants::{
    ETH_HLEN, ETH_P_8021Q, ETH_ZLEN, PRP_RCT_LEN, VLAN_ETH_ZLEN,
};
use crate::protocol::{supervision, LanId, MacAddr, Rct};
use std::sync::atomic::Ordering;

/// Entry point from the master's `send`.
pub(crate) fn xmit(core: &MasterCore, mut frame: FrameBuf) {
    if frame.len() < ETH_HLEN {
        log::debug!(
            "[prp_tx] {}: dropping runt frame of {} octets",
            core.name,
            frame.len()
        );
        core.stats.tx_errors.fetch_add(1, Ordering::Relaxed);
        return;
    }

    // Both slaves advertise the master's address.
    frame.as_mut_slice()[6..12].copy_from_slice(&core.mac.octets());

    let dest = match MacAddr::from_slice(&frame.as_slice()[0..6]) {
        Some(dest) => dest,
        None => return,
    };

    if let Some(lan) = core.nodes.classify_san(dest) {
        send_san(core, frame, lan);
        return;
    }
    send_duplicated(core, frame);
}

/// Single untagged copy for a confirmed SAN; no RCT, no sequence number.
fn send_san(core: &MasterCore, frame: FrameBuf, lan: LanId) {
    let port = &core.ports[lan.index()];
    if !port.device.is_oper_up() {
        log::debug!(
            "[prp_tx] {}: SAN port {} is down, dropping frame",
            core.name,
            lan
        );
        core.stats.tx_errors.fetch_add(1, Ordering::Relaxed);
        return;
    }
    match port.device.transmit(frame) {
        Ok(()) => {
            core.stats.tx_data.fetch_add(1, Ordering::Relaxed);
        }
        Err(err) => {
            core.stats.tx_errors.fetch_add(1, Ordering::Relaxed);
            log::warn!("[prp_tx] {}: failed to send to SAN on {}: {}", core.name, lan, err);
        }
    }
}

/// Dual send with RCT: pad, allocate one data sequence number, then one
/// tagged clone per operational port.
pub(crate) fn send_duplicated(core: &MasterCore, mut frame: FrameBuf) {
    // IEC 62439-3:2016 Sec.4.2.7.4.1: pad before tagging so both copies
    // are identical apart from the LAN ID.
    let ethertype = u16::from_be_bytes([frame.as_slice()[12], frame.as_slice()[13]]);
    let min_len = if ethertype == ETH_P_8021Q {
        VLAN_ETH_ZLEN
    } else {
        ETH_ZLEN
    };
    frame.pad_to(min_len);

    let seqnr = core.data_seqnr.fetch_add(1, Ordering::Relaxed);

    for port in &core.ports {
        if !port.device.is_oper_up() {
            continue;
        }
        let mut copy = frame.clone_with_tailroom(PRP_RCT_LEN);
        let rct = Rct::for_frame(copy.len(), port.lan, seqnr);
        copy.append(&rct.encode());

        match port.device.transmit(copy) {
            Ok(()) => {
                core.stats.tx_data.fetch_add(1, Ordering::Relaxed);
                log::trace!(
                    "[prp_tx] {}: sent seqnr {} over LAN {}",
                    core.name,
                    seqnr,
                    port.lan
                );
            }
            Err(err) => {
                core.stats.tx_errors.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "[prp_tx] {}: failed to send over LAN {}: {}",
                    core.name,
                    port.lan,
                    err
                );
            }
        }
    }
}

/// Build and emit one supervision frame (timer tick).
pub(crate) fn send_supervision(core: &MasterCore) {
    let sup_seqnr = core.sup_seqnr.fetch_add(1, Ordering::Relaxed);
    // slaves are plain Ethernet-class devices, so emission is untagged
    let frame = supervision::build_frame(core.mac, core.sup_multicast, sup_seqnr, None);
    core.stats.tx_supervision.fetch_add(1, Ordering::Relaxed);
    log::debug!(
        "[prp_tx] {}: supervision frame sup_seqnr={}",
        core.name,
        sup_seqnr
    );
    // Duplicated across both ports with RCTs like any other DANP frame.
    send_duplicated(core, frame);
}
