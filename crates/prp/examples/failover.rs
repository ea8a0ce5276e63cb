// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Two DANPs on a pair of emulated LANs: watch duplicate discard work,
//! then kill LAN A and watch traffic continue over LAN B.
//!
//! Run with: `cargo run --example failover`

use prp::config::{RuntimeConfig, Timings};
use prp::device::mem::{connect, MemRegistry};
use prp::device::{FrameBuf, LowerDevice};
use prp::protocol::constants::ETH_HLEN;
use prp::protocol::MacAddr;
use prp::{PrpMaster, UpperLayer, UpstreamFrame};
use std::sync::Arc;
use std::time::Duration;

struct Printer(&'static str);

impl UpperLayer for Printer {
    fn deliver(&self, frame: UpstreamFrame) {
        println!(
            "{} <- {} ({} octets): {:?}",
            self.0,
            frame.src,
            frame.payload.len(),
            String::from_utf8_lossy(frame.payload.as_slice())
        );
    }
}

fn eth_frame(dest: MacAddr, payload: &[u8]) -> FrameBuf {
    let mut frame = FrameBuf::with_room(0, ETH_HLEN + payload.len() + 6);
    let mut hdr = [0u8; ETH_HLEN];
    hdr[0..6].copy_from_slice(&dest.octets());
    // source is rewritten by the master
    hdr[12..14].copy_from_slice(&0x0800u16.to_be_bytes());
    frame.append(&hdr);
    frame.append(payload);
    frame
}

fn main() -> prp::Result<()> {
    let registry = Arc::new(MemRegistry::new());
    let a1 = registry.add_device("m1-a", MacAddr::new([2, 0, 0, 0, 1, 0xA]), 1500);
    let b1 = registry.add_device("m1-b", MacAddr::new([2, 0, 0, 0, 1, 0xB]), 1500);
    let a2 = registry.add_device("m2-a", MacAddr::new([2, 0, 0, 0, 2, 0xA]), 1500);
    let b2 = registry.add_device("m2-b", MacAddr::new([2, 0, 0, 0, 2, 0xB]), 1500);
    connect(&a1, &a2);
    connect(&b1, &b2);
    for dev in [&a1, &b1, &a2, &b2] {
        dev.set_oper_up(true);
    }

    let config = Arc::new(RuntimeConfig::with_timings(Timings {
        life_check_interval_ms: 200,
        ..Timings::default()
    }));

    let m1 = PrpMaster::builder(registry.clone(), "prp-m1")
        .port_a(a1.id())
        .port_b(b1.id())
        .config(config.clone())
        .upper(Arc::new(Printer("m1")))
        .build()?;
    let m2 = PrpMaster::builder(registry.clone(), "prp-m2")
        .port_a(a2.id())
        .port_b(b2.id())
        .config(config)
        .upper(Arc::new(Printer("m2")))
        .build()?;
    m1.set_admin_up(true);
    m2.set_admin_up(true);

    println!("waiting for supervision exchange...");
    std::thread::sleep(Duration::from_millis(600));

    println!("\nboth LANs up - every frame is sent twice, delivered once:");
    m1.send(eth_frame(m2.mac(), b"hello over both LANs"));
    std::thread::sleep(Duration::from_millis(50));
    println!(
        "m2 stats: delivered={} duplicates={}",
        m2.stats().rx_delivered,
        m2.stats().duplicates
    );

    println!("\nkilling LAN A...");
    a1.set_oper_up(false);
    a2.set_oper_up(false);
    std::thread::sleep(Duration::from_millis(300));

    m1.send(eth_frame(m2.mac(), b"still here via LAN B"));
    std::thread::sleep(Duration::from_millis(50));
    println!(
        "m2 stats: delivered={} duplicates={}",
        m2.stats().rx_delivered,
        m2.stats().duplicates
    );

    m1.shutdown();
    m2.shutdown();
    Ok(())
}
