// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # PRP - Parallel Redundancy Protocol endpoint
//!
//! A pure Rust implementation of the IEC 62439-3 Parallel Redundancy
//! Protocol (PRP) frame plane: a doubly-attached node (DANP) that bonds
//! two independent Ethernet networks into one logical interface with
//! zero-recovery-time failover.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prp::{PrpMaster, Result};
//! use prp::device::mem::MemRegistry;
//! use prp::protocol::MacAddr;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let registry = Arc::new(MemRegistry::new());
//!     let lan_a = registry.add_device("eth0", MacAddr::new([2, 0, 0, 0, 0, 1]), 1500);
//!     let lan_b = registry.add_device("eth1", MacAddr::new([2, 0, 0, 0, 0, 2]), 1500);
//!
//!     let master = PrpMaster::builder(registry, "prp0")
//!         .port_a(lan_a.id())
//!         .port_b(lan_b.id())
//!         .build()?;
//!     master.set_admin_up(true);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |                          Upper layer                             |
//! |            UpperLayer::deliver  /  PrpMaster::send               |
//! +------------------------------------------------------------------+
//! |                          PRP master                              |
//! |  TX engine | RX engine | node table | supervision timer | pruner |
//! +------------------------------------------------------------------+
//! |                         Wire formats                             |
//! |        RCT trailer codec  |  PRP_Supervision frame codec         |
//! +------------------------------------------------------------------+
//! |                       Host capabilities                          |
//! |   PortRegistry | LowerDevice (x2) | Clock | device event stream  |
//! +------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PrpMaster`] | The logical PRP interface; owns two lower ports |
//! | [`device::PortRegistry`] | Host capability for resolving/claiming lower devices |
//! | [`device::UpperLayer`] | Sink for decapsulated inbound payloads |
//! | [`node::NodeTable`] | Per-peer liveness, SAN/DANP classification, duplicate windows |
//! | [`protocol::Rct`] | The 6-octet Redundancy Control Trailer |
//!
//! ## Wire behavior
//!
//! - Every outbound frame to a PRP-capable (or unknown) peer is padded,
//!   sequenced and sent once per LAN with a per-LAN RCT appended.
//! - A peer that only ever sends untagged traffic is classified as a
//!   singly-attached node (SAN) and addressed on its own LAN, untagged.
//! - On receive, the first copy of a tagged frame wins; the mate from
//!   the other LAN is discarded against a per-peer sliding window.
//! - PRP_Supervision frames are emitted every `life_check_interval` and
//!   consumed on ingress to classify peers as DANPs.
//!
//! Out of scope: HSR (ring) mode, VLAN slaves, RedBox proxying (TLV2 is
//! accepted on ingress only).

/// Timing constants and runtime configuration.
pub mod config;
/// Host capabilities: frame buffers, clock, device registry, upper layer.
pub mod device;
/// The master interface: lifecycle, TX/RX engines, background tasks.
pub mod master;
/// Node table, per-peer classification and duplicate-discard windows.
pub mod node;
/// Wire formats: RCT and supervision codecs, link-layer types.
pub mod protocol;

pub use config::{RuntimeConfig, Timings};
pub use device::{FrameBuf, UpperLayer, UpstreamFrame};
pub use master::{ConfigError, Operstate, PrpMaster, PrpMasterBuilder, Result, StatsSnapshot};
pub use node::NodeSnapshot;
pub use protocol::{LanId, MacAddr};
