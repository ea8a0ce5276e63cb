// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire-format constants (IEC 62439-3:2016 Sec.4 and Sec.5).

/// EtherType of PRP supervision frames; also the RCT suffix value.
pub const ETH_P_PRP: u16 = 0x88FB;

/// EtherType of 802.1Q VLAN-tagged frames.
pub const ETH_P_8021Q: u16 = 0x8100;

/// Octets in a MAC address.
pub const ETH_ALEN: usize = 6;

/// Octets in an untagged Ethernet header (dest + src + ethertype).
pub const ETH_HLEN: usize = 14;

/// Octets in an 802.1Q-tagged Ethernet header (dest + src + TPID + TCI
/// + ethertype).
pub const VLAN_ETH_HLEN: usize = 18;

/// Minimum Ethernet frame length without FCS.
pub const ETH_ZLEN: usize = 60;

/// Minimum 802.1Q-tagged frame length without FCS.
pub const VLAN_ETH_ZLEN: usize = 64;

/// Length of the Redundancy Control Trailer.
pub const PRP_RCT_LEN: usize = 6;

/// SupPath value emitted in the supervision tag (upper 4 bits).
pub const PRP_SUP_PATH: u8 = 0x0;

/// SupVersion value emitted in the supervision tag (lower 12 bits).
pub const PRP_SUP_VERSION: u16 = 0x1;

/// TLV1 type: sender operates in duplicate-discard mode.
pub const PRP_TLV_DUPDISCARD: u8 = 20;

/// TLV1 type: sender operates in duplicate-accept mode.
pub const PRP_TLV_DUPACCEPT: u8 = 21;

/// TLV2 type: RedBox MAC address, appended on behalf of a VDAN.
pub const PRP_TLV_REDBOX_MAC: u8 = 30;

/// Fixed supervision frame length without FCS (untagged).
pub const PRP_SUP_FRAME_LEN: usize = 70;

/// Fixed supervision frame length without FCS (802.1Q-tagged).
pub const PRP_SUP_FRAME_LEN_VLAN: usize = 74;
