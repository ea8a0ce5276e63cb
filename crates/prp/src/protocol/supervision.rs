// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PRP_Supervision frame codec.
//!
//! See Table 6 - PRP_Supervision frame contents (IEC 62439-3:2016 p.32):
//!
//! ```text
//! ------------------------------------------
//! |        ETH HDR, proto=0x88FB           |
//! ------------------------------------------
//! |    path (4)  |     version (12)       |
//! ------------------------------------------
//! |             sup_seqnr (16)             |
//! ------------------------------------------
//! | TLV1.type=20/21 (8) | TLV1.len=6 (8)  |
//! ------------------------------------------
//! |        MAC address of DANP (48)        |
//! ------------------------------------------
//! | TLV2.type=30 (8)    | TLV2.len=6 (8)  |   (RedBox only)
//! ------------------------------------------
//! |        RedBox MAC address (48)         |
//! ------------------------------------------
//! | TLV0.type=0 (8)     | TLV0.len=0 (8)  |
//! ------------------------------------------
//! | padding to 70/74 octets (no VLAN/VLAN) |
//! ------------------------------------------
//! |               PRP RCT (48)             |
//! ------------------------------------------
//! ```
//!
//! The builder emits path=0, version=1, TLV1.type=20 (duplicate discard)
//! and never appends TLV2; TLV2 is accepted on ingress for RedBox interop.

use super::constants::{
    ETH_ALEN, ETH_P_8021Q, ETH_P_PRP, PRP_RCT_LEN, PRP_SUP_FRAME_LEN, PRP_SUP_FRAME_LEN_VLAN,
    PRP_SUP_PATH, PRP_SUP_VERSION, PRP_TLV_DUPACCEPT, PRP_TLV_DUPDISCARD, PRP_TLV_REDBOX_MAC,
};
use super::types::MacAddr;
use super::{ParseError, ParseResult};
use crate::device::{FrameBuf, Priority};

/// Duplicate handling mode announced in TLV1.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SupMode {
    /// TLV1.type = 20.
    DupDiscard,
    /// TLV1.type = 21. Parsed but treated identically to `DupDiscard`.
    DupAccept,
}

impl SupMode {
    fn from_tlv_type(tlv_type: u8) -> Option<Self> {
        match tlv_type {
            PRP_TLV_DUPDISCARD => Some(SupMode::DupDiscard),
            PRP_TLV_DUPACCEPT => Some(SupMode::DupAccept),
            _ => None,
        }
    }
}

/// Parsed supervision frame body.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Supervision {
    /// SupPath from the tag (builder emits 0).
    pub path: u8,
    /// SupVersion from the tag (builder emits 1).
    pub version: u16,
    /// Supervision sequence number, independent of the data counter.
    pub sup_seqnr: u16,
    /// Announced duplicate-handling mode.
    pub mode: SupMode,
    /// MAC of the announcing DANP (TLV1). May differ from the outer
    /// Ethernet source when a RedBox translated the frame.
    pub mac: MacAddr,
    /// RedBox MAC (TLV2), when present.
    pub redbox_mac: Option<MacAddr>,
}

/// Parse a supervision body.
///
/// `body` is everything after the Ethernet header; trailing padding and
/// the RCT are tolerated and ignored once TLV0 is reached. The TLV walk
/// is strict: TLV1 (type 20/21, length 6), optional TLV2 (type 30,
/// length 6), then TLV0 (0, 0). Anything else rejects the frame.
pub fn parse(body: &[u8]) -> ParseResult<Supervision> {
    // tag(4) + TLV1 header(2) + MAC(6) + TLV0(2)
    if body.len() < 14 {
        return Err(ParseError::Truncated);
    }

    let path_and_ver = u16::from_be_bytes([body[0], body[1]]);
    let sup_seqnr = u16::from_be_bytes([body[2], body[3]]);

    let tlv1_type = body[4];
    let tlv1_len = body[5];
    let mode = SupMode::from_tlv_type(tlv1_type).ok_or(ParseError::UnexpectedTlv {
        tlv_type: tlv1_type,
        len: tlv1_len,
    })?;
    if tlv1_len as usize != ETH_ALEN {
        return Err(ParseError::UnexpectedTlv {
            tlv_type: tlv1_type,
            len: tlv1_len,
        });
    }
    let mac = MacAddr::from_slice(&body[6..12]).ok_or(ParseError::Truncated)?;

    let mut at = 12;
    let mut redbox_mac = None;

    let (t2_type, t2_len) = tlv_header(body, at)?;
    if t2_type == PRP_TLV_REDBOX_MAC {
        if t2_len as usize != ETH_ALEN {
            return Err(ParseError::UnexpectedTlv {
                tlv_type: t2_type,
                len: t2_len,
            });
        }
        if body.len() < at + 2 + ETH_ALEN {
            return Err(ParseError::Truncated);
        }
        redbox_mac = MacAddr::from_slice(&body[at + 2..at + 2 + ETH_ALEN]);
        at += 2 + ETH_ALEN;
    }

    let (t0_type, t0_len) = if redbox_mac.is_some() {
        tlv_header(body, at)?
    } else {
        (t2_type, t2_len)
    };
    if t0_type != 0 || t0_len != 0 {
        return Err(ParseError::UnexpectedTlv {
            tlv_type: t0_type,
            len: t0_len,
        });
    }

    Ok(Supervision {
        path: (path_and_ver >> 12) as u8,
        version: path_and_ver & 0x0FFF,
        sup_seqnr,
        mode,
        mac,
        redbox_mac,
    })
}

fn tlv_header(body: &[u8], at: usize) -> ParseResult<(u8, u8)> {
    if body.len() < at + 2 {
        return Err(ParseError::Truncated);
    }
    Ok((body[at], body[at + 1]))
}

/// Build a complete supervision frame (Ethernet header included), padded
/// so that appending the RCT yields the fixed wire length: 70 octets
/// untagged, 74 octets when `vlan_tci` selects the 802.1Q variant (the
/// tag is inserted between the addresses and the PRP ethertype).
///
/// The zero padding after TLV1 doubles as TLV0 (type 0, length 0).
#[must_use]
pub fn build_frame(
    src: MacAddr,
    sup_multicast: MacAddr,
    sup_seqnr: u16,
    vlan_tci: Option<u16>,
) -> FrameBuf {
    let frame_len = match vlan_tci {
        Some(_) => PRP_SUP_FRAME_LEN_VLAN,
        None => PRP_SUP_FRAME_LEN,
    };
    let mut frame = FrameBuf::with_room(0, frame_len);

    frame.append(&sup_multicast.octets());
    frame.append(&src.octets());
    if let Some(tci) = vlan_tci {
        frame.append(&ETH_P_8021Q.to_be_bytes());
        frame.append(&tci.to_be_bytes());
    }
    frame.append(&ETH_P_PRP.to_be_bytes());

    let path_and_ver = (u16::from(PRP_SUP_PATH) << 12) | (PRP_SUP_VERSION & 0x0FFF);
    frame.append(&path_and_ver.to_be_bytes());
    frame.append(&sup_seqnr.to_be_bytes());

    frame.append(&[PRP_TLV_DUPDISCARD, ETH_ALEN as u8]);
    frame.append(&src.octets());

    // Pad with zeroes; implicitly writes TLV0 and leaves room for the RCT.
    frame.pad_to(frame_len - PRP_RCT_LEN);
    frame.set_priority(Priority::Control);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::{ETH_HLEN, VLAN_ETH_HLEN};

    const DANP: MacAddr = MacAddr::new([0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01]);
    const SUP_MC: MacAddr = MacAddr::new([0x01, 0x15, 0x4E, 0x00, 0x01, 0x00]);

    #[test]
    fn test_build_then_parse_round_trip() {
        let frame = build_frame(DANP, SUP_MC, 0x0142, None);
        assert_eq!(frame.len(), PRP_SUP_FRAME_LEN - PRP_RCT_LEN);

        let sup = parse(&frame.as_slice()[ETH_HLEN..]).expect("builder output parses");
        assert_eq!(sup.sup_seqnr, 0x0142);
        assert_eq!(sup.mac, DANP);
        assert_eq!(sup.mode, SupMode::DupDiscard);
        assert_eq!(sup.redbox_mac, None);
        assert_eq!(sup.path, 0);
        assert_eq!(sup.version, 1);
    }

    #[test]
    fn test_build_frame_header() {
        let frame = build_frame(DANP, SUP_MC, 9, None);
        let bytes = frame.as_slice();
        assert_eq!(&bytes[0..6], &SUP_MC.octets());
        assert_eq!(&bytes[6..12], &DANP.octets());
        assert_eq!(u16::from_be_bytes([bytes[12], bytes[13]]), ETH_P_PRP);
        assert_eq!(frame.priority(), Priority::Control);
    }

    #[test]
    fn test_build_vlan_variant_round_trip() {
        let frame = build_frame(DANP, SUP_MC, 7, Some(0x0064));
        assert_eq!(frame.len(), PRP_SUP_FRAME_LEN_VLAN - PRP_RCT_LEN);

        let bytes = frame.as_slice();
        assert_eq!(&bytes[0..6], &SUP_MC.octets());
        assert_eq!(u16::from_be_bytes([bytes[12], bytes[13]]), ETH_P_8021Q);
        assert_eq!(u16::from_be_bytes([bytes[14], bytes[15]]), 0x0064);
        assert_eq!(u16::from_be_bytes([bytes[16], bytes[17]]), ETH_P_PRP);

        let sup = parse(&bytes[VLAN_ETH_HLEN..]).expect("body parses after the tagged header");
        assert_eq!(sup.sup_seqnr, 7);
        assert_eq!(sup.mac, DANP);
        assert_eq!(sup.mode, SupMode::DupDiscard);
    }

    fn body(tlvs: &[u8]) -> Vec<u8> {
        let mut b = vec![0x00, 0x01, 0x00, 0x2A]; // path=0 ver=1, sup_seqnr=42
        b.extend_from_slice(tlvs);
        b
    }

    #[test]
    fn test_parse_accepts_redbox_tlv2() {
        let mut tlvs = vec![PRP_TLV_DUPACCEPT, 6];
        tlvs.extend_from_slice(&DANP.octets());
        tlvs.extend_from_slice(&[PRP_TLV_REDBOX_MAC, 6]);
        tlvs.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x07]);
        tlvs.extend_from_slice(&[0, 0]);

        let sup = parse(&body(&tlvs)).expect("TLV2 accepted");
        assert_eq!(sup.sup_seqnr, 42);
        assert_eq!(sup.mode, SupMode::DupAccept);
        assert_eq!(
            sup.redbox_mac,
            Some(MacAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x07]))
        );
    }

    #[test]
    fn test_parse_rejects_wrong_tlv1() {
        let mut tlvs = vec![0x07, 6]; // neither 20 nor 21
        tlvs.extend_from_slice(&DANP.octets());
        tlvs.extend_from_slice(&[0, 0]);
        assert!(parse(&body(&tlvs)).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_tlv1_len() {
        let mut tlvs = vec![PRP_TLV_DUPDISCARD, 4];
        tlvs.extend_from_slice(&DANP.octets());
        tlvs.extend_from_slice(&[0, 0]);
        assert!(parse(&body(&tlvs)).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_tlv0() {
        let mut tlvs = vec![PRP_TLV_DUPDISCARD, 6];
        tlvs.extend_from_slice(&DANP.octets());
        tlvs.extend_from_slice(&[0x09, 0x01]); // not TLV0, not TLV2
        assert!(parse(&body(&tlvs)).is_err());
    }

    #[test]
    fn test_parse_truncated() {
        assert_eq!(parse(&[0x00, 0x01]), Err(ParseError::Truncated));
        let mut tlvs = vec![PRP_TLV_DUPDISCARD, 6];
        tlvs.extend_from_slice(&DANP.octets());
        // no room for the closing TLV0
        assert_eq!(parse(&body(&tlvs)), Err(ParseError::Truncated));
    }

    #[test]
    fn test_parse_tolerates_padding_and_rct() {
        let mut b = body(&{
            let mut tlvs = vec![PRP_TLV_DUPDISCARD, 6];
            tlvs.extend_from_slice(&DANP.octets());
            tlvs.extend_from_slice(&[0, 0]);
            tlvs
        });
        b.resize(56, 0); // padding to the fixed supervision length
        b.extend_from_slice(&[0x00, 0x05, 0xA0, 0x38, 0x88, 0xFB]); // trailing RCT
        let sup = parse(&b).expect("padding ignored");
        assert_eq!(sup.mac, DANP);
    }
}
