// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host device-plane capabilities.
//!
//! The PRP master never talks to network hardware directly: the host
//! injects a [`PortRegistry`] through which lower devices are resolved,
//! claimed (RX hook + upper link) and observed (event stream). Tests
//! supply the in-memory implementation from [`crate::device::mem`].

use super::frame::{FrameBuf, PacketKind};
use crate::protocol::MacAddr;
use crossbeam::channel::Receiver;
use std::fmt;
use std::sync::Arc;

/// Host-assigned device index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dev#{}", self.0)
    }
}

/// Coarse device classification used by slave validation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeviceClass {
    /// Plain Ethernet-class device; the only class PRP binds.
    Ethernet,
    /// 802.1Q virtual device; rejected as a slave.
    Vlan,
    /// Another PRP master interface; rejected as a slave.
    PrpMaster,
}

/// One frame handed up by a lower device.
pub struct RxFrame {
    pub buf: FrameBuf,
    pub kind: PacketKind,
}

/// Receive callback installed on a lower device.
///
/// Runs on the delivering device's context, possibly concurrently for
/// the two ports of one master. Must not block.
pub trait RxHook: Send + Sync {
    fn on_frame(&self, frame: RxFrame);
}

/// A lower Ethernet device as exposed by the host.
pub trait LowerDevice: Send + Sync {
    fn id(&self) -> DeviceId;
    fn name(&self) -> &str;
    fn mac(&self) -> MacAddr;
    fn mtu(&self) -> u32;
    /// Operationally up: administratively enabled and carrier present.
    fn is_oper_up(&self) -> bool;
    fn class(&self) -> DeviceClass;
    /// Queue one frame for transmission. Per-frame failures are reported
    /// here and contained by the caller; they are never fatal.
    fn transmit(&self, frame: FrameBuf) -> DeviceResult<()>;
    /// Disable large-receive-offload. Coalescing would corrupt the
    /// per-frame RCT accounting, so attach turns it off.
    fn disable_lro(&self);
}

/// Event kinds surfaced by the host's device notifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeviceEventKind {
    Up,
    Down,
    Change,
    MtuChange,
    AddressChange,
    NameChange,
    /// The device is about to change its link type; PRP binds only
    /// Ethernet-class devices and must veto this.
    PreTypeChange,
    Register,
    Unregister,
}

/// One device notification.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DeviceEvent {
    pub device: DeviceId,
    pub kind: DeviceEventKind,
}

/// Registry capability injected by the host.
pub trait PortRegistry: Send + Sync {
    /// Resolve a device by host index.
    fn get_by_index(&self, id: DeviceId) -> Option<Arc<dyn LowerDevice>>;

    /// Record `lower` as subordinate of the named upper interface.
    fn link_upper(&self, lower: DeviceId, upper: &str) -> DeviceResult<()>;

    /// Undo [`PortRegistry::link_upper`].
    fn unlink_upper(&self, lower: DeviceId) -> DeviceResult<()>;

    /// Install the receive callback. Fails with
    /// [`DeviceError::AlreadyBound`] when another hook is present.
    fn install_rx_hook(&self, lower: DeviceId, hook: Arc<dyn RxHook>) -> DeviceResult<()>;

    /// Remove a previously installed receive callback.
    fn remove_rx_hook(&self, lower: DeviceId) -> DeviceResult<()>;

    /// Whether an RX hook is currently installed (the device is someone's
    /// slave).
    fn has_rx_hook(&self, lower: DeviceId) -> bool;

    /// Subscribe to the device event stream.
    fn subscribe(&self) -> Receiver<DeviceEvent>;
}

/// Result alias for device-plane operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Device-plane failure surfaced by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No device with this index.
    NoSuchDevice(DeviceId),
    /// An RX hook is already installed on the device.
    AlreadyBound(DeviceId),
    /// The device already has an upper link.
    AlreadyLinked(DeviceId),
    /// No hook/link to remove.
    NotBound(DeviceId),
    /// Transmit failed at the device.
    TxFailed { device: DeviceId, reason: String },
    /// Host refused the linkage.
    LinkFailed { device: DeviceId, reason: String },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NoSuchDevice(id) => write!(f, "no such device: {}", id),
            DeviceError::AlreadyBound(id) => write!(f, "rx hook already installed on {}", id),
            DeviceError::AlreadyLinked(id) => write!(f, "{} already has an upper link", id),
            DeviceError::NotBound(id) => write!(f, "{} has no hook/link to remove", id),
            DeviceError::TxFailed { device, reason } => {
                write!(f, "transmit failed on {}: {}", device, reason)
            }
            DeviceError::LinkFailed { device, reason } => {
                write!(f, "linkage failed on {}: {}", device, reason)
            }
        }
    }
}

impl std::error::Error for DeviceError {}

/// Frame handed to the upper layer after PRP processing.
///
/// `payload` is the frame with the Ethernet header (and, for tagged
/// frames, the RCT) already removed.
pub struct UpstreamFrame {
    pub src: MacAddr,
    pub dest: MacAddr,
    pub ethertype: u16,
    pub payload: FrameBuf,
}

/// Upper-layer injection entry point for decapsulated payloads.
pub trait UpperLayer: Send + Sync {
    fn deliver(&self, frame: UpstreamFrame);
}

/// Default sink: counts nothing, drops everything.
pub struct NullUpperLayer;

impl UpperLayer for NullUpperLayer {
    fn deliver(&self, frame: UpstreamFrame) {
        log::trace!(
            "[prp] upper layer unset, dropping {} octets from {}",
            frame.payload.len(),
            frame.src
        );
    }
}
