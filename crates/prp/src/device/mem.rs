// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory host fake: devices, registry and wire.
//!
//! Implements [`PortRegistry`]/[`LowerDevice`] entirely in memory so the
//! frame plane can be exercised without network hardware. Two devices can
//! be wired back-to-back with [`connect`], in which case a transmit on
//! one is delivered synchronously to the other's RX hook - enough to run
//! two full masters against each other in a test.

use super::frame::{FrameBuf, PacketKind};
use super::registry::{
    DeviceClass, DeviceError, DeviceEvent, DeviceEventKind, DeviceId, DeviceResult, LowerDevice,
    PortRegistry, RxFrame, RxHook,
};
use crate::protocol::{EthHeader, MacAddr};
use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};

/// In-memory lower device.
pub struct MemDevice {
    id: DeviceId,
    name: String,
    mac: MacAddr,
    class: DeviceClass,
    mtu: AtomicU32,
    oper_up: AtomicBool,
    lro: AtomicBool,
    hook: RwLock<Option<Arc<dyn RxHook>>>,
    upper: Mutex<Option<String>>,
    peer: Mutex<Option<Weak<MemDevice>>>,
    sent: Mutex<Vec<FrameBuf>>,
    fail_tx: AtomicBool,
    fail_link: AtomicBool,
    registry: Weak<RegistryInner>,
}

impl MemDevice {
    /// Frames transmitted through this device, in order.
    pub fn sent(&self) -> Vec<FrameBuf> {
        self.sent.lock().clone()
    }

    /// Drop the transmit capture.
    pub fn clear_sent(&self) {
        self.sent.lock().clear();
    }

    /// Deliver a frame to the installed RX hook, as the wire would.
    pub fn inject(&self, buf: FrameBuf, kind: PacketKind) {
        let hook = self.hook.read().clone();
        if let Some(hook) = hook {
            hook.on_frame(RxFrame { buf, kind });
        }
    }

    /// Toggle operational state and emit the matching event.
    pub fn set_oper_up(&self, up: bool) {
        self.oper_up.store(up, Ordering::Relaxed);
        self.fire(if up {
            DeviceEventKind::Up
        } else {
            DeviceEventKind::Down
        });
    }

    /// Change the MTU and emit `MtuChange`.
    pub fn set_mtu(&self, mtu: u32) {
        self.mtu.store(mtu, Ordering::Relaxed);
        self.fire(DeviceEventKind::MtuChange);
    }

    /// Make subsequent transmits fail (test knob).
    pub fn set_fail_tx(&self, fail: bool) {
        self.fail_tx.store(fail, Ordering::Relaxed);
    }

    /// Make `link_upper` fail for this device (test knob).
    pub fn set_fail_link(&self, fail: bool) {
        self.fail_link.store(fail, Ordering::Relaxed);
    }

    /// Whether LRO was disabled by an attach.
    pub fn lro_disabled(&self) -> bool {
        self.lro.load(Ordering::Relaxed)
    }

    /// Current upper link, if any.
    pub fn upper(&self) -> Option<String> {
        self.upper.lock().clone()
    }

    /// Emit an arbitrary event about this device.
    pub fn fire(&self, kind: DeviceEventKind) {
        if let Some(registry) = self.registry.upgrade() {
            registry.broadcast(DeviceEvent {
                device: self.id,
                kind,
            });
        }
    }
}

impl LowerDevice for MemDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn mac(&self) -> MacAddr {
        self.mac
    }

    fn mtu(&self) -> u32 {
        self.mtu.load(Ordering::Relaxed)
    }

    fn is_oper_up(&self) -> bool {
        self.oper_up.load(Ordering::Relaxed)
    }

    fn class(&self) -> DeviceClass {
        self.class
    }

    fn transmit(&self, frame: FrameBuf) -> DeviceResult<()> {
        if self.fail_tx.load(Ordering::Relaxed) {
            return Err(DeviceError::TxFailed {
                device: self.id,
                reason: "transmit disabled".into(),
            });
        }
        self.sent.lock().push(frame.clone());

        // Hand the frame to the wired peer, classifying by destination.
        let peer = self.peer.lock().clone();
        if let Some(peer) = peer.and_then(|weak| weak.upgrade()) {
            if peer.is_oper_up() {
                let kind = EthHeader::parse(frame.as_slice())
                    .map_or(PacketKind::Unicast, |eth| PacketKind::from_dest(eth.dest));
                peer.inject(frame, kind);
            }
        }
        Ok(())
    }

    fn disable_lro(&self) {
        self.lro.store(true, Ordering::Relaxed);
    }
}

/// Wire two devices back-to-back (one emulated LAN segment).
pub fn connect(a: &Arc<MemDevice>, b: &Arc<MemDevice>) {
    *a.peer.lock() = Some(Arc::downgrade(b));
    *b.peer.lock() = Some(Arc::downgrade(a));
}

struct RegistryInner {
    devices: RwLock<HashMap<u32, Arc<MemDevice>>>,
    next_id: AtomicU32,
    subscribers: Mutex<Vec<Sender<DeviceEvent>>>,
}

impl RegistryInner {
    fn broadcast(&self, event: DeviceEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

/// In-memory [`PortRegistry`].
pub struct MemRegistry {
    inner: Arc<RegistryInner>,
}

impl MemRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                devices: RwLock::new(HashMap::new()),
                next_id: AtomicU32::new(1),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register an Ethernet-class device.
    pub fn add_device(&self, name: &str, mac: MacAddr, mtu: u32) -> Arc<MemDevice> {
        self.add_device_with_class(name, mac, mtu, DeviceClass::Ethernet)
    }

    /// Register a device of an explicit class (for validation tests).
    pub fn add_device_with_class(
        &self,
        name: &str,
        mac: MacAddr,
        mtu: u32,
        class: DeviceClass,
    ) -> Arc<MemDevice> {
        let id = DeviceId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let device = Arc::new(MemDevice {
            id,
            name: name.to_owned(),
            mac,
            class,
            mtu: AtomicU32::new(mtu),
            oper_up: AtomicBool::new(false),
            lro: AtomicBool::new(false),
            hook: RwLock::new(None),
            upper: Mutex::new(None),
            peer: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            fail_tx: AtomicBool::new(false),
            fail_link: AtomicBool::new(false),
            registry: Arc::downgrade(&self.inner),
        });
        self.inner.devices.write().insert(id.0, Arc::clone(&device));
        self.inner.broadcast(DeviceEvent {
            device: id,
            kind: DeviceEventKind::Register,
        });
        device
    }

    fn device(&self, id: DeviceId) -> DeviceResult<Arc<MemDevice>> {
        self.inner
            .devices
            .read()
            .get(&id.0)
            .cloned()
            .ok_or(DeviceError::NoSuchDevice(id))
    }
}

impl Default for MemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PortRegistry for MemRegistry {
    fn get_by_index(&self, id: DeviceId) -> Option<Arc<dyn LowerDevice>> {
        self.device(id).ok().map(|d| d as Arc<dyn LowerDevice>)
    }

    fn link_upper(&self, lower: DeviceId, upper: &str) -> DeviceResult<()> {
        let device = self.device(lower)?;
        if device.fail_link.load(Ordering::Relaxed) {
            return Err(DeviceError::LinkFailed {
                device: lower,
                reason: "linkage refused".into(),
            });
        }
        let mut slot = device.upper.lock();
        if slot.is_some() {
            return Err(DeviceError::AlreadyLinked(lower));
        }
        *slot = Some(upper.to_owned());
        Ok(())
    }

    fn unlink_upper(&self, lower: DeviceId) -> DeviceResult<()> {
        let device = self.device(lower)?;
        let mut slot = device.upper.lock();
        if slot.take().is_none() {
            return Err(DeviceError::NotBound(lower));
        }
        Ok(())
    }

    fn install_rx_hook(&self, lower: DeviceId, hook: Arc<dyn RxHook>) -> DeviceResult<()> {
        let device = self.device(lower)?;
        let mut slot = device.hook.write();
        if slot.is_some() {
            return Err(DeviceError::AlreadyBound(lower));
        }
        *slot = Some(hook);
        Ok(())
    }

    fn remove_rx_hook(&self, lower: DeviceId) -> DeviceResult<()> {
        let device = self.device(lower)?;
        let mut slot = device.hook.write();
        if slot.take().is_none() {
            return Err(DeviceError::NotBound(lower));
        }
        Ok(())
    }

    fn has_rx_hook(&self, lower: DeviceId) -> bool {
        self.device(lower)
            .map(|d| d.hook.read().is_some())
            .unwrap_or(false)
    }

    fn subscribe(&self) -> Receiver<DeviceEvent> {
        let (tx, rx) = unbounded();
        self.inner.subscribers.lock().push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(last: u8) -> MacAddr {
        MacAddr::new([0x02, 0, 0, 0, 0, last])
    }

    struct Capture(Mutex<Vec<Vec<u8>>>);

    impl RxHook for Capture {
        fn on_frame(&self, frame: RxFrame) {
            self.0.lock().push(frame.buf.as_slice().to_vec());
        }
    }

    #[test]
    fn test_hook_install_and_duplicate_bind() {
        let registry = MemRegistry::new();
        let dev = registry.add_device("eth0", mac(1), 1500);
        let hook = Arc::new(Capture(Mutex::new(Vec::new())));

        registry
            .install_rx_hook(dev.id(), hook.clone())
            .expect("first install");
        assert!(registry.has_rx_hook(dev.id()));
        assert_eq!(
            registry.install_rx_hook(dev.id(), hook.clone()),
            Err(DeviceError::AlreadyBound(dev.id()))
        );

        registry.remove_rx_hook(dev.id()).expect("remove");
        assert!(!registry.has_rx_hook(dev.id()));
        assert_eq!(
            registry.remove_rx_hook(dev.id()),
            Err(DeviceError::NotBound(dev.id()))
        );
    }

    #[test]
    fn test_connected_pair_delivers() {
        let registry = MemRegistry::new();
        let a = registry.add_device("a", mac(1), 1500);
        let b = registry.add_device("b", mac(2), 1500);
        connect(&a, &b);
        a.set_oper_up(true);
        b.set_oper_up(true);

        let capture = Arc::new(Capture(Mutex::new(Vec::new())));
        registry
            .install_rx_hook(b.id(), capture.clone())
            .expect("install");

        let mut frame = FrameBuf::from_slice(&[0u8; 14]);
        frame.as_mut_slice()[0..6].copy_from_slice(&mac(2).octets());
        a.transmit(frame).expect("tx");

        assert_eq!(a.sent().len(), 1);
        assert_eq!(capture.0.lock().len(), 1);
    }

    #[test]
    fn test_peer_down_swallows_frame() {
        let registry = MemRegistry::new();
        let a = registry.add_device("a", mac(1), 1500);
        let b = registry.add_device("b", mac(2), 1500);
        connect(&a, &b);
        a.set_oper_up(true);

        let capture = Arc::new(Capture(Mutex::new(Vec::new())));
        registry
            .install_rx_hook(b.id(), capture.clone())
            .expect("install");

        a.transmit(FrameBuf::from_slice(&[0u8; 14])).expect("tx");
        assert!(capture.0.lock().is_empty());
    }

    #[test]
    fn test_events_reach_subscribers() {
        let registry = MemRegistry::new();
        let dev = registry.add_device("eth0", mac(1), 1500);
        let events = registry.subscribe();
        dev.set_oper_up(true);
        dev.set_mtu(1400);

        let kinds: Vec<_> = events.try_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![DeviceEventKind::Up, DeviceEventKind::MtuChange]);
    }

    #[test]
    fn test_failed_tx_reports_error() {
        let registry = MemRegistry::new();
        let dev = registry.add_device("eth0", mac(1), 1500);
        dev.set_fail_tx(true);
        assert!(dev.transmit(FrameBuf::from_slice(&[0u8; 14])).is_err());
    }
}
