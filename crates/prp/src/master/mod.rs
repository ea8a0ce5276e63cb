// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The PRP master interface: one logical L2 endpoint bonded onto two
//! lower Ethernet ports.
//!
//! The master owns the two port bindings, the node table, the sequence
//! counters and the background tasks (supervision timer, pruner, event
//! notifier). Creation validates and claims both slaves atomically;
//! teardown detaches them and joins every thread before returning.

/// Device-event handling.
pub mod notifier;
/// Per-master counters.
pub mod stats;

pub(crate) mod pruner;
pub(crate) mod rx;
pub(crate) mod sup_timer;
pub(crate) mod tx;

pub use notifier::NotifyDecision;
pub use stats::{MasterStats, StatsSnapshot};

use crate::config::RuntimeConfig;
use crate::device::{
    Clock, DeviceClass, DeviceError, DeviceId, FrameBuf, LowerDevice, NullUpperLayer, PortRegistry,
    SystemClock, UpperLayer,
};
use crate::node::{NodeSnapshot, NodeTable};
use crate::config::SUP_MULTICAST_DEFAULT;
use crate::protocol::constants::PRP_RCT_LEN;
use crate::protocol::{LanId, MacAddr};
use parking_lot::Mutex;
use pruner::Pruner;
use rx::PortRx;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::Arc;
use sup_timer::SupTimer;

/// Result alias for control-plane operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Control-plane failure. Reported synchronously; no partial state is
/// retained when creation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A slave parameter was not supplied.
    MissingPort,
    /// The same device was named for both ports.
    SamePort,
    /// The named device does not exist.
    NoSuchDevice(DeviceId),
    /// The candidate slave is itself a PRP master.
    AlreadyPrpMaster { name: String },
    /// The candidate slave is already bound to a PRP master.
    AlreadyPrpSlave { name: String },
    /// The candidate slave is a VLAN device.
    VlanDevice { name: String },
    /// Requested MTU exceeds `min(slave MTUs) - 6`.
    MtuExceedsMax { requested: u32, max: u32 },
    /// The host refused a device-plane operation during attach.
    Device(DeviceError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingPort => write!(f, "both slave ports must be given"),
            ConfigError::SamePort => write!(f, "ports A and B must be distinct devices"),
            ConfigError::NoSuchDevice(id) => write!(f, "slave does not exist: {}", id),
            ConfigError::AlreadyPrpMaster { name } => {
                write!(f, "cannot use PRP master '{}' as a slave", name)
            }
            ConfigError::AlreadyPrpSlave { name } => {
                write!(f, "device '{}' is already a PRP slave", name)
            }
            ConfigError::VlanDevice { name } => {
                write!(f, "VLAN device '{}' is not supported as a slave", name)
            }
            ConfigError::MtuExceedsMax { requested, max } => {
                write!(f, "MTU {} exceeds maximum {} (min slave MTU - 6)", requested, max)
            }
            ConfigError::Device(err) => write!(f, "attach failed: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Device(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DeviceError> for ConfigError {
    fn from(err: DeviceError) -> Self {
        ConfigError::Device(err)
    }
}

/// Operational state of the master, aggregated from its ports.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operstate {
    /// Admin-up with at least one operational port.
    Up,
    /// Administratively down.
    Down,
    /// Admin-up but both ports down.
    LowerLayerDown,
}

impl fmt::Display for Operstate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operstate::Up => write!(f, "UP"),
            Operstate::Down => write!(f, "DOWN"),
            Operstate::LowerLayerDown => write!(f, "LOWERLAYERDOWN"),
        }
    }
}

/// One bound lower port. Owned by the master for its whole lifetime.
pub(crate) struct PortHandle {
    pub(crate) device: Arc<dyn LowerDevice>,
    pub(crate) lan: LanId,
}

/// Shared master state. Background tasks reach it through `Weak`
/// references only, so dropping the master is what ends them.
pub(crate) struct MasterCore {
    pub(crate) name: String,
    pub(crate) mac: MacAddr,
    pub(crate) sup_multicast: MacAddr,
    pub(crate) registry: Arc<dyn PortRegistry>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: Arc<RuntimeConfig>,
    pub(crate) ports: [PortHandle; 2],
    pub(crate) mtu: AtomicU32,
    pub(crate) admin_up: AtomicBool,
    pub(crate) carrier: AtomicBool,
    pub(crate) operstate: Mutex<Operstate>,
    pub(crate) data_seqnr: AtomicU16,
    pub(crate) sup_seqnr: AtomicU16,
    pub(crate) nodes: NodeTable,
    pub(crate) stats: MasterStats,
    pub(crate) upper: Arc<dyn UpperLayer>,
    pub(crate) sup_timer: Mutex<Option<SupTimer>>,
}

impl MasterCore {
    pub(crate) fn operstate(&self) -> Operstate {
        *self.operstate.lock()
    }

    /// Largest MTU the master may carry: `min(slave MTUs) - RCT`.
    pub(crate) fn max_mtu(&self) -> u32 {
        self.ports
            .iter()
            .map(|port| port.device.mtu())
            .min()
            .unwrap_or(0)
            .saturating_sub(PRP_RCT_LEN as u32)
    }
}

/// Recompute carrier and operstate from the ports, clamp the MTU, and
/// gate the supervision timer. Called on admin transitions and on every
/// lower-port event.
pub(crate) fn aggregate(core: &Arc<MasterCore>) {
    let any_up = core.ports.iter().any(|port| port.device.is_oper_up());
    core.carrier.store(any_up, Ordering::Relaxed);

    let admin_up = core.admin_up.load(Ordering::Relaxed);
    let new_state = match (admin_up, any_up) {
        (true, true) => Operstate::Up,
        (true, false) => Operstate::LowerLayerDown,
        (false, _) => Operstate::Down,
    };

    let old_state = {
        let mut state = core.operstate.lock();
        std::mem::replace(&mut *state, new_state)
    };
    if old_state != new_state {
        log::info!(
            "[prp] {}: operstate {} -> {}",
            core.name,
            old_state,
            new_state
        );
    }

    let max = core.max_mtu();
    if core.mtu.load(Ordering::Relaxed) > max {
        core.mtu.store(max, Ordering::Relaxed);
        log::info!("[prp] {}: MTU clamped to {}", core.name, max);
    }

    if new_state == Operstate::Up {
        arm_sup_timer(core);
    } else {
        disarm_sup_timer(core);
    }
}

/// Arm the supervision timer. Idempotent.
fn arm_sup_timer(core: &Arc<MasterCore>) {
    let mut slot = core.sup_timer.lock();
    if slot.is_none() {
        log::debug!("[sup_timer] {}: armed", core.name);
        *slot = Some(SupTimer::spawn(Arc::downgrade(core)));
    }
}

/// Disarm the supervision timer, waiting out any in-flight tick.
fn disarm_sup_timer(core: &Arc<MasterCore>) {
    let timer = core.sup_timer.lock().take();
    if let Some(timer) = timer {
        log::debug!("[sup_timer] {}: disarmed", core.name);
        timer.stop();
    }
}

/// Builder for [`PrpMaster`].
pub struct PrpMasterBuilder {
    registry: Arc<dyn PortRegistry>,
    name: String,
    port_a: Option<DeviceId>,
    port_b: Option<DeviceId>,
    sup_multicast: MacAddr,
    config: Arc<RuntimeConfig>,
    clock: Arc<dyn Clock>,
    upper: Arc<dyn UpperLayer>,
}

impl PrpMasterBuilder {
    /// Lower device for LAN A. The master's MAC is copied from it.
    #[must_use]
    pub fn port_a(mut self, id: DeviceId) -> Self {
        self.port_a = Some(id);
        self
    }

    /// Lower device for LAN B.
    #[must_use]
    pub fn port_b(mut self, id: DeviceId) -> Self {
        self.port_b = Some(id);
        self
    }

    /// Override the supervision multicast address (last octet selects
    /// the PRP network; default `01:15:4e:00:01:00`).
    #[must_use]
    pub fn sup_multicast(mut self, addr: MacAddr) -> Self {
        self.sup_multicast = addr;
        self
    }

    /// Use a shared runtime configuration.
    #[must_use]
    pub fn config(mut self, config: Arc<RuntimeConfig>) -> Self {
        self.config = config;
        self
    }

    /// Inject a clock (tests drive a [`crate::device::ManualClock`]).
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sink for decapsulated upstream payloads.
    #[must_use]
    pub fn upper(mut self, upper: Arc<dyn UpperLayer>) -> Self {
        self.upper = upper;
        self
    }

    /// Validate both slaves, claim them, and start the master's
    /// background tasks. On any failure every partial binding is rolled
    /// back before the error is returned.
    pub fn build(self) -> Result<PrpMaster> {
        let port_a_id = self.port_a.ok_or(ConfigError::MissingPort)?;
        let port_b_id = self.port_b.ok_or(ConfigError::MissingPort)?;
        if port_a_id == port_b_id {
            return Err(ConfigError::SamePort);
        }

        let dev_a = self
            .registry
            .get_by_index(port_a_id)
            .ok_or(ConfigError::NoSuchDevice(port_a_id))?;
        let dev_b = self
            .registry
            .get_by_index(port_b_id)
            .ok_or(ConfigError::NoSuchDevice(port_b_id))?;
        slave_ok(self.registry.as_ref(), dev_a.as_ref())?;
        slave_ok(self.registry.as_ref(), dev_b.as_ref())?;

        // hardware address is that of slave A
        let mac = dev_a.mac();
        let mtu = dev_a
            .mtu()
            .min(dev_b.mtu())
            .saturating_sub(PRP_RCT_LEN as u32);

        let core = Arc::new(MasterCore {
            name: self.name,
            mac,
            sup_multicast: self.sup_multicast,
            registry: Arc::clone(&self.registry),
            clock: self.clock,
            config: self.config,
            ports: [
                PortHandle {
                    device: dev_a,
                    lan: LanId::A,
                },
                PortHandle {
                    device: dev_b,
                    lan: LanId::B,
                },
            ],
            mtu: AtomicU32::new(mtu),
            admin_up: AtomicBool::new(false),
            carrier: AtomicBool::new(false),
            operstate: Mutex::new(Operstate::Down),
            data_seqnr: AtomicU16::new(0),
            sup_seqnr: AtomicU16::new(0),
            nodes: NodeTable::new(),
            stats: MasterStats::new(),
            upper: self.upper,
            sup_timer: Mutex::new(None),
        });

        attach_ports(&core)?;

        let events = core.registry.subscribe();
        let notifier = notifier::Notifier::spawn(Arc::downgrade(&core), events);
        let pruner = Pruner::spawn(Arc::downgrade(&core));
        aggregate(&core);

        log::info!(
            "[prp] {}: created (slave A '{}', slave B '{}', mtu {})",
            core.name,
            core.ports[0].device.name(),
            core.ports[1].device.name(),
            mtu
        );
        Ok(PrpMaster {
            core,
            notifier: Some(notifier),
            pruner: Some(pruner),
            torn_down: false,
        })
    }
}

/// Check that `device` can be used as a slave.
fn slave_ok(registry: &dyn PortRegistry, device: &dyn LowerDevice) -> Result<()> {
    match device.class() {
        DeviceClass::PrpMaster => Err(ConfigError::AlreadyPrpMaster {
            name: device.name().to_owned(),
        }),
        DeviceClass::Vlan => Err(ConfigError::VlanDevice {
            name: device.name().to_owned(),
        }),
        DeviceClass::Ethernet => {
            if registry.has_rx_hook(device.id()) {
                Err(ConfigError::AlreadyPrpSlave {
                    name: device.name().to_owned(),
                })
            } else {
                Ok(())
            }
        }
    }
}

/// Link and hook both ports; on failure roll back whatever was claimed.
fn attach_ports(core: &Arc<MasterCore>) -> Result<()> {
    let registry = core.registry.as_ref();
    let mut attached: Vec<DeviceId> = Vec::new();

    for port in &core.ports {
        let id = port.device.id();
        if let Err(err) = registry.link_upper(id, &core.name) {
            rollback_attach(registry, &attached);
            return Err(err.into());
        }
        let hook = Arc::new(PortRx {
            core: Arc::downgrade(core),
            lan: port.lan,
        });
        if let Err(err) = registry.install_rx_hook(id, hook) {
            let _ = registry.unlink_upper(id);
            rollback_attach(registry, &attached);
            return Err(err.into());
        }
        // LRO coalescing would corrupt the per-frame RCT accounting
        port.device.disable_lro();
        attached.push(id);
    }
    Ok(())
}

fn rollback_attach(registry: &dyn PortRegistry, attached: &[DeviceId]) {
    for &id in attached {
        let _ = registry.remove_rx_hook(id);
        let _ = registry.unlink_upper(id);
    }
}

/// A PRP master interface (DANP endpoint).
pub struct PrpMaster {
    core: Arc<MasterCore>,
    notifier: Option<notifier::Notifier>,
    pruner: Option<Pruner>,
    torn_down: bool,
}

impl fmt::Debug for PrpMaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrpMaster")
            .field("name", &self.core.name)
            .field("mac", &self.core.mac)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl PrpMaster {
    /// Start building a master bound to `registry`.
    #[must_use]
    pub fn builder(registry: Arc<dyn PortRegistry>, name: &str) -> PrpMasterBuilder {
        PrpMasterBuilder {
            registry,
            name: name.to_owned(),
            port_a: None,
            port_b: None,
            sup_multicast: MacAddr::new(SUP_MULTICAST_DEFAULT),
            config: Arc::new(RuntimeConfig::new()),
            clock: Arc::new(SystemClock::new()),
            upper: Arc::new(NullUpperLayer),
        }
    }

    /// Submit one outbound frame (Ethernet header included). The source
    /// MAC is rewritten to the master's address; per-port transmit
    /// failures are counted, never surfaced.
    pub fn send(&self, frame: FrameBuf) {
        tx::xmit(&self.core, frame);
    }

    /// Administrative up/down. Going up with a dead slave is legal (the
    /// peer LAN carries the traffic) but worth a warning.
    pub fn set_admin_up(&self, up: bool) {
        self.core.admin_up.store(up, Ordering::Relaxed);
        if up {
            for port in &self.core.ports {
                if !port.device.is_oper_up() {
                    log::warn!(
                        "[prp] {}: slave {} ('{}') is not up",
                        self.core.name,
                        port.lan,
                        port.device.name()
                    );
                }
            }
        }
        aggregate(&self.core);
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn mac(&self) -> MacAddr {
        self.core.mac
    }

    pub fn sup_multicast(&self) -> MacAddr {
        self.core.sup_multicast
    }

    pub fn mtu(&self) -> u32 {
        self.core.mtu.load(Ordering::Relaxed)
    }

    /// Change the master MTU. Fails when the value would not fit the
    /// slaves once the RCT is appended.
    pub fn set_mtu(&self, mtu: u32) -> Result<()> {
        let max = self.core.max_mtu();
        if mtu > max {
            return Err(ConfigError::MtuExceedsMax {
                requested: mtu,
                max,
            });
        }
        self.core.mtu.store(mtu, Ordering::Relaxed);
        log::info!("[prp] {}: MTU changed to {}", self.core.name, mtu);
        Ok(())
    }

    pub fn operstate(&self) -> Operstate {
        self.core.operstate()
    }

    /// Carrier: at least one slave operationally up.
    pub fn carrier(&self) -> bool {
        self.core.carrier.load(Ordering::Relaxed)
    }

    pub fn is_admin_up(&self) -> bool {
        self.core.admin_up.load(Ordering::Relaxed)
    }

    /// Counter snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.core.stats.snapshot()
    }

    /// Copy of the node table for introspection.
    pub fn node_snapshot(&self) -> Vec<NodeSnapshot> {
        self.core.nodes.snapshot()
    }

    /// Run one prune sweep immediately. Returns the number of removed
    /// entries. The background pruner does this periodically.
    pub fn prune_nodes(&self) -> usize {
        let timings = self.core.config.timings();
        self.core
            .nodes
            .prune(self.core.clock.now_ms(), timings.node_forget_time_ms)
    }

    /// Prime the data sequence counter (diagnostics and tests).
    pub fn set_data_seqnr(&self, seqnr: u16) {
        self.core.data_seqnr.store(seqnr, Ordering::Relaxed);
    }

    /// Detach both slaves, stop every background task and drop the node
    /// table. Also performed on drop.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        // stop event handling first so nothing re-arms the timer
        if let Some(notifier) = self.notifier.take() {
            notifier.stop();
        }

        for port in &self.core.ports {
            let id = port.device.id();
            if let Err(err) = self.core.registry.remove_rx_hook(id) {
                log::warn!("[prp] {}: detach rx hook: {}", self.core.name, err);
            }
            if let Err(err) = self.core.registry.unlink_upper(id) {
                log::warn!("[prp] {}: unlink: {}", self.core.name, err);
            }
        }

        disarm_sup_timer(&self.core);
        if let Some(pruner) = self.pruner.take() {
            pruner.stop();
        }
        self.core.nodes.clear();
        log::info!("[prp] {}: destroyed", self.core.name);
    }
}

impl Drop for PrpMaster {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mem::MemRegistry;
    use crate::device::{DeviceEvent, DeviceEventKind};

    fn mac(last: u8) -> MacAddr {
        MacAddr::new([0x02, 0x42, 0xAC, 0x11, 0x00, last])
    }

    fn rig() -> (Arc<MemRegistry>, Arc<crate::device::mem::MemDevice>, Arc<crate::device::mem::MemDevice>) {
        let registry = Arc::new(MemRegistry::new());
        let a = registry.add_device("lan-a", mac(1), 1500);
        let b = registry.add_device("lan-b", mac(2), 1500);
        (registry, a, b)
    }

    #[test]
    fn test_build_requires_both_ports() {
        let (registry, a, _b) = rig();
        let err = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .build()
            .expect_err("port B missing");
        assert_eq!(err, ConfigError::MissingPort);
    }

    #[test]
    fn test_build_rejects_same_device_twice() {
        let (registry, a, _b) = rig();
        let err = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(a.id())
            .build()
            .expect_err("same device");
        assert_eq!(err, ConfigError::SamePort);
    }

    #[test]
    fn test_build_rejects_unknown_device() {
        let (registry, a, _b) = rig();
        let bogus = DeviceId(9_999);
        let err = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(bogus)
            .build()
            .expect_err("unknown device");
        assert_eq!(err, ConfigError::NoSuchDevice(bogus));
    }

    #[test]
    fn test_build_rejects_vlan_and_master_class() {
        let (registry, a, _b) = rig();
        let vlan = registry.add_device_with_class("eth0.100", mac(3), 1500, DeviceClass::Vlan);
        let err = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(vlan.id())
            .build()
            .expect_err("vlan slave");
        assert!(matches!(err, ConfigError::VlanDevice { .. }));

        let other = registry.add_device_with_class("prp1", mac(4), 1500, DeviceClass::PrpMaster);
        let err = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(other.id())
            .port_b(a.id())
            .build()
            .expect_err("master as slave");
        assert!(matches!(err, ConfigError::AlreadyPrpMaster { .. }));
    }

    #[test]
    fn test_build_rejects_claimed_slave() {
        let (registry, a, b) = rig();
        let _first = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(b.id())
            .build()
            .expect("first master");
        let c = registry.add_device("lan-c", mac(5), 1500);
        let err = PrpMaster::builder(registry.clone(), "prp1")
            .port_a(a.id())
            .port_b(c.id())
            .build()
            .expect_err("slave already claimed");
        assert!(matches!(err, ConfigError::AlreadyPrpSlave { .. }));
    }

    #[test]
    fn test_attach_rollback_leaves_no_state() {
        let (registry, a, b) = rig();
        b.set_fail_link(true);
        let err = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(b.id())
            .build()
            .expect_err("link B refused");
        assert!(matches!(err, ConfigError::Device(_)));
        assert!(!registry.has_rx_hook(a.id()));
        assert!(!registry.has_rx_hook(b.id()));
        assert_eq!(a.upper(), None);
        assert_eq!(b.upper(), None);
    }

    #[test]
    fn test_build_claims_both_ports() {
        let (registry, a, b) = rig();
        let master = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(b.id())
            .build()
            .expect("create");
        assert_eq!(master.mac(), a.mac());
        assert!(registry.has_rx_hook(a.id()));
        assert!(registry.has_rx_hook(b.id()));
        assert_eq!(a.upper().as_deref(), Some("prp0"));
        assert!(a.lro_disabled() && b.lro_disabled());
        assert_eq!(master.mtu(), 1494);
    }

    #[test]
    fn test_teardown_releases_ports() {
        let (registry, a, b) = rig();
        let master = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(b.id())
            .build()
            .expect("create");
        master.shutdown();
        assert!(!registry.has_rx_hook(a.id()));
        assert!(!registry.has_rx_hook(b.id()));
        assert_eq!(a.upper(), None);

        // the released slaves can be claimed again
        let _again = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(b.id())
            .build()
            .expect("recreate after teardown");
    }

    #[test]
    fn test_mtu_rule() {
        let (registry, a, b) = rig();
        b.set_mtu(1400);
        let master = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(b.id())
            .build()
            .expect("create");
        assert_eq!(master.mtu(), 1394);
        master.set_mtu(1394).expect("bound value accepted");
        master.set_mtu(1000).expect("smaller accepted");
        let err = master.set_mtu(1500).expect_err("too large");
        assert_eq!(
            err,
            ConfigError::MtuExceedsMax {
                requested: 1500,
                max: 1394
            }
        );
    }

    #[test]
    fn test_operstate_aggregation() {
        let (registry, a, b) = rig();
        let master = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(b.id())
            .build()
            .expect("create");

        assert_eq!(master.operstate(), Operstate::Down);
        assert!(!master.carrier());

        master.set_admin_up(true);
        assert_eq!(master.operstate(), Operstate::LowerLayerDown);

        a.set_oper_up(true);
        aggregate(&master.core); // notifier thread also does this
        assert_eq!(master.operstate(), Operstate::Up);
        assert!(master.carrier());

        a.set_oper_up(false);
        aggregate(&master.core);
        assert_eq!(master.operstate(), Operstate::LowerLayerDown);
        assert!(!master.carrier());

        master.set_admin_up(false);
        assert_eq!(master.operstate(), Operstate::Down);
    }

    #[test]
    fn test_notifier_decisions() {
        let (registry, a, b) = rig();
        let master = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(b.id())
            .build()
            .expect("create");

        let unrelated = registry.add_device("lan-x", mac(9), 1500);
        assert_eq!(
            notifier::handle_event(
                &master.core,
                DeviceEvent {
                    device: unrelated.id(),
                    kind: DeviceEventKind::PreTypeChange
                }
            ),
            NotifyDecision::Ok
        );
        assert_eq!(
            notifier::handle_event(
                &master.core,
                DeviceEvent {
                    device: a.id(),
                    kind: DeviceEventKind::PreTypeChange
                }
            ),
            NotifyDecision::Bad
        );
        assert_eq!(
            notifier::handle_event(
                &master.core,
                DeviceEvent {
                    device: a.id(),
                    kind: DeviceEventKind::Change
                }
            ),
            NotifyDecision::Ok
        );
    }

    #[test]
    fn test_lower_mtu_change_clamps_master() {
        let (registry, a, b) = rig();
        let master = PrpMaster::builder(registry.clone(), "prp0")
            .port_a(a.id())
            .port_b(b.id())
            .build()
            .expect("create");
        assert_eq!(master.mtu(), 1494);

        b.set_mtu(1200);
        notifier::handle_event(
            &master.core,
            DeviceEvent {
                device: b.id(),
                kind: DeviceEventKind::MtuChange,
            },
        );
        assert_eq!(master.mtu(), 1194);
    }
}
