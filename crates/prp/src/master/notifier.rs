// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Device-event handler.
//!
//! Subscribes to the host's device notifier stream. Events about the
//! master's own lower ports drive carrier/operstate recomputation (which
//! also clamps the MTU and gates the supervision timer); a pending link
//! type change on a bound slave is vetoed, since PRP binds only
//! Ethernet-class devices. Events about unrelated devices are ignored.

use super::MasterCore;
use crate::device::{DeviceEvent, DeviceEventKind};
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Outcome reported back to the host notifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotifyDecision {
    /// Event processed (or ignored).
    Ok,
    /// Event rejected; the host must abort the operation.
    Bad,
}

pub(crate) struct Notifier {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl Notifier {
    pub(crate) fn spawn(core: Weak<MasterCore>, events: Receiver<DeviceEvent>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);
        let handle = thread::spawn(move || notify_loop(&core, &events, &shutdown_clone));
        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    pub(crate) fn stop(mut self) {
        self.join_inner();
    }

    fn join_inner(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.join_inner();
    }
}

fn notify_loop(core: &Weak<MasterCore>, events: &Receiver<DeviceEvent>, shutdown: &AtomicBool) {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }
        match events.recv_timeout(RECV_TIMEOUT) {
            Ok(event) => {
                let Some(core) = core.upgrade() else { return };
                if handle_event(&core, event) == NotifyDecision::Bad {
                    log::error!(
                        "[notifier] {}: host event {:?} on {} rejected",
                        core.name,
                        event.kind,
                        event.device
                    );
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Process one device event. Split out so tests can drive it directly.
pub(crate) fn handle_event(core: &Arc<MasterCore>, event: DeviceEvent) -> NotifyDecision {
    let bound = core.ports.iter().any(|port| port.device.id() == event.device);
    if !bound {
        return NotifyDecision::Ok;
    }

    match event.kind {
        DeviceEventKind::Up
        | DeviceEventKind::Down
        | DeviceEventKind::Change
        | DeviceEventKind::MtuChange => {
            super::aggregate(core);
            NotifyDecision::Ok
        }
        DeviceEventKind::PreTypeChange => {
            log::error!(
                "[notifier] {}: slave {} may not change link type while bound",
                core.name,
                event.device
            );
            NotifyDecision::Bad
        }
        DeviceEventKind::AddressChange
        | DeviceEventKind::NameChange
        | DeviceEventKind::Register
        | DeviceEventKind::Unregister => {
            log::debug!(
                "[notifier] {}: event {:?} on {}",
                core.name,
                event.kind,
                event.device
            );
            NotifyDecision::Ok
        }
    }
}
