// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Supervision timer thread.
//!
//! Armed when the master's operstate transitions to UP, disarmed on the
//! way down. Each tick builds one PRP_Supervision frame and submits it
//! through the TX engine. The first emission is one full interval after
//! arming. The thread holds only a weak reference to the master and no
//! lock while sending, so teardown can join it at any point.

use super::{tx, MasterCore, Operstate};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

/// Handle to the running timer thread.
pub(crate) struct SupTimer {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl SupTimer {
    /// Spawn the timer. The interval is re-read from the runtime
    /// configuration on every cycle.
    pub(crate) fn spawn(core: Weak<MasterCore>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);
        let handle = thread::spawn(move || timer_loop(&core, &shutdown_clone));
        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the thread and wait for any in-flight tick to finish.
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

impl Drop for SupTimer {
    fn drop(&mut self) {
        self.join_inner();
    }
}

fn timer_loop(core: &Weak<MasterCore>, shutdown: &AtomicBool) {
    loop {
        let interval_ms = match core.upgrade() {
            Some(core) => core.config.timings().life_check_interval_ms,
            None => return,
        };

        // Sleep in small chunks so disarm and teardown stay responsive.
        let deadline = Instant::now() + Duration::from_millis(interval_ms);
        while Instant::now() < deadline {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            thread::sleep(SHUTDOWN_POLL);
        }

        let Some(core) = core.upgrade() else { return };
        if core.operstate() == Operstate::Up {
            tx::send_supervision(&core);
        }
        // drop the strong reference before sleeping again
    }
}
