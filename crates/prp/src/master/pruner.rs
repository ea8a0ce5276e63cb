// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node-table pruner thread.
//!
//! Sweeps the table a few times per forget interval and removes peers
//! silent on both LANs beyond `node_forget_time_ms`. Runs for the
//! master's whole lifetime, independent of operstate.

use super::MasterCore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

pub(crate) struct Pruner {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl Pruner {
    pub(crate) fn spawn(core: Weak<MasterCore>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);
        let handle = thread::spawn(move || prune_loop(&core, &shutdown_clone));
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

impl Drop for Pruner {
    fn drop(&mut self) {
        self.join_inner();
    }
}

fn prune_loop(core: &Weak<MasterCore>, shutdown: &AtomicBool) {
    loop {
        let forget_ms = match core.upgrade() {
            Some(core) => core.config.timings().node_forget_time_ms,
            None => return,
        };
        let interval_ms = (forget_ms / 4).max(1);

        let deadline = Instant::now() + Duration::from_millis(interval_ms);
        while Instant::now() < deadline {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            thread::sleep(SHUTDOWN_POLL);
        }

        let Some(core) = core.upgrade() else { return };
        let removed = core.nodes.prune(core.clock.now_ms(), forget_ms);
        if removed > 0 {
            log::debug!("[pruner] {}: forgot {} stale node(s)", core.name, removed);
        }
    }
}
