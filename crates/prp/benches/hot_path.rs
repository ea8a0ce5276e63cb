// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hot-path micro-benchmarks: duplicate-window accept and node-table
//! classification (the per-frame costs of RX and TX).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prp::config::Timings;
use prp::node::{DuplicateWindow, NodeTable};
use prp::protocol::{LanId, MacAddr};

fn bench_window_accept(c: &mut Criterion) {
    let timings = Timings::default();
    c.bench_function("window_accept", |b| {
        let mut window = DuplicateWindow::new();
        let mut seq = 0u16;
        let mut now = 0u64;
        b.iter(|| {
            seq = seq.wrapping_add(1);
            now += 1;
            black_box(window.accept(seq, now, &timings));
        });
    });
}

fn bench_node_classify(c: &mut Criterion) {
    let table = NodeTable::new();
    let macs: Vec<MacAddr> = (0..128u8)
        .map(|i| MacAddr::new([0x02, 0, 0, 0, i, 1]))
        .collect();
    {
        let mut guard = table.write();
        for &mac in &macs {
            guard.get_or_create(mac, LanId::A, 0);
        }
    }
    c.bench_function("node_classify", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % macs.len();
            black_box(table.classify_san(macs[i]));
        });
    });
}

criterion_group!(benches, bench_window_accept, bench_node_classify);
criterion_main!(benches);
