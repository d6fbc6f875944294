//! Host-Latenzen pro Pipeline-Stufe und Allokations-Zähler.
#![cfg(feature = "metrics")]

use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Instant,
};

/* ───────────── Roh‑Latenzen ─────────────────────────── */

static TIMES: Lazy<Mutex<Vec<(&'static str, u128)>>> =
    Lazy::new(|| Mutex::new(Vec::new()));

/// In der Pipeline aufrufen: `record("upload", t)` mit `t` = Startzeitpunkt
pub fn record(stage: &'static str, start: Instant) {
    let dur = start.elapsed().as_micros();
    TIMES
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push((stage, dur));
}

/* ───────────── Buffer‑Allokationen ───────────────────── */

/// aktuell lebende Device-Buffer
pub static ALLOCS:      AtomicUsize = AtomicUsize::new(0);
/// deren Größe in Bytes
pub static ALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);

/* ───────────── Zusammenfassung ──────────────────────── */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageStats {
    pub stage: &'static str,
    pub calls: usize,
    pub mean_us: u128,
    pub p95_us: u128,
}

/// Leert die Rohdaten und gruppiert sie pro Stufe, sortiert nach Name
pub fn summary() -> Vec<StageStats> {
    let mut map: HashMap<&'static str, Vec<u128>> = HashMap::new();
    {
        let mut times = TIMES.lock().unwrap_or_else(PoisonError::into_inner);
        for (stage, us) in times.drain(..) {
            map.entry(stage).or_default().push(us);
        }
    }

    let mut out: Vec<StageStats> = map
        .into_iter()
        .map(|(stage, mut v)| {
            v.sort_unstable();
            let mean_us = v.iter().sum::<u128>() / v.len() as u128;
            let p95_us = v[((v.len() * 95) / 100).saturating_sub(1)];
            StageStats { stage, calls: v.len(), mean_us, p95_us }
        })
        .collect();
    out.sort_by_key(|s| s.stage);
    out
}

/// Am Programmende aufrufen, z. B. in `main()`
pub fn print_summary() {
    println!("── metrics summary ──");
    for s in summary() {
        println!(
            "{:<10} calls={:>3}  mean={:>6} µs   p95={:>6} µs",
            s.stage, s.calls, s.mean_us, s.p95_us
        );
    }

    let allocs = ALLOCS.load(Ordering::Relaxed);
    let bytes  = ALLOC_BYTES.load(Ordering::Relaxed);
    println!("live GPU buffers: {}   ({} KiB)", allocs, bytes / 1024);
}
