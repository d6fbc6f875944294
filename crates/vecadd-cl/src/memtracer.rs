//! Transfer-Trace: H2D-, Kernel- und D2H-Phasen mit Leerlaufzeit dazwischen.
#![cfg(feature = "memtrace")]

use once_cell::sync::Lazy;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    sync::{Mutex, PoisonError},
    time::Instant,
};

/// Transfer‑Richtung oder Kernel‑Event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dir { H2D, D2H, Kernel }

impl Dir {
    fn as_str(self) -> &'static str {
        match self {
            Dir::H2D    => "H2D",
            Dir::D2H    => "D2H",
            Dir::Kernel => "Kernel",
        }
    }
}

/// Eine abgeschlossene Phase, Zeiten relativ zum ersten start()
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub start_us: u128,
    pub end_us: u128,
    pub bytes: usize,
    pub dir: &'static str,
    pub idle_us: u128,
}

/// globaler Nullpunkt – wird beim ersten start() initialisiert
static T0: Lazy<Instant> = Lazy::new(Instant::now);

static LOG: Lazy<Mutex<Vec<TraceEntry>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Token hält Startzeit, Größe & Richtung
#[must_use = "CopyToken::finish() schreibt die Trace-Zeile"]
pub struct CopyToken {
    start: Instant,
    bytes: usize,
    dir: Dir,
}

/// Start eines Transfers/Kernels
pub fn start(dir: Dir, bytes: usize) -> CopyToken {
    Lazy::force(&T0);
    CopyToken { start: Instant::now(), bytes, dir }
}

impl CopyToken {
    /// Ende eines Transfers/Kernels – idle_us ist der Abstand zum vorigen Ende
    pub fn finish(self) {
        let t0 = *T0;
        let s  = self.start.duration_since(t0).as_micros();
        let e  = Instant::now().duration_since(t0).as_micros();

        let mut log = LOG.lock().unwrap_or_else(PoisonError::into_inner);
        let prev_end = log.last().map(|entry| entry.end_us).unwrap_or(0);
        let idle = s.saturating_sub(prev_end);

        log.push(TraceEntry {
            start_us: s,
            end_us: e,
            bytes: self.bytes,
            dir: self.dir.as_str(),
            idle_us: idle,
        });
    }
}

/// Kopie der bisher aufgezeichneten Phasen
pub fn entries() -> Vec<TraceEntry> {
    LOG.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// CSV schreiben – einmal am Programmende aufrufen
pub fn flush_csv(path: &Path) -> io::Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    writeln!(f, "t_start_us,t_end_us,bytes,dir,idle_us")?;
    for e in LOG.lock().unwrap_or_else(PoisonError::into_inner).iter() {
        writeln!(f, "{},{},{},{},{}", e.start_us, e.end_us, e.bytes, e.dir, e.idle_us)?;
    }
    f.flush()
}
