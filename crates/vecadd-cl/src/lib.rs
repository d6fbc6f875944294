//! Vektoraddition über OpenCL.
//!
//! Ablauf: erstes Gerät wählen, Context + Queue anlegen, drei Buffer
//! (A, B read-only mit Host-Kopie, C write-only), Kernel `vector_add` bauen,
//! über genau `len` Work-Items starten, warten, C zurücklesen.
//!
//! ```no_run
//! use vecadd_cl::{RunConfig, VecAdd, report};
//!
//! # fn main() -> Result<(), vecadd_cl::ClError> {
//! let cfg = RunConfig::default();
//! let (a, b) = cfg.inputs();
//! let mut pipeline = VecAdd::from_config(&cfg)?;
//! let out = pipeline.run(&a, &b)?;
//! println!("{}", report::verify(&a, &b, &out.values));
//! # Ok(())
//! # }
//! ```

// ─── Module ───────────────────────────────────────────────────────────
pub mod buffer;
pub mod config;
pub mod device;
mod error;
pub mod kernel;
pub mod pipeline;
pub mod report;

// ─── Feature‑Module ───────────────────────────────────────────────────
#[cfg(feature = "metrics")]
pub mod metrics;
#[cfg(feature = "metrics")]
pub use metrics::{ALLOC_BYTES, ALLOCS, print_summary, summary};

#[cfg(feature = "memtrace")]
pub mod memtracer;
#[cfg(feature = "memtrace")]
pub use memtracer::{CopyToken, Dir, flush_csv};

// ─── Re‑Exports ──────────────────────────────────────────────────────
pub use buffer::{CompletedEvent, GpuBuffer, GpuEventGuard, InFlight, Queued, Ready, State};
pub use config::{DEFAULT_LEN, DeviceKind, Fill, ReportMode, RunConfig};
pub use device::{ComputeDevice, DeviceInfo};
pub use error::ClError;
pub use pipeline::{RunOutput, VecAdd};
pub use report::Verdict;
