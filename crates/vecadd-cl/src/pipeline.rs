//! Setup → Upload → Launch → Wait → Readback.
//!
//! [`VecAdd`] hält Context, Queue, Programm und Kernel für genau ein Gerät.
//! Die Felder werden in Deklarationsreihenfolge freigegeben: Kernel,
//! Programm, Queue, zuletzt der Context.

use opencl3::{
    command_queue::{CL_QUEUE_PROFILING_ENABLE, CommandQueue},
    context::Context,
    kernel::Kernel,
    program::Program,
    types::cl_int,
};
use std::{ptr, time::Duration};
use tracing::{debug, info};

use crate::{
    ClError,
    buffer::{GpuBuffer, GpuEventGuard, Queued, Ready},
    config::{RunConfig, check_len},
    device::{self, ComputeDevice},
    kernel::{self, arg},
};

#[cfg(feature = "metrics")]
use crate::metrics::record;
#[cfg(feature = "metrics")]
use std::time::Instant;

#[cfg(feature = "memtrace")]
use crate::memtracer::{Dir, start as trace_start};

/// Gleiche Länge, nicht leer, passt in den `int n` des Kernels
pub(crate) fn check_inputs(a: &[f32], b: &[f32]) -> Result<usize, ClError> {
    if a.len() != b.len() {
        return Err(ClError::LengthMismatch { expected: a.len(), actual: b.len() });
    }
    check_len(a.len())?;
    Ok(a.len())
}

/// Ergebnis eines Durchlaufs
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutput {
    pub values: Vec<f32>,
    /// Kernel-Laufzeit auf dem Gerät, nur mit Profiling
    pub kernel_time: Option<Duration>,
}

pub struct VecAdd {
    kernel: Kernel,
    #[allow(dead_code)] // muss leben, solange der Kernel lebt
    program: Program,
    queue: CommandQueue,
    context: Context,
    device: ComputeDevice,
}

impl VecAdd {
    /// Context, Queue und Kernel für `device` anlegen
    pub fn new(device: ComputeDevice, profile: bool) -> Result<Self, ClError> {
        #[cfg(feature = "metrics")]
        let t = Instant::now();

        let context = Context::from_device(device.device())?;
        let props = if profile { CL_QUEUE_PROFILING_ENABLE } else { 0 };
        #[allow(deprecated)]
        let queue = CommandQueue::create(&context, device.device().id(), props)?;
        let (program, kernel) = kernel::build(&context)?;

        #[cfg(feature = "metrics")]
        record("setup", t);

        debug!(device = %device.device_name, profile, "pipeline ready");
        Ok(Self { kernel, program, queue, context, device })
    }

    /// Gerät laut Konfiguration wählen, dann [`VecAdd::new`]
    pub fn from_config(cfg: &RunConfig) -> Result<Self, ClError> {
        let device = device::select(cfg.platform_index, cfg.device_index, cfg.device_kind)?;
        Self::new(device, cfg.profile)
    }

    pub fn device(&self) -> &ComputeDevice {
        &self.device
    }

    /// `C = A + B` auf dem Gerät; blockiert bis das Ergebnis auf dem Host liegt.
    ///
    /// `&mut self`, weil die Argumente am gemeinsamen Kernel-Objekt gebunden werden.
    pub fn run(&mut self, a: &[f32], b: &[f32]) -> Result<RunOutput, ClError> {
        let len = check_inputs(a, b)?;

        /* ---------- 1. Buffer anlegen, Eingaben kopieren ---------- */
        let a_dev = GpuBuffer::<f32, Ready>::from_host(&self.context, a)?;
        let b_dev = GpuBuffer::<f32, Ready>::from_host(&self.context, b)?;
        let c_dev = GpuBuffer::<f32, Queued>::new(&self.context, len)?.launch();

        /* ---------- 2. Argumente binden ---------- */
        let n = len as cl_int;
        unsafe {
            self.kernel.set_arg(arg::A, a_dev.raw())?;
            self.kernel.set_arg(arg::B, b_dev.raw())?;
            self.kernel.set_arg(arg::C, c_dev.raw())?;
            self.kernel.set_arg(arg::N, &n)?;
        }

        /* ---------- 3. Launch über genau `len` Work-Items ---------- */
        #[cfg(feature = "metrics")]
        let t = Instant::now();
        #[cfg(feature = "memtrace")]
        let tok = trace_start(Dir::Kernel, 0);

        let global = [len];
        let evt = unsafe {
            self.queue.enqueue_nd_range_kernel(
                self.kernel.get(),
                1,
                ptr::null(),
                global.as_ptr(),
                ptr::null(),
                &[],
            )?
        };
        let done = GpuEventGuard::new(evt).wait()?;
        self.queue.finish()?;

        #[cfg(feature = "memtrace")]
        tok.finish();
        #[cfg(feature = "metrics")]
        record("kernel", t);

        let kernel_time = done.device_time();
        if let Some(d) = kernel_time {
            info!(elapsed_us = d.as_micros() as u64, "vector_add finished");
        }

        /* ---------- 4. Device → Host ---------- */
        let c_ready = c_dev.into_ready(&done);
        let values = c_ready.to_vec(&self.queue)?;

        Ok(RunOutput { values, kernel_time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_inputs_are_rejected() {
        let err = check_inputs(&[1.0; 4], &[2.0; 3]).unwrap_err();
        assert!(matches!(err, ClError::LengthMismatch { expected: 4, actual: 3 }));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let err = check_inputs(&[], &[]).unwrap_err();
        assert!(matches!(err, ClError::InvalidSize(0)));
    }

    #[test]
    fn matching_inputs_yield_length() {
        assert_eq!(check_inputs(&[1.0; 1024], &[2.0; 1024]).unwrap(), 1024);
    }
}
