//! Device-Buffer mit Typ-State.
//!
//! Ein [`GpuBuffer`] trägt seinen Synchronisationszustand im Typ:
//!
//! * [`Queued`]   – angelegt, Inhalt undefiniert (Ausgabepuffer vor dem Launch)
//! * [`InFlight`] – ein Kernel, der diesen Puffer schreibt, ist eingereiht
//! * [`Ready`]    – Inhalt synchronisiert, darf gelesen werden
//!
//! Lesen geht nur aus `Ready`, und nach `Ready` kommt man aus `InFlight` nur
//! mit einem [`CompletedEvent`], also nach einem expliziten Wait:
//!
//! ```compile_fail
//! use opencl3::command_queue::CommandQueue;
//! use vecadd_cl::{GpuBuffer, Queued};
//!
//! fn read_too_early(buf: &GpuBuffer<f32, Queued>, queue: &CommandQueue) {
//!     let _ = buf.to_vec(queue);
//! }
//! ```

use bytemuck::Pod;
use opencl3::{
    command_queue::CommandQueue,
    context::Context,
    event::Event,
    memory::{Buffer, CL_MEM_COPY_HOST_PTR, CL_MEM_READ_ONLY, CL_MEM_WRITE_ONLY},
    types::CL_BLOCKING,
};
use std::{
    ffi::c_void,
    marker::PhantomData,
    mem::ManuallyDrop,
    ptr,
    time::Duration,
};

use crate::ClError;

#[cfg(feature = "metrics")]
use crate::metrics::{ALLOC_BYTES, ALLOCS, record};
#[cfg(feature = "metrics")]
use std::{sync::atomic::Ordering, time::Instant};

#[cfg(feature = "memtrace")]
use crate::memtracer::{Dir, start as trace_start};

// ─── Typ‑State‑Marker ────────────────────────────────────────────────
mod sealed {
    pub trait Sealed {}
}

pub trait State: sealed::Sealed {}

pub struct Queued;
impl sealed::Sealed for Queued {}
impl State for Queued {}

pub struct InFlight;
impl sealed::Sealed for InFlight {}
impl State for InFlight {}

pub struct Ready;
impl sealed::Sealed for Ready {}
impl State for Ready {}

// ─── GPU‑Buffer ──────────────────────────────────────────────────────
pub struct GpuBuffer<T, S: State> {
    buf: Buffer<T>,
    len: usize,
    _state: PhantomData<S>,
}

impl<T, S: State> std::fmt::Debug for GpuBuffer<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("len", &self.len)
            .field("state", &std::any::type_name::<S>())
            .finish()
    }
}

// Drop nur für den Allokations-Zähler; der cl_mem wird von Buffer<T> freigegeben
impl<T, S: State> Drop for GpuBuffer<T, S> {
    #[inline]
    fn drop(&mut self) {
        #[cfg(feature = "metrics")]
        {
            ALLOCS.fetch_sub(1, Ordering::Relaxed);
            ALLOC_BYTES.fetch_sub(self.len * std::mem::size_of::<T>(), Ordering::Relaxed);
        }
    }
}

impl<T: Pod, S: State> GpuBuffer<T, S> {
    fn wrap(buf: Buffer<T>, len: usize) -> Self {
        #[cfg(feature = "metrics")]
        {
            ALLOCS.fetch_add(1, Ordering::Relaxed);
            ALLOC_BYTES.fetch_add(len * std::mem::size_of::<T>(), Ordering::Relaxed);
        }
        Self { buf, len, _state: PhantomData }
    }

    /// Zustandswechsel ohne Kopie; Drop darf dabei nicht laufen
    #[inline(always)]
    fn into_state<N: State>(self) -> GpuBuffer<T, N> {
        let this = ManuallyDrop::new(self);
        // Safety: `this` wird nie wieder benutzt oder gedroppt, der Buffer
        // wird also genau einmal herausbewegt.
        let buf = unsafe { ptr::read(&this.buf) };
        GpuBuffer { buf, len: this.len, _state: PhantomData }
    }
}

// ── Ready (Host → Device beim Anlegen) ───────────────────────────────
impl<T: Pod> GpuBuffer<T, Ready> {
    /// Read-only Buffer, beim Anlegen mit `host` befüllt (CL_MEM_COPY_HOST_PTR)
    pub fn from_host(ctx: &Context, host: &[T]) -> Result<Self, ClError> {
        if host.is_empty() {
            return Err(ClError::InvalidSize(0));
        }

        #[cfg(feature = "metrics")]
        let t = Instant::now();
        #[cfg(feature = "memtrace")]
        let tok = trace_start(Dir::H2D, std::mem::size_of_val(host));

        // COPY_HOST_PTR liest nur; der *mut ist eine Vorgabe der C-API
        let buf = unsafe {
            Buffer::<T>::create(
                ctx,
                CL_MEM_READ_ONLY | CL_MEM_COPY_HOST_PTR,
                host.len(),
                host.as_ptr() as *mut c_void,
            )?
        };

        #[cfg(feature = "memtrace")]
        tok.finish();
        #[cfg(feature = "metrics")]
        record("upload", t);

        Ok(Self::wrap(buf, host.len()))
    }

    /// Blockierendes Lesen nach `host_out`
    pub fn read_into(&self, queue: &CommandQueue, host_out: &mut [T]) -> Result<(), ClError> {
        if host_out.len() != self.len {
            return Err(ClError::LengthMismatch { expected: self.len, actual: host_out.len() });
        }

        #[cfg(feature = "metrics")]
        let t = Instant::now();
        #[cfg(feature = "memtrace")]
        let tok = trace_start(Dir::D2H, std::mem::size_of_val(host_out));

        unsafe {
            queue.enqueue_read_buffer(&self.buf, CL_BLOCKING, 0, host_out, &[])?;
        }

        #[cfg(feature = "memtrace")]
        tok.finish();
        #[cfg(feature = "metrics")]
        record("readback", t);

        Ok(())
    }

    pub fn to_vec(&self, queue: &CommandQueue) -> Result<Vec<T>, ClError> {
        let mut out = vec![T::zeroed(); self.len];
        self.read_into(queue, &mut out)?;
        Ok(out)
    }
}

// ── Queued ───────────────────────────────────────────────────────────
impl<T: Pod> GpuBuffer<T, Queued> {
    /// Write-only Buffer mit `len` Elementen, Inhalt undefiniert
    pub fn new(ctx: &Context, len: usize) -> Result<Self, ClError> {
        if len == 0 {
            return Err(ClError::InvalidSize(len));
        }

        #[cfg(feature = "metrics")]
        let t = Instant::now();

        let buf = unsafe { Buffer::<T>::create(ctx, CL_MEM_WRITE_ONLY, len, ptr::null_mut())? };

        #[cfg(feature = "metrics")]
        record("alloc", t);

        Ok(Self::wrap(buf, len))
    }

    /// Ein Kernel schreibt gleich in diesen Buffer
    #[inline(always)]
    pub fn launch(self) -> GpuBuffer<T, InFlight> {
        self.into_state()
    }
}

// ── InFlight ─────────────────────────────────────────────────────────
impl<T: Pod> GpuBuffer<T, InFlight> {
    /// Nur mit einem abgeschlossenen Event erreichbar
    #[inline(always)]
    pub fn into_ready(self, _done: &CompletedEvent) -> GpuBuffer<T, Ready> {
        self.into_state()
    }
}

// ── Accessors (alle States) ──────────────────────────────────────────
impl<T, S: State> GpuBuffer<T, S> {
    #[inline(always)]
    pub fn raw(&self) -> &Buffer<T> {
        &self.buf
    }

    /// Anzahl Elemente (nicht Bytes)
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ── Guard (wartet bei Drop auf Event) ────────────────────────────────
pub struct GpuEventGuard {
    evt: ManuallyDrop<Event>,
}

impl GpuEventGuard {
    pub fn new(evt: Event) -> Self {
        Self { evt: ManuallyDrop::new(evt) }
    }

    /// Explizites Wait; liefert das Event als Beweis der Fertigstellung
    pub fn wait(self) -> Result<CompletedEvent, ClError> {
        let mut this = ManuallyDrop::new(self);
        // Safety: Drop des Guards läuft nicht mehr, das Event wird genau
        // einmal herausgenommen.
        let evt = unsafe { ManuallyDrop::take(&mut this.evt) };
        evt.wait()?;
        Ok(CompletedEvent { evt })
    }
}

impl Drop for GpuEventGuard {
    #[inline]
    fn drop(&mut self) {
        let _ = self.evt.wait();
        // Safety: nur hier und in wait() freigegeben; wait() überspringt dieses Drop
        unsafe { ManuallyDrop::drop(&mut self.evt) };
    }
}

/// Ein Event, auf das bereits gewartet wurde
pub struct CompletedEvent {
    evt: Event,
}

impl CompletedEvent {
    /// Ausführungszeit laut Profiling-Zählern; `None` ohne CL_QUEUE_PROFILING_ENABLE
    pub fn device_time(&self) -> Option<Duration> {
        let start = self.evt.profiling_command_start().ok()?;
        let end = self.evt.profiling_command_end().ok()?;
        Some(Duration::from_nanos(end.saturating_sub(start)))
    }
}
