//! Laufzeit-Konfiguration: Problemgröße, Geräteauswahl, Eingabedaten und
//! Ausgabemodus.
//!
//! Die Defaults entsprechen dem klassischen Beispiel: 1024 Elemente,
//! `A = 1.0`, `B = 2.0`, erste Plattform, erstes GPU-Gerät.

use std::{fmt, path::PathBuf};

use clap::ValueEnum;
use opencl3::{
    device::{
        CL_DEVICE_TYPE_ACCELERATOR, CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_CPU,
        CL_DEVICE_TYPE_DEFAULT, CL_DEVICE_TYPE_GPU,
    },
    types::cl_device_type,
};

use crate::ClError;

/// Anzahl Elemente pro Vektor
pub const DEFAULT_LEN: usize = 1024;

/// Größte Ramp-Länge, bei der `i` und `2 * i` noch exakt als `f32` darstellbar sind
pub const MAX_EXACT_RAMP_LEN: usize = 1 << 23;

/// Gerätetyp für die Enumeration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DeviceKind {
    #[default]
    Gpu,
    Cpu,
    Accelerator,
    Default,
    All,
}

impl DeviceKind {
    pub fn cl_type(self) -> cl_device_type {
        match self {
            DeviceKind::Gpu => CL_DEVICE_TYPE_GPU,
            DeviceKind::Cpu => CL_DEVICE_TYPE_CPU,
            DeviceKind::Accelerator => CL_DEVICE_TYPE_ACCELERATOR,
            DeviceKind::Default => CL_DEVICE_TYPE_DEFAULT,
            DeviceKind::All => CL_DEVICE_TYPE_ALL,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceKind::Gpu => "GPU",
            DeviceKind::Cpu => "CPU",
            DeviceKind::Accelerator => "accelerator",
            DeviceKind::Default => "default",
            DeviceKind::All => "any",
        };
        f.write_str(s)
    }
}

/// Wie die Host-Eingaben befüllt werden
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Fill {
    /// `A[i] = a_value`, `B[i] = b_value`
    #[default]
    Constant,
    /// `A[i] = i`, `B[i] = 2 * i`
    Ramp,
}

/// Was nach dem Readback ausgegeben wird
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    /// Ergebnis elementweise prüfen, "correct"/"incorrect" melden
    #[default]
    Verify,
    /// Die ersten Werte ausgeben, ohne Prüfung
    Sample,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub len: usize,
    pub platform_index: usize,
    pub device_index: usize,
    pub device_kind: DeviceKind,
    pub fill: Fill,
    pub a_value: f32,
    pub b_value: f32,
    pub mode: ReportMode,
    pub sample_count: usize,
    pub profile: bool,
    pub trace_csv: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            len: DEFAULT_LEN,
            platform_index: 0,
            device_index: 0,
            device_kind: DeviceKind::Gpu,
            fill: Fill::Constant,
            a_value: 1.0,
            b_value: 2.0,
            mode: ReportMode::Verify,
            sample_count: 10,
            profile: false,
            trace_csv: None,
        }
    }
}

impl RunConfig {
    /// Prüft die Konfiguration, bevor irgendein OpenCL-Call passiert
    pub fn validate(&self) -> Result<(), ClError> {
        check_len(self.len)?;

        match self.fill {
            Fill::Constant => {
                if !self.a_value.is_finite() || !self.b_value.is_finite() {
                    return Err(ClError::Config(format!(
                        "fill values must be finite (a = {}, b = {})",
                        self.a_value, self.b_value
                    )));
                }
            }
            Fill::Ramp => {
                if self.len > MAX_EXACT_RAMP_LEN {
                    return Err(ClError::Config(format!(
                        "ramp fill supports at most {MAX_EXACT_RAMP_LEN} elements, got {}",
                        self.len
                    )));
                }
            }
        }

        if self.mode == ReportMode::Sample && self.sample_count == 0 {
            return Err(ClError::Config("sample count must be at least 1".into()));
        }
        Ok(())
    }

    /// Erzeugt die beiden Host-Vektoren `A` und `B`
    pub fn inputs(&self) -> (Vec<f32>, Vec<f32>) {
        match self.fill {
            Fill::Constant => (vec![self.a_value; self.len], vec![self.b_value; self.len]),
            Fill::Ramp => (
                (0..self.len).map(|i| i as f32).collect(),
                (0..self.len).map(|i| (2 * i) as f32).collect(),
            ),
        }
    }
}

/// Der Kernel bekommt `n` als `int`, also muss die Länge dort hineinpassen
pub(crate) fn check_len(len: usize) -> Result<(), ClError> {
    if len == 0 || len > i32::MAX as usize {
        return Err(ClError::InvalidSize(len));
    }
    Ok(())
}
