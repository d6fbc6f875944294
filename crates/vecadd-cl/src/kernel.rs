//! Kernel-Quelltext und Programm-Build.

use opencl3::{context::Context, kernel::Kernel, program::Program};
use tracing::{debug, error};

use crate::ClError;

/// OpenCL-C-Quelltext, wird zur Laufzeit gebaut
pub const VEC_ADD_SOURCE: &str = include_str!("kernels/vec_add.cl");

/// Name des Einsprungpunkts in [`VEC_ADD_SOURCE`]
pub const VEC_ADD_ENTRY: &str = "vector_add";

/// Positionen der Kernel-Argumente
pub mod arg {
    pub const A: u32 = 0;
    pub const B: u32 = 1;
    pub const C: u32 = 2;
    pub const N: u32 = 3;
}

/// Baut [`VEC_ADD_SOURCE`] für `context` und holt den Kernel heraus.
///
/// Schlägt der Build fehl, steht das Build-Log des Treibers in [`ClError::Build`].
pub fn build(context: &Context) -> Result<(Program, Kernel), ClError> {
    let program = Program::create_and_build_from_source(context, VEC_ADD_SOURCE, "")
        .map_err(|log| {
            error!("vector_add build failed");
            ClError::Build(log)
        })?;
    let kernel = Kernel::create(&program, VEC_ADD_ENTRY)?;
    debug!(entry = VEC_ADD_ENTRY, "kernel built");
    Ok((program, kernel))
}
