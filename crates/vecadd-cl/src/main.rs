// 2025 Thomas Bicanic – MIT License
//
// vecadd-cl: C = A + B auf dem ersten OpenCL-Gerät, danach Prüfung oder Stichprobe

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::{error, info};
use vecadd_cl::{
    ClError, DEFAULT_LEN, DeviceKind, Fill, ReportMode, RunConfig, VecAdd, device, report,
};

#[derive(Parser, Debug)]
#[command(name = "vecadd-cl")]
#[command(about = "Element-wise addition of two float vectors on an OpenCL device")]
#[command(version)]
struct Args {
    /// Elements per vector
    #[arg(short = 'n', long, default_value_t = DEFAULT_LEN)]
    len: usize,

    /// Platform index in ICD enumeration order
    #[arg(long, default_value_t = 0)]
    platform: usize,

    /// Device index on the chosen platform
    #[arg(long, default_value_t = 0)]
    device: usize,

    #[arg(long, value_enum, default_value_t = DeviceKind::Gpu)]
    device_type: DeviceKind,

    /// Input fill pattern
    #[arg(long, value_enum, default_value_t = Fill::Constant)]
    fill: Fill,

    /// Constant value of A
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    a_value: f32,

    /// Constant value of B
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    b_value: f32,

    /// verify: print "Result is correct/incorrect"; sample: print the first values
    #[arg(short, long, value_enum, default_value_t = ReportMode::Verify)]
    mode: ReportMode,

    /// Number of values printed in sample mode
    #[arg(long, default_value_t = 10)]
    sample_count: usize,

    /// Enable queue profiling and log the kernel's device time
    #[arg(long)]
    profile: bool,

    /// Write the transfer trace as CSV (needs the `memtrace` feature)
    #[arg(long)]
    trace_csv: Option<PathBuf>,

    /// List devices of the chosen type and exit
    #[arg(long)]
    list_devices: bool,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn config(&self) -> RunConfig {
        RunConfig {
            len: self.len,
            platform_index: self.platform,
            device_index: self.device,
            device_kind: self.device_type,
            fill: self.fill,
            a_value: self.a_value,
            b_value: self.b_value,
            mode: self.mode,
            sample_count: self.sample_count,
            profile: self.profile,
            trace_csv: self.trace_csv.clone(),
        }
    }
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn list_devices(kind: DeviceKind) -> Result<(), ClError> {
    let devices = device::enumerate(kind)?;
    if devices.is_empty() {
        println!("no {kind} devices found");
    }
    for d in devices {
        println!(
            "[{}:{}] {} ({}) on {}",
            d.platform_index, d.device_index, d.device_name, d.vendor, d.platform_name
        );
    }
    Ok(())
}

fn run(cfg: &RunConfig) -> Result<bool, ClError> {
    cfg.validate()?;

    /* ---------- 1. Hostdaten ---------------------------------- */
    let (a, b) = cfg.inputs();

    /* ---------- 2. OpenCL-Setup + Lauf ------------------------ */
    let mut pipeline = VecAdd::from_config(cfg)?;
    info!(len = cfg.len, device = %pipeline.device().device_name, "running vector_add");
    let out = pipeline.run(&a, &b)?;

    /* ---------- 3. Ausgabe ------------------------------------ */
    let ok = match cfg.mode {
        ReportMode::Verify => {
            let verdict = report::verify(&a, &b, &out.values);
            if let report::Verdict::Incorrect { index, expected, actual } = verdict {
                error!(index, expected, actual, "mismatch");
            }
            println!("{verdict}");
            verdict.is_correct()
        }
        ReportMode::Sample => {
            for line in report::sample(&out.values, cfg.sample_count) {
                println!("{line}");
            }
            true
        }
    };

    #[cfg(feature = "metrics")]
    vecadd_cl::print_summary();

    #[cfg(feature = "memtrace")]
    if let Some(path) = &cfg.trace_csv {
        vecadd_cl::flush_csv(path)?;
        info!(path = %path.display(), "transfer trace written");
    }
    #[cfg(not(feature = "memtrace"))]
    if cfg.trace_csv.is_some() {
        tracing::warn!("--trace-csv ignored: built without the memtrace feature");
    }

    Ok(ok)
}

/// 0 bei Erfolg, 1 bei "incorrect" oder Fehler
fn exit_status(result: &Result<bool, ClError>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) | Err(_) => 1,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let result = if args.list_devices {
        list_devices(args.device_type).map(|()| true)
    } else {
        run(&args.config())
    };

    if let Err(e) = &result {
        eprintln!("error: {e}");
    }
    ExitCode::from(exit_status(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_config() {
        let args = Args::try_parse_from([
            "vecadd-cl",
            "--len", "8",
            "--platform", "1",
            "--device", "2",
            "--device-type", "cpu",
            "--fill", "ramp",
            "--a-value", "-1.5",
            "--b-value", "-0.25",
            "--mode", "sample",
            "--sample-count", "3",
            "--profile",
            "--trace-csv", "trace.csv",
        ])
        .unwrap();

        let cfg = args.config();
        assert_eq!(cfg.len, 8);
        assert_eq!((cfg.platform_index, cfg.device_index), (1, 2));
        assert_eq!(cfg.device_kind, DeviceKind::Cpu);
        assert_eq!(cfg.fill, Fill::Ramp);
        assert_eq!((cfg.a_value, cfg.b_value), (-1.5, -0.25));
        assert_eq!(cfg.mode, ReportMode::Sample);
        assert_eq!(cfg.sample_count, 3);
        assert!(cfg.profile);
        assert_eq!(cfg.trace_csv, Some(PathBuf::from("trace.csv")));
    }

    #[test]
    fn no_flags_give_default_config() {
        let args = Args::try_parse_from(["vecadd-cl"]).unwrap();
        assert_eq!(args.config(), RunConfig::default());
        assert!(!args.list_devices);
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn short_flags() {
        let args = Args::try_parse_from(["vecadd-cl", "-n", "16", "-m", "verify"]).unwrap();
        assert_eq!(args.config().len, 16);
        assert_eq!(args.config().mode, ReportMode::Verify);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Args::try_parse_from(["vecadd-cl", "--mode", "fast"]).is_err());
    }

    #[test]
    fn exit_status_follows_outcome() {
        assert_eq!(exit_status(&Ok(true)), 0);
        assert_eq!(exit_status(&Ok(false)), 1);
        assert_eq!(exit_status(&Err(ClError::Api(-5))), 1);
        assert_eq!(exit_status(&Err(ClError::NoPlatform)), 1);
    }
}
