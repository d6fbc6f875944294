//! Plattform- und Geräteauswahl.
//!
//! Auswahl nach Index in der Reihenfolge, die der ICD-Loader liefert; mit den
//! Default-Indizes `0/0` ist das "erste Plattform, erstes Gerät".

use opencl3::{
    device::Device,
    platform::{Platform, get_platforms},
};
use tracing::{debug, info};

use crate::{ClError, config::DeviceKind};

/// Das ausgewählte Gerät samt Plattform
#[derive(Debug)]
pub struct ComputeDevice {
    pub(crate) device: Device,
    pub platform_name: String,
    pub device_name: String,
    pub vendor: String,
    pub version: String,
}

impl ComputeDevice {
    pub fn device(&self) -> &Device {
        &self.device
    }
}

/// Eintrag für `--list-devices`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub platform_index: usize,
    pub device_index: usize,
    pub platform_name: String,
    pub device_name: String,
    pub vendor: String,
}

/// Statuscode des ICD-Loaders, wenn kein Treiber installiert ist
const CL_PLATFORM_NOT_FOUND_KHR: i32 = -1001;

/// Nur "kein ICD" wird zu `NoPlatform`, alles andere behält seinen Code
fn platform_error(err: ClError) -> ClError {
    match err {
        ClError::Api(CL_PLATFORM_NOT_FOUND_KHR) => ClError::NoPlatform,
        other => other,
    }
}

fn platforms() -> Result<Vec<Platform>, ClError> {
    let platforms = get_platforms().map_err(|e| platform_error(e.into()))?;
    if platforms.is_empty() {
        return Err(ClError::NoPlatform);
    }
    Ok(platforms)
}

/// Geräte-IDs einer Plattform; `CL_DEVICE_NOT_FOUND` wird zur leeren Liste
fn device_ids(
    platform: &Platform,
    kind: DeviceKind,
) -> Result<Vec<opencl3::types::cl_device_id>, ClError> {
    match platform.get_devices(kind.cl_type()) {
        Ok(ids) => Ok(ids),
        Err(e) => {
            let err = ClError::from(e);
            if err.is_device_not_found() {
                Ok(Vec::new())
            } else {
                Err(err)
            }
        }
    }
}

/// Wählt Plattform `platform_index` und darauf Gerät `device_index` vom Typ `kind`
pub fn select(
    platform_index: usize,
    device_index: usize,
    kind: DeviceKind,
) -> Result<ComputeDevice, ClError> {
    let platforms = platforms()?;
    debug!(count = platforms.len(), "OpenCL platforms found");

    let platform = platforms.get(platform_index).ok_or_else(|| {
        ClError::Config(format!(
            "platform index {platform_index} out of range ({} available)",
            platforms.len()
        ))
    })?;
    let platform_name = platform.name().unwrap_or_default();

    let ids = device_ids(platform, kind)?;
    let id = ids.get(device_index).copied().ok_or_else(|| ClError::NoDevice {
        kind: kind.to_string(),
        platform: platform_name.clone(),
    })?;

    let device = Device::new(id);
    let device_name = device.name().unwrap_or_default();
    let vendor = device.vendor().unwrap_or_default();
    let version = device.version().unwrap_or_default();
    info!(
        platform = %platform_name,
        device = %device_name,
        %vendor,
        "selected OpenCL device"
    );

    Ok(ComputeDevice { device, platform_name, device_name, vendor, version })
}

/// Alle Geräte vom Typ `kind` über alle Plattformen
pub fn enumerate(kind: DeviceKind) -> Result<Vec<DeviceInfo>, ClError> {
    let mut out = Vec::new();
    for (platform_index, platform) in platforms()?.iter().enumerate() {
        let platform_name = platform.name().unwrap_or_default();
        debug!("scanning OpenCL platform: {}", platform_name);

        for (device_index, id) in device_ids(platform, kind)?.into_iter().enumerate() {
            let device = Device::new(id);
            out.push(DeviceInfo {
                platform_index,
                device_index,
                platform_name: platform_name.clone(),
                device_name: device.name().unwrap_or_default(),
                vendor: device.vendor().unwrap_or_default(),
            });
        }
    }
    Ok(out)
}
