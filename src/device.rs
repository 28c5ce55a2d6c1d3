//! Acquiring the keyboard's control channel.
//!
//! The pipeline only ever sees a [`ControlChannel`]. This module finds the
//! keyboard, claims what it needs, and gives everything back on drop.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use hidapi::{HidApi, HidDevice};
use rusb::{Device, DeviceDescriptor, DeviceHandle, Direction, GlobalContext, TransferType};
use tracing::{debug, info, warn};

use crate::error::{LightError, Result};
use crate::transport::ControlChannel;

pub const VENDOR_ID: u16 = 0x03F0;
pub const PRODUCT_ID: u16 = 0x1F41;

const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// How to reach the keyboard.
#[derive(ValueEnum, Default, PartialEq, Eq, Debug, Copy, Clone)]
pub enum Backend {
    /// libusb interrupt endpoint (detaches the kernel driver while writing)
    #[default]
    Usb,
    /// hidapi output reports
    Hid,
}

impl Backend {
    /// Open the keyboard and return a channel that releases it on drop.
    pub fn open(&self) -> Result<Box<dyn ControlChannel>> {
        match self {
            Self::Usb => Ok(Box::new(UsbChannel::open()?)),
            Self::Hid => Ok(Box::new(HidChannel::open()?)),
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usb => f.write_str("usb"),
            Self::Hid => f.write_str("hid"),
        }
    }
}

fn unavailable(what: &str, err: impl Display) -> LightError {
    LightError::DeviceUnavailable(format!("{what}: {err}"))
}

/// Location of the interrupt OUT endpoint.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    config: u8,
    iface: u8,
    setting: u8,
    address: u8,
}

/// Find the first interrupt OUT endpoint across all configurations.
fn find_interrupt_out(device: &Device<GlobalContext>, desc: &DeviceDescriptor) -> Option<Endpoint> {
    for n in 0..desc.num_configurations() {
        let config = match device.config_descriptor(n) {
            Ok(config) => config,
            Err(_) => continue,
        };

        for interface in config.interfaces() {
            for interface_desc in interface.descriptors() {
                let endpoint = interface_desc.endpoint_descriptors().find(|ep| {
                    ep.direction() == Direction::Out && ep.transfer_type() == TransferType::Interrupt
                });

                if let Some(ep) = endpoint {
                    return Some(Endpoint {
                        config: config.number(),
                        iface: interface_desc.interface_number(),
                        setting: interface_desc.setting_number(),
                        address: ep.address(),
                    });
                }
            }
        }
    }

    None
}

/// Claimed libusb interface with its interrupt OUT endpoint.
struct UsbChannel {
    handle: DeviceHandle<GlobalContext>,
    endpoint: Endpoint,
    detached_kernel_driver: bool,
    claimed: bool,
}

impl Drop for UsbChannel {
    fn drop(&mut self) {
        if self.claimed {
            let _ = self.handle.release_interface(self.endpoint.iface);
        }

        if self.detached_kernel_driver {
            // Best-effort: give the interface back to the kernel so typing keeps working.
            let _ = self.handle.attach_kernel_driver(self.endpoint.iface);
        }
    }
}

impl UsbChannel {
    fn open() -> Result<Self> {
        let devices = rusb::devices()
            .map_err(|e| unavailable("failed to list USB devices (try running with sudo)", e))?;

        let (device, desc) = devices
            .iter()
            .find_map(|device| {
                let desc = device.device_descriptor().ok()?;
                (desc.vendor_id() == VENDOR_ID && desc.product_id() == PRODUCT_ID)
                    .then_some((device, desc))
            })
            .ok_or_else(|| {
                LightError::DeviceUnavailable(format!(
                    "keyboard {VENDOR_ID:04x}:{PRODUCT_ID:04x} not found"
                ))
            })?;

        let endpoint = find_interrupt_out(&device, &desc)
            .ok_or_else(|| LightError::DeviceUnavailable("no interrupt OUT endpoint".into()))?;
        debug!(?endpoint, "found endpoint");

        let mut handle = device
            .open()
            .map_err(|e| unavailable("failed to open device (try running with sudo)", e))?;

        let mut detached_kernel_driver = false;
        if handle.kernel_driver_active(endpoint.iface).unwrap_or(false) {
            debug!(iface = endpoint.iface, "detaching kernel driver");
            handle
                .detach_kernel_driver(endpoint.iface)
                .map_err(|e| unavailable("failed to detach kernel driver", e))?;
            detached_kernel_driver = true;
        }

        // From here on Drop restores whatever was changed.
        let mut channel = Self {
            handle,
            endpoint,
            detached_kernel_driver,
            claimed: false,
        };

        if channel.handle.active_configuration().ok() != Some(endpoint.config) {
            channel
                .handle
                .set_active_configuration(endpoint.config)
                .map_err(|e| unavailable("failed to set configuration", e))?;
        }

        channel
            .handle
            .claim_interface(endpoint.iface)
            .map_err(|e| unavailable("failed to claim interface - do you have permission?", e))?;
        channel.claimed = true;

        if let Err(e) = channel
            .handle
            .set_alternate_setting(endpoint.iface, endpoint.setting)
        {
            warn!(error = %e, "could not select alternate setting");
        }

        info!(
            "opened {VENDOR_ID:04x}:{PRODUCT_ID:04x} interface {} endpoint 0x{:02x}",
            endpoint.iface, endpoint.address
        );
        Ok(channel)
    }
}

impl ControlChannel for UsbChannel {
    fn write(&mut self, frame: &[u8]) -> anyhow::Result<usize> {
        self.handle
            .write_interrupt(self.endpoint.address, frame, WRITE_TIMEOUT)
            .with_context(|| format!("interrupt write to endpoint 0x{:02x}", self.endpoint.address))
    }
}

/// hidapi handle to the keyboard.
struct HidChannel {
    device: HidDevice,
}

impl HidChannel {
    fn open() -> Result<Self> {
        let api = HidApi::new().map_err(|e| unavailable("failed to initialize HID API", e))?;
        let device = api
            .open(VENDOR_ID, PRODUCT_ID)
            .map_err(|e| unavailable("unable to open device (root permissions required)", e))?;

        info!("opened {VENDOR_ID:04x}:{PRODUCT_ID:04x} via hidapi");
        Ok(Self { device })
    }
}

impl ControlChannel for HidChannel {
    fn write(&mut self, frame: &[u8]) -> anyhow::Result<usize> {
        // The first frame byte is the report ID, as hidapi expects.
        self.device.write(frame).context("HID output report")
    }
}
