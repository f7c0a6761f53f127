//! Device — one of the four field devices wired to the facility hub.
//!
//! Each device has an `on` flag, a kind-specific [`Reading`] and a canvas
//! position. The rain sensor's `on` flag is carried for display only.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NotFoundError;
use crate::geometry::Point;

/// The fixed set of device kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Irrigation,
    Generator,
    Solar,
    RainSensor,
}

impl DeviceKind {
    pub const ALL: [Self; 4] = [
        Self::Irrigation,
        Self::Generator,
        Self::Solar,
        Self::RainSensor,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Irrigation => "irrigation",
            Self::Generator => "generator",
            Self::Solar => "solar",
            Self::RainSensor => "rain_sensor",
        }
    }

    /// Static catalogue metadata for this kind.
    #[must_use]
    pub fn info(self) -> DeviceInfo {
        match self {
            Self::Irrigation => DeviceInfo {
                name: "Irrigation System",
                model: "SIMATIC S7-1200",
                serial: "6ES7214-1AG40-0XB0",
                protocol: "PROFINET",
            },
            Self::Generator => DeviceInfo {
                name: "Generator",
                model: "SINAMICS G120C",
                serial: "6SL3210-1KE21-3UF2",
                protocol: "PROFIBUS DP",
            },
            Self::Solar => DeviceInfo {
                name: "Solar Panel",
                model: "SITOP PSU8200",
                serial: "6EP3436-8SB00-2AY0",
                protocol: "Modbus TCP",
            },
            Self::RainSensor => DeviceInfo {
                name: "Rain Sensor",
                model: "SITRANS P DS III",
                serial: "7MF4033-1DA10-1AC6",
                protocol: "HART",
            },
        }
    }

    /// Whether the device is switched on in the startup (and reset) state.
    ///
    /// Reset turns everything off except the generator and solar array.
    #[must_use]
    pub fn on_by_default(self) -> bool {
        matches!(self, Self::Generator | Self::Solar)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = NotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| NotFoundError {
                entity: "Device",
                id: s.to_string(),
            })
    }
}

/// Catalogue metadata shown in a device's detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: &'static str,
    pub model: &'static str,
    pub serial: &'static str,
    pub protocol: &'static str,
}

/// The kind-specific metric a device reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", content = "value", rename_all = "snake_case")]
pub enum Reading {
    /// Soil moisture in percent, `0..=100`.
    SoilMoisture(u8),
    /// Generator fuel in percent, never below 10.
    FuelLevel(f64),
    /// Solar output in watts.
    WattProduction(u32),
    /// Whether the rain sensor currently detects rain.
    Rain(bool),
}

impl Reading {
    /// The reading a freshly commissioned device of `kind` reports.
    #[must_use]
    pub fn initial(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Irrigation => Self::SoilMoisture(35),
            DeviceKind::Generator => Self::FuelLevel(78.0),
            DeviceKind::Solar => Self::WattProduction(2450),
            DeviceKind::RainSensor => Self::Rain(false),
        }
    }
}

/// A field device as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub kind: DeviceKind,
    pub on: bool,
    pub reading: Reading,
    pub position: Point,
    pub info: DeviceInfo,
}

impl Device {
    /// Commission a device of `kind` at `position`.
    ///
    /// The rain sensor starts powered, even though reset later leaves it off.
    #[must_use]
    pub fn commission(kind: DeviceKind, position: Point) -> Self {
        Self {
            kind,
            on: kind.on_by_default() || kind == DeviceKind::RainSensor,
            reading: Reading::initial(kind),
            position,
            info: kind.info(),
        }
    }
}

/// The four devices, addressable by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Devices {
    pub irrigation: Device,
    pub generator: Device,
    pub solar: Device,
    pub rain_sensor: Device,
}

impl Devices {
    #[must_use]
    pub fn get(&self, kind: DeviceKind) -> &Device {
        match kind {
            DeviceKind::Irrigation => &self.irrigation,
            DeviceKind::Generator => &self.generator,
            DeviceKind::Solar => &self.solar,
            DeviceKind::RainSensor => &self.rain_sensor,
        }
    }

    pub fn get_mut(&mut self, kind: DeviceKind) -> &mut Device {
        match kind {
            DeviceKind::Irrigation => &mut self.irrigation,
            DeviceKind::Generator => &mut self.generator,
            DeviceKind::Solar => &mut self.solar,
            DeviceKind::RainSensor => &mut self.rain_sensor,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        DeviceKind::ALL.into_iter().map(|kind| self.get(kind))
    }

    #[must_use]
    pub fn rain_detected(&self) -> bool {
        matches!(self.rain_sensor.reading, Reading::Rain(true))
    }

    #[must_use]
    pub fn irrigation_on(&self) -> bool {
        self.irrigation.on
    }

    #[must_use]
    pub fn soil_moisture(&self) -> Option<u8> {
        match self.irrigation.reading {
            Reading::SoilMoisture(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn fuel_level(&self) -> Option<f64> {
        match self.generator.reading {
            Reading::FuelLevel(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn watt_production(&self) -> Option<u32> {
        match self.solar.reading {
            Reading::WattProduction(value) => Some(value),
            _ => None,
        }
    }
}
