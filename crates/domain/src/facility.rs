//! Facility state — the snapshot handed to the presentation layer.
//!
//! A [`FacilityState`] is an immutable value once published: the store in the
//! `app` crate builds a fresh one for every mutation, so readers can detect
//! change by reference identity.

use serde::Serialize;

use crate::alert::Alert;
use crate::device::{Device, DeviceKind, Devices};
use crate::geometry::Point;
use crate::id::NodeId;
use crate::reservoir::{DEFAULT_CAPACITY, DEFAULT_START_VOLUME, Reservoir};

/// Default canvas size used to centre the initial layout.
pub const DEFAULT_CANVAS: (f64, f64) = (1400.0, 800.0);

/// The central node that every link line terminates at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HubAnchor {
    pub position: Point,
}

/// Initial node positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub irrigation: Point,
    pub generator: Point,
    pub solar: Point,
    pub rain_sensor: Point,
    pub hub: Point,
    pub reservoir: Point,
}

impl Layout {
    /// Arrange the devices around the centre of a `width` x `height` canvas:
    /// irrigation and generator on the left, solar and rain sensor on the
    /// right, the hub in the middle and the reservoir below it.
    #[must_use]
    pub fn centered(width: f64, height: f64) -> Self {
        let center = Point::new(width / 2.0, height / 2.0);
        Self {
            irrigation: center + Point::new(-250.0, -130.0),
            generator: center + Point::new(-250.0, 120.0),
            solar: center + Point::new(250.0, -130.0),
            rain_sensor: center + Point::new(250.0, 120.0),
            hub: center,
            reservoir: center + Point::new(0.0, 240.0),
        }
    }

    #[must_use]
    pub fn position(&self, node: NodeId) -> Point {
        match node {
            NodeId::Device(DeviceKind::Irrigation) => self.irrigation,
            NodeId::Device(DeviceKind::Generator) => self.generator,
            NodeId::Device(DeviceKind::Solar) => self.solar,
            NodeId::Device(DeviceKind::RainSensor) => self.rain_sensor,
            NodeId::Hub => self.hub,
            NodeId::Reservoir => self.reservoir,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::centered(DEFAULT_CANVAS.0, DEFAULT_CANVAS.1)
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityState {
    pub devices: Devices,
    pub reservoir: Reservoir,
    pub hub: HubAnchor,
    /// Visible alerts, oldest first.
    pub alerts: Vec<Alert>,
    /// Node whose detail view is open, if any.
    pub detail: Option<NodeId>,
}

impl FacilityState {
    /// Commission the facility with the given layout and tank parameters.
    #[must_use]
    pub fn commission(layout: &Layout, reservoir_capacity: u32, reservoir_start: u32) -> Self {
        let device = |kind| Device::commission(kind, layout.position(NodeId::Device(kind)));
        Self {
            devices: Devices {
                irrigation: device(DeviceKind::Irrigation),
                generator: device(DeviceKind::Generator),
                solar: device(DeviceKind::Solar),
                rain_sensor: device(DeviceKind::RainSensor),
            },
            reservoir: Reservoir::new(reservoir_capacity, reservoir_start, layout.reservoir),
            hub: HubAnchor {
                position: layout.hub,
            },
            alerts: Vec::new(),
            detail: None,
        }
    }

    #[must_use]
    pub fn position(&self, node: NodeId) -> Point {
        match node {
            NodeId::Device(kind) => self.devices.get(kind).position,
            NodeId::Hub => self.hub.position,
            NodeId::Reservoir => self.reservoir.position,
        }
    }

    pub fn position_mut(&mut self, node: NodeId) -> &mut Point {
        match node {
            NodeId::Device(kind) => &mut self.devices.get_mut(kind).position,
            NodeId::Hub => &mut self.hub.position,
            NodeId::Reservoir => &mut self.reservoir.position,
        }
    }

    #[must_use]
    pub fn rain_detected(&self) -> bool {
        self.devices.rain_detected()
    }

    #[must_use]
    pub fn irrigation_on(&self) -> bool {
        self.devices.irrigation_on()
    }
}

impl Default for FacilityState {
    fn default() -> Self {
        Self::commission(&Layout::default(), DEFAULT_CAPACITY, DEFAULT_START_VOLUME)
    }
}
