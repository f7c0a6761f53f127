//! Identifiers for canvas nodes and alerts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::device::DeviceKind;
use crate::error::NotFoundError;

/// A draggable node on the facility canvas.
///
/// The set is closed: four devices, the central hub and the reservoir.
/// Text that names anything else is rejected at parse time, so an unknown
/// node can never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NodeId {
    Device(DeviceKind),
    Hub,
    Reservoir,
}

impl NodeId {
    /// Every node, devices first.
    pub const ALL: [Self; 6] = [
        Self::Device(DeviceKind::Irrigation),
        Self::Device(DeviceKind::Generator),
        Self::Device(DeviceKind::Solar),
        Self::Device(DeviceKind::RainSensor),
        Self::Hub,
        Self::Reservoir,
    ];

    /// Whether clicking this node opens a detail view.
    ///
    /// The hub is only a link anchor and has nothing to show.
    #[must_use]
    pub fn has_detail(self) -> bool {
        !matches!(self, Self::Hub)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Device(kind) => kind.as_str(),
            Self::Hub => "hub",
            Self::Reservoir => "reservoir",
        }
    }
}

impl From<DeviceKind> for NodeId {
    fn from(kind: DeviceKind) -> Self {
        Self::Device(kind)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeId {
    type Err = NotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hub" => Ok(Self::Hub),
            "reservoir" => Ok(Self::Reservoir),
            other => other.parse::<DeviceKind>().map(Self::Device).map_err(|_| NotFoundError {
                entity: "Node",
                id: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for NodeId {
    type Error = NotFoundError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.as_str().to_string()
    }
}

/// Unique, monotonically increasing identifier of an [`Alert`](crate::alert::Alert).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(u64);

impl AlertId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_roundtrip_every_node_through_display_and_from_str() {
        for node in NodeId::ALL {
            let parsed: NodeId = node.to_string().parse().unwrap();
            assert_eq!(parsed, node);
        }
    }

    #[test]
    fn should_reject_unknown_node_name() {
        let err = "barn".parse::<NodeId>().unwrap_err();
        assert_eq!(err.entity, "Node");
        assert_eq!(err.id, "barn");
    }

    #[test]
    fn should_serialize_node_as_string() {
        let json = serde_json::to_string(&NodeId::Device(DeviceKind::RainSensor)).unwrap();
        assert_eq!(json, "\"rain_sensor\"");
        let parsed: NodeId = serde_json::from_str("\"reservoir\"").unwrap();
        assert_eq!(parsed, NodeId::Reservoir);
    }

    #[test]
    fn should_fail_to_deserialize_unknown_node() {
        let result: Result<NodeId, _> = serde_json::from_str("\"silo\"");
        assert!(result.is_err());
    }

    #[test]
    fn should_only_give_hub_no_detail_view() {
        assert!(!NodeId::Hub.has_detail());
        assert!(NodeId::Reservoir.has_detail());
        assert!(NodeId::Device(DeviceKind::Solar).has_detail());
    }

    #[test]
    fn should_increase_alert_ids_monotonically() {
        let first = AlertId::new(1);
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.as_u64(), 2);
    }
}
