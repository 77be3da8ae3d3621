//! Virtual network and isolation zones
//!
//! The network is the placement surface every other resource references. It
//! is subdivided into a fixed number of isolation zones; zone 0 is public
//! (the gateway front end lands there) and the rest are private.

use crate::{NodeId, TopoResult, TopologyError};
use serde::{Deserialize, Serialize};

/// Whether a zone is reachable from outside the network
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Public,
    Private,
}

/// One isolation subdivision of the network
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Position within the network, 0-based
    pub index: u32,
    pub kind: ZoneKind,
}

/// A virtual address space subdivided into isolation zones
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub zones: Vec<Zone>,
}

impl Network {
    /// Build a network with `zone_count` zones
    ///
    /// Zone 0 is public, the remainder private. Fails with a configuration
    /// error when `zone_count` is 0.
    pub fn build(name: impl Into<String>, zone_count: u32) -> TopoResult<Self> {
        if zone_count == 0 {
            return Err(TopologyError::Configuration(
                "network must have at least one zone".into(),
            ));
        }
        let zones = (0..zone_count)
            .map(|index| Zone {
                index,
                kind: if index == 0 {
                    ZoneKind::Public
                } else {
                    ZoneKind::Private
                },
            })
            .collect();
        Ok(Self {
            name: name.into(),
            zones,
        })
    }

    /// Node key for this network
    pub fn node_id(&self) -> NodeId {
        NodeId::new(&self.name)
    }

    /// Indices of the private zones, in order
    pub fn private_zones(&self) -> Vec<u32> {
        self.zones
            .iter()
            .filter(|z| z.kind == ZoneKind::Private)
            .map(|z| z.index)
            .collect()
    }
}
