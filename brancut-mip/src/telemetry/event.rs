//! Search events.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::search::NodeId;

/// Branch direction shown by the observer.
///
/// `Middle` for the root (`id <= 1`), otherwise `Right` for even and
/// `Left` for odd ids, independent of which bound the child carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Odd, non-root ids.
    #[serde(rename = "L")]
    Left,
    /// The root.
    #[serde(rename = "M")]
    Middle,
    /// Even ids.
    #[serde(rename = "R")]
    Right,
}

impl Direction {
    /// Direction for a node id.
    pub fn for_node(id: NodeId) -> Self {
        if id <= 1 {
            Direction::Middle
        } else if id % 2 == 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}

/// Event variants and their payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    /// Relaxation solved, not yet classified.
    Pregnant {
        /// LP bound of the node, null when the solve was not optimal.
        lp_bound: Option<f64>,
    },
    /// Pruned as integer feasible.
    Integral {
        /// LP bound of the node.
        lp_bound: f64,
    },
    /// Pruned as infeasible.
    Infeasible,
    /// Pruned by bound.
    Fathomed,
    /// Replaced by two children.
    Branched {
        /// LP bound of the node.
        lp_bound: f64,
        /// Sum of the fractional parts of the violated variables.
        sum_of_fractional_parts: f64,
        /// Number of violated variables.
        violated_count: usize,
    },
    /// Newly created child, about to enter the pool.
    Candidate {
        /// LP bound from the creation-time solve, null when it was not optimal.
        lp_bound: Option<f64>,
    },
}

/// One telemetry message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Node the event is about.
    pub node_id: NodeId,
    /// Its parent (null for the root).
    pub parent_id: Option<NodeId>,
    /// Observer direction of `node_id`.
    pub direction: Direction,
    /// Variant and payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Stamp an event for a node now.
    pub fn new(node_id: NodeId, parent_id: Option<NodeId>, kind: EventKind) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            timestamp_ms,
            node_id,
            parent_id,
            direction: Direction::for_node(node_id),
            kind,
        }
    }

    /// Encode as one JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
