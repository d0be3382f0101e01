// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions for the graph.

use crate::pin::PinId;
use crate::string_id;
use serde::{Deserialize, Serialize};

string_id!(
    /// Unique identifier for an edge, global across all graphs
    EdgeId
);

/// A connection between two pins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique edge ID
    pub id: EdgeId,
    /// Source pin ID
    pub from_pin_id: PinId,
    /// Target pin ID
    pub to_pin_id: PinId,
    /// Edge label (choice text for choice branches)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Display color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Edge {
    /// Create a new edge
    pub fn new(from_pin_id: PinId, to_pin_id: PinId) -> Self {
        Self {
            id: EdgeId::new(),
            from_pin_id,
            to_pin_id,
            label: None,
            color: None,
        }
    }

    /// Check if this edge involves a specific pin
    pub fn involves_pin(&self, pin_id: &PinId) -> bool {
        self.from_pin_id == *pin_id || self.to_pin_id == *pin_id
    }

    /// Whether the label is missing or blank
    pub fn is_unlabeled(&self) -> bool {
        self.label.as_deref().map_or(true, |label| label.trim().is_empty())
    }

    /// Apply a partial update
    pub fn apply(&mut self, update: EdgeUpdate) {
        if let Some(label) = update.label {
            self.label = label;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
    }
}

/// Partial update of an edge's editable fields.
///
/// `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeUpdate {
    /// New label
    pub label: Option<Option<String>>,
    /// New color
    pub color: Option<Option<String>>,
}

impl EdgeUpdate {
    /// Set the label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(Some(label.into()));
        self
    }

    /// Set the color
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(Some(color.into()));
        self
    }
}
