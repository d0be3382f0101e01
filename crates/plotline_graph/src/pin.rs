// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin definitions for node inputs/outputs.

use crate::node::NodeId;
use crate::string_id;
use serde::{Deserialize, Serialize};

string_id!(
    /// Unique identifier for a pin, global across all graphs
    PinId
);

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    /// Input pin
    #[serde(rename = "in")]
    In,
    /// Output pin
    #[serde(rename = "out")]
    Out,
}

/// A connection point on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    /// Unique pin ID
    pub id: PinId,
    /// Owning node
    pub node_id: NodeId,
    /// Pin direction
    pub direction: PinDirection,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Condition guarding an input pin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_expr: Option<String>,
    /// Instruction run when leaving through an output pin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_expr: Option<String>,
}

impl Pin {
    /// Create a new unnamed pin
    pub fn new(node_id: NodeId, direction: PinDirection) -> Self {
        Self {
            id: PinId::new(),
            node_id,
            direction,
            name: None,
            condition_expr: None,
            instruction_expr: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Whether this is an input pin
    pub fn is_input(&self) -> bool {
        self.direction == PinDirection::In
    }

    /// Whether this is an output pin
    pub fn is_output(&self) -> bool {
        self.direction == PinDirection::Out
    }

    /// Apply a partial update
    pub fn apply(&mut self, update: PinUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(condition_expr) = update.condition_expr {
            self.condition_expr = condition_expr;
        }
        if let Some(instruction_expr) = update.instruction_expr {
            self.instruction_expr = instruction_expr;
        }
    }
}

/// Partial update of a pin's editable fields.
///
/// `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinUpdate {
    /// New display name
    pub name: Option<Option<String>>,
    /// New condition expression
    pub condition_expr: Option<Option<String>>,
    /// New instruction expression
    pub instruction_expr: Option<Option<String>>,
}

impl PinUpdate {
    /// Set the display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Some(name.into()));
        self
    }

    /// Set the condition expression
    pub fn condition_expr(mut self, expr: impl Into<String>) -> Self {
        self.condition_expr = Some(Some(expr.into()));
        self
    }

    /// Set the instruction expression
    pub fn instruction_expr(mut self, expr: impl Into<String>) -> Self {
        self.instruction_expr = Some(Some(expr.into()));
        self
    }
}
