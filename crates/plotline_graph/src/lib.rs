// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph document engine for Plotline.
//!
//! This crate holds the entity model of a narrative project:
//! - Graphs listing their nodes and edges
//! - Typed nodes with input/output pins
//! - Edges between pins, optionally labeled
//! - Container nodes owning nested inner graphs
//!
//! ## Architecture
//!
//! All entities live in one [`EntityStore`] keyed by globally unique ids.
//! The store keeps references consistent on deletion, and
//! [`validation`] reports structural problems as advisory warnings.

pub mod id;
pub mod node;
pub mod pin;
pub mod edge;
pub mod graph;
pub mod store;
pub mod validation;

pub use node::{Node, NodeData, NodeId, NodeType, Position};
pub use pin::{Pin, PinDirection, PinId, PinUpdate};
pub use edge::{Edge, EdgeId, EdgeUpdate};
pub use graph::{Graph, GraphId};
pub use store::{EntityStore, StoreSnapshot};
pub use validation::{validate_project, validate_graph, ValidationRule, ValidationWarning};
