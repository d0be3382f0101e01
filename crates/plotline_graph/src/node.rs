// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::graph::GraphId;
use crate::string_id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

string_id!(
    /// Unique identifier for a node, global across all graphs
    NodeId
);

/// Node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    /// Container owning a nested dialogue graph
    DialogueContainer,
    /// Container owning a nested flow fragment graph
    FlowFragment,
    /// A spoken line
    Line,
    /// Player choice between outgoing branches
    Choice,
    /// Conditional branch
    Condition,
    /// Instruction executed when passed
    Instruction,
    /// Jump to another node
    Jump,
    /// Merge point
    Hub,
    /// End of the flow
    End,
    /// Free-floating note
    Annotation,
}

impl NodeType {
    /// All node types
    pub const ALL: [NodeType; 10] = [
        NodeType::DialogueContainer,
        NodeType::FlowFragment,
        NodeType::Line,
        NodeType::Choice,
        NodeType::Condition,
        NodeType::Instruction,
        NodeType::Jump,
        NodeType::Hub,
        NodeType::End,
        NodeType::Annotation,
    ];

    /// Wire name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DialogueContainer => "dialogueContainer",
            Self::FlowFragment => "flowFragment",
            Self::Line => "line",
            Self::Choice => "choice",
            Self::Condition => "condition",
            Self::Instruction => "instruction",
            Self::Jump => "jump",
            Self::Hub => "hub",
            Self::End => "end",
            Self::Annotation => "annotation",
        }
    }

    /// Whether nodes of this type own an inner graph
    pub fn is_container(&self) -> bool {
        matches!(self, Self::DialogueContainer | Self::FlowFragment)
    }

    /// Name given to the inner graph of a freshly created container
    pub fn inner_graph_name(&self) -> Option<&'static str> {
        match self {
            Self::DialogueContainer => Some("Dialogue Inner"),
            Self::FlowFragment => Some("Fragment Inner"),
            _ => None,
        }
    }

    /// Payload field names accepted for this type, `type` excluded
    pub fn data_fields(&self) -> &'static [&'static str] {
        match self {
            Self::DialogueContainer | Self::FlowFragment => &["innerGraphId", "label"],
            Self::Line => &["speakerId", "text"],
            Self::Choice => &["prompt"],
            Self::Condition | Self::Instruction => &["expression"],
            Self::Jump => &["targetNodeId", "targetPath"],
            Self::Hub => &["label"],
            Self::End => &[],
            Self::Annotation => &["text", "color"],
        }
    }

    /// Pins a freshly created node of this type starts with
    pub fn default_pins(&self) -> DefaultPins {
        match self {
            Self::DialogueContainer | Self::FlowFragment => DefaultPins::new(1, 1, &["Exit"]),
            Self::Line | Self::Instruction | Self::Hub => DefaultPins::new(1, 1, &[]),
            Self::Choice => DefaultPins::new(1, 2, &["Option 1", "Option 2"]),
            Self::Condition => DefaultPins::new(1, 2, &["True", "False"]),
            Self::Jump | Self::End => DefaultPins::new(1, 0, &[]),
            Self::Annotation => DefaultPins::new(0, 0, &[]),
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default pin layout for a node type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPins {
    /// Number of input pins
    pub input_count: usize,
    /// Number of output pins
    pub output_count: usize,
    /// Names for the leading output pins
    pub output_names: &'static [&'static str],
}

impl DefaultPins {
    const fn new(input_count: usize, output_count: usize, output_names: &'static [&'static str]) -> Self {
        Self {
            input_count,
            output_count,
            output_names,
        }
    }

    /// Name of the output pin at `index`, if the table names it
    pub fn output_name(&self, index: usize) -> Option<&'static str> {
        self.output_names.get(index).copied()
    }
}

/// Canvas position of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Position with both coordinates rounded to one decimal place.
    ///
    /// Halves round towards positive infinity.
    pub fn rounded(self) -> Self {
        fn round1(v: f64) -> f64 {
            (v * 10.0 + 0.5).floor() / 10.0
        }
        Self {
            x: round1(self.x),
            y: round1(self.y),
        }
    }
}

/// Typed payload of a node, tagged by node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeData {
    /// Dialogue container payload
    #[serde(rename_all = "camelCase")]
    DialogueContainer {
        /// Graph nested inside the container
        inner_graph_id: GraphId,
        /// Display label
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Flow fragment payload
    #[serde(rename_all = "camelCase")]
    FlowFragment {
        /// Graph nested inside the container
        inner_graph_id: GraphId,
        /// Display label
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Line payload
    #[serde(rename_all = "camelCase")]
    Line {
        /// Speaking character, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speaker_id: Option<String>,
        /// Spoken text
        #[serde(default)]
        text: String,
    },
    /// Choice payload
    Choice {
        /// Prompt shown above the options
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
    /// Condition payload
    Condition {
        /// Condition expression
        #[serde(default)]
        expression: String,
    },
    /// Instruction payload
    Instruction {
        /// Instruction expression
        #[serde(default)]
        expression: String,
    },
    /// Jump payload
    #[serde(rename_all = "camelCase")]
    Jump {
        /// Node jumped to
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_node_id: Option<NodeId>,
        /// Graph path leading to the target
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_path: Option<Vec<String>>,
    },
    /// Hub payload
    Hub {
        /// Display label
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// End payload
    End,
    /// Annotation payload
    Annotation {
        /// Note text
        #[serde(default)]
        text: String,
        /// Note color
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
}

impl NodeData {
    /// Default payload for a freshly created node.
    ///
    /// Container payloads are given a newly allocated inner graph id; the
    /// store creates the graph under that id.
    pub fn default_for(kind: NodeType) -> Self {
        match kind {
            NodeType::DialogueContainer => Self::DialogueContainer {
                inner_graph_id: GraphId::new(),
                label: Some(String::new()),
            },
            NodeType::FlowFragment => Self::FlowFragment {
                inner_graph_id: GraphId::new(),
                label: Some(String::new()),
            },
            NodeType::Line => Self::Line {
                speaker_id: None,
                text: String::new(),
            },
            NodeType::Choice => Self::Choice {
                prompt: Some(String::new()),
            },
            NodeType::Condition => Self::Condition {
                expression: String::new(),
            },
            NodeType::Instruction => Self::Instruction {
                expression: String::new(),
            },
            NodeType::Jump => Self::Jump {
                target_node_id: None,
                target_path: None,
            },
            NodeType::Hub => Self::Hub {
                label: Some(String::new()),
            },
            NodeType::End => Self::End,
            NodeType::Annotation => Self::Annotation {
                text: String::new(),
                color: Some("#f5e642".to_string()),
            },
        }
    }

    /// The node type this payload belongs to
    pub fn kind(&self) -> NodeType {
        match self {
            Self::DialogueContainer { .. } => NodeType::DialogueContainer,
            Self::FlowFragment { .. } => NodeType::FlowFragment,
            Self::Line { .. } => NodeType::Line,
            Self::Choice { .. } => NodeType::Choice,
            Self::Condition { .. } => NodeType::Condition,
            Self::Instruction { .. } => NodeType::Instruction,
            Self::Jump { .. } => NodeType::Jump,
            Self::Hub { .. } => NodeType::Hub,
            Self::End => NodeType::End,
            Self::Annotation { .. } => NodeType::Annotation,
        }
    }

    /// Inner graph of a container payload
    pub fn inner_graph_id(&self) -> Option<&GraphId> {
        match self {
            Self::DialogueContainer { inner_graph_id, .. } | Self::FlowFragment { inner_graph_id, .. } => {
                Some(inner_graph_id)
            }
            _ => None,
        }
    }

    /// Build a payload of the given type from loose fields.
    ///
    /// Any `type` key in `fields` is overridden by `kind`.
    pub fn from_fields(kind: NodeType, mut fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        fields.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        serde_json::from_value(Value::Object(fields))
    }

    /// The payload as a JSON object, `type` key included
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // Internally tagged enums always serialize to objects
            _ => Ok(Map::new()),
        }
    }

    /// Shallow-merge `patch` into this payload without changing its type.
    ///
    /// `null` clears an optional field.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut fields = self.to_fields()?;
        for (key, value) in patch {
            if key == "type" {
                continue;
            }
            if value.is_null() {
                fields.remove(key);
            } else {
                fields.insert(key.clone(), value.clone());
            }
        }
        Self::from_fields(self.kind(), fields)
    }
}

/// A node instance in a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Position in the graph UI
    pub position: Position,
    /// Typed payload; also determines the node type
    pub data: NodeData,
    /// Graph whose node list holds this node
    pub graph_id: GraphId,
}

impl Node {
    /// Create a new node with the default payload for `kind`
    pub fn new(kind: NodeType, position: Position, graph_id: GraphId) -> Self {
        Self {
            id: NodeId::new(),
            position,
            data: NodeData::default_for(kind),
            graph_id,
        }
    }

    /// Node type
    pub fn node_type(&self) -> NodeType {
        self.data.kind()
    }

    /// Whether this node owns an inner graph
    pub fn is_container(&self) -> bool {
        self.node_type().is_container()
    }
}
