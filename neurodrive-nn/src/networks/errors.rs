use crate::{LinkId, NodeId};

use std::error::Error;
use std::fmt;

/// An error type indicating a network
/// topology could not be built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// No layer sizes were supplied.
    EmptyLayerList,
    /// The layer at the contained position was given no nodes.
    EmptyLayer(usize),
    /// A layer could not be appended after an empty layer.
    /// Contains the position of the rejected layer.
    LayerRejected(usize),
    /// A node could not be appended to a layer.
    NodeRejected {
        /// Position of the layer.
        layer: usize,
        /// Position of the node within its layer.
        node: usize,
    },
}

impl TopologyError {
    /// Returns true if the error reflects an internal
    /// construction failure rather than unusable input.
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::LayerRejected(_) | Self::NodeRejected { .. })
    }
}

/// An error type indicating a failed
/// network input, output or evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkError {
    /// The index lies outside of the input layer.
    InputOutOfRange { index: usize, size: usize },
    /// The index lies outside of the output layer.
    OutputOutOfRange { index: usize, size: usize },
    /// The index resolves to a bias node,
    /// which is neither writable nor readable as an output.
    BiasNode(NodeId),
    /// The network has fewer than two layers.
    /// Contains the layer count.
    TooFewLayers(usize),
}

/// An error type indicating a malformed
/// serialized network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The text ended while reading the named item.
    UnexpectedEnd(&'static str),
    /// A token could not be parsed as the named item.
    InvalidToken { expected: &'static str, token: String },
    /// The named section was declared empty.
    EmptySection(&'static str),
    /// A link token is not of the form `from>to=gain`.
    InvalidLink(String),
    /// A node id does not refer to a declared node.
    NodeOutOfRange { id: NodeId, count: usize },
    /// A link id does not refer to a declared link.
    LinkOutOfRange { id: LinkId, count: usize },
    /// A node is listed in more than one layer slot.
    DuplicateNode(NodeId),
    /// A link is listed in more than one layer slot.
    DuplicateLink(LinkId),
    /// Two links share the same endpoints.
    DuplicateConnection(NodeId, NodeId),
    /// A node is not listed in any layer.
    UnassignedNode(NodeId),
    /// A link is not listed in any layer.
    UnassignedLink(LinkId),
    /// A layer was declared with no nodes.
    EmptyLayer(usize),
    /// The input layer was declared with links.
    InputLayerLinks,
    /// A non-input layer was declared with no links.
    LayerWithoutLinks(usize),
    /// A link listed in a layer does not target that layer,
    /// or is not sourced from the preceding one.
    MisplacedLink { link: LinkId, layer: usize },
    /// A link targets a bias node.
    BiasTarget(LinkId),
    /// The terminating sentinel is missing or wrong.
    BadSentinel(String),
    /// Tokens follow the terminating sentinel.
    TrailingTokens,
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLayerList => write!(f, "network must have at least one layer"),
            Self::EmptyLayer(layer) => write!(f, "layer {} must have at least one node", layer),
            Self::LayerRejected(layer) => write!(f, "unable to add layer {}", layer),
            Self::NodeRejected { layer, node } => {
                write!(f, "unable to add node {} for layer {}", node, layer)
            }
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputOutOfRange { index, size } => {
                write!(f, "input index {} out of range for {} inputs", index, size)
            }
            Self::OutputOutOfRange { index, size } => {
                write!(f, "output index {} out of range for {} outputs", index, size)
            }
            Self::BiasNode(id) => write!(f, "node {} is a bias node", id),
            Self::TooFewLayers(count) => {
                write!(f, "cannot evaluate a network with {} layer(s)", count)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd(what) => write!(f, "configuration ended while reading {}", what),
            Self::InvalidToken { expected, token } => {
                write!(f, "expected {}, found {:?}", expected, token)
            }
            Self::EmptySection(what) => write!(f, "configuration must provide at least one {}", what),
            Self::InvalidLink(token) => write!(
                f,
                "unable to parse link {:?}, expected `from>to=gain`",
                token
            ),
            Self::NodeOutOfRange { id, count } => {
                write!(f, "node id {} out of range for {} nodes", id, count)
            }
            Self::LinkOutOfRange { id, count } => {
                write!(f, "link id {} out of range for {} links", id, count)
            }
            Self::DuplicateNode(id) => write!(f, "node {} listed more than once", id),
            Self::DuplicateLink(id) => write!(f, "link {} listed more than once", id),
            Self::DuplicateConnection(from, to) => {
                write!(f, "more than one link connects {} -> {}", from, to)
            }
            Self::UnassignedNode(id) => write!(f, "node {} belongs to no layer", id),
            Self::UnassignedLink(id) => write!(f, "link {} belongs to no layer", id),
            Self::EmptyLayer(layer) => write!(f, "layer {} has no nodes", layer),
            Self::InputLayerLinks => write!(f, "input layer cannot have links"),
            Self::LayerWithoutLinks(layer) => write!(f, "layer {} has no links", layer),
            Self::MisplacedLink { link, layer } => write!(
                f,
                "link {} does not connect layer {} to its predecessor",
                link, layer
            ),
            Self::BiasTarget(link) => write!(f, "link {} targets a bias node", link),
            Self::BadSentinel(token) => {
                write!(f, "configuration end value {:?} is incorrect", token)
            }
            Self::TrailingTokens => write!(f, "unexpected tokens after configuration end value"),
        }
    }
}

impl Error for TopologyError {}
impl Error for NetworkError {}
impl Error for ConfigError {}
