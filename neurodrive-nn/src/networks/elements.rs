use crate::{LinkId, NodeId};

/// Nodes hold the values propagated through a network.
///
/// A bias node always holds 1.0; its outgoing link
/// gains act as additive biases of the next layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    id: NodeId,
    value: f64,
    bias: bool,
}

impl Node {
    /// Returns a regular node with value 0.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_nn::networks::Node;
    ///
    /// let node = Node::new(3, false);
    /// assert_eq!(node.id(), 3);
    /// assert_eq!(node.value(), 0.0);
    ///
    /// let bias = Node::new(4, true);
    /// assert_eq!(bias.value(), 1.0);
    /// ```
    pub fn new(id: NodeId, bias: bool) -> Node {
        Node {
            id,
            value: if bias { 1.0 } else { 0.0 },
            bias,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_bias(&self) -> bool {
        self.bias
    }

    pub(super) fn set_value(&mut self, value: f64) {
        if !self.bias {
            self.value = value;
        }
    }
}

/// A weighted connection between nodes
/// of consecutive layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    id: LinkId,
    from: NodeId,
    to: NodeId,
    gain: f64,
}

impl Link {
    /// Returns a link with the passed endpoints and gain.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_nn::networks::Link;
    ///
    /// let link = Link::new(0, 1, 4, -0.5);
    /// assert_eq!((link.from(), link.to(), link.gain()), (1, 4, -0.5));
    /// ```
    pub fn new(id: LinkId, from: NodeId, to: NodeId, gain: f64) -> Link {
        Link { id, from, to, gain }
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }
}

/// A layer references its nodes and the
/// links targeting them. It owns neither.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layer {
    node_ids: Vec<NodeId>,
    link_ids: Vec<LinkId>,
}

impl Layer {
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    pub fn link_ids(&self) -> &[LinkId] {
        &self.link_ids
    }

    pub(super) fn add_node(&mut self, id: NodeId) {
        self.node_ids.push(id);
    }

    pub(super) fn add_link(&mut self, id: LinkId) {
        self.link_ids.push(id);
    }
}
