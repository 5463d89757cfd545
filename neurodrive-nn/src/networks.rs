//! A NeuralNetwork is a strictly layered, fully-connected
//! feedforward network. Nodes and links live in flat arenas
//! indexed by their ids, and layers only hold id lists.
//!
//! Every non-output layer built through [`NeuralNetwork::from_layers`]
//! carries a trailing bias node of constant value 1.0, so each
//! non-input node effectively has a learnable additive bias.
//! No activation function is applied: a node's value is the
//! plain weighted sum of its inputs.
mod elements;
mod errors;
mod text_format;

pub use elements::{Layer, Link, Node};
pub use errors::{ConfigError, NetworkError, TopologyError};

use crate::{LinkId, NodeId};

use neurodrive::Phenotype;

use std::fmt;

/// A layered feedforward neural network.
#[derive(Clone, Debug, Default)]
pub struct NeuralNetwork {
    nodes: Vec<Node>,
    links: Vec<Link>,
    layers: Vec<Layer>,
    scratch: Vec<f64>,
}

impl NeuralNetwork {
    /// Returns an empty network, to be grown with
    /// [`add_layer`](Self::add_layer) and [`add_node`](Self::add_node).
    pub fn new() -> NeuralNetwork {
        NeuralNetwork::default()
    }

    /// Builds a fully-connected network with the passed
    /// number of regular nodes in each layer. All gains are 0.
    ///
    /// # Errors
    /// Returns [`TopologyError::EmptyLayerList`] or
    /// [`TopologyError::EmptyLayer`] for an empty list or
    /// a zero-sized layer.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_nn::networks::NeuralNetwork;
    ///
    /// let network = NeuralNetwork::from_layers(&[3, 6, 2]).unwrap();
    /// assert_eq!(network.size_inputs(), 3);
    /// assert_eq!(network.size_outputs(), 2);
    /// // Every non-input node is fed by the previous layer and its bias.
    /// assert_eq!(network.links().len(), (3 + 1) * 6 + (6 + 1) * 2);
    ///
    /// assert!(NeuralNetwork::from_layers(&[]).is_err());
    /// assert!(NeuralNetwork::from_layers(&[2, 0, 1]).is_err());
    /// ```
    pub fn from_layers(layer_sizes: &[usize]) -> Result<NeuralNetwork, TopologyError> {
        if layer_sizes.is_empty() {
            return Err(TopologyError::EmptyLayerList);
        }
        if let Some(layer) = layer_sizes.iter().position(|size| *size == 0) {
            return Err(TopologyError::EmptyLayer(layer));
        }

        let mut network = NeuralNetwork::new();
        let last = layer_sizes.len() - 1;
        for (layer, size) in layer_sizes.iter().enumerate() {
            network
                .add_layer()
                .map_err(|_| TopologyError::LayerRejected(layer))?;
            for node in 0..*size {
                network
                    .add_node()
                    .map_err(|_| TopologyError::NodeRejected { layer, node })?;
            }
            if layer != last {
                network
                    .add_bias_node()
                    .map_err(|_| TopologyError::NodeRejected { layer, node: *size })?;
            }
        }
        Ok(network)
    }

    /// Appends an empty layer.
    ///
    /// # Errors
    /// Fails if the current last layer has no nodes.
    pub fn add_layer(&mut self) -> Result<(), TopologyError> {
        if self.layers.last().map_or(false, |l| l.node_ids().is_empty()) {
            return Err(TopologyError::LayerRejected(self.layers.len()));
        }
        self.layers.push(Layer::default());
        Ok(())
    }

    /// Appends a regular node to the last layer, linking
    /// every node of the previous layer to it with gain 0.
    ///
    /// # Errors
    /// Fails if the network has no layers.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_nn::networks::NeuralNetwork;
    ///
    /// let mut network = NeuralNetwork::new();
    /// assert!(network.add_node().is_err());
    ///
    /// network.add_layer().unwrap();
    /// network.add_node().unwrap();
    /// network.add_node().unwrap();
    /// network.add_layer().unwrap();
    /// let output = network.add_node().unwrap();
    ///
    /// assert_eq!(output, 2);
    /// assert!(network.links().iter().all(|l| l.to() == output));
    /// assert_eq!(network.links().len(), 2);
    /// ```
    pub fn add_node(&mut self) -> Result<NodeId, TopologyError> {
        self.push_node(false)
    }

    /// Appends a bias node to the last layer. Bias nodes
    /// are only ever link sources, so no links are created.
    ///
    /// # Errors
    /// Fails if the network has no layers.
    pub fn add_bias_node(&mut self) -> Result<NodeId, TopologyError> {
        self.push_node(true)
    }

    fn push_node(&mut self, bias: bool) -> Result<NodeId, TopologyError> {
        let layer_count = self.layers.len();
        if layer_count == 0 {
            return Err(TopologyError::NodeRejected { layer: 0, node: 0 });
        }
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, bias));
        self.scratch.push(0.0);

        let (previous, current) = self.layers.split_at_mut(layer_count - 1);
        let current = &mut current[0];
        current.add_node(id);
        if let (false, Some(previous)) = (bias, previous.last()) {
            for from in previous.node_ids() {
                let link_id = self.links.len();
                self.links.push(Link::new(link_id, *from, id, 0.0));
                current.add_link(link_id);
            }
        }
        Ok(id)
    }

    /// Sets the value of the `index`th input node.
    ///
    /// # Errors
    /// Fails if `index` is outside of the input layer,
    /// or refers to its bias node.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_nn::networks::{NetworkError, NeuralNetwork};
    ///
    /// let mut network = NeuralNetwork::from_layers(&[2, 1]).unwrap();
    /// assert!(network.set_input(1, 0.5).is_ok());
    /// assert_eq!(network.set_input(2, 0.5), Err(NetworkError::BiasNode(2)));
    /// assert!(network.set_input(3, 0.5).is_err());
    /// ```
    pub fn set_input(&mut self, index: usize, value: f64) -> Result<(), NetworkError> {
        let id = self.input_node(index)?;
        self.nodes[id].set_value(value);
        Ok(())
    }

    /// Returns the value of the `index`th output node.
    ///
    /// # Errors
    /// Fails if `index` is outside of the output layer,
    /// or refers to a bias node.
    pub fn get_output(&self, index: usize) -> Result<f64, NetworkError> {
        let node_ids = self.layers.last().map_or(&[][..], |l| l.node_ids());
        let id = *node_ids.get(index).ok_or(NetworkError::OutputOutOfRange {
            index,
            size: node_ids.len(),
        })?;
        let node = &self.nodes[id];
        if node.is_bias() {
            Err(NetworkError::BiasNode(id))
        } else {
            Ok(node.value())
        }
    }

    fn input_node(&self, index: usize) -> Result<NodeId, NetworkError> {
        let node_ids = self.layers.first().map_or(&[][..], |l| l.node_ids());
        let id = *node_ids.get(index).ok_or(NetworkError::InputOutOfRange {
            index,
            size: node_ids.len(),
        })?;
        if self.nodes[id].is_bias() {
            Err(NetworkError::BiasNode(id))
        } else {
            Ok(id)
        }
    }

    /// Propagates the input values through the network.
    ///
    /// Each layer is fully computed from the values of
    /// the previous one before any of its nodes is updated,
    /// and values never accumulate across calls.
    ///
    /// # Errors
    /// Fails if the network has fewer than two layers.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_nn::networks::NeuralNetwork;
    ///
    /// let mut network = NeuralNetwork::new();
    /// network.add_layer().unwrap();
    /// network.add_node().unwrap();
    /// network.add_node().unwrap();
    /// assert!(network.evaluate().is_err());
    ///
    /// network.add_layer().unwrap();
    /// network.add_node().unwrap();
    /// network.set_gains(&[0.5, -0.5]);
    /// network.set_input(0, 1.0).unwrap();
    /// network.set_input(1, 0.5).unwrap();
    /// network.evaluate().unwrap();
    /// assert!((network.get_output(0).unwrap() - 0.25).abs() < 1e-9);
    /// ```
    pub fn evaluate(&mut self) -> Result<(), NetworkError> {
        if self.layers.len() < 2 {
            return Err(NetworkError::TooFewLayers(self.layers.len()));
        }
        for layer in &self.layers[1..] {
            for id in layer.node_ids() {
                self.scratch[*id] = 0.0;
            }
            for link in layer.link_ids().iter().map(|id| &self.links[*id]) {
                self.scratch[link.to()] += self.nodes[link.from()].value() * link.gain();
            }
            for id in layer.node_ids() {
                self.nodes[*id].set_value(self.scratch[*id]);
            }
        }
        Ok(())
    }

    /// Returns the number of writable input nodes.
    pub fn size_inputs(&self) -> usize {
        self.regular_node_count(self.layers.first())
    }

    /// Returns the number of readable output nodes.
    pub fn size_outputs(&self) -> usize {
        self.regular_node_count(self.layers.last())
    }

    fn regular_node_count(&self, layer: Option<&Layer>) -> usize {
        layer.map_or(0, |l| {
            l.node_ids()
                .iter()
                .filter(|id| !self.nodes[**id].is_bias())
                .count()
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut [Link] {
        &mut self.links
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the gains of all links, in link id order.
    pub fn gains(&self) -> Vec<f64> {
        self.links.iter().map(Link::gain).collect()
    }

    /// Overwrites the gains of all links, in link id order.
    ///
    /// # Panics
    /// Panics if `gains` does not hold exactly one gain per link.
    pub fn set_gains(&mut self, gains: &[f64]) {
        assert_eq!(
            gains.len(),
            self.links.len(),
            "gain count does not match link count"
        );
        for (link, gain) in self.links.iter_mut().zip(gains) {
            link.set_gain(*gain);
        }
    }

    /// Returns the link with the passed id, if any.
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id)
    }
}

impl Phenotype for NeuralNetwork {
    fn design_len(&self) -> usize {
        self.links.len()
    }

    fn load_design(&mut self, variables: &[f64]) {
        self.set_gains(variables);
    }

    fn to_design(&self) -> Vec<f64> {
        self.gains()
    }
}

impl fmt::Display for NeuralNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Inputs:")?;
        for (i, id) in self.layers.first().map_or(&[][..], |l| l.node_ids()).iter().enumerate() {
            if !self.nodes[*id].is_bias() {
                writeln!(f, "  {}: {}", i, self.nodes[*id].value())?;
            }
        }
        writeln!(f, "Outputs:")?;
        for (i, id) in self.layers.last().map_or(&[][..], |l| l.node_ids()).iter().enumerate() {
            if !self.nodes[*id].is_bias() {
                writeln!(f, "  {}: {}", i, self.nodes[*id].value())?;
            }
        }
        Ok(())
    }
}
