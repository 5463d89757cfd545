//! The flat text encoding of a network. Every token
//! is written on its own line, in this order:
//!
//! ```text
//! <node count>
//! <0|1>                 bias flag, once per node
//! <link count>
//! <from>><to>=<gain>    once per link
//! <layer count>
//! <node id count> <node id>...   once per layer,
//! <link id count> <link id>...   in layer order
//! 8080
//! ```
//!
//! The encoding is positional and carries no version.
use super::{ConfigError, Layer, Link, NeuralNetwork, Node};
use crate::{LinkId, NodeId};

use ahash::RandomState;

use std::collections::HashSet;
use std::fmt::Write;
use std::str::{FromStr, SplitWhitespace};

/// Terminates every serialized network.
const SENTINEL: usize = 8080;

impl NeuralNetwork {
    /// Encodes the network's topology and gains as text.
    ///
    /// Gains are written with the shortest representation
    /// that parses back to the same value, so
    /// [`deserialize`](Self::deserialize) restores them exactly.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_nn::networks::NeuralNetwork;
    ///
    /// let mut network = NeuralNetwork::new();
    /// network.add_layer().unwrap();
    /// network.add_node().unwrap();
    /// network.add_layer().unwrap();
    /// network.add_node().unwrap();
    /// network.set_gains(&[-0.5]);
    ///
    /// assert_eq!(network.serialize(), "2\n0\n0\n1\n0>1=-0.5\n2\n1\n0\n0\n1\n1\n1\n0\n8080\n");
    /// ```
    pub fn serialize(&self) -> String {
        let mut text = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_config(&mut text);
        text
    }

    fn write_config(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "{}", self.nodes.len())?;
        for node in &self.nodes {
            writeln!(out, "{}", if node.is_bias() { 1 } else { 0 })?;
        }
        writeln!(out, "{}", self.links.len())?;
        for link in &self.links {
            writeln!(out, "{}>{}={}", link.from(), link.to(), link.gain())?;
        }
        writeln!(out, "{}", self.layers.len())?;
        for layer in &self.layers {
            writeln!(out, "{}", layer.node_ids().len())?;
            for id in layer.node_ids() {
                writeln!(out, "{}", id)?;
            }
            writeln!(out, "{}", layer.link_ids().len())?;
            for id in layer.link_ids() {
                writeln!(out, "{}", id)?;
            }
        }
        writeln!(out, "{}", SENTINEL)
    }

    /// Decodes a network previously encoded by [`serialize`](Self::serialize).
    ///
    /// # Errors
    /// Returns a [`ConfigError`] describing the first deviation
    /// from the format: missing or unparsable tokens, empty
    /// sections, references to undeclared or already-listed nodes
    /// and links, links that do not join consecutive layers,
    /// links into bias nodes, or a wrong or missing terminator.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_nn::networks::NeuralNetwork;
    ///
    /// let network = NeuralNetwork::from_layers(&[3, 2]).unwrap();
    /// let restored = NeuralNetwork::deserialize(&network.serialize()).unwrap();
    /// assert_eq!(restored.size_inputs(), 3);
    ///
    /// assert!(NeuralNetwork::deserialize("0 8080").is_err());
    /// ```
    pub fn deserialize(text: &str) -> Result<NeuralNetwork, ConfigError> {
        let mut tokens = Tokens(text.split_whitespace());

        let node_count = tokens.count("node count")?;
        if node_count == 0 {
            return Err(ConfigError::EmptySection("node"));
        }
        let nodes = (0..node_count)
            .map(|id| match tokens.next("bias flag")? {
                "0" => Ok(Node::new(id, false)),
                "1" => Ok(Node::new(id, true)),
                token => Err(ConfigError::InvalidToken {
                    expected: "bias flag",
                    token: token.to_owned(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let link_count = tokens.count("link count")?;
        if link_count == 0 {
            return Err(ConfigError::EmptySection("link"));
        }
        let mut endpoints = HashSet::with_hasher(RandomState::new());
        let mut links = Vec::new();
        for id in 0..link_count {
            let link = parse_link(id, tokens.next("link")?)?;
            for endpoint in [link.from(), link.to()] {
                if endpoint >= node_count {
                    return Err(ConfigError::NodeOutOfRange {
                        id: endpoint,
                        count: node_count,
                    });
                }
            }
            if nodes[link.to()].is_bias() {
                return Err(ConfigError::BiasTarget(id));
            }
            if !endpoints.insert((link.from(), link.to())) {
                return Err(ConfigError::DuplicateConnection(link.from(), link.to()));
            }
            links.push(link);
        }

        let layer_count = tokens.count("layer count")?;
        if layer_count == 0 {
            return Err(ConfigError::EmptySection("layer"));
        }
        let mut node_layer: Vec<Option<usize>> = vec![None; node_count];
        let mut link_listed = vec![false; link_count];
        let mut layers = Vec::new();
        for index in 0..layer_count {
            let mut layer = Layer::default();

            let layer_nodes = tokens.count("layer node count")?;
            if layer_nodes == 0 {
                return Err(ConfigError::EmptyLayer(index));
            }
            for _ in 0..layer_nodes {
                let id: NodeId = tokens.count("layer node id")?;
                let slot = node_layer.get_mut(id).ok_or(ConfigError::NodeOutOfRange {
                    id,
                    count: node_count,
                })?;
                if slot.replace(index).is_some() {
                    return Err(ConfigError::DuplicateNode(id));
                }
                layer.add_node(id);
            }

            let layer_links = tokens.count("layer link count")?;
            match (index, layer_links) {
                (0, 0) => {}
                (0, _) => return Err(ConfigError::InputLayerLinks),
                (_, 0) => return Err(ConfigError::LayerWithoutLinks(index)),
                _ => {}
            }
            for _ in 0..layer_links {
                let id: LinkId = tokens.count("layer link id")?;
                let listed = link_listed.get_mut(id).ok_or(ConfigError::LinkOutOfRange {
                    id,
                    count: link_count,
                })?;
                if std::mem::replace(listed, true) {
                    return Err(ConfigError::DuplicateLink(id));
                }
                let link = &links[id];
                if node_layer[link.to()] != Some(index)
                    || node_layer[link.from()] != Some(index - 1)
                {
                    return Err(ConfigError::MisplacedLink { link: id, layer: index });
                }
                layer.add_link(id);
            }

            layers.push(layer);
        }
        if let Some(id) = node_layer.iter().position(Option::is_none) {
            return Err(ConfigError::UnassignedNode(id));
        }
        if let Some(id) = link_listed.iter().position(|listed| !listed) {
            return Err(ConfigError::UnassignedLink(id));
        }

        let end = tokens.next("end value")?;
        if end.parse::<usize>() != Ok(SENTINEL) {
            return Err(ConfigError::BadSentinel(end.to_owned()));
        }
        if tokens.0.next().is_some() {
            return Err(ConfigError::TrailingTokens);
        }

        Ok(NeuralNetwork {
            scratch: vec![0.0; nodes.len()],
            nodes,
            links,
            layers,
        })
    }
}

impl FromStr for NeuralNetwork {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NeuralNetwork::deserialize(s)
    }
}

struct Tokens<'a>(SplitWhitespace<'a>);

impl<'a> Tokens<'a> {
    fn next(&mut self, what: &'static str) -> Result<&'a str, ConfigError> {
        self.0.next().ok_or(ConfigError::UnexpectedEnd(what))
    }

    fn count(&mut self, what: &'static str) -> Result<usize, ConfigError> {
        let token = self.next(what)?;
        token.parse().map_err(|_| ConfigError::InvalidToken {
            expected: what,
            token: token.to_owned(),
        })
    }
}

fn parse_link(id: LinkId, token: &str) -> Result<Link, ConfigError> {
    let invalid = || ConfigError::InvalidLink(token.to_owned());
    let (from, rest) = token.split_once('>').ok_or_else(invalid)?;
    let (to, gain) = rest.split_once('=').ok_or_else(invalid)?;
    Ok(Link::new(
        id,
        from.parse().map_err(|_| invalid())?,
        to.parse().map_err(|_| invalid())?,
        gain.parse().map_err(|_| invalid())?,
    ))
}
