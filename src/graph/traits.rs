use arrayvec::ArrayVec;

use super::types::{NodeKey, PortDescriptor, PortKey, MAX_NODE_PORTS};

/// Per-sample computation. The graph gathers one scalar per declared input
/// port (summing live connections, falling back to the resident value) and
/// routes the returned scalar to the node's output port.
pub trait SignalProcessor: Send + std::fmt::Debug {
    fn init(&mut self, _sample_rate: f32) {}

    fn process(&mut self, sample_rate: f32, inputs: &[f32]) -> f32;
}

/// A node type the graph can instantiate: declares its ports and builds the
/// typed endpoint handle returned by `Graph::add_node`.
pub trait ProcessingNode: SignalProcessor {
    type Endpoints;

    const PORT_DESCRIPTORS: &'static [PortDescriptor];

    /// Resident values for value inputs, as `(input index, value)` pairs.
    fn default_values(&self) -> ArrayVec<(usize, f32), MAX_NODE_PORTS> {
        ArrayVec::new()
    }

    fn create_endpoints(
        node_key: NodeKey,
        inputs: ArrayVec<PortKey, MAX_NODE_PORTS>,
        outputs: ArrayVec<PortKey, MAX_NODE_PORTS>,
    ) -> Self::Endpoints;
}
