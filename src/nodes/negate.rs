use arrayvec::ArrayVec;

use crate::graph::types::{
    InputEndpoint, NodeKey, PortDescriptor, PortDirection, PortKey, PortType, StreamInput,
    StreamOutput, MAX_NODE_PORTS,
};
use crate::graph::{ProcessingNode, SignalProcessor};

use super::gain::Gain;

/// A Gain fixed at -1. Not a new primitive: it shares Gain's processor and
/// port layout, but the scale port is never exposed, and the node keeps its
/// own name so the sign flip stays visible when inspecting a composed graph.
#[derive(Debug)]
pub struct Negate {
    inner: Gain,
}

#[derive(Copy, Clone, Debug)]
pub struct NegateEndpoints {
    pub node: NodeKey,
    pub input: StreamInput,
    pub output: StreamOutput,
}

impl Negate {
    pub fn new() -> Self {
        Self {
            inner: Gain::new(-1.0),
        }
    }
}

impl Default for Negate {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalProcessor for Negate {
    #[inline(always)]
    fn process(&mut self, sample_rate: f32, inputs: &[f32]) -> f32 {
        self.inner.process(sample_rate, inputs)
    }
}

impl ProcessingNode for Negate {
    type Endpoints = NegateEndpoints;

    const PORT_DESCRIPTORS: &'static [PortDescriptor] = &[
        PortDescriptor::new("input", PortType::Stream, PortDirection::Input),
        PortDescriptor::new("scale", PortType::Value, PortDirection::Input),
        PortDescriptor::new("output", PortType::Stream, PortDirection::Output),
    ];

    fn default_values(&self) -> ArrayVec<(usize, f32), MAX_NODE_PORTS> {
        let mut defaults = ArrayVec::new();
        defaults.push((1, -1.0));
        defaults
    }

    fn create_endpoints(
        node_key: NodeKey,
        inputs: ArrayVec<PortKey, MAX_NODE_PORTS>,
        outputs: ArrayVec<PortKey, MAX_NODE_PORTS>,
    ) -> Self::Endpoints {
        NegateEndpoints {
            node: node_key,
            input: StreamInput::new(InputEndpoint::new(inputs[0])),
            output: StreamOutput::new(outputs[0]),
        }
    }
}
