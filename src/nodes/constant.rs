use arrayvec::ArrayVec;

use crate::graph::types::{
    InputEndpoint, NodeKey, PortDescriptor, PortDirection, PortKey, PortType, StreamOutput,
    ValueInput, MAX_NODE_PORTS,
};
use crate::graph::{ProcessingNode, SignalProcessor};

/// Emits its automatable `value` parameter as a continuous audio-rate
/// stream. The resident constant is audible until something connects to the
/// value input; connected signals take over for as long as they persist.
#[derive(Debug)]
pub struct ConstantSource {
    value: f32,
}

#[derive(Copy, Clone, Debug)]
pub struct ConstantSourceEndpoints {
    pub node: NodeKey,
    pub value: ValueInput,
    pub output: StreamOutput,
}

impl ConstantSource {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Default for ConstantSource {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl SignalProcessor for ConstantSource {
    #[inline(always)]
    fn process(&mut self, _sample_rate: f32, inputs: &[f32]) -> f32 {
        inputs.first().copied().unwrap_or(0.0)
    }
}

impl ProcessingNode for ConstantSource {
    type Endpoints = ConstantSourceEndpoints;

    const PORT_DESCRIPTORS: &'static [PortDescriptor] = &[
        PortDescriptor::new("value", PortType::Value, PortDirection::Input),
        PortDescriptor::new("output", PortType::Stream, PortDirection::Output),
    ];

    fn default_values(&self) -> ArrayVec<(usize, f32), MAX_NODE_PORTS> {
        let mut defaults = ArrayVec::new();
        defaults.push((0, self.value));
        defaults
    }

    fn create_endpoints(
        node_key: NodeKey,
        inputs: ArrayVec<PortKey, MAX_NODE_PORTS>,
        outputs: ArrayVec<PortKey, MAX_NODE_PORTS>,
    ) -> Self::Endpoints {
        ConstantSourceEndpoints {
            node: node_key,
            value: ValueInput::new(InputEndpoint::new(inputs[0])),
            output: StreamOutput::new(outputs[0]),
        }
    }
}
