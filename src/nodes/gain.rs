use arrayvec::ArrayVec;

use crate::graph::types::{
    InputEndpoint, NodeKey, PortDescriptor, PortDirection, PortKey, PortType, StreamInput,
    StreamOutput, ValueInput, MAX_NODE_PORTS,
};
use crate::graph::{ProcessingNode, SignalProcessor};

/// Multiplies its input stream by a scalar factor. All signals connected to
/// `input` sum before the multiply, so a unity Gain doubles as a summing
/// junction.
#[derive(Debug)]
pub struct Gain {
    gain: f32,
}

#[derive(Copy, Clone, Debug)]
pub struct GainEndpoints {
    pub node: NodeKey,
    pub input: StreamInput,
    pub gain: ValueInput,
    pub output: StreamOutput,
}

impl Gain {
    pub fn new(initial_gain: f32) -> Self {
        Self { gain: initial_gain }
    }
}

impl Default for Gain {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SignalProcessor for Gain {
    #[inline(always)]
    fn process(&mut self, _sample_rate: f32, inputs: &[f32]) -> f32 {
        inputs[0] * inputs[1]
    }
}

impl ProcessingNode for Gain {
    type Endpoints = GainEndpoints;

    const PORT_DESCRIPTORS: &'static [PortDescriptor] = &[
        PortDescriptor::new("input", PortType::Stream, PortDirection::Input),
        PortDescriptor::new("gain", PortType::Value, PortDirection::Input),
        PortDescriptor::new("output", PortType::Stream, PortDirection::Output),
    ];

    fn default_values(&self) -> ArrayVec<(usize, f32), MAX_NODE_PORTS> {
        let mut defaults = ArrayVec::new();
        defaults.push((1, self.gain));
        defaults
    }

    fn create_endpoints(
        node_key: NodeKey,
        inputs: ArrayVec<PortKey, MAX_NODE_PORTS>,
        outputs: ArrayVec<PortKey, MAX_NODE_PORTS>,
    ) -> Self::Endpoints {
        GainEndpoints {
            node: node_key,
            input: StreamInput::new(InputEndpoint::new(inputs[0])),
            gain: ValueInput::new(InputEndpoint::new(inputs[1])),
            output: StreamOutput::new(outputs[0]),
        }
    }
}
