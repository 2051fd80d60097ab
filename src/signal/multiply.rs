use crate::graph::{Graph, GraphError, InputEndpoint, Param, StreamOutput};
use crate::nodes::{Gain, GainEndpoints};

use super::{Signal, SignalConfig, SignalNode};

/// Multiplies the incoming signal by the factor. The inherited constant
/// source drives the scaler's gain parameter rather than its stream input,
/// so a live connection to [`Multiply::factor`] overrides the resident
/// factor the same way it does for `Subtract`'s subtrahend.
#[derive(Debug)]
pub struct Multiply {
    signal: Signal,
    mult: GainEndpoints,
}

impl Multiply {
    pub fn defaults() -> SignalConfig {
        SignalConfig::new().value(0.0).merge(Signal::defaults())
    }

    pub fn new(graph: &mut Graph) -> Result<Self, GraphError> {
        Self::from_config(graph, SignalConfig::new())
    }

    pub fn with_value(graph: &mut Graph, value: f32) -> Result<Self, GraphError> {
        Self::from_config(graph, SignalConfig::new().value(value))
    }

    pub fn from_config(graph: &mut Graph, config: SignalConfig) -> Result<Self, GraphError> {
        let mut signal = Signal::from_config(graph, config.merge(Self::defaults()));
        let mult = graph.add_node(Gain::default());

        if let Err(err) = graph.connect(signal.output(), mult.gain) {
            graph.remove_node(mult.node);
            signal.dispose(graph);
            return Err(err);
        }

        Ok(Self { signal, mult })
    }

    /// The value the incoming signal is scaled by.
    pub fn factor(&self) -> Param {
        self.signal.param()
    }
}

impl SignalNode for Multiply {
    fn name(&self) -> &'static str {
        "Multiply"
    }

    fn input(&self) -> InputEndpoint {
        self.mult.input.into()
    }

    fn output(&self) -> StreamOutput {
        self.mult.output
    }

    fn dispose(&mut self, graph: &mut Graph) {
        self.signal.dispose(graph);
        graph.disconnect_node(self.mult.node);
    }
}
