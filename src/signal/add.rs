use crate::graph::{Graph, GraphError, InputEndpoint, Param, StreamOutput};
use crate::nodes::{Gain, GainEndpoints};

use super::{connect_series, Signal, SignalConfig, SignalNode};

/// Adds the addend to the signals connected to `input`. Same shape as
/// [`Subtract`](super::Subtract) minus the negate stage: the inherited
/// constant source feeds the junction directly.
#[derive(Debug)]
pub struct Add {
    signal: Signal,
    /// Summing junction, serving as both `input` and `output`.
    sum: GainEndpoints,
}

impl Add {
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
        let sum = graph.add_node(Gain::default());

        if let Err(err) = connect_series(graph, &[(&signal).into(), sum.into()]) {
            graph.remove_node(sum.node);
            signal.dispose(graph);
            return Err(err);
        }

        Ok(Self { signal, sum })
    }

    /// The value added to the incoming signal.
    pub fn addend(&self) -> Param {
        self.signal.param()
    }
}

impl SignalNode for Add {
    fn name(&self) -> &'static str {
        "Add"
    }

    fn input(&self) -> InputEndpoint {
        self.sum.input.into()
    }

    fn output(&self) -> StreamOutput {
        self.sum.output
    }

    fn dispose(&mut self, graph: &mut Graph) {
        self.signal.dispose(graph);
        graph.disconnect_node(self.sum.node);
    }
}
