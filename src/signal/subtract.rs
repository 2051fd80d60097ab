use crate::graph::{Graph, GraphError, InputEndpoint, Param, StreamOutput};
use crate::nodes::{Gain, GainEndpoints, Negate, NegateEndpoints};

use super::{connect_series, Signal, SignalConfig, SignalNode};

/// Subtracts the subtrahend from the signals connected to `input`.
///
/// The subtrahend is the inherited constant source, negated and fed into the
/// same summing junction the external inputs arrive at, so the engine
/// evaluates `sum(inputs) + (-1 * subtrahend)` every sample. The operand can
/// be a resident constant or a live signal connected to [`Subtract::subtrahend`].
///
/// ```no_run
/// # use tonegraph::{Graph, Signal, SignalNode, Subtract};
/// let mut graph = Graph::new(44_100.0);
/// let sub = Subtract::with_value(&mut graph, 1.0)?;
/// let sig = Signal::with_value(&mut graph, 4.0);
/// sig.connect(&mut graph, &sub)?;
/// // after processing, the output of sub is 3.
/// # Ok::<(), tonegraph::GraphError>(())
/// ```
#[derive(Debug)]
pub struct Subtract {
    signal: Signal,
    /// Negates the subtrahend path before it reaches the junction.
    neg: NegateEndpoints,
    /// The summing junction. Serves as both `input` and `output`:
    /// externally connected signals and the negated subtrahend are combined
    /// at this one node, which keeps the subgraph to two owned helpers.
    sum: GainEndpoints,
}

impl Subtract {
    /// Base Signal defaults with this node's value default merged over them.
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
        let neg = graph.add_node(Negate::new());
        let sum = graph.add_node(Gain::default());

        // ConstantSource -> Negate -> junction. Wire the whole chain or
        // release everything created so far: a half-wired node would pass
        // the subtrahend through unnegated instead of erroring.
        let wired = connect_series(graph, &[(&signal).into(), neg.into(), sum.into()]);
        if let Err(err) = wired {
            graph.remove_node(sum.node);
            graph.remove_node(neg.node);
            signal.dispose(graph);
            return Err(err);
        }

        Ok(Self { signal, neg, sum })
    }

    /// The value subtracted from the incoming signal. Connecting a live
    /// signal to it overrides the resident constant until disconnected.
    pub fn subtrahend(&self) -> Param {
        self.signal.param()
    }
}

impl SignalNode for Subtract {
    fn name(&self) -> &'static str {
        "Subtract"
    }

    fn input(&self) -> InputEndpoint {
        self.sum.input.into()
    }

    fn output(&self) -> StreamOutput {
        self.sum.output
    }

    /// Tears down in owner order: the base signal's constant source, then
    /// the negate stage, then the junction's edges. The junction node is
    /// disconnected rather than destroyed because its ports are what this
    /// node exposed as `input`/`output`, and neighbours may still hold those
    /// handles while a parent composite unwinds. Safe to repeat.
    fn dispose(&mut self, graph: &mut Graph) {
        self.signal.dispose(graph);
        graph.remove_node(self.neg.node);
        graph.disconnect_node(self.sum.node);
    }
}
