//! Audio-rate signals as graph nodes.
//!
//! A [`Signal`] wraps one constant source whose value can be set, ramped, or
//! overridden by a live connection. Arithmetic composites ([`Subtract`],
//! [`Add`], [`Multiply`]) recombine the same three routing primitives behind
//! the uniform [`SignalNode`] contract: an input port, an output port, an
//! automatable operand, and deterministic teardown.

mod add;
mod multiply;
mod subtract;

pub use add::Add;
pub use multiply::Multiply;
pub use subtract::Subtract;

use crate::graph::{Graph, GraphError, InputEndpoint, Param, StreamOutput};
use crate::nodes::{ConstantSource, ConstantSourceEndpoints, GainEndpoints, NegateEndpoints};

/// Capability shared by every signal-rate node: a summing input port, an
/// output port, and destructive teardown. `dispose` is single-owner-only;
/// repeat calls must not corrupt graph state.
pub trait SignalNode {
    fn name(&self) -> &'static str;
    fn input(&self) -> InputEndpoint;
    fn output(&self) -> StreamOutput;
    fn dispose(&mut self, graph: &mut Graph);
}

/// Normalized construction options. Resolution order when a field is read:
/// explicit value > subclass default > base default (0).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SignalConfig {
    pub value: Option<f32>,
}

impl SignalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }

    /// Fills unset fields from `fallback`, keeping explicit ones.
    pub fn merge(self, fallback: SignalConfig) -> SignalConfig {
        SignalConfig {
            value: self.value.or(fallback.value),
        }
    }

    pub fn resolve(self) -> f32 {
        self.value.unwrap_or(0.0)
    }
}

/// One element of a series chain. Sources have no input, sinks may have no
/// output; `connect_series` reports which position could not be wired.
#[derive(Copy, Clone, Debug)]
pub struct ChainLink {
    pub input: Option<InputEndpoint>,
    pub output: Option<StreamOutput>,
}

impl<T: SignalNode + ?Sized> From<&T> for ChainLink {
    fn from(node: &T) -> Self {
        Self {
            input: Some(node.input()),
            output: Some(node.output()),
        }
    }
}

impl From<ConstantSourceEndpoints> for ChainLink {
    fn from(endpoints: ConstantSourceEndpoints) -> Self {
        Self {
            input: None,
            output: Some(endpoints.output),
        }
    }
}

impl From<GainEndpoints> for ChainLink {
    fn from(endpoints: GainEndpoints) -> Self {
        Self {
            input: Some(endpoints.input.into()),
            output: Some(endpoints.output),
        }
    }
}

impl From<NegateEndpoints> for ChainLink {
    fn from(endpoints: NegateEndpoints) -> Self {
        Self {
            input: Some(endpoints.input.into()),
            output: Some(endpoints.output),
        }
    }
}

/// Connects an ordered sequence of nodes output -> input, left to right.
pub fn connect_series(graph: &mut Graph, links: &[ChainLink]) -> Result<(), GraphError> {
    for (index, pair) in links.windows(2).enumerate() {
        let from = pair[0]
            .output
            .ok_or(GraphError::NotConnectable { index })?;
        let to = pair[1]
            .input
            .ok_or(GraphError::NotConnectable { index: index + 1 })?;
        graph.connect(from, to)?;
    }
    Ok(())
}

/// The base signal: one constant source whose output is the signal and
/// whose value parameter is the automatable control surface. Allocates one
/// engine node per instance.
#[derive(Debug)]
pub struct Signal {
    constant: ConstantSourceEndpoints,
    param: Param,
}

impl Signal {
    /// Base option set. Subclasses merge their own defaults over this.
    pub fn defaults() -> SignalConfig {
        SignalConfig::new().value(0.0)
    }

    pub fn new(graph: &mut Graph) -> Self {
        Self::from_config(graph, SignalConfig::new())
    }

    pub fn with_value(graph: &mut Graph, value: f32) -> Self {
        Self::from_config(graph, SignalConfig::new().value(value))
    }

    pub fn from_config(graph: &mut Graph, config: SignalConfig) -> Self {
        let value = config.merge(Self::defaults()).resolve();
        let constant = graph.add_node(ConstantSource::new(value));
        Self {
            constant,
            param: Param::new(constant.value),
        }
    }

    pub fn param(&self) -> Param {
        self.param
    }

    /// Resident constant, regardless of any live override.
    pub fn value(&self, graph: &Graph) -> Option<f32> {
        graph.param_value(self.param)
    }

    pub fn set_value(&self, graph: &mut Graph, value: f32) {
        graph.set_param(self.param, value);
    }

    pub fn ramp_to(&self, graph: &mut Graph, value: f32, ramp_samples: u32) {
        graph.ramp_param(self.param, value, ramp_samples);
    }

    /// Connects this signal into another node's summing input.
    pub fn connect(&self, graph: &mut Graph, dest: &dyn SignalNode) -> Result<(), GraphError> {
        graph.connect(self.output(), dest.input())
    }

    /// Connects this signal to an arbitrary endpoint, e.g. a `Param`.
    pub fn connect_to<I>(&self, graph: &mut Graph, to: I) -> Result<(), GraphError>
    where
        I: Into<InputEndpoint>,
    {
        graph.connect(self.output(), to)
    }
}

impl SignalNode for Signal {
    fn name(&self) -> &'static str {
        "Signal"
    }

    // Connecting into a Signal drives its value parameter.
    fn input(&self) -> InputEndpoint {
        self.param.into()
    }

    fn output(&self) -> StreamOutput {
        self.constant.output
    }

    fn dispose(&mut self, graph: &mut Graph) {
        graph.remove_node(self.constant.node);
    }
}
