//! Signal-rate arithmetic on an audio graph.
//!
//! The [`graph`] module is the rendering engine: nodes, ports, connections,
//! topological scheduling, and parameter ramps. The [`nodes`] module supplies
//! the routing primitives (constant source, gain, negate) and [`signal`]
//! builds the user-facing arithmetic layer on top of them, with [`Subtract`]
//! as the canonical composite.
//!
//! ```no_run
//! use tonegraph::{Graph, Signal, SignalNode, Subtract};
//!
//! let mut graph = Graph::new(44_100.0);
//! let sub = Subtract::with_value(&mut graph, 2.5)?;
//! let sig = Signal::with_value(&mut graph, 10.0);
//! sig.connect(&mut graph, &sub)?;
//! graph.process()?;
//! // sub now outputs 7.5
//! # Ok::<(), tonegraph::GraphError>(())
//! ```

pub mod graph;
pub mod nodes;
pub mod signal;

pub use graph::{
    Graph, GraphError, InputEndpoint, NodeKey, Output, Param, PortDescriptor, PortDirection,
    PortKey, PortType, ProcessingNode, SignalProcessor, StreamInput, StreamOutput, ValueInput,
};
pub use nodes::{
    ConstantSource, ConstantSourceEndpoints, Gain, GainEndpoints, Negate, NegateEndpoints,
};
pub use signal::{connect_series, Add, ChainLink, Multiply, Signal, SignalConfig, SignalNode, Subtract};
