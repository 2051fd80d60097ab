mod graph_impl;
mod topology;
mod traits;
pub mod types;

#[cfg(test)]
mod tests;

pub use graph_impl::{Graph, GraphError, NodeData};
pub use traits::{ProcessingNode, SignalProcessor};
pub use types::{
    InputEndpoint, NodeKey, Output, Param, PortDescriptor, PortDirection, PortKey, PortType,
    StreamInput, StreamOutput, ValueInput, MAX_FAN_IN, MAX_NODE_PORTS,
};
