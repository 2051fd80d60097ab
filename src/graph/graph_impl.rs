use std::error::Error;
use std::fmt;

use arrayvec::ArrayVec;
use log::{debug, trace};
use slotmap::{SecondaryMap, SlotMap};

use super::topology::{self, TopologyError};
use super::traits::{ProcessingNode, SignalProcessor};
use super::types::{
    ConnectionBuilder, InputEndpoint, NodeKey, Output, Param, PortDescriptor, PortDirection,
    PortKey, PortState, PortType, MAX_FAN_IN, MAX_NODE_PORTS,
};

pub struct NodeData {
    pub processor: Box<dyn SignalProcessor>,
    pub inputs: ArrayVec<PortKey, MAX_NODE_PORTS>,
    pub outputs: ArrayVec<PortKey, MAX_NODE_PORTS>,
}

impl fmt::Debug for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeData")
            .field("processor", &"<SignalProcessor>")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum GraphError {
    CycleDetected(Vec<NodeKey>),
    SelfConnection(PortKey),
    UnknownPort(PortKey),
    DirectionMismatch { from: PortKey, to: PortKey },
    FanInExceeded(PortKey),
    NotConnectable { index: usize },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::CycleDetected(nodes) => {
                write!(
                    f,
                    "invalid cycle detected in graph; cycle contains {} nodes",
                    nodes.len()
                )
            }
            GraphError::SelfConnection(port) => {
                write!(f, "cannot connect port {:?} to itself", port)
            }
            GraphError::UnknownPort(port) => {
                write!(f, "port {:?} does not exist in this graph", port)
            }
            GraphError::DirectionMismatch { from, to } => {
                write!(
                    f,
                    "connection must run output -> input, got {:?} -> {:?}",
                    from, to
                )
            }
            GraphError::FanInExceeded(port) => {
                write!(f, "too many connections into port {:?}", port)
            }
            GraphError::NotConnectable { index } => {
                write!(f, "node at position {} in series lacks the required port", index)
            }
        }
    }
}

impl Error for GraphError {}

#[derive(Copy, Clone, Debug)]
struct ActiveRamp {
    key: PortKey,
    step: f32,
    remaining: u32,
    target: f32,
}

/// One rendering-engine instance: the context every node is created in.
/// Owns node processors and port state, recomputes the whole graph one
/// sample at a time in topological order.
#[derive(Debug)]
pub struct Graph {
    pub sample_rate: f32,
    nodes: SlotMap<NodeKey, NodeData>,
    ports: SlotMap<PortKey, PortState>,
    port_dirs: SecondaryMap<PortKey, PortDirection>,
    port_descriptors: SecondaryMap<PortKey, &'static PortDescriptor>,
    /// Incoming edges keyed by input port. All sources into a port sum.
    incoming: SecondaryMap<PortKey, ArrayVec<PortKey, MAX_FAN_IN>>,
    port_to_node: SecondaryMap<PortKey, NodeKey>,
    node_order: Vec<NodeKey>,
    topology_dirty: bool,
    active_ramps: Vec<ActiveRamp>,
    ramp_indices: SecondaryMap<PortKey, usize>,
}

impl Graph {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            nodes: SlotMap::with_key(),
            ports: SlotMap::with_key(),
            port_dirs: SecondaryMap::new(),
            port_descriptors: SecondaryMap::new(),
            incoming: SecondaryMap::new(),
            port_to_node: SecondaryMap::new(),
            node_order: Vec::new(),
            topology_dirty: true,
            active_ramps: Vec::with_capacity(32),
            ramp_indices: SecondaryMap::new(),
        }
    }

    /// Adds a processing node: allocates port slots for its declared
    /// endpoints, seeds resident values, and stores the boxed processor.
    /// Returns the node-specific endpoint handle for ergonomic wiring.
    pub fn add_node<T: ProcessingNode + 'static>(&mut self, mut node: T) -> T::Endpoints {
        node.init(self.sample_rate);

        let mut inputs = ArrayVec::<PortKey, MAX_NODE_PORTS>::new();
        let mut outputs = ArrayVec::<PortKey, MAX_NODE_PORTS>::new();

        for descriptor in T::PORT_DESCRIPTORS.iter() {
            let key = self.ports.insert(PortState::for_type(descriptor.port_type));
            self.port_dirs.insert(key, descriptor.direction);
            self.port_descriptors.insert(key, descriptor);
            match descriptor.direction {
                PortDirection::Input => inputs.push(key),
                PortDirection::Output => outputs.push(key),
            }
        }

        for (idx, value) in node.default_values() {
            if let Some(&key) = inputs.get(idx) {
                if let Some(state) = self.ports.get_mut(key) {
                    state.set_scalar(value);
                }
            }
        }

        let node_key = self.nodes.insert(NodeData {
            processor: Box::new(node),
            inputs: inputs.clone(),
            outputs: outputs.clone(),
        });

        for &port_key in inputs.iter().chain(outputs.iter()) {
            self.port_to_node.insert(port_key, node_key);
        }

        self.topology_dirty = true;
        debug!(
            "added node {:?} ({} inputs, {} outputs)",
            node_key,
            inputs.len(),
            outputs.len()
        );

        T::create_endpoints(node_key, inputs, outputs)
    }

    /// Destroys a node and every edge touching its ports. Safe to call with
    /// a stale key; returns whether anything was removed.
    pub fn remove_node(&mut self, node_key: NodeKey) -> bool {
        let Some(node) = self.nodes.remove(node_key) else {
            return false;
        };

        self.node_order.retain(|&key| key != node_key);

        for &input_key in &node.inputs {
            self.incoming.remove(input_key);
        }
        for &output_key in &node.outputs {
            self.remove_outgoing_edges(output_key);
        }

        for &key in node.inputs.iter().chain(node.outputs.iter()) {
            self.remove_active_ramp(key);
            self.ports.remove(key);
            self.port_dirs.remove(key);
            self.port_descriptors.remove(key);
            self.port_to_node.remove(key);
        }

        self.topology_dirty = true;
        debug!("removed node {:?}", node_key);

        true
    }

    /// Breaks every edge into and out of a node without destroying it.
    /// The ports stay alive, so handles held elsewhere remain usable.
    pub fn disconnect_node(&mut self, node_key: NodeKey) -> bool {
        let Some(node) = self.nodes.get(node_key) else {
            return false;
        };

        let input_keys: Vec<PortKey> = node.inputs.iter().copied().collect();
        let output_keys: Vec<PortKey> = node.outputs.iter().copied().collect();

        let mut removed = false;
        for input_key in input_keys {
            if self.incoming.remove(input_key).is_some_and(|s| !s.is_empty()) {
                removed = true;
            }
        }
        for output_key in output_keys {
            if self.remove_outgoing_edges(output_key) {
                removed = true;
            }
        }

        if removed {
            self.topology_dirty = true;
            debug!("disconnected node {:?}", node_key);
        }

        removed
    }

    fn remove_outgoing_edges(&mut self, source: PortKey) -> bool {
        let mut removed = false;
        for (_, sources) in self.incoming.iter_mut() {
            let original_len = sources.len();
            sources.retain(|key| *key != source);
            if sources.len() != original_len {
                removed = true;
            }
        }
        removed
    }

    /// Wires an output port to an input port. Fails loudly on malformed
    /// connections; a successful call is immediately visible to `process`.
    pub fn connect<O, I>(&mut self, from: O, to: I) -> Result<(), GraphError>
    where
        O: Output,
        I: Into<InputEndpoint>,
    {
        let from_key = from.key();
        let to_key = to.into().key();
        self.connect_keys(from_key, to_key)
    }

    fn connect_keys(&mut self, from_key: PortKey, to_key: PortKey) -> Result<(), GraphError> {
        if from_key == to_key {
            return Err(GraphError::SelfConnection(from_key));
        }
        match self.port_dirs.get(from_key) {
            None => return Err(GraphError::UnknownPort(from_key)),
            Some(PortDirection::Input) => {
                return Err(GraphError::DirectionMismatch {
                    from: from_key,
                    to: to_key,
                })
            }
            Some(PortDirection::Output) => {}
        }
        match self.port_dirs.get(to_key) {
            None => return Err(GraphError::UnknownPort(to_key)),
            Some(PortDirection::Output) => {
                return Err(GraphError::DirectionMismatch {
                    from: from_key,
                    to: to_key,
                })
            }
            Some(PortDirection::Input) => {}
        }

        self.incoming
            .entry(to_key)
            .ok_or(GraphError::UnknownPort(to_key))?
            .or_default()
            .try_push(from_key)
            .map_err(|_| GraphError::FanInExceeded(to_key))?;

        self.topology_dirty = true;
        trace!("connected {:?} -> {:?}", from_key, to_key);

        Ok(())
    }

    pub fn connect_all(&mut self, connections: Vec<ConnectionBuilder>) -> Result<(), GraphError> {
        for builder in connections {
            for connection in builder.connections {
                self.connect_keys(connection.from, connection.to)?;
            }
        }
        Ok(())
    }

    /// Removes one edge. Repeatable: returns whether an edge was removed.
    pub fn disconnect<O, I>(&mut self, from: O, to: I) -> bool
    where
        O: Output,
        I: Into<InputEndpoint>,
    {
        let from_key = from.key();
        let to_key = to.into().key();

        let mut removed = false;
        if let Some(sources) = self.incoming.get_mut(to_key) {
            let original_len = sources.len();
            sources.retain(|key| *key != from_key);
            if sources.len() != original_len {
                removed = true;
                if sources.is_empty() {
                    self.incoming.remove(to_key);
                }
            }
        }

        if removed {
            self.topology_dirty = true;
            trace!("disconnected {:?} -> {:?}", from_key, to_key);
        }

        removed
    }

    /// Removes every edge fanning out of an output port.
    pub fn disconnect_all_from<O>(&mut self, from: O) -> bool
    where
        O: Output,
    {
        let removed = self.remove_outgoing_edges(from.key());
        if removed {
            self.topology_dirty = true;
        }
        removed
    }

    /// Number of live connections into an input port.
    pub fn fan_in<I>(&self, to: I) -> usize
    where
        I: Into<InputEndpoint>,
    {
        self.incoming
            .get(to.into().key())
            .map(|sources| sources.len())
            .unwrap_or(0)
    }

    /// Writes a resident value immediately, cancelling any active ramp.
    pub fn set_value<I>(&mut self, input: I, value: f32)
    where
        I: Into<InputEndpoint>,
    {
        let key = input.into().key();
        if let Some(state) = self.ports.get_mut(key) {
            if state.port_type() == PortType::Value {
                state.set_scalar(value);
                self.remove_active_ramp(key);
            }
        }
    }

    /// Moves a resident value linearly to `value` over `ramp_samples`
    /// samples. A second ramp on the same port replaces the first.
    pub fn set_value_with_ramp<I>(&mut self, input: I, value: f32, ramp_samples: u32)
    where
        I: Into<InputEndpoint>,
    {
        let key = input.into().key();

        let current = match self.ports.get(key) {
            Some(state) if state.port_type() == PortType::Value => state.scalar(),
            _ => return,
        };
        if ramp_samples == 0 {
            self.set_value(InputEndpoint::new(key), value);
            return;
        }

        let step = (value - current) / (ramp_samples as f32);

        if let Some(&idx) = self.ramp_indices.get(key) {
            if let Some(ramp) = self.active_ramps.get_mut(idx) {
                ramp.step = step;
                ramp.remaining = ramp_samples;
                ramp.target = value;
            }
        } else {
            let idx = self.active_ramps.len();
            self.active_ramps.push(ActiveRamp {
                key,
                step,
                remaining: ramp_samples,
                target: value,
            });
            self.ramp_indices.insert(key, idx);
        }
    }

    /// Convenience methods for `Param` handles.
    pub fn set_param(&mut self, param: Param, value: f32) {
        self.set_value(param.input(), value);
    }

    pub fn ramp_param(&mut self, param: Param, value: f32, ramp_samples: u32) {
        self.set_value_with_ramp(param.input(), value, ramp_samples);
    }

    /// Resident value of a param, regardless of any live connection.
    pub fn param_value(&self, param: Param) -> Option<f32> {
        self.resident_value(param.input())
    }

    pub fn resident_value<I>(&self, input: I) -> Option<f32>
    where
        I: Into<InputEndpoint>,
    {
        self.ports.get(input.into().key()).map(PortState::scalar)
    }

    /// Last value written to an output port by `process`.
    pub fn get_value<O>(&self, endpoint: &O) -> Option<f32>
    where
        O: Output,
    {
        self.ports.get(endpoint.key()).map(PortState::scalar)
    }

    pub fn is_param_ramping(&self, param: Param) -> bool {
        self.ramp_indices.contains_key(param.key())
    }

    pub fn port_descriptor(&self, key: PortKey) -> Option<&'static PortDescriptor> {
        self.port_descriptors.get(key).copied()
    }

    pub fn node_for_port(&self, key: PortKey) -> Option<NodeKey> {
        self.port_to_node.get(key).copied()
    }

    /// Computes one sample across the whole graph in topological order.
    pub fn process(&mut self) -> Result<(), GraphError> {
        self.update_topology_if_needed()?;
        self.advance_ramps();

        for node_idx in 0..self.node_order.len() {
            let node_key = self.node_order[node_idx];

            let (input_keys, output_key) = match self.nodes.get(node_key) {
                Some(node) => (node.inputs.clone(), node.outputs.first().copied()),
                None => continue,
            };

            let mut input_values = ArrayVec::<f32, MAX_NODE_PORTS>::new();
            for &port in &input_keys {
                input_values.push(self.gather_input(port));
            }

            if let Some(node) = self.nodes.get_mut(node_key) {
                let output = node.processor.process(self.sample_rate, &input_values);
                if let Some(output_key) = output_key {
                    if let Some(state) = self.ports.get_mut(output_key) {
                        state.set_scalar(output);
                    }
                }
            }
        }

        Ok(())
    }

    /// Scalar seen by a node at one of its input ports: the algebraic sum of
    /// all connected outputs, or the resident value when nothing is
    /// connected. Connection takes precedence over the resident constant.
    #[inline]
    fn gather_input(&self, port: PortKey) -> f32 {
        match self.incoming.get(port) {
            Some(sources) if !sources.is_empty() => sources
                .iter()
                .filter_map(|&source| self.ports.get(source).map(PortState::scalar))
                .sum(),
            _ => self.ports.get(port).map(PortState::scalar).unwrap_or(0.0),
        }
    }

    fn advance_ramps(&mut self) {
        let mut i = 0;
        while i < self.active_ramps.len() {
            let mut finished_key: Option<PortKey> = None;
            if let Some(ramp) = self.active_ramps.get_mut(i) {
                if let Some(state) = self.ports.get_mut(ramp.key) {
                    state.set_scalar(state.scalar() + ramp.step);
                }
                if ramp.remaining > 0 {
                    ramp.remaining -= 1;
                }
                if ramp.remaining == 0 {
                    if let Some(state) = self.ports.get_mut(ramp.key) {
                        state.set_scalar(ramp.target);
                    }
                    finished_key = Some(ramp.key);
                }
            }

            if let Some(key) = finished_key {
                self.remove_active_ramp(key);
            } else {
                i += 1;
            }
        }
    }

    fn remove_active_ramp(&mut self, key: PortKey) {
        if let Some(&idx) = self.ramp_indices.get(key) {
            let removed = self.active_ramps.swap_remove(idx);
            self.ramp_indices.remove(removed.key);
            if idx < self.active_ramps.len() {
                let swapped_key = self.active_ramps[idx].key;
                self.ramp_indices.insert(swapped_key, idx);
            }
        }
    }

    /// Validates the wiring without processing a sample.
    pub fn validate(&mut self) -> Result<(), GraphError> {
        self.update_topology_if_needed()
    }

    fn update_topology_if_needed(&mut self) -> Result<(), GraphError> {
        if self.topology_dirty {
            self.node_order = self.topological_sort()?;
            self.topology_dirty = false;
        }
        Ok(())
    }

    fn topological_sort(&self) -> Result<Vec<NodeKey>, GraphError> {
        let nodes: Vec<NodeKey> = self.nodes.keys().collect();

        let get_dependencies = |node: &NodeKey| -> Vec<NodeKey> {
            let mut deps = Vec::new();
            if let Some(data) = self.nodes.get(*node) {
                for &input_key in &data.inputs {
                    if let Some(sources) = self.incoming.get(input_key) {
                        for &source in sources {
                            if let Some(&source_node) = self.port_to_node.get(source) {
                                if !deps.contains(&source_node) {
                                    deps.push(source_node);
                                }
                            }
                        }
                    }
                }
            }
            deps
        };

        topology::topological_sort(nodes, get_dependencies).map_err(|e| match e {
            TopologyError::CycleDetected { path } => GraphError::CycleDetected(path),
        })
    }

    /// Renders `duration_secs` of the signal at `from` to a stereo WAV file
    /// (the mono output duplicated into both channels).
    pub fn render_to_file<O>(
        &mut self,
        from: &O,
        duration_secs: f32,
        path: &str,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        O: Output,
    {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: self.sample_rate as u32,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        let num_samples = (duration_secs * self.sample_rate) as u32;

        for _ in 0..num_samples {
            self.process()?;
            let value = self.get_value(from).unwrap_or(0.0);
            writer.write_sample(value)?;
            writer.write_sample(value)?;
        }

        writer.finalize()?;
        Ok(())
    }
}
