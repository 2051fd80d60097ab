use std::ops::Shr;

use arrayvec::ArrayVec;
use slotmap::new_key_type;

pub const MAX_NODE_PORTS: usize = 8;
pub const MAX_FAN_IN: usize = 64;

new_key_type! { pub struct NodeKey; }
new_key_type! { pub struct PortKey; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PortType {
    Stream,
    Value,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Clone, Debug)]
pub struct PortDescriptor {
    pub name: &'static str,
    pub port_type: PortType,
    pub direction: PortDirection,
}

impl PortDescriptor {
    pub const fn new(name: &'static str, port_type: PortType, direction: PortDirection) -> Self {
        Self {
            name,
            port_type,
            direction,
        }
    }
}

/// Scalar state held at a port. Output ports carry the value the node wrote
/// during the last `process` pass; input ports carry the resident value used
/// when nothing is connected.
#[derive(Debug)]
pub enum PortState {
    Stream(f32),
    Value(f32),
}

impl PortState {
    pub fn for_type(port_type: PortType) -> Self {
        match port_type {
            PortType::Stream => Self::Stream(0.0),
            PortType::Value => Self::Value(0.0),
        }
    }

    pub fn port_type(&self) -> PortType {
        match self {
            Self::Stream(_) => PortType::Stream,
            Self::Value(_) => PortType::Value,
        }
    }

    #[inline]
    pub fn scalar(&self) -> f32 {
        match self {
            Self::Stream(v) | Self::Value(v) => *v,
        }
    }

    #[inline]
    pub fn set_scalar(&mut self, value: f32) {
        match self {
            Self::Stream(v) | Self::Value(v) => *v = value,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct InputEndpoint {
    key: PortKey,
}

impl InputEndpoint {
    pub fn new(key: PortKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> PortKey {
        self.key
    }
}

// ============================================================================
// Typed input handles
// ============================================================================

/// Audio-rate input. Incoming connections sum.
#[derive(Copy, Clone, Debug)]
pub struct StreamInput {
    endpoint: InputEndpoint,
}

impl StreamInput {
    pub fn new(endpoint: InputEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> InputEndpoint {
        self.endpoint
    }

    pub fn key(&self) -> PortKey {
        self.endpoint.key()
    }
}

impl From<StreamInput> for InputEndpoint {
    fn from(handle: StreamInput) -> Self {
        handle.endpoint()
    }
}

impl From<&StreamInput> for InputEndpoint {
    fn from(handle: &StreamInput) -> Self {
        handle.endpoint()
    }
}

/// Control input holding a resident constant. A live connection takes
/// precedence over the resident value for as long as it persists.
#[derive(Copy, Clone, Debug)]
pub struct ValueInput {
    endpoint: InputEndpoint,
}

impl ValueInput {
    pub fn new(endpoint: InputEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> InputEndpoint {
        self.endpoint
    }

    pub fn key(&self) -> PortKey {
        self.endpoint.key()
    }
}

impl From<ValueInput> for InputEndpoint {
    fn from(handle: ValueInput) -> Self {
        handle.endpoint()
    }
}

impl From<&ValueInput> for InputEndpoint {
    fn from(handle: &ValueInput) -> Self {
        handle.endpoint()
    }
}

// ============================================================================
// Typed output handles
// ============================================================================

/// Trait for output endpoints, so wiring helpers can be generic over them.
pub trait Output {
    fn key(&self) -> PortKey;
}

#[derive(Copy, Clone, Debug)]
pub struct StreamOutput {
    key: PortKey,
}

impl StreamOutput {
    pub fn new(key: PortKey) -> Self {
        Self { key }
    }
}

impl Output for StreamOutput {
    fn key(&self) -> PortKey {
        self.key
    }
}

// ============================================================================
// Param - automatable scalar handle
// ============================================================================

/// Handle onto one node's automatable scalar. Settable directly via
/// `Graph::set_param`, ramped via `Graph::ramp_param`, or overridden by
/// connecting another node's output to it.
#[derive(Copy, Clone, Debug)]
pub struct Param {
    input: ValueInput,
}

impl Param {
    pub fn new(input: ValueInput) -> Self {
        Self { input }
    }

    pub fn input(&self) -> ValueInput {
        self.input
    }

    pub fn key(&self) -> PortKey {
        self.input.key()
    }
}

impl From<Param> for InputEndpoint {
    fn from(param: Param) -> Self {
        param.input.into()
    }
}

impl From<&Param> for InputEndpoint {
    fn from(param: &Param) -> Self {
        param.input.into()
    }
}

// ============================================================================
// Connections
// ============================================================================

/// Internal representation of a connection (keys, not typed handles).
pub struct Connection {
    pub(crate) from: PortKey,
    pub(crate) to: PortKey,
}

pub struct ConnectionBuilder {
    pub(crate) connections: ArrayVec<Connection, MAX_FAN_IN>,
}

impl ConnectionBuilder {
    fn single(from: PortKey, to: PortKey) -> Self {
        let mut connections = ArrayVec::new();
        connections.push(Connection { from, to });
        Self { connections }
    }

    pub fn and<I>(mut self, to: I) -> Self
    where
        I: Into<InputEndpoint>,
    {
        let from = self.connections[0].from;
        self.connections.push(Connection {
            from,
            to: to.into().key(),
        });
        self
    }
}

impl Shr<StreamInput> for StreamOutput {
    type Output = ConnectionBuilder;

    fn shr(self, to: StreamInput) -> ConnectionBuilder {
        ConnectionBuilder::single(Output::key(&self), to.key())
    }
}

impl Shr<ValueInput> for StreamOutput {
    type Output = ConnectionBuilder;

    fn shr(self, to: ValueInput) -> ConnectionBuilder {
        ConnectionBuilder::single(Output::key(&self), to.key())
    }
}

// A stream can drive a Param directly, overriding its resident constant.
impl Shr<Param> for StreamOutput {
    type Output = ConnectionBuilder;

    fn shr(self, to: Param) -> ConnectionBuilder {
        self >> to.input()
    }
}
