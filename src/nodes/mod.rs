//! Primitive routing nodes supplied by the rendering engine: constant-value
//! injection, scalar multiply / summing junction, and sign inversion.

pub mod constant;
pub mod gain;
pub mod negate;

pub use constant::{ConstantSource, ConstantSourceEndpoints};
pub use gain::{Gain, GainEndpoints};
pub use negate::{Negate, NegateEndpoints};
