//! Raw document layer: serde shapes of the serialized plan.
//!
//! This module is intentionally separate from the graph model: it owns only
//! what the file says, unvalidated. Everything that can be wrong with a plan
//! beyond JSON shape (unknown step tags, dangling buffer indices, missing
//! buffer sizes) is reported by the graph builder, not here.

pub mod doc;

pub use doc::{AttrValue, BufferBinding, BufferKind, OperatorTypeDoc, PlanDoc, StepDoc, TensorDesc};
