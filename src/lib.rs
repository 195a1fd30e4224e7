//! Reader for serialized DirectML execution plans (`*dmlplan.json`).
//!
//! A plan is a flat program: a buffer table plus an ordered list of operator
//! dispatches and global UAV barriers. This crate turns one into a structured
//! graph a viewer can walk — operator nodes, barrier nodes, and explicit
//! edges for the synchronization the flat form only implies.
//!
//! Layout:
//! - [`plan`] — raw serde shapes of the document, unvalidated
//! - [`tensor`] — tensor type/shape descriptors + external payload loading
//! - [`graph`] — the in-memory graph model and the builder that produces it
//! - [`model`] — the `ModelFactory` entry point (`matches`/`open`) and the
//!   top-level `Plan` wrapper

pub mod graph;
pub mod model;
pub mod plan;
pub mod tensor;

pub type Result<T> = anyhow::Result<T>;

pub use graph::{Argument, Attribute, Graph, Node, Parameter};
pub use model::{ModelFactory, Plan, PLAN_FILE_SUFFIX};
pub use plan::{AttrValue, BufferBinding, BufferKind, PlanDoc, StepDoc, TensorDesc};
pub use tensor::{Tensor, TensorShape, TensorType};
