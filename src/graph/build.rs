//! Plan-to-graph construction: one forward pass over the step list.
//!
//! The serialized plan encodes synchronization as bare barrier markers with
//! no edges. The builder reifies that: every operator emits one synthetic
//! output edge ("my writes are visible"), a barrier collects the edges of
//! every operator since the previous barrier as its inputs, and every
//! operator after a barrier gets one synthetic input edge ("the barrier has
//! completed"). A barrier's outward fan is only known once the *next*
//! barrier (or the end of the plan) is reached, so closing a barrier is
//! deferred.
//!
//! Constants never become nodes: a plan input with a payload side file is
//! loaded and inlined as an initializer on every operator argument that
//! binds it, and is excluded from the graph's boundary inputs.

use crate::Result;
use crate::graph::{Argument, Attribute, Graph, Node, Parameter};
use crate::plan::{BufferKind, PlanDoc, StepDoc, TensorDesc};
use crate::tensor::Tensor;

use anyhow::bail;
use std::mem;
use std::path::Path;

/// Fixed type rendering reported for every boundary parameter and synthetic
/// edge. The serializer does not record per-activation element types, and
/// type propagation from the declared buffer table is not implemented.
const PLACEHOLDER_TYPE: &str = "float32[1,3,256,256]";

const STEP_OPERATOR: &str = "ExecuteDmlOperation";
const STEP_BARRIER: &str = "GlobalUAVBarrier";

impl Graph {
    /// Derive the graph view of one plan. `base_dir` anchors the relative
    /// payload paths of constant inputs.
    pub fn from_plan(plan: &PlanDoc, base_dir: &Path) -> Result<Self> {
        GraphBuilder::new(base_dir).build(plan)
    }
}

/// Builder state for one graph construction. Lives for a single
/// [`Graph::from_plan`] call; nothing leaks between documents.
struct GraphBuilder<'a> {
    base_dir: &'a Path,

    /// Positional input buffer table, one parameter per plan input. Shared
    /// by every node that binds the buffer.
    input_buffers: Vec<Parameter>,

    graph_inputs: Vec<Parameter>,
    graph_outputs: Vec<Parameter>,
    nodes: Vec<Node>,

    /// Synthetic output edges of operators since the last barrier; becomes
    /// the next barrier's inputs.
    pending_barrier_inputs: Vec<Parameter>,

    /// Synthetic input edges handed to operators since the last barrier;
    /// becomes that barrier's outputs when it is closed.
    pending_operator_inputs: Vec<Parameter>,

    /// Index into `nodes` of the barrier still waiting for its outputs.
    active_barrier: Option<usize>,
}

impl<'a> GraphBuilder<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            input_buffers: Vec::new(),
            graph_inputs: Vec::new(),
            graph_outputs: Vec::new(),
            nodes: Vec::new(),
            pending_barrier_inputs: Vec::new(),
            pending_operator_inputs: Vec::new(),
            active_barrier: None,
        }
    }

    fn build(mut self, plan: &PlanDoc) -> Result<Graph> {
        self.prepare_inputs(&plan.inputs)?;
        self.prepare_outputs(plan.outputs.len());

        for (index, step) in plan.steps.iter().enumerate() {
            match step.step_type.as_str() {
                STEP_OPERATOR => self.push_operator(index, step)?,
                STEP_BARRIER => self.push_barrier(),
                other => bail!("Unsupported step type \"{other}\"."),
            }
        }

        // No trailing barrier will close the last one; do it here.
        self.close_active_barrier();

        Ok(Graph {
            name: String::new(),
            description: String::new(),
            inputs: self.graph_inputs,
            outputs: self.graph_outputs,
            nodes: self.nodes,
        })
    }

    /// Allocate the positional input buffer table. Descriptors with a
    /// payload side file are loaded now and inlined; only payload-free
    /// inputs surface on the graph boundary.
    fn prepare_inputs(&mut self, inputs: &[TensorDesc]) -> Result<()> {
        for (index, desc) in inputs.iter().enumerate() {
            let name = format!("input_{index}");

            let initializer = match desc.data {
                Some(_) => Some(Tensor::load(desc, self.base_dir)?),
                None => None,
            };
            let is_constant = initializer.is_some();

            let param = Parameter::new(
                &name,
                vec![Argument::new(
                    &name,
                    Some(PLACEHOLDER_TYPE.to_string()),
                    initializer,
                )],
            );

            if !is_constant {
                self.graph_inputs.push(param.clone());
            }
            self.input_buffers.push(param);
        }
        Ok(())
    }

    fn prepare_outputs(&mut self, count: usize) {
        for index in 0..count {
            let name = format!("output_{index}");
            let param = Parameter::new(
                &name,
                vec![Argument::new(&name, Some(PLACEHOLDER_TYPE.to_string()), None)],
            );
            self.graph_outputs.push(param);
        }
    }

    fn push_operator(&mut self, index: usize, step: &StepDoc) -> Result<()> {
        let operator = match &step.operator_type {
            Some(op) => op.enum_name.clone(),
            None => bail!("Step {index} is missing \"OperatorType\"."),
        };

        let mut inputs = Vec::new();

        // Everything after a barrier waits on it: one edge per operator.
        if self.active_barrier.is_some() {
            let edge = edge_parameter(format!("input_edge_{index}"));
            inputs.push(edge.clone());
            self.pending_operator_inputs.push(edge);
        }

        for (slot, binding) in &step.inputs {
            if binding.kind != BufferKind::Input {
                continue;
            }
            match self.input_buffers.get(binding.index) {
                Some(param) => inputs.push(param.clone()),
                None => bail!(
                    "Step {index} input slot {slot} references input buffer {}, \
                     but the plan declares {} inputs.",
                    binding.index,
                    self.input_buffers.len()
                ),
            }
        }

        let mut outputs = Vec::new();
        for (slot, binding) in &step.outputs {
            if binding.kind != BufferKind::Output {
                continue;
            }
            match self.graph_outputs.get(binding.index) {
                Some(param) => outputs.push(param.clone()),
                None => bail!(
                    "Step {index} output slot {slot} references output buffer {}, \
                     but the plan declares {} outputs.",
                    binding.index,
                    self.graph_outputs.len()
                ),
            }
        }

        // Unconditional: the edge exists whether or not a barrier follows.
        let out_edge = edge_parameter(format!("output_edge_{index}"));
        outputs.push(out_edge.clone());
        self.pending_barrier_inputs.push(out_edge);

        let attributes = step
            .attributes
            .iter()
            .map(|(name, value)| Attribute {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();

        self.nodes.push(Node::Operator {
            operator,
            attributes,
            inputs,
            outputs,
        });
        Ok(())
    }

    fn push_barrier(&mut self) {
        self.close_active_barrier();

        self.nodes.push(Node::Barrier {
            inputs: mem::take(&mut self.pending_barrier_inputs),
            outputs: Vec::new(),
        });
        self.active_barrier = Some(self.nodes.len() - 1);
    }

    /// Deferred close: hand the open barrier the input edges of every
    /// operator that ran after it.
    fn close_active_barrier(&mut self) {
        if let Some(index) = self.active_barrier.take() {
            let edges = mem::take(&mut self.pending_operator_inputs);
            if let Node::Barrier { outputs, .. } = &mut self.nodes[index] {
                *outputs = edges;
            }
        }
    }
}

/// A synthetic edge: single-argument parameter carrying the placeholder type.
fn edge_parameter(name: String) -> Parameter {
    let argument = Argument::new(&name, Some(PLACEHOLDER_TYPE.to_string()), None);
    Parameter::new(name, vec![argument])
}
