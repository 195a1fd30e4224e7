//! Graph model: the immutable structures a host viewer walks.
//!
//! Everything here is built once per document by [`build`] and never mutated
//! afterwards. The types derive `Serialize` so a whole graph can be embedded
//! as JSON by a renderer.

pub mod build;

use crate::plan::AttrValue;
use crate::tensor::Tensor;
use serde::Serialize;

/// Display name shared by every barrier node.
pub const BARRIER_NAME: &str = "Global UAV Barrier";

/// A named value flowing into or out of a node (or the graph boundary).
#[derive(Debug, Clone, Serialize)]
pub struct Argument {
    pub id: String,
    /// Declared type rendering, if the builder assigned one.
    pub declared_type: Option<String>,
    /// Constant payload inlined into this argument; never a node of its own.
    pub initializer: Option<Tensor>,
}

impl Argument {
    pub fn new(id: impl Into<String>, declared_type: Option<String>, initializer: Option<Tensor>) -> Self {
        Self {
            id: id.into(),
            declared_type,
            initializer,
        }
    }

    /// Effective type: declared if present, else the initializer's rendered
    /// type, else none.
    pub fn ty(&self) -> Option<String> {
        if self.declared_type.is_some() {
            return self.declared_type.clone();
        }
        self.initializer.as_ref().map(|t| t.ty.to_string())
    }
}

/// A named connection point holding one or more arguments.
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Boundary and node parameters are always user-visible.
    pub fn visible(&self) -> bool {
        true
    }
}

/// An operator attribute, copied verbatim from the plan. Values are opaque to
/// the reader.
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

/// One graph node: an operator dispatch or a synchronization barrier. Both
/// kinds share the read-only shape a viewer consumes; a barrier has no
/// attributes and a fixed display name.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Node {
    Operator {
        operator: String,
        attributes: Vec<Attribute>,
        inputs: Vec<Parameter>,
        outputs: Vec<Parameter>,
    },
    Barrier {
        inputs: Vec<Parameter>,
        outputs: Vec<Parameter>,
    },
}

impl Node {
    pub fn operator(&self) -> &str {
        match self {
            Node::Operator { operator, .. } => operator,
            Node::Barrier { .. } => BARRIER_NAME,
        }
    }

    /// Display name; equals the operator type for operator nodes.
    pub fn name(&self) -> &str {
        self.operator()
    }

    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Node::Operator { attributes, .. } => attributes,
            Node::Barrier { .. } => &[],
        }
    }

    pub fn inputs(&self) -> &[Parameter] {
        match self {
            Node::Operator { inputs, .. } | Node::Barrier { inputs, .. } => inputs,
        }
    }

    pub fn outputs(&self) -> &[Parameter] {
        match self {
            Node::Operator { outputs, .. } | Node::Barrier { outputs, .. } => outputs,
        }
    }
}

/// The derived view of one plan: nodes in step order plus the boundary
/// parameter lists. Constant inputs (those with a payload side file) do not
/// appear in `inputs`; they ride along as initializers on the nodes that
/// bind them.
#[derive(Debug, Clone, Serialize)]
pub struct Graph {
    pub name: String,
    pub description: String,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    pub nodes: Vec<Node>,
}

impl Graph {
    /// The plan format has no node grouping.
    pub fn groups(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{TensorShape, TensorType};
    use pretty_assertions::assert_eq;

    #[test]
    fn argument_type_falls_back_to_its_initializer() {
        let tensor = Tensor {
            name: "w".to_string(),
            ty: TensorType::new(Some("float32"), TensorShape(vec![2, 2]), None),
            raw_data: None,
        };

        let declared = Argument::new("a", Some("int64[4]".to_string()), Some(tensor.clone()));
        assert_eq!(declared.ty(), Some("int64[4]".to_string()));

        let inherited = Argument::new("a", None, Some(tensor));
        assert_eq!(inherited.ty(), Some("float32[2,2]".to_string()));

        let untyped = Argument::new("a", None, None);
        assert_eq!(untyped.ty(), None);
    }

    #[test]
    fn barrier_nodes_share_the_operator_node_surface() {
        let edge = Parameter::new("e", vec![Argument::new("e", None, None)]);
        let node = Node::Barrier {
            inputs: vec![edge.clone()],
            outputs: vec![],
        };

        assert_eq!(node.operator(), BARRIER_NAME);
        assert_eq!(node.name(), BARRIER_NAME);
        assert!(node.attributes().is_empty());
        assert_eq!(node.inputs().len(), 1);
        assert!(node.inputs()[0].visible());
    }

    #[test]
    fn graphs_have_no_grouping() {
        let graph = Graph {
            name: String::new(),
            description: String::new(),
            inputs: vec![],
            outputs: vec![],
            nodes: vec![],
        };
        assert!(!graph.groups());
    }
}
