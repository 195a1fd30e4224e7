//! Serialized plan document shapes.
//!
//! JSON shape:
//! {
//!   "Inputs": [
//!     { "name": "w0", "DataType": "float32", "Dimensions": [64,3,3,3],
//!       "Denotation": "FILTER", "BufferSize": 6912, "Data": "w0.bin" },
//!     ...
//!   ],
//!   "Outputs": [ { ... }, ... ],            // only slot count/order is used
//!   "Steps": [
//!     { "StepType": "ExecuteDmlOperation",
//!       "OperatorType": { "EnumName": "Conv" },
//!       "Inputs":  { "0": { "BufferKind": "Input",  "BufferIndex": 0 } },
//!       "Outputs": { "0": { "BufferKind": "Output", "BufferIndex": 0 } },
//!       "Attributes": { "Strides": [1, 1] } },
//!     { "StepType": "GlobalUAVBarrier" },
//!     ...
//!   ]
//! }
//!
//! `Inputs`/`Outputs`/`Steps` are required; everything inside a step is
//! optional at parse time. `StepType` stays a plain string so the builder can
//! name an unknown tag in its error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct PlanDoc {
    #[serde(rename = "Inputs")]
    pub inputs: Vec<TensorDesc>,

    /// Declared output slots. The reader only consumes their count and order.
    #[serde(rename = "Outputs")]
    pub outputs: Vec<serde_json::Value>,

    #[serde(rename = "Steps")]
    pub steps: Vec<StepDoc>,
}

/// One entry of the plan's input buffer table.
#[derive(Debug, Clone, Deserialize)]
pub struct TensorDesc {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "DataType", default)]
    pub data_type: Option<String>,

    #[serde(rename = "Dimensions", default)]
    pub dimensions: Option<Vec<i64>>,

    #[serde(rename = "Denotation", default)]
    pub denotation: Option<String>,

    /// Required for any descriptor a Tensor is built from; optional here so
    /// its absence surfaces as a construction error, not a parse error.
    #[serde(rename = "BufferSize", default)]
    pub buffer_size: Option<u64>,

    /// Relative path to the raw payload side file, present for constants.
    #[serde(rename = "Data", default)]
    pub data: Option<String>,
}

/// One step of the plan, shape shared by both step kinds.
#[derive(Debug, Clone, Deserialize)]
pub struct StepDoc {
    #[serde(rename = "StepType")]
    pub step_type: String,

    #[serde(rename = "OperatorType", default)]
    pub operator_type: Option<OperatorTypeDoc>,

    /// Slot -> binding. Keyed by the numeric value of the JSON object key so
    /// iteration runs in slot order ("2" before "10").
    #[serde(rename = "Inputs", default)]
    pub inputs: BTreeMap<u32, BufferBinding>,

    #[serde(rename = "Outputs", default)]
    pub outputs: BTreeMap<u32, BufferBinding>,

    #[serde(rename = "Attributes", default)]
    pub attributes: BTreeMap<String, AttrValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperatorTypeDoc {
    #[serde(rename = "EnumName")]
    pub enum_name: String,
}

/// Reference from a step slot into the plan's buffer tables.
#[derive(Debug, Clone, Deserialize)]
pub struct BufferBinding {
    #[serde(rename = "BufferKind")]
    pub kind: BufferKind,

    #[serde(rename = "BufferIndex")]
    pub index: usize,
}

/// Which buffer table a binding points at. Kinds this reader does not wire
/// into the graph (scratch buffers and the like) collapse into `Other` and
/// are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BufferKind {
    Input,
    Output,
    #[serde(other)]
    Other,
}

/// Attribute values are copied verbatim onto operator nodes. Closed variant
/// set rather than raw `serde_json::Value` so the model stays statically
/// checkable.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<AttrValue>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_a_minimal_plan() {
        let doc: PlanDoc = serde_json::from_str(
            r#"{
                "Inputs": [
                    { "name": "w", "BufferSize": 16, "Data": "w.bin",
                      "DataType": "float32", "Dimensions": [2, 2] }
                ],
                "Outputs": [ {} ],
                "Steps": [
                    { "StepType": "ExecuteDmlOperation",
                      "OperatorType": { "EnumName": "Conv" },
                      "Inputs": { "0": { "BufferKind": "Input", "BufferIndex": 0 } },
                      "Outputs": { "0": { "BufferKind": "Output", "BufferIndex": 0 } },
                      "Attributes": { "Strides": [1, 1], "Fused": false } },
                    { "StepType": "GlobalUAVBarrier" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.inputs.len(), 1);
        assert_eq!(doc.inputs[0].data.as_deref(), Some("w.bin"));
        assert_eq!(doc.inputs[0].buffer_size, Some(16));
        assert_eq!(doc.outputs.len(), 1);
        assert_eq!(doc.steps.len(), 2);

        let step = &doc.steps[0];
        assert_eq!(step.step_type, "ExecuteDmlOperation");
        assert_eq!(step.operator_type.as_ref().unwrap().enum_name, "Conv");
        assert_eq!(step.inputs[&0].kind, BufferKind::Input);
        assert_eq!(step.inputs[&0].index, 0);
        assert_eq!(
            step.attributes["Strides"],
            AttrValue::List(vec![AttrValue::Int(1), AttrValue::Int(1)])
        );
        assert_eq!(step.attributes["Fused"], AttrValue::Bool(false));

        let barrier = &doc.steps[1];
        assert_eq!(barrier.step_type, "GlobalUAVBarrier");
        assert!(barrier.inputs.is_empty());
        assert!(barrier.attributes.is_empty());
    }

    #[test]
    fn binding_maps_iterate_in_numeric_slot_order() {
        let step: StepDoc = serde_json::from_str(
            r#"{
                "StepType": "ExecuteDmlOperation",
                "Inputs": {
                    "10": { "BufferKind": "Input", "BufferIndex": 10 },
                    "2":  { "BufferKind": "Input", "BufferIndex": 2 }
                }
            }"#,
        )
        .unwrap();

        let indices: Vec<usize> = step.inputs.values().map(|b| b.index).collect();
        assert_eq!(indices, vec![2, 10]);
    }

    #[test]
    fn unknown_buffer_kind_collapses_to_other() {
        let binding: BufferBinding =
            serde_json::from_str(r#"{ "BufferKind": "Temporary", "BufferIndex": 3 }"#).unwrap();
        assert_eq!(binding.kind, BufferKind::Other);
    }

    #[test]
    fn missing_top_level_field_is_a_parse_error() {
        let err = serde_json::from_str::<PlanDoc>(r#"{ "Inputs": [], "Outputs": [] }"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("Steps"), "unexpected message: {err}");
    }
}
