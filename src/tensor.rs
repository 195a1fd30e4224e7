//! Tensor descriptors and external payload loading.
//!
//! A plan stores constant tensors out of line: the descriptor carries a
//! relative `Data` path and the bytes live in a side file next to the plan.
//! `Tensor::load` pulls those bytes in so the graph can embed the constant
//! directly in the consuming node's argument.

use crate::Result;
use crate::plan::TensorDesc;

use anyhow::{Context, bail};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Declared dimension sizes, empty when the plan declares none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TensorShape(pub Vec<i64>);

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        let dims: Vec<String> = self.0.iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", dims.join(","))
    }
}

/// Declared element type + shape. Renders as e.g. `float32[64,3,3,3]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TensorType {
    pub data_type: String,
    pub shape: TensorShape,
    pub denotation: Option<String>,
}

impl TensorType {
    pub fn new(data_type: Option<&str>, shape: TensorShape, denotation: Option<&str>) -> Self {
        Self {
            // Descriptors without a declared element type are opaque bytes.
            data_type: data_type.unwrap_or("bytes").to_string(),
            shape,
            denotation: denotation.map(str::to_string),
        }
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.data_type, self.shape)
    }
}

/// A constant tensor embedded in an operator argument. Never a graph node of
/// its own: weights are inlined into the consumers that bind them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tensor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TensorType,
    /// Raw payload bytes; absent for descriptors with no side file. Left out
    /// of the serialized view, reachable through the field.
    #[serde(skip)]
    pub raw_data: Option<Vec<u8>>,
}

impl Tensor {
    /// Build a tensor from its plan descriptor, reading the payload side file
    /// (if any) relative to `base_dir`.
    ///
    /// The declared byte size must be present; that is checked before any
    /// file access is attempted.
    pub fn load(desc: &TensorDesc, base_dir: &Path) -> Result<Self> {
        if desc.buffer_size.is_none() {
            bail!("Field \"BufferSize\" not found.");
        }

        let ty = TensorType::new(
            desc.data_type.as_deref(),
            TensorShape(desc.dimensions.clone().unwrap_or_default()),
            desc.denotation.as_deref(),
        );

        let raw_data = match &desc.data {
            Some(rel) => {
                let path = base_dir.join(rel);
                let bytes = fs::read(&path)
                    .with_context(|| format!("read tensor data file {}", path.display()))?;
                Some(bytes)
            }
            None => None,
        };

        Ok(Self {
            name: desc.name.clone().unwrap_or_default(),
            ty,
            raw_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn desc(json: &str) -> TensorDesc {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn shape_and_type_render() {
        assert_eq!(TensorShape(vec![]).to_string(), "");
        assert_eq!(TensorShape(vec![1, 3, 256, 256]).to_string(), "[1,3,256,256]");

        let ty = TensorType::new(Some("float32"), TensorShape(vec![2, 2]), None);
        assert_eq!(ty.to_string(), "float32[2,2]");

        let opaque = TensorType::new(None, TensorShape(vec![]), None);
        assert_eq!(opaque.to_string(), "bytes");
    }

    #[test]
    fn missing_buffer_size_fails_before_any_read() {
        // The Data path does not exist; the size check must fire first.
        let err = Tensor::load(
            &desc(r#"{ "Data": "does-not-exist.bin" }"#),
            Path::new("/nonexistent"),
        )
        .unwrap_err();
        assert!(
            err.to_string().contains("BufferSize"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn loads_payload_bytes_from_side_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("w.bin"), [1u8, 2, 3, 4]).unwrap();

        let tensor = Tensor::load(
            &desc(
                r#"{ "name": "w", "DataType": "float32", "Dimensions": [4],
                     "BufferSize": 4, "Data": "w.bin" }"#,
            ),
            dir.path(),
        )
        .unwrap();

        assert_eq!(tensor.name, "w");
        assert_eq!(tensor.ty.to_string(), "float32[4]");
        assert_eq!(tensor.raw_data, Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn descriptor_without_data_has_no_payload() {
        let tensor = Tensor::load(
            &desc(r#"{ "name": "x", "BufferSize": 64 }"#),
            Path::new("/nonexistent"),
        )
        .unwrap();
        assert_eq!(tensor.raw_data, None);
        assert_eq!(tensor.ty.to_string(), "bytes");
    }

    #[test]
    fn unreadable_payload_surfaces_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Tensor::load(
            &desc(r#"{ "BufferSize": 4, "Data": "missing.bin" }"#),
            dir.path(),
        )
        .unwrap_err();
        assert!(
            format!("{err:#}").contains("missing.bin"),
            "unexpected error: {err:#}"
        );
    }
}
