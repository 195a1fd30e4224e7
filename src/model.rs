//! Entry point: recognize plan documents and open them as graphs.
//!
//! `open` is the single normalization boundary. Everything below it — JSON
//! parsing, tensor loads, graph construction — fails with an ordinary error;
//! this layer rewraps whatever comes out into one message naming the source
//! document. A failed open yields nothing: there is no partial graph.

use crate::Result;
use crate::graph::Graph;
use crate::plan::PlanDoc;

use anyhow::anyhow;
use serde::Serialize;
use std::path::Path;

/// File-name suffix that marks a document as a serialized plan.
pub const PLAN_FILE_SUFFIX: &str = "dmlplan.json";

/// Format tag reported to the host viewer.
pub const PLAN_FORMAT: &str = "dmlplan";

/// Top-level wrapper around the graphs derived from one document. A plan
/// document always yields exactly one graph; the list shape matches what a
/// viewer expects. Metadata stays empty — the plan format carries no
/// producer or version information.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub graphs: Vec<Graph>,
    pub metadata: Vec<String>,
}

impl Plan {
    pub fn format(&self) -> &'static str {
        PLAN_FORMAT
    }
}

/// Recognizes and opens `*dmlplan.json` documents.
pub struct ModelFactory;

impl ModelFactory {
    /// True iff `identifier` (a file name) names a plan document.
    pub fn matches(identifier: &str) -> bool {
        identifier.ends_with(PLAN_FILE_SUFFIX)
    }

    /// Parse `text` as a plan document and build its graph. Payload side
    /// files resolve relative to `base_dir`. Any failure — parse or
    /// construction — comes back as one error naming `identifier`.
    pub fn open(identifier: &str, text: &str, base_dir: &Path) -> Result<Plan> {
        Self::open_inner(text, base_dir).map_err(|err| {
            let mut message = format!("{err:#}");
            if message.ends_with('.') {
                message.pop();
            }
            anyhow!("{message} in '{identifier}'.")
        })
    }

    fn open_inner(text: &str, base_dir: &Path) -> Result<Plan> {
        let doc: PlanDoc = serde_json::from_str(text)?;
        let graph = Graph::from_plan(&doc, base_dir)?;
        Ok(Plan {
            graphs: vec![graph],
            metadata: Vec::new(),
        })
    }
}
