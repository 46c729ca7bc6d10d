//! Verdicts, reports and the verify request/response surface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{Backend, Semantics, VerifyOptions};
use crate::graph_catalog::GraphSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Equivalent,
    NotEquivalent,
    Timeout,
    NotSupported,
    Unknown,
    SyntaxError,
}

impl Verdict {
    /// Process exit code for CLI wrappers.
    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Equivalent => 0,
            Verdict::NotEquivalent => 1,
            Verdict::Timeout | Verdict::Unknown | Verdict::NotSupported => 2,
            Verdict::SyntaxError => 64,
        }
    }
}

/// Where the wall-clock went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSplit {
    pub traversing_ms: u64,
    pub encoding_ms: u64,
    pub solving_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub result: Verdict,
    pub time_ms: u64,
    /// Largest bound that completed with `Equivalent`, or the bound at
    /// which a counterexample was found.
    pub checked_bound: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterexample: Option<String>,
    pub times: TimeSplit,
    pub details: Map<String, Value>,
}

impl Report {
    pub fn new(result: Verdict) -> Self {
        Report {
            result,
            time_ms: 0,
            checked_bound: None,
            counterexample: None,
            times: TimeSplit::default(),
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// One verification request, as accepted over the external JSON surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub cypher: String,
    pub sql: String,
    pub schema: GraphSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantics: Option<Semantics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
}

impl VerifyRequest {
    /// Merge request overrides over the base options.
    pub fn options(&self, base: &VerifyOptions) -> VerifyOptions {
        let mut options = base.clone();
        if let Some(bound_max) = self.bound_max {
            options.bound_max = bound_max;
        }
        if let Some(timeout) = self.timeout {
            options.timeout_secs = timeout;
        }
        if let Some(semantics) = self.semantics {
            options.semantics = semantics;
        }
        if let Some(backend) = self.backend {
            options.backend = backend;
        }
        options
    }
}
