//! Wire parameters, mode dispatch and response shapes.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::engine::ContextEngine;
use crate::error::Result;
use crate::pmi::PmiParams;
use crate::prediction::{PredictionParams, ScoringMode};
use crate::source::TermStatisticsSource;
use crate::vector::Candidate;

/// Raw query parameters, as named on the wire.
///
/// Repeated `context.fl` and `context.prefix` keys collect into lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextParams {
    #[serde(default)]
    pub context: Option<String>,
    #[serde(rename = "context.fl", default)]
    pub fields: Vec<String>,
    #[serde(rename = "context.prefix", default)]
    pub prefixes: Vec<String>,
    #[serde(rename = "context.limit")]
    pub limit: Option<usize>,
    #[serde(rename = "context.mode")]
    pub mode: Option<String>,
    #[serde(rename = "context.pmi.power")]
    pub pmi_power: Option<f64>,
    #[serde(rename = "context.pmi.shift")]
    pub pmi_shift: Option<f64>,
    #[serde(rename = "context.pmi.min.tf")]
    pub pmi_min_tf: Option<u64>,
    #[serde(rename = "context.pmi.min.cf")]
    pub pmi_min_cf: Option<u64>,
    #[serde(rename = "context.pmi.normalise")]
    pub pmi_normalise: Option<bool>,
    #[serde(rename = "context.rerank")]
    pub rerank: Option<bool>,
}

/// Operation selected by the number of prefixes.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextQuery {
    Predict { fields: Vec<String>, seed: String },
    Similarity { field: String, a: String, b: String },
    Analogy { field: String, a: String, b: String, c: String },
    OddOneOut { field: String, terms: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextRequest {
    pub query: ContextQuery,
    pub params: PredictionParams,
}

impl ContextParams {
    fn prediction_params(&self) -> PredictionParams {
        let defaults = PredictionParams::default();
        let pmi_defaults = PmiParams::default();

        PredictionParams {
            limit: self.limit.unwrap_or(defaults.limit),
            mode: self
                .mode
                .as_deref()
                .map(ScoringMode::from_param)
                .unwrap_or(defaults.mode),
            pmi: PmiParams {
                power: self.pmi_power.unwrap_or(pmi_defaults.power),
                shift: self.pmi_shift.unwrap_or(pmi_defaults.shift),
                min_term_freq: self.pmi_min_tf.unwrap_or(pmi_defaults.min_term_freq),
                min_co_freq: self.pmi_min_cf.unwrap_or(pmi_defaults.min_co_freq),
                normalise: self.pmi_normalise.unwrap_or(pmi_defaults.normalise),
            },
            rerank: self.rerank.unwrap_or(defaults.rerank),
        }
    }

    /// Validate into a request, or `None` when the request is a no-op.
    pub fn into_request(self) -> Option<ContextRequest> {
        if self.context.as_deref() != Some("true") {
            debug!("Context analytics not enabled for request");
            return None;
        }
        if self.fields.is_empty() {
            debug!("No context fields given");
            return None;
        }

        let params = self.prediction_params();
        let Self {
            mut fields,
            mut prefixes,
            ..
        } = self;

        if prefixes.len() > 1 && fields.len() != 1 {
            debug!(
                fields = fields.len(),
                "Similarity, analogy and odd-one-out need exactly one field"
            );
            return None;
        }

        let query = match prefixes.len() {
            1 => ContextQuery::Predict {
                fields,
                seed: prefixes.remove(0),
            },
            2 => {
                let b = prefixes.remove(1);
                let a = prefixes.remove(0);
                ContextQuery::Similarity {
                    field: fields.remove(0),
                    a,
                    b,
                }
            }
            3 => {
                let c = prefixes.remove(2);
                let b = prefixes.remove(1);
                let a = prefixes.remove(0);
                ContextQuery::Analogy {
                    field: fields.remove(0),
                    a,
                    b,
                    c,
                }
            }
            4 => ContextQuery::OddOneOut {
                field: fields.remove(0),
                terms: prefixes,
            },
            count => {
                debug!(prefixes = count, "Unsupported number of prefixes");
                return None;
            }
        };

        Some(ContextRequest { query, params })
    }
}

/// Predicted candidates for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldPrediction {
    pub field: String,
    pub candidates: Vec<Candidate>,
}

/// Result section of a context request, keyed by operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ContextResponse {
    #[serde(rename = "terms")]
    Predict(Vec<FieldPrediction>),
    #[serde(rename = "sim")]
    Similarity(f64),
    #[serde(rename = "isTo")]
    Analogy(Vec<Candidate>),
    #[serde(rename = "oddOneOut")]
    OddOneOut(Vec<Candidate>),
}

impl<S> ContextEngine<S>
where
    S: TermStatisticsSource,
{
    /// Run a validated request.
    #[instrument(name = "ContextEngine::handle", skip(self, request), fields(query = ?request.query))]
    pub fn handle(&self, request: &ContextRequest) -> Result<ContextResponse> {
        let params = &request.params;

        let response = match &request.query {
            ContextQuery::Predict { fields, seed } => {
                let mut predictions = Vec::with_capacity(fields.len());
                for field in fields {
                    let prediction = self.predict(field, seed, params)?;
                    predictions.push(FieldPrediction {
                        field: field.clone(),
                        candidates: prediction.candidates,
                    });
                }
                ContextResponse::Predict(predictions)
            }
            ContextQuery::Similarity { field, a, b } => {
                ContextResponse::Similarity(self.similarity(field, a, b)?)
            }
            ContextQuery::Analogy { field, a, b, c } => {
                ContextResponse::Analogy(self.analogy(field, a, b, c, params)?.ranked)
            }
            ContextQuery::OddOneOut { field, terms } => {
                ContextResponse::OddOneOut(self.odd_one_out(field, terms)?)
            }
        };

        Ok(response)
    }
}
