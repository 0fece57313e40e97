//! JSON request/response surface.
//!
//! A request carries an instrument definition and the answers to score;
//! the response carries per-dimension percentages and any levels the
//! instrument defines. Every request is independent.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::evaluate;
use crate::error::{ConfigError, ScoringError};
use crate::instrument::{Instrument, InstrumentConfig};
use crate::model::{Answer, AnswerSet, DimensionKey};

/// A scoring request: an instrument plus answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    #[serde(flatten)]
    pub instrument: InstrumentConfig,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// A scoring response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub scores: BTreeMap<DimensionKey, u8>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub levels: BTreeMap<DimensionKey, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<u8>,
    /// Label of the overall level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
}

/// Why a request could not be scored.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid instrument")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Score a request.
pub fn handle(request: &ScoreRequest) -> Result<ScoreResponse, RequestError> {
    let instrument = Instrument::new(request.instrument.clone())?;
    let answers: AnswerSet = request.answers.iter().cloned().collect();
    let assessment = evaluate(&instrument, &answers)?;

    Ok(ScoreResponse {
        scores: assessment.card.to_map(),
        levels: assessment
            .levels
            .into_iter()
            .map(|(key, level)| (key, level.label))
            .collect(),
        overall: assessment.overall.as_ref().map(|o| o.percentage),
        classification: assessment.overall.map(|o| o.level.label),
        type_code: assessment.type_code,
    })
}

/// Score a JSON-encoded request and return the JSON-encoded response.
pub fn handle_json(input: &str) -> Result<String> {
    let request: ScoreRequest =
        serde_json::from_str(input).context("failed to parse score request")?;
    let response = handle(&request)?;
    serde_json::to_string(&response).context("failed to serialize score response")
}
