//! The scoring engine.
//!
//! [`score`] turns an answer set into per-dimension percentages;
//! [`evaluate`] adds levels, the overall aggregate, ranking, and the type
//! code that a results view displays. Both are pure: the instrument and
//! answers are only borrowed, and identical inputs give identical output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::instrument::Instrument;
use crate::model::{AnswerSet, AnswerValue, DimensionKey, MissingAnswerPolicy, QuestionKind};
use crate::profile;
use crate::thresholds::{classify, Level};

/// Raw and normalized score of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: DimensionKey,
    /// Sum of contributions.
    pub raw: f64,
    /// Normalization denominator.
    pub max: f64,
    /// `round(raw / max * 100)`, clamped to 0..=100.
    pub percentage: u8,
}

/// Scores for every dimension, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub scores: Vec<DimensionScore>,
}

impl ScoreCard {
    pub fn get(&self, key: &str) -> Option<&DimensionScore> {
        self.scores.iter().find(|s| s.dimension.as_str() == key)
    }

    pub fn percentage(&self, key: &str) -> Option<u8> {
        self.get(key).map(|s| s.percentage)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionScore> {
        self.scores.iter()
    }

    /// Percentages keyed by dimension.
    pub fn to_map(&self) -> BTreeMap<DimensionKey, u8> {
        self.scores
            .iter()
            .map(|s| (s.dimension.clone(), s.percentage))
            .collect()
    }
}

/// Aggregate score across dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    pub label: String,
    pub percentage: u8,
    pub level: Level,
}

/// Everything a results view needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub card: ScoreCard,
    /// Level of each dimension, when the instrument declares bands.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub levels: BTreeMap<DimensionKey, Level>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallScore>,
    /// Dimensions from highest to lowest percentage.
    pub ranking: Vec<DimensionKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
}

impl Assessment {
    /// The highest-scoring dimension. Ties go to the one declared first.
    pub fn dominant(&self) -> Option<&DimensionKey> {
        self.ranking.first()
    }
}

/// Score an answer set against an instrument.
pub fn score(instrument: &Instrument, answers: &AnswerSet) -> Result<ScoreCard, ScoringError> {
    for (id, value) in answers.iter() {
        instrument.validate_answer(id.as_str(), value)?;
    }

    let missing: Vec<_> = instrument
        .questions()
        .iter()
        .filter(|q| !answers.contains(q.id.as_str()))
        .map(|q| q.id.clone())
        .collect();
    if !missing.is_empty() {
        match instrument.missing_answers() {
            MissingAnswerPolicy::Reject => {
                return Err(ScoringError::IncompleteAnswers { missing });
            }
            MissingAnswerPolicy::ZeroFill => {
                tracing::debug!(
                    instrument = instrument.id(),
                    missing = missing.len(),
                    "zero-filling unanswered questions"
                );
            }
        }
    }

    let mut raw: BTreeMap<&DimensionKey, f64> = BTreeMap::new();
    for question in instrument.questions() {
        let Some(value) = answers.get(question.id.as_str()) else {
            continue;
        };
        match (&question.kind, value) {
            (QuestionKind::Likert { dimension, reversed }, AnswerValue::Ordinal(v)) => {
                let v = if *reversed {
                    instrument.scale_for(question).reverse(*v)
                } else {
                    f64::from(*v)
                };
                *raw.entry(dimension).or_default() += v;
            }
            (QuestionKind::Weighted { weights }, AnswerValue::Ordinal(v)) => {
                for (key, weight) in weights {
                    *raw.entry(key).or_default() += f64::from(*v) * weight;
                }
            }
            (QuestionKind::Choice { options }, AnswerValue::Choice(chosen)) => {
                if let Some(option) = options.iter().find(|o| &o.id == chosen) {
                    for (key, weight) in &option.weights {
                        *raw.entry(key).or_default() += weight;
                    }
                }
            }
            // validate_answer has already rejected mismatched kinds
            _ => {}
        }
    }

    let scores = instrument
        .dimensions()
        .iter()
        .map(|dim| {
            let raw = raw.get(&dim.key).copied().unwrap_or(0.0);
            let max = instrument.denominator(dim.key.as_str()).unwrap_or(0.0);
            DimensionScore {
                dimension: dim.key.clone(),
                raw,
                max,
                percentage: normalize(raw, max),
            }
        })
        .collect();

    tracing::debug!(
        instrument = instrument.id(),
        answered = answers.len(),
        "scored answer set"
    );

    Ok(ScoreCard { scores })
}

/// Score an answer set and derive levels, overall, ranking, and type code.
pub fn evaluate(instrument: &Instrument, answers: &AnswerSet) -> Result<Assessment, ScoringError> {
    let card = score(instrument, answers)?;

    let levels = match instrument.bands() {
        Some(bands) => card
            .iter()
            .map(|s| (s.dimension.clone(), classify(s.percentage, bands).clone()))
            .collect(),
        None => BTreeMap::new(),
    };

    let overall = instrument.overall().map(|config| {
        let percentage = profile::weighted_mean(instrument.dimensions(), &card);
        OverallScore {
            label: config.label.clone(),
            percentage,
            level: classify(percentage, &config.thresholds).clone(),
        }
    });

    let type_code = if instrument.axes().is_empty() {
        None
    } else {
        Some(profile::type_code(instrument.axes(), &card))
    };

    Ok(Assessment {
        ranking: profile::rank(&card),
        card,
        levels,
        overall,
        type_code,
    })
}

/// Convert a raw sum into a 0..=100 percentage.
pub fn normalize(raw: f64, max: f64) -> u8 {
    if max <= 0.0 || !raw.is_finite() {
        return 0;
    }
    (raw / max * 100.0).round().clamp(0.0, 100.0) as u8
}

impl Instrument {
    /// See [`score`].
    pub fn score(&self, answers: &AnswerSet) -> Result<ScoreCard, ScoringError> {
        score(self, answers)
    }

    /// See [`evaluate`].
    pub fn evaluate(&self, answers: &AnswerSet) -> Result<Assessment, ScoringError> {
        evaluate(self, answers)
    }
}
