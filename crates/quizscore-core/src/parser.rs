//! TOML instrument parser.
//!
//! Loads instruments from TOML files and directories, and lints them for
//! issues that are legal but probably unintended.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::instrument::{Axis, Instrument, InstrumentConfig, OverallConfig, Step};
use crate::model::{
    ChoiceOption, Dimension, DimensionKey, MissingAnswerPolicy, Normalization, Question,
    QuestionId, QuestionKind, Scale,
};
use crate::thresholds::{Level, Threshold, ThresholdSet};

/// Intermediate TOML structure for parsing instrument files.
#[derive(Debug, Deserialize)]
struct TomlInstrumentFile {
    instrument: TomlInstrumentHeader,
    #[serde(default)]
    dimensions: Vec<Dimension>,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    bands: Vec<TomlThreshold>,
    #[serde(default)]
    overall: Option<TomlOverall>,
    #[serde(default)]
    steps: Vec<Step>,
    #[serde(default)]
    axes: Vec<Axis>,
}

#[derive(Debug, Deserialize)]
struct TomlInstrumentHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    scale: Option<Scale>,
    /// Divide every dimension by this constant instead of its maximum.
    #[serde(default)]
    fixed_max: Option<f64>,
    #[serde(default)]
    missing_answers: MissingAnswerPolicy,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    #[serde(default)]
    dimension: Option<String>,
    #[serde(default)]
    reversed: bool,
    #[serde(default)]
    weights: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    options: Vec<TomlOption>,
    #[serde(default)]
    scale: Option<Scale>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: String,
    label: String,
    #[serde(default)]
    weights: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct TomlThreshold {
    min: u8,
    max: u8,
    label: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlOverall {
    #[serde(default)]
    label: Option<String>,
    thresholds: Vec<TomlThreshold>,
}

/// Parse a single TOML file into an [`Instrument`].
pub fn parse_instrument(path: &Path) -> Result<Instrument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read instrument file: {}", path.display()))?;

    parse_instrument_str(&content, path)
}

/// Parse a TOML string into an [`Instrument`] (useful for testing and for
/// definitions embedded with `include_str!`).
pub fn parse_instrument_str(content: &str, source_path: &Path) -> Result<Instrument> {
    let config = parse_config_str(content, source_path)?;
    Instrument::new(config)
        .with_context(|| format!("invalid instrument: {}", source_path.display()))
}

/// Parse a TOML string into an unvalidated [`InstrumentConfig`].
pub fn parse_config_str(content: &str, source_path: &Path) -> Result<InstrumentConfig> {
    let parsed: TomlInstrumentFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(convert_question)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid question in {}", source_path.display()))?;

    let bands = if parsed.bands.is_empty() {
        None
    } else {
        Some(ThresholdSet::new(convert_thresholds(parsed.bands))?)
    };

    let overall = parsed
        .overall
        .map(|o| -> Result<OverallConfig> {
            Ok(OverallConfig {
                label: o.label.unwrap_or_else(|| "Overall".to_string()),
                thresholds: ThresholdSet::new(convert_thresholds(o.thresholds))?,
            })
        })
        .transpose()?;

    let normalization = match parsed.instrument.fixed_max {
        Some(max) => Normalization::Fixed { max },
        None => Normalization::MaxPossible,
    };

    Ok(InstrumentConfig {
        id: parsed.instrument.id,
        name: parsed.instrument.name,
        description: parsed.instrument.description,
        scale: parsed.instrument.scale.unwrap_or_default(),
        dimensions: parsed.dimensions,
        questions,
        normalization,
        missing_answers: parsed.instrument.missing_answers,
        bands,
        overall,
        steps: parsed.steps,
        axes: parsed.axes,
    })
}

/// Options make a choice question, weights a weighted one, and a bare
/// dimension a Likert one.
fn convert_question(q: TomlQuestion) -> Result<Question> {
    let keyed = |weights: BTreeMap<String, f64>| -> BTreeMap<DimensionKey, f64> {
        weights.into_iter().map(|(k, w)| (k.into(), w)).collect()
    };

    let kind = if !q.options.is_empty() {
        QuestionKind::Choice {
            options: q
                .options
                .into_iter()
                .map(|o| ChoiceOption {
                    id: o.id,
                    label: o.label,
                    weights: keyed(o.weights),
                })
                .collect(),
        }
    } else if let Some(weights) = q.weights {
        QuestionKind::Weighted {
            weights: keyed(weights),
        }
    } else if let Some(dimension) = q.dimension {
        QuestionKind::Likert {
            dimension: dimension.into(),
            reversed: q.reversed,
        }
    } else {
        anyhow::bail!(
            "question '{}' needs one of `dimension`, `weights`, or `options`",
            q.id
        );
    };

    Ok(Question {
        id: q.id.into(),
        text: q.text,
        kind,
        scale: q.scale,
    })
}

fn convert_thresholds(thresholds: Vec<TomlThreshold>) -> Vec<Threshold> {
    thresholds
        .into_iter()
        .map(|t| Threshold {
            min: t.min,
            max: t.max,
            level: Level {
                label: t.label,
                description: t.description,
            },
        })
        .collect()
}

/// Recursively load all `.toml` instrument files from a directory.
pub fn load_instrument_directory(dir: &Path) -> Result<Vec<Instrument>> {
    let mut instruments = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            instruments.extend(load_instrument_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_instrument(&path) {
                Ok(instrument) => instruments.push(instrument),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(instruments)
}

/// A non-fatal issue found by [`lint_instrument`].
#[derive(Debug, Clone)]
pub struct LintWarning {
    /// The question ID (if applicable).
    pub question_id: Option<QuestionId>,
    /// Warning message.
    pub message: String,
}

/// Lint an instrument for common authoring mistakes.
pub fn lint_instrument(instrument: &Instrument) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    for question in instrument.questions() {
        if question.text.trim().is_empty() {
            warnings.push(LintWarning {
                question_id: Some(question.id.clone()),
                message: "question text is empty".into(),
            });
        }
    }

    // Same wording twice usually means a copy-paste slip
    let mut seen_text: HashMap<String, &QuestionId> = HashMap::new();
    for question in instrument.questions() {
        let normalized = question.text.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        let first = *seen_text.entry(normalized).or_insert(&question.id);
        if first != &question.id {
            warnings.push(LintWarning {
                question_id: Some(question.id.clone()),
                message: format!("same text as question '{first}'"),
            });
        }
    }

    let mut likert_counts: BTreeMap<&DimensionKey, usize> = BTreeMap::new();
    for question in instrument.questions() {
        if let QuestionKind::Likert { dimension, .. } = &question.kind {
            *likert_counts.entry(dimension).or_default() += 1;
        }
    }
    let min = likert_counts.values().copied().min();
    let max = likert_counts.values().copied().max();
    if let (Some(min), Some(max)) = (min, max) {
        if min != max {
            warnings.push(LintWarning {
                question_id: None,
                message: format!(
                    "dimensions have between {min} and {max} Likert questions; percentages are not equally precise"
                ),
            });
        }
    }

    for question in instrument.questions() {
        if let QuestionKind::Choice { options } = &question.kind {
            for option in options {
                if option.weights.values().all(|&w| w == 0.0) {
                    warnings.push(LintWarning {
                        question_id: Some(question.id.clone()),
                        message: format!("option '{}' contributes to no dimension", option.id),
                    });
                }
            }
        }
    }

    warnings
}
