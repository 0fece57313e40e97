//! Instrument definitions and their load-time validation.
//!
//! An [`InstrumentConfig`] is the raw, serializable description of a tool.
//! [`Instrument::new`] checks it once and produces an immutable
//! [`Instrument`] that the engine can score without re-validating.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ScoringError};
use crate::model::{
    AnswerValue, Dimension, DimensionKey, MissingAnswerPolicy, Normalization, Question,
    QuestionId, QuestionKind, Scale,
};
use crate::thresholds::ThresholdSet;

/// Serializable description of an instrument, prior to validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Default ordinal scale for questions without their own.
    #[serde(default)]
    pub scale: Scale,
    pub dimensions: Vec<Dimension>,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub normalization: Normalization,
    #[serde(default)]
    pub missing_answers: MissingAnswerPolicy,
    /// Levels applied to each dimension score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<ThresholdSet>,
    /// Aggregate score across dimensions and its levels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallConfig>,
    /// Wizard steps; generated from the dimensions when empty.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Opposing dimension pairs resolved into a type code.
    #[serde(default)]
    pub axes: Vec<Axis>,
}

/// Aggregate score configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallConfig {
    #[serde(default = "default_overall_label")]
    pub label: String,
    pub thresholds: ThresholdSet,
}

fn default_overall_label() -> String {
    "Overall".to_string()
}

/// One page of the answer wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<QuestionId>,
}

/// Two opposing dimensions; the higher-scoring one names the axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub left: DimensionKey,
    pub right: DimensionKey,
}

/// A validated instrument.
#[derive(Debug, Clone)]
pub struct Instrument {
    id: String,
    name: String,
    description: String,
    scale: Scale,
    dimensions: Vec<Dimension>,
    questions: Vec<Question>,
    question_index: HashMap<QuestionId, usize>,
    normalization: Normalization,
    missing_answers: MissingAnswerPolicy,
    bands: Option<ThresholdSet>,
    overall: Option<OverallConfig>,
    steps: Vec<Step>,
    axes: Vec<Axis>,
    denominators: BTreeMap<DimensionKey, f64>,
}

impl Instrument {
    /// Validate a configuration and build the instrument.
    pub fn new(config: InstrumentConfig) -> Result<Self, ConfigError> {
        if config.dimensions.is_empty() {
            return Err(ConfigError::NoDimensions);
        }
        if config.questions.is_empty() {
            return Err(ConfigError::NoQuestions);
        }
        check_scale(config.scale)?;

        let mut declared = HashSet::new();
        for dim in &config.dimensions {
            if !declared.insert(dim.key.clone()) {
                return Err(ConfigError::DuplicateDimension(dim.key.clone()));
            }
            check_weight(&format!("dimension '{}'", dim.key), &dim.key, dim.weight)?;
        }

        let mut question_index = HashMap::new();
        for (i, question) in config.questions.iter().enumerate() {
            if question_index.insert(question.id.clone(), i).is_some() {
                return Err(ConfigError::DuplicateQuestion(question.id.clone()));
            }
            if let Some(scale) = question.scale {
                check_scale(scale)?;
            }
            check_question(question, &declared)?;
        }

        let denominators = match config.normalization {
            Normalization::MaxPossible => {
                let maxima = max_contributions(&config.questions, config.scale);
                let mut denominators = BTreeMap::new();
                for dim in &config.dimensions {
                    let max = maxima.get(&dim.key).copied().unwrap_or(0.0);
                    if max <= 0.0 {
                        return Err(ConfigError::EmptyDimension(dim.key.clone()));
                    }
                    denominators.insert(dim.key.clone(), max);
                }
                denominators
            }
            Normalization::Fixed { max } => {
                if !max.is_finite() || max <= 0.0 {
                    return Err(ConfigError::InvalidNormalization(max));
                }
                config
                    .dimensions
                    .iter()
                    .map(|d| (d.key.clone(), max))
                    .collect()
            }
        };

        for axis in &config.axes {
            if axis.left == axis.right {
                return Err(ConfigError::DegenerateAxis(axis.left.clone()));
            }
            for key in [&axis.left, &axis.right] {
                if !declared.contains(key) {
                    return Err(ConfigError::UnknownDimension {
                        context: "axis".to_string(),
                        dimension: key.clone(),
                    });
                }
            }
        }

        let steps = if config.steps.is_empty() {
            default_steps(&config.dimensions, &config.questions)
        } else {
            check_steps(&config.steps, &config.questions, &question_index)?;
            config.steps
        };

        Ok(Self {
            id: config.id,
            name: config.name,
            description: config.description,
            scale: config.scale,
            dimensions: config.dimensions,
            questions: config.questions,
            question_index,
            normalization: config.normalization,
            missing_answers: config.missing_answers,
            bands: config.bands,
            overall: config.overall,
            steps,
            axes: config.axes,
            denominators,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, key: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.key.as_str() == key)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.question_index.get(id).map(|&i| &self.questions[i])
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    pub fn missing_answers(&self) -> MissingAnswerPolicy {
        self.missing_answers
    }

    pub fn bands(&self) -> Option<&ThresholdSet> {
        self.bands.as_ref()
    }

    pub fn overall(&self) -> Option<&OverallConfig> {
        self.overall.as_ref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// The ordinal scale that applies to a question.
    pub fn scale_for(&self, question: &Question) -> Scale {
        question.scale.unwrap_or(self.scale)
    }

    /// The default scale of the instrument.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Normalization denominator of a dimension.
    pub fn denominator(&self, key: &str) -> Option<f64> {
        self.denominators.get(key).copied()
    }

    /// Check a single answer against the question it targets.
    pub fn validate_answer(&self, id: &str, value: &AnswerValue) -> Result<(), ScoringError> {
        let question = self
            .question(id)
            .ok_or_else(|| ScoringError::UnknownQuestion(id.into()))?;

        match (&question.kind, value) {
            (
                QuestionKind::Likert { .. } | QuestionKind::Weighted { .. },
                AnswerValue::Ordinal(v),
            ) => {
                let scale = self.scale_for(question);
                if scale.contains(*v) {
                    Ok(())
                } else {
                    Err(ScoringError::OutOfRange {
                        question: question.id.clone(),
                        value: *v,
                        min: scale.min,
                        max: scale.max,
                    })
                }
            }
            (QuestionKind::Choice { options }, AnswerValue::Choice(option)) => {
                if options.iter().any(|o| &o.id == option) {
                    Ok(())
                } else {
                    Err(ScoringError::UnknownOption {
                        question: question.id.clone(),
                        option: option.clone(),
                    })
                }
            }
            (kind, _) => Err(ScoringError::AnswerKindMismatch {
                question: question.id.clone(),
                expected: kind.expected_answer(),
            }),
        }
    }
}

impl TryFrom<InstrumentConfig> for Instrument {
    type Error = ConfigError;

    fn try_from(config: InstrumentConfig) -> Result<Self, Self::Error> {
        Instrument::new(config)
    }
}

/// A scale needs a positive maximum, otherwise no dimension fed by it can
/// be normalized.
fn check_scale(scale: Scale) -> Result<(), ConfigError> {
    if scale.min >= scale.max || scale.max <= 0 {
        return Err(ConfigError::InvalidScale {
            min: scale.min,
            max: scale.max,
        });
    }
    Ok(())
}

fn check_weight(context: &str, dimension: &DimensionKey, weight: f64) -> Result<(), ConfigError> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(ConfigError::InvalidWeight {
            context: context.to_string(),
            dimension: dimension.clone(),
            weight,
        });
    }
    Ok(())
}

fn check_known(
    context: impl FnOnce() -> String,
    key: &DimensionKey,
    declared: &HashSet<DimensionKey>,
) -> Result<(), ConfigError> {
    if declared.contains(key) {
        Ok(())
    } else {
        Err(ConfigError::UnknownDimension {
            context: context(),
            dimension: key.clone(),
        })
    }
}

fn check_question(
    question: &Question,
    declared: &HashSet<DimensionKey>,
) -> Result<(), ConfigError> {
    let context = || format!("question '{}'", question.id);
    match &question.kind {
        QuestionKind::Likert { dimension, .. } => check_known(context, dimension, declared),
        QuestionKind::Weighted { weights } => {
            for (key, &weight) in weights {
                check_known(context, key, declared)?;
                check_weight(&context(), key, weight)?;
            }
            Ok(())
        }
        QuestionKind::Choice { options } => {
            if options.is_empty() {
                return Err(ConfigError::NoOptions(question.id.clone()));
            }
            let mut seen = HashSet::new();
            for option in options {
                if !seen.insert(option.id.as_str()) {
                    return Err(ConfigError::DuplicateOption {
                        question: question.id.clone(),
                        option: option.id.clone(),
                    });
                }
                let option_context =
                    || format!("option '{}' of question '{}'", option.id, question.id);
                for (key, &weight) in &option.weights {
                    check_known(option_context, key, declared)?;
                    check_weight(&option_context(), key, weight)?;
                }
            }
            Ok(())
        }
    }
}

/// Largest contribution each question can make, summed per dimension.
fn max_contributions(questions: &[Question], default_scale: Scale) -> BTreeMap<DimensionKey, f64> {
    let mut maxima: BTreeMap<DimensionKey, f64> = BTreeMap::new();
    for question in questions {
        let scale = question.scale.unwrap_or(default_scale);
        match &question.kind {
            QuestionKind::Likert { dimension, .. } => {
                *maxima.entry(dimension.clone()).or_default() += f64::from(scale.max);
            }
            QuestionKind::Weighted { weights } => {
                for (key, weight) in weights {
                    *maxima.entry(key.clone()).or_default() += f64::from(scale.max) * weight;
                }
            }
            QuestionKind::Choice { options } => {
                let mut best: BTreeMap<&DimensionKey, f64> = BTreeMap::new();
                for option in options {
                    for (key, &weight) in &option.weights {
                        let entry = best.entry(key).or_default();
                        *entry = entry.max(weight);
                    }
                }
                for (key, weight) in best {
                    *maxima.entry(key.clone()).or_default() += weight;
                }
            }
        }
    }
    maxima
}

/// One step per dimension for its Likert questions, then one step for
/// everything else.
fn default_steps(dimensions: &[Dimension], questions: &[Question]) -> Vec<Step> {
    let mut steps: Vec<Step> = dimensions
        .iter()
        .map(|dim| Step {
            id: dim.key.to_string(),
            title: dim.label.clone(),
            questions: questions
                .iter()
                .filter(|q| {
                    matches!(&q.kind, QuestionKind::Likert { dimension, .. } if dimension == &dim.key)
                })
                .map(|q| q.id.clone())
                .collect(),
        })
        .filter(|step| !step.questions.is_empty())
        .collect();

    let rest: Vec<QuestionId> = questions
        .iter()
        .filter(|q| !matches!(q.kind, QuestionKind::Likert { .. }))
        .map(|q| q.id.clone())
        .collect();
    if !rest.is_empty() {
        steps.push(Step {
            id: "questions".to_string(),
            title: "Questions".to_string(),
            questions: rest,
        });
    }

    steps
}

fn check_steps(
    steps: &[Step],
    questions: &[Question],
    question_index: &HashMap<QuestionId, usize>,
) -> Result<(), ConfigError> {
    let mut step_ids = HashSet::new();
    let mut placed = HashSet::new();
    for step in steps {
        if !step_ids.insert(step.id.as_str()) {
            return Err(ConfigError::DuplicateStep(step.id.clone()));
        }
        for id in &step.questions {
            if !question_index.contains_key(id) {
                return Err(ConfigError::StepUnknownQuestion {
                    step: step.id.clone(),
                    question: id.clone(),
                });
            }
            if !placed.insert(id) {
                return Err(ConfigError::QuestionInMultipleSteps(id.clone()));
            }
        }
    }
    if let Some(orphan) = questions.iter().find(|q| !placed.contains(&q.id)) {
        return Err(ConfigError::QuestionWithoutStep(orphan.id.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChoiceOption;

    fn dim(key: &str) -> Dimension {
        Dimension {
            key: key.into(),
            label: key.to_uppercase(),
            description: None,
            weight: 1.0,
        }
    }

    fn likert(id: &str, dimension: &str, reversed: bool) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
            kind: QuestionKind::Likert {
                dimension: dimension.into(),
                reversed,
            },
            scale: None,
        }
    }

    fn config(dimensions: Vec<Dimension>, questions: Vec<Question>) -> InstrumentConfig {
        InstrumentConfig {
            id: "test".into(),
            name: "Test".into(),
            description: String::new(),
            scale: Scale::LIKERT_5,
            dimensions,
            questions,
            normalization: Normalization::MaxPossible,
            missing_answers: MissingAnswerPolicy::Reject,
            bands: None,
            overall: None,
            steps: vec![],
            axes: vec![],
        }
    }

    #[test]
    fn builds_valid_instrument() {
        let instrument = Instrument::new(config(
            vec![dim("a"), dim("b")],
            vec![likert("a1", "a", false), likert("a2", "a", true), likert("b1", "b", false)],
        ))
        .unwrap();
        assert_eq!(instrument.denominator("a"), Some(10.0));
        assert_eq!(instrument.denominator("b"), Some(5.0));
        assert_eq!(instrument.question("a2").unwrap().id.as_str(), "a2");
    }

    #[test]
    fn rejects_unknown_dimension() {
        let err =
            Instrument::new(config(vec![dim("a")], vec![likert("q1", "zz", false)])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownDimension { ref dimension, .. } if dimension.as_str() == "zz"
        ));
    }

    #[test]
    fn rejects_duplicates() {
        let err = Instrument::new(config(
            vec![dim("a")],
            vec![likert("q1", "a", false), likert("q1", "a", false)],
        ))
        .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateQuestion("q1".into()));

        let err = Instrument::new(config(vec![dim("a"), dim("a")], vec![likert("q1", "a", false)]))
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateDimension("a".into()));
    }

    #[test]
    fn rejects_dimension_without_questions() {
        let err = Instrument::new(config(vec![dim("a"), dim("b")], vec![likert("q1", "a", false)]))
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyDimension("b".into()));
    }

    #[test]
    fn fixed_normalization_allows_sparse_dimensions() {
        let mut cfg = config(vec![dim("a"), dim("b")], vec![likert("q1", "a", false)]);
        cfg.normalization = Normalization::Fixed { max: 30.0 };
        let instrument = Instrument::new(cfg).unwrap();
        assert_eq!(instrument.denominator("b"), Some(30.0));

        let mut cfg = config(vec![dim("a")], vec![likert("q1", "a", false)]);
        cfg.normalization = Normalization::Fixed { max: 0.0 };
        assert_eq!(
            Instrument::new(cfg).unwrap_err(),
            ConfigError::InvalidNormalization(0.0)
        );
    }

    #[test]
    fn rejects_invalid_scale() {
        let mut cfg = config(vec![dim("a")], vec![likert("q1", "a", false)]);
        cfg.scale = Scale { min: 5, max: 5 };
        assert_eq!(
            Instrument::new(cfg).unwrap_err(),
            ConfigError::InvalidScale { min: 5, max: 5 }
        );
    }

    #[test]
    fn rejects_scale_without_positive_max() {
        let mut cfg = config(vec![dim("a")], vec![likert("q1", "a", true)]);
        cfg.scale = Scale { min: -4, max: 0 };
        let err = Instrument::new(cfg).unwrap_err();
        assert_eq!(err, ConfigError::InvalidScale { min: -4, max: 0 });
        assert!(err.to_string().contains("max must be positive"));

        let mut question = likert("q1", "a", false);
        question.scale = Some(Scale { min: -2, max: -1 });
        assert_eq!(
            Instrument::new(config(vec![dim("a")], vec![question])).unwrap_err(),
            ConfigError::InvalidScale { min: -2, max: -1 }
        );
    }

    #[test]
    fn accepts_extreme_scale_bounds() {
        let mut cfg = config(vec![dim("a")], vec![likert("q1", "a", true)]);
        cfg.scale = Scale {
            min: 1,
            max: i32::MAX,
        };
        let instrument = Instrument::new(cfg).unwrap();
        assert_eq!(instrument.denominator("a"), Some(f64::from(i32::MAX)));
    }

    #[test]
    fn rejects_negative_weight() {
        let question = Question {
            id: "w1".into(),
            text: "Weighted".into(),
            kind: QuestionKind::Weighted {
                weights: BTreeMap::from([("a".into(), -1.0)]),
            },
            scale: None,
        };
        let err = Instrument::new(config(vec![dim("a")], vec![question])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWeight { weight, .. } if weight == -1.0));
    }

    #[test]
    fn rejects_bad_choice_options() {
        let empty = Question {
            id: "c1".into(),
            text: "Pick".into(),
            kind: QuestionKind::Choice { options: vec![] },
            scale: None,
        };
        assert_eq!(
            Instrument::new(config(vec![dim("a")], vec![empty])).unwrap_err(),
            ConfigError::NoOptions("c1".into())
        );

        let option = ChoiceOption {
            id: "x".into(),
            label: "X".into(),
            weights: BTreeMap::from([("a".into(), 1.0)]),
        };
        let dupes = Question {
            id: "c2".into(),
            text: "Pick".into(),
            kind: QuestionKind::Choice {
                options: vec![option.clone(), option],
            },
            scale: None,
        };
        assert!(matches!(
            Instrument::new(config(vec![dim("a")], vec![dupes])).unwrap_err(),
            ConfigError::DuplicateOption { .. }
        ));
    }

    #[test]
    fn default_steps_follow_dimensions() {
        let instrument = Instrument::new(config(
            vec![dim("a"), dim("b")],
            vec![likert("a1", "a", false), likert("b1", "b", false), likert("a2", "a", false)],
        ))
        .unwrap();
        let steps = instrument.steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].id, "a");
        assert_eq!(steps[0].questions, vec![QuestionId::from("a1"), QuestionId::from("a2")]);
        assert_eq!(steps[1].questions, vec![QuestionId::from("b1")]);
    }

    #[test]
    fn explicit_steps_must_cover_every_question_once() {
        let mut cfg = config(
            vec![dim("a")],
            vec![likert("a1", "a", false), likert("a2", "a", false)],
        );
        cfg.steps = vec![Step {
            id: "one".into(),
            title: "One".into(),
            questions: vec!["a1".into()],
        }];
        assert_eq!(
            Instrument::new(cfg.clone()).unwrap_err(),
            ConfigError::QuestionWithoutStep("a2".into())
        );

        cfg.steps = vec![
            Step {
                id: "one".into(),
                title: "One".into(),
                questions: vec!["a1".into(), "a2".into()],
            },
            Step {
                id: "two".into(),
                title: "Two".into(),
                questions: vec!["a2".into()],
            },
        ];
        assert_eq!(
            Instrument::new(cfg.clone()).unwrap_err(),
            ConfigError::QuestionInMultipleSteps("a2".into())
        );

        cfg.steps = vec![Step {
            id: "one".into(),
            title: "One".into(),
            questions: vec!["a1".into(), "a2".into(), "ghost".into()],
        }];
        assert!(matches!(
            Instrument::new(cfg).unwrap_err(),
            ConfigError::StepUnknownQuestion { .. }
        ));
    }

    #[test]
    fn rejects_bad_axes() {
        let mut cfg = config(
            vec![dim("a"), dim("b")],
            vec![likert("a1", "a", false), likert("b1", "b", false)],
        );
        cfg.axes = vec![Axis {
            left: "a".into(),
            right: "a".into(),
        }];
        assert_eq!(
            Instrument::new(cfg.clone()).unwrap_err(),
            ConfigError::DegenerateAxis("a".into())
        );
        cfg.axes = vec![Axis {
            left: "a".into(),
            right: "c".into(),
        }];
        assert!(matches!(
            Instrument::new(cfg).unwrap_err(),
            ConfigError::UnknownDimension { .. }
        ));
    }

    #[test]
    fn validate_answer_checks_range_and_kind() {
        let instrument =
            Instrument::new(config(vec![dim("a")], vec![likert("a1", "a", false)])).unwrap();
        assert!(instrument.validate_answer("a1", &AnswerValue::Ordinal(5)).is_ok());
        assert!(matches!(
            instrument.validate_answer("a1", &AnswerValue::Ordinal(6)),
            Err(ScoringError::OutOfRange { value: 6, min: 1, max: 5, .. })
        ));
        assert!(matches!(
            instrument.validate_answer("a1", &AnswerValue::Choice("x".into())),
            Err(ScoringError::AnswerKindMismatch { expected: "an ordinal", .. })
        ));
        assert_eq!(
            instrument.validate_answer("zz", &AnswerValue::Ordinal(1)),
            Err(ScoringError::UnknownQuestion("zz".into()))
        );
    }

    #[test]
    fn config_deserializes_with_validated_bands() {
        let json = r#"{
            "dimensions": [{"key": "a", "label": "A"}],
            "questions": [{"id": "a1", "text": "Q", "kind": "likert", "dimension": "a"}],
            "bands": [{"min": 0, "max": 49, "label": "Low"}, {"min": 50, "max": 100, "label": "High"}]
        }"#;
        let cfg: InstrumentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.missing_answers, MissingAnswerPolicy::Reject);
        let instrument = Instrument::try_from(cfg).unwrap();
        assert_eq!(instrument.bands().map(ThresholdSet::len), Some(2));
    }
}
