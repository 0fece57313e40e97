//! Error types for instrument configuration, scoring, and sessions.
//!
//! Configuration errors are fatal and surface when an [`Instrument`] is
//! built. Scoring errors are caller errors returned synchronously from a
//! scoring pass; none of them are transient.
//!
//! [`Instrument`]: crate::instrument::Instrument

use thiserror::Error;

use crate::model::{DimensionKey, QuestionId};

/// A malformed instrument definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The instrument declares no dimensions.
    #[error("instrument declares no dimensions")]
    NoDimensions,

    /// The instrument declares no questions.
    #[error("instrument declares no questions")]
    NoQuestions,

    #[error("duplicate dimension key: {0}")]
    DuplicateDimension(DimensionKey),

    #[error("duplicate question id: {0}")]
    DuplicateQuestion(QuestionId),

    /// A question, option, or axis references a dimension the instrument
    /// does not declare.
    #[error("{context} references unknown dimension '{dimension}'")]
    UnknownDimension {
        context: String,
        dimension: DimensionKey,
    },

    /// A declared dimension has no achievable maximum, so it cannot be
    /// normalized.
    #[error("dimension '{0}' has no questions contributing to it")]
    EmptyDimension(DimensionKey),

    #[error("invalid scale {min}..={max}: min must be below max and max must be positive")]
    InvalidScale { min: i32, max: i32 },

    #[error("{context}: weight for '{dimension}' must be finite and non-negative, got {weight}")]
    InvalidWeight {
        context: String,
        dimension: DimensionKey,
        weight: f64,
    },

    #[error("choice question '{0}' has no options")]
    NoOptions(QuestionId),

    #[error("question '{question}' has duplicate option id '{option}'")]
    DuplicateOption { question: QuestionId, option: String },

    #[error("fixed normalization maximum must be finite and positive, got {0}")]
    InvalidNormalization(f64),

    #[error("threshold set is empty")]
    EmptyThresholds,

    #[error("threshold '{label}' has min {min} above max {max}")]
    InvertedThreshold { label: String, min: u8, max: u8 },

    /// The first range must start at 0 and the last must end at 100.
    #[error("thresholds must cover 0..=100, found {first}..={last}")]
    ThresholdBounds { first: u8, last: u8 },

    #[error("gap between thresholds: '{before}' ends at {end}, '{after}' starts at {start}")]
    ThresholdGap {
        before: String,
        after: String,
        end: u8,
        start: u8,
    },

    #[error("overlapping thresholds: '{before}' ends at {end}, '{after}' starts at {start}")]
    ThresholdOverlap {
        before: String,
        after: String,
        end: u8,
        start: u8,
    },

    #[error("duplicate step id: {0}")]
    DuplicateStep(String),

    #[error("step '{step}' references unknown question '{question}'")]
    StepUnknownQuestion { step: String, question: QuestionId },

    #[error("question '{0}' appears in more than one step")]
    QuestionInMultipleSteps(QuestionId),

    #[error("question '{0}' is not assigned to any step")]
    QuestionWithoutStep(QuestionId),

    #[error("axis pairs dimension '{0}' with itself")]
    DegenerateAxis(DimensionKey),
}

/// An answer set that cannot be scored against an instrument.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// Required questions are unanswered and the instrument rejects
    /// incomplete runs. Listed in declaration order.
    #[error("{} question(s) unanswered: {}", .missing.len(), join_ids(.missing))]
    IncompleteAnswers { missing: Vec<QuestionId> },

    #[error("answer given for unknown question '{0}'")]
    UnknownQuestion(QuestionId),

    #[error("answer {value} to '{question}' is outside {min}..={max}")]
    OutOfRange {
        question: QuestionId,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("'{option}' is not an option of question '{question}'")]
    UnknownOption { question: QuestionId, option: String },

    #[error("question '{question}' expects {expected} answer")]
    AnswerKindMismatch {
        question: QuestionId,
        expected: &'static str,
    },
}

/// A wizard navigation or answer failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Answer(#[from] ScoringError),

    /// The current step still has unanswered questions.
    #[error("step '{step}' has {} unanswered question(s)", .unanswered.len())]
    StepIncomplete {
        step: String,
        unanswered: Vec<QuestionId>,
    },

    /// The session is already on the results view.
    #[error("session is already on the results view")]
    Finished,
}

fn join_ids(ids: &[QuestionId]) -> String {
    ids.iter()
        .map(QuestionId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
