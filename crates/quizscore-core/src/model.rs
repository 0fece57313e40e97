//! Core data model types for quizscore.
//!
//! Questions, dimensions and scales describe an instrument; answers are
//! collected into an [`AnswerSet`] keyed by question id.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_string())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_key!(
    /// Key of a measured trait or category (e.g. `openness`, `workload`).
    DimensionKey
);

string_key!(
    /// Unique identifier of a question within an instrument.
    QuestionId
);

/// Inclusive bounds of an ordinal answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub min: i32,
    pub max: i32,
}

impl Scale {
    /// The 1..=5 Likert scale most tools use.
    pub const LIKERT_5: Scale = Scale { min: 1, max: 5 };

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Reflect a value across the scale midpoint. Computed in `f64` so the
    /// full `i32` range cannot overflow.
    pub fn reverse(&self, value: i32) -> f64 {
        f64::from(self.min) + f64::from(self.max) - f64::from(value)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::LIKERT_5
    }
}

/// A trait or category measured by an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub key: DimensionKey,
    /// Human-readable name.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Relative weight in the overall aggregate.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// A single question of an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    /// How the answer feeds dimensions.
    #[serde(flatten)]
    pub kind: QuestionKind,
    /// Per-question override of the instrument scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
}

/// How a question's answer contributes to dimension scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Ordinal answer feeding one dimension, optionally reverse-keyed.
    Likert {
        dimension: DimensionKey,
        #[serde(default)]
        reversed: bool,
    },
    /// Ordinal answer feeding several dimensions, scaled per dimension.
    Weighted { weights: BTreeMap<DimensionKey, f64> },
    /// The answer picks one option; each option carries its own weights.
    Choice { options: Vec<ChoiceOption> },
}

impl QuestionKind {
    /// The kind of answer value this question accepts, for error messages.
    pub fn expected_answer(&self) -> &'static str {
        match self {
            QuestionKind::Likert { .. } | QuestionKind::Weighted { .. } => "an ordinal",
            QuestionKind::Choice { .. } => "a choice",
        }
    }
}

/// One selectable option of a choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub weights: BTreeMap<DimensionKey, f64>,
}

/// The value of a single answer: an ordinal or the id of a chosen option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Ordinal(i32),
    Choice(String),
}

impl From<i32> for AnswerValue {
    fn from(value: i32) -> Self {
        AnswerValue::Ordinal(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(option: &str) -> Self {
        AnswerValue::Choice(option.to_string())
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Ordinal(v) => write!(f, "{v}"),
            AnswerValue::Choice(option) => f.write_str(option),
        }
    }
}

/// A single answer as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: QuestionId,
    pub value: AnswerValue,
}

/// Answers keyed by question id. Re-answering a question overwrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<QuestionId, AnswerValue>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, returning the value it replaced.
    pub fn record(
        &mut self,
        question: impl Into<QuestionId>,
        value: impl Into<AnswerValue>,
    ) -> Option<AnswerValue> {
        self.0.insert(question.into(), value.into())
    }

    /// Builder-style [`record`](Self::record).
    pub fn with(mut self, question: impl Into<QuestionId>, value: impl Into<AnswerValue>) -> Self {
        self.record(question, value);
        self
    }

    pub fn remove(&mut self, question: &str) -> Option<AnswerValue> {
        self.0.remove(question)
    }

    pub fn get(&self, question: &str) -> Option<&AnswerValue> {
        self.0.get(question)
    }

    pub fn contains(&self, question: &str) -> bool {
        self.0.contains_key(question)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &AnswerValue)> {
        self.0.iter()
    }
}

impl FromIterator<Answer> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = Answer>>(iter: I) -> Self {
        let mut set = AnswerSet::new();
        for answer in iter {
            set.record(answer.question_id, answer.value);
        }
        set
    }
}

/// What to do when scoring an answer set that skips questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAnswerPolicy {
    /// Fail with [`ScoringError::IncompleteAnswers`](crate::error::ScoringError).
    #[default]
    Reject,
    /// Count the missing question as zero in the numerator only; its
    /// maximum still counts in the denominator.
    ZeroFill,
}

/// How raw dimension sums are turned into percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Normalization {
    /// Divide by the largest sum the dimension's questions can produce.
    #[default]
    MaxPossible,
    /// Divide every dimension by the same constant.
    Fixed { max: f64 },
}
