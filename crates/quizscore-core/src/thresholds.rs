//! Threshold sets and score classification.
//!
//! A [`ThresholdSet`] is an ordered list of inclusive integer ranges that
//! together cover 0..=100 exactly once. It is validated when built, so
//! [`classify`] never fails at runtime.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Human-readable classification of a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An inclusive score range mapped to a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub min: u8,
    pub max: u8,
    #[serde(flatten)]
    pub level: Level,
}

impl Threshold {
    pub fn new(min: u8, max: u8, label: impl Into<String>) -> Self {
        Self {
            min,
            max,
            level: Level {
                label: label.into(),
                description: None,
            },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.level.description = Some(description.into());
        self
    }

    pub fn contains(&self, score: u8) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

/// Validated, contiguous, exhaustive thresholds over 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Threshold>", into = "Vec<Threshold>")]
pub struct ThresholdSet(Vec<Threshold>);

impl ThresholdSet {
    pub fn new(thresholds: Vec<Threshold>) -> Result<Self, ConfigError> {
        let (first, last) = match (thresholds.first(), thresholds.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ConfigError::EmptyThresholds),
        };

        for t in &thresholds {
            if t.min > t.max {
                return Err(ConfigError::InvertedThreshold {
                    label: t.level.label.clone(),
                    min: t.min,
                    max: t.max,
                });
            }
        }

        if first.min != 0 || last.max != 100 {
            return Err(ConfigError::ThresholdBounds {
                first: first.min,
                last: last.max,
            });
        }

        for pair in thresholds.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            let expected = u16::from(before.max) + 1;
            let start = u16::from(after.min);
            if start > expected {
                return Err(ConfigError::ThresholdGap {
                    before: before.level.label.clone(),
                    after: after.level.label.clone(),
                    end: before.max,
                    start: after.min,
                });
            }
            if start < expected {
                return Err(ConfigError::ThresholdOverlap {
                    before: before.level.label.clone(),
                    after: after.level.label.clone(),
                    end: before.max,
                    start: after.min,
                });
            }
        }

        Ok(Self(thresholds))
    }

    /// The threshold containing `score`. Scores above 100 count as 100.
    pub fn find(&self, score: u8) -> &Threshold {
        let score = score.min(100);
        self.0
            .iter()
            .find(|t| t.contains(score))
            .unwrap_or_else(|| unreachable!("validated thresholds cover 0..=100"))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Threshold> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<Threshold>> for ThresholdSet {
    type Error = ConfigError;

    fn try_from(thresholds: Vec<Threshold>) -> Result<Self, Self::Error> {
        ThresholdSet::new(thresholds)
    }
}

impl From<ThresholdSet> for Vec<Threshold> {
    fn from(set: ThresholdSet) -> Self {
        set.0
    }
}

/// Classify a normalized score. The first matching range wins.
pub fn classify(score: u8, thresholds: &ThresholdSet) -> &Level {
    &thresholds.find(score).level
}
