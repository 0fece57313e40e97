//! Score report types with JSON persistence and retake comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{Assessment, OverallScore};
use crate::instrument::Instrument;
use crate::model::DimensionKey;

/// A complete, serializable results record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the instrument.
    pub instrument: InstrumentSummary,
    /// One row per dimension, in declaration order.
    pub dimensions: Vec<DimensionRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
}

/// Summary of an instrument (without its question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

/// A single dimension's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionRow {
    pub key: DimensionKey,
    pub label: String,
    pub raw: f64,
    pub max: f64,
    pub percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl ScoreReport {
    /// Build a report from an evaluated answer set.
    pub fn new(instrument: &Instrument, assessment: &Assessment) -> Self {
        let dimensions = assessment
            .card
            .iter()
            .map(|s| DimensionRow {
                key: s.dimension.clone(),
                label: instrument
                    .dimension(s.dimension.as_str())
                    .map(|d| d.label.clone())
                    .unwrap_or_else(|| s.dimension.to_string()),
                raw: s.raw,
                max: s.max,
                percentage: s.percentage,
                level: assessment
                    .levels
                    .get(&s.dimension)
                    .map(|l| l.label.clone()),
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            instrument: InstrumentSummary {
                id: instrument.id().to_string(),
                name: instrument.name().to_string(),
                question_count: instrument.questions().len(),
            },
            dimensions,
            overall: assessment.overall.clone(),
            type_code: assessment.type_code.clone(),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ScoreReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against an earlier attempt. Changes of at most
    /// `threshold` percentage points count as unchanged.
    pub fn compare(&self, baseline: &ScoreReport, threshold: u8) -> ChangeReport {
        let mut increases = Vec::new();
        let mut decreases = Vec::new();
        let mut unchanged = 0usize;
        let mut added = Vec::new();

        for row in &self.dimensions {
            let Some(before) = baseline.dimensions.iter().find(|b| b.key == row.key) else {
                added.push(row.key.clone());
                continue;
            };
            let delta = i16::from(row.percentage) - i16::from(before.percentage);
            let change = Change {
                dimension: row.key.clone(),
                label: row.label.clone(),
                baseline: before.percentage,
                current: row.percentage,
                delta,
            };
            if delta > i16::from(threshold) {
                increases.push(change);
            } else if delta < -i16::from(threshold) {
                decreases.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed = baseline
            .dimensions
            .iter()
            .filter(|b| !self.dimensions.iter().any(|r| r.key == b.key))
            .map(|b| b.key.clone())
            .collect();

        ChangeReport {
            increases,
            decreases,
            unchanged,
            added,
            removed,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeReport {
    /// Dimensions whose percentage went up.
    pub increases: Vec<Change>,
    /// Dimensions whose percentage went down.
    pub decreases: Vec<Change>,
    /// Dimensions within the threshold.
    pub unchanged: usize,
    /// Dimensions in current but not baseline.
    pub added: Vec<DimensionKey>,
    /// Dimensions in baseline but not current.
    pub removed: Vec<DimensionKey>,
}

/// A dimension that moved between attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    pub dimension: DimensionKey,
    pub label: String,
    pub baseline: u8,
    pub current: u8,
    pub delta: i16,
}

impl ChangeReport {
    /// Format the change report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} increased, {} decreased, {} unchanged\n\n",
            self.increases.len(),
            self.decreases.len(),
            self.unchanged
        ));

        for (title, changes) in [("Increases", &self.increases), ("Decreases", &self.decreases)] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Dimension | Baseline | Current | Delta |\n");
            md.push_str("|-----------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {}% | {}% | {:+} |\n",
                    c.label, c.baseline, c.current, c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    pub fn has_changes(&self) -> bool {
        !self.increases.is_empty() || !self.decreases.is_empty()
    }
}
