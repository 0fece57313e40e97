//! The built-in tool catalog.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use quizscore_core::instrument::{Instrument, InstrumentConfig};
use quizscore_core::parser::{parse_config_str, parse_instrument_str};

/// Identifies a built-in tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    Mbti,
    BigFive,
    FounderIq,
    LeadStyle,
    CareerFit,
    StressCheck,
    RiskLens,
    TeamSync,
}

impl ToolId {
    /// Every tool, in catalog order.
    pub const ALL: [ToolId; 8] = [
        ToolId::Mbti,
        ToolId::BigFive,
        ToolId::FounderIq,
        ToolId::LeadStyle,
        ToolId::CareerFit,
        ToolId::StressCheck,
        ToolId::RiskLens,
        ToolId::TeamSync,
    ];

    /// The kebab-case id, which is also the instrument id.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::Mbti => "mbti",
            ToolId::BigFive => "big-five",
            ToolId::FounderIq => "founder-iq",
            ToolId::LeadStyle => "lead-style",
            ToolId::CareerFit => "career-fit",
            ToolId::StressCheck => "stress-check",
            ToolId::RiskLens => "risk-lens",
            ToolId::TeamSync => "team-sync",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            ToolId::Mbti => "mbti.toml",
            ToolId::BigFive => "big_five.toml",
            ToolId::FounderIq => "founder_iq.toml",
            ToolId::LeadStyle => "lead_style.toml",
            ToolId::CareerFit => "career_fit.toml",
            ToolId::StressCheck => "stress_check.toml",
            ToolId::RiskLens => "risk_lens.toml",
            ToolId::TeamSync => "team_sync.toml",
        }
    }

    /// The embedded TOML definition.
    pub fn source(&self) -> &'static str {
        match self {
            ToolId::Mbti => include_str!("../tools/mbti.toml"),
            ToolId::BigFive => include_str!("../tools/big_five.toml"),
            ToolId::FounderIq => include_str!("../tools/founder_iq.toml"),
            ToolId::LeadStyle => include_str!("../tools/lead_style.toml"),
            ToolId::CareerFit => include_str!("../tools/career_fit.toml"),
            ToolId::StressCheck => include_str!("../tools/stress_check.toml"),
            ToolId::RiskLens => include_str!("../tools/risk_lens.toml"),
            ToolId::TeamSync => include_str!("../tools/team_sync.toml"),
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "mbti" => Ok(ToolId::Mbti),
            "big-five" | "bigfive" | "ocean" => Ok(ToolId::BigFive),
            "founder-iq" | "founderiq" => Ok(ToolId::FounderIq),
            "lead-style" | "leadstyle" => Ok(ToolId::LeadStyle),
            "career-fit" | "careerfit" => Ok(ToolId::CareerFit),
            "stress-check" | "stresscheck" => Ok(ToolId::StressCheck),
            "risk-lens" | "risklens" => Ok(ToolId::RiskLens),
            "team-sync" | "teamsync" => Ok(ToolId::TeamSync),
            other => Err(format!("unknown tool: {other}")),
        }
    }
}

/// Parse and validate the instrument for `tool`.
pub fn instrument(tool: ToolId) -> Result<Instrument> {
    parse_instrument_str(tool.source(), Path::new(tool.file_name()))
}

/// The unvalidated configuration for `tool`, for callers that embed it in
/// a JSON score request.
pub fn config(tool: ToolId) -> Result<InstrumentConfig> {
    parse_config_str(tool.source(), Path::new(tool.file_name()))
}

/// Load every built-in tool.
pub fn all() -> Result<Vec<Instrument>> {
    ToolId::ALL
        .iter()
        .map(|&tool| {
            tracing::debug!(tool = %tool, "loading built-in tool");
            instrument(tool)
        })
        .collect()
}
