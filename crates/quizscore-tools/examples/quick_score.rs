//! Score a built-in tool with a fixed answer pattern and print the report.
//!
//! ```sh
//! RUST_LOG=quizscore=debug cargo run -p quizscore-tools --example quick_score -- big-five
//! ```

use anyhow::Result;

use quizscore_core::model::QuestionKind;
use quizscore_core::report::ScoreReport;
use quizscore_core::session::Session;
use quizscore_tools::catalog::{self, ToolId};
use quizscore_tools::mbti;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizscore=info".parse()?),
        )
        .init();

    let tool: ToolId = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "big-five".to_string())
        .parse()
        .map_err(anyhow::Error::msg)?;

    let instrument = catalog::instrument(tool)?;
    let mut session = Session::new(&instrument);
    let scale = instrument.scale();

    // Walk the wizard, cycling through the scale and the options
    let mut turn = 0usize;
    while let Some(step) = session.current_step() {
        println!("== {} ==", step.title);
        for id in &step.questions {
            let Some(question) = instrument.question(id.as_str()) else {
                continue;
            };
            match &question.kind {
                QuestionKind::Choice { options } => {
                    let option = &options[turn % options.len()];
                    println!("  {} -> {}", question.text, option.label);
                    session.answer(id.clone(), option.id.as_str())?;
                }
                _ => {
                    let span = (i64::from(scale.max) - i64::from(scale.min) + 1) as usize;
                    let value = scale.min + (turn % span) as i32;
                    println!("  {} -> {}", question.text, value);
                    session.answer(id.clone(), value)?;
                }
            }
            turn += 1;
        }
        session.advance()?;
    }

    let assessment = session.results()?;
    println!();
    for s in assessment.card.iter() {
        let level = assessment
            .levels
            .get(&s.dimension)
            .map(|l| l.label.as_str())
            .unwrap_or("-");
        println!("{:<20} {:>3}%  {}", s.dimension.as_str(), s.percentage, level);
    }
    if let Some(overall) = &assessment.overall {
        println!("{:<20} {:>3}%  {}", overall.label, overall.percentage, overall.level.label);
    }
    if let Some((code, description)) = mbti::personality(&assessment) {
        println!("Type {code}: {description}");
    }

    let report = ScoreReport::new(&instrument, &assessment);
    println!("\n{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
