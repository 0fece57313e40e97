//! Multi-step answer wizard.
//!
//! A [`Session`] is a step cursor plus an [`AnswerSet`]. The cursor runs
//! from `0` to `step_count()`; the last position is the results view.
//! Moving forward requires the current step to be fully answered, moving
//! back never does.

use crate::engine::{evaluate, Assessment};
use crate::error::{ScoringError, SessionError};
use crate::instrument::{Instrument, Step};
use crate::model::{AnswerSet, AnswerValue, QuestionId};

#[derive(Debug, Clone)]
pub struct Session<'a> {
    instrument: &'a Instrument,
    answers: AnswerSet,
    cursor: usize,
}

impl<'a> Session<'a> {
    pub fn new(instrument: &'a Instrument) -> Self {
        Self {
            instrument,
            answers: AnswerSet::new(),
            cursor: 0,
        }
    }

    pub fn instrument(&self) -> &'a Instrument {
        self.instrument
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn step_index(&self) -> usize {
        self.cursor
    }

    pub fn step_count(&self) -> usize {
        self.instrument.steps().len()
    }

    /// The step being answered, or `None` on the results view.
    pub fn current_step(&self) -> Option<&'a Step> {
        self.instrument.steps().get(self.cursor)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.step_count()
    }

    /// Validate and record an answer, replacing any earlier one.
    pub fn answer(
        &mut self,
        question: impl Into<QuestionId>,
        value: impl Into<AnswerValue>,
    ) -> Result<(), SessionError> {
        let question = question.into();
        let value = value.into();
        self.instrument.validate_answer(question.as_str(), &value)?;
        self.answers.record(question, value);
        Ok(())
    }

    /// Questions of the current step still waiting for an answer.
    pub fn unanswered(&self) -> Vec<QuestionId> {
        self.current_step()
            .map(|step| {
                step.questions
                    .iter()
                    .filter(|id| !self.answers.contains(id.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_step_complete(&self) -> bool {
        self.unanswered().is_empty()
    }

    /// Move to the next step if the current one is complete.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        let Some(step) = self.current_step() else {
            return Err(SessionError::Finished);
        };
        let unanswered = self.unanswered();
        if !unanswered.is_empty() {
            return Err(SessionError::StepIncomplete {
                step: step.id.clone(),
                unanswered,
            });
        }
        self.cursor += 1;
        tracing::debug!(
            instrument = self.instrument.id(),
            step = self.cursor,
            "advanced"
        );
        Ok(())
    }

    /// Move back one step. Returns `false` when already on the first step.
    pub fn retreat(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        tracing::debug!(
            instrument = self.instrument.id(),
            step = self.cursor,
            "retreated"
        );
        true
    }

    /// Percentage of the instrument's questions answered so far.
    pub fn progress(&self) -> u8 {
        let total = self.instrument.questions().len();
        if total == 0 {
            return 0;
        }
        (self.answers.len() * 100 / total).min(100) as u8
    }

    /// Evaluate the answers collected so far.
    pub fn results(&self) -> Result<Assessment, ScoringError> {
        evaluate(self.instrument, &self.answers)
    }

    /// Drop all answers and return to the first step.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.cursor = 0;
    }
}
