//! Step-by-step wizard sessions over the built-in tools.

use quizscore_core::error::{ScoringError, SessionError};
use quizscore_core::session::Session;
use quizscore_tools::catalog::{self, ToolId};

#[test]
fn big_five_walkthrough() {
    let instrument = catalog::instrument(ToolId::BigFive).unwrap();
    let mut session = Session::new(&instrument);

    // One step per trait when no steps are declared
    assert_eq!(session.step_count(), 5);
    assert_eq!(session.current_step().unwrap().id, "openness");
    assert_eq!(session.progress(), 0);

    while let Some(step) = session.current_step() {
        for question in &step.questions {
            session.answer(question.clone(), 3).unwrap();
        }
        session.advance().unwrap();
    }

    assert!(session.is_finished());
    assert_eq!(session.progress(), 100);
    let assessment = session.results().unwrap();
    assert!(assessment.card.iter().all(|s| s.percentage == 60));
    assert!(matches!(session.advance(), Err(SessionError::Finished)));
}

#[test]
fn cannot_skip_an_incomplete_step() {
    let instrument = catalog::instrument(ToolId::BigFive).unwrap();
    let mut session = Session::new(&instrument);

    session.answer("o1", 4).unwrap();
    session.answer("o2", 2).unwrap();

    match session.advance() {
        Err(SessionError::StepIncomplete { step, unanswered }) => {
            assert_eq!(step, "openness");
            let ids: Vec<_> = unanswered.iter().map(|q| q.as_str()).collect();
            assert_eq!(ids, ["o3", "o4", "o5", "o6"]);
        }
        other => panic!("expected StepIncomplete, got {other:?}"),
    }
    assert_eq!(session.step_index(), 0);

    // Partial answers are not enough to score a Reject instrument
    assert!(matches!(
        session.results(),
        Err(ScoringError::IncompleteAnswers { .. })
    ));
}

#[test]
fn invalid_answers_are_not_recorded() {
    let instrument = catalog::instrument(ToolId::BigFive).unwrap();
    let mut session = Session::new(&instrument);

    let err = session.answer("o1", 0).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Answer(ScoringError::OutOfRange { .. })
    ));
    assert!(session.answers().is_empty());

    let err = session.answer("o1", "agree").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Answer(ScoringError::AnswerKindMismatch { .. })
    ));
    assert!(session.answers().is_empty());
}

#[test]
fn mbti_declared_steps_and_back_navigation() {
    let instrument = catalog::instrument(ToolId::Mbti).unwrap();
    let mut session = Session::new(&instrument);

    let ids: Vec<_> = instrument.steps().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["energy", "information", "decisions", "structure"]);
    assert!(!session.retreat());

    for q in ["ei1", "ei2", "ei3", "ei4", "ei5"] {
        session.answer(q, "I").unwrap();
    }
    session.advance().unwrap();
    assert_eq!(session.current_step().unwrap().id, "information");
    assert_eq!(session.progress(), 25);

    // Going back keeps the answers and allows changing them
    assert!(session.retreat());
    assert_eq!(session.current_step().unwrap().id, "energy");
    assert!(session.is_step_complete());
    session.answer("ei1", "E").unwrap();
    assert_eq!(session.answers().len(), 5);

    session.reset();
    assert_eq!(session.step_index(), 0);
    assert!(session.answers().is_empty());
}

#[test]
fn stress_check_session_scores_partial_answers() {
    let instrument = catalog::instrument(ToolId::StressCheck).unwrap();
    let mut session = Session::new(&instrument);

    session.answer("workload-1", 4).unwrap();
    session.answer("workload-2", 4).unwrap();

    // Zero-fill lets an unfinished wizard report interim results
    let assessment = session.results().unwrap();
    assert_eq!(assessment.card.percentage("workload"), Some(50));
    assert_eq!(assessment.card.percentage("recovery"), Some(0));
}
