//! Debate scheduling and transcript visibility.

mod common;

use std::sync::Arc;
use std::time::Duration;

use agora_conversation::{
    Collaborators, DebateSession, OPENING_TEMPERATURE, Participant, SessionState, WindowConfig,
};
use agora_core::{EngineError, GenerationError, Role};
use common::{ScriptedBackend, collaborators, persona, stalled_collaborators};
use uuid::Uuid;

fn seated(
    collaborators: Collaborators,
    participants: Vec<Participant>,
) -> Result<DebateSession, EngineError> {
    DebateSession::new(
        Uuid::now_v7(),
        "What is justice?",
        participants,
        WindowConfig::default().with_max_chars(None),
        collaborators,
    )
}

fn debate(backend: &Arc<ScriptedBackend>, ids: &[&str]) -> Result<DebateSession, EngineError> {
    seated(
        collaborators(backend),
        ids.iter().map(|id| Participant::from(persona(id))).collect(),
    )
}

#[test]
fn test_participant_count_bounds() {
    let backend = ScriptedBackend::new();

    assert!(matches!(debate(&backend, &["a"]), Err(EngineError::Validation(_))));
    assert!(matches!(
        debate(&backend, &["a", "b", "c", "d", "e", "f"]),
        Err(EngineError::Validation(_))
    ));
    assert!(debate(&backend, &["a", "b"]).is_ok());
    assert!(debate(&backend, &["a", "b", "c", "d", "e"]).is_ok());
}

#[test]
fn test_duplicates_and_bad_topics_rejected() {
    let backend = ScriptedBackend::new();

    assert!(matches!(debate(&backend, &["a", "b", "a"]), Err(EngineError::Validation(_))));

    let err = DebateSession::new(
        Uuid::now_v7(),
        "  ",
        vec![persona("a").into(), persona("b").into()],
        WindowConfig::default(),
        collaborators(&backend),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn test_topic_statement_is_pinned() {
    let backend = ScriptedBackend::new();
    let session = debate(&backend, &["a", "b"]).unwrap();

    let pinned = session.window().pinned().unwrap();
    assert_eq!(pinned.role(), Role::System);
    assert!(pinned.text().contains("What is justice?"));
    assert_eq!(session.state(), SessionState::Created);
}

#[tokio::test]
async fn test_round_robin_order_and_round_counter() {
    let backend = ScriptedBackend::new();
    let mut session = debate(&backend, &["a", "b", "c"]).unwrap();

    let mut speakers = Vec::new();
    for _ in 0..3 {
        speakers.push(session.advance_turn().await.unwrap().speaker_id().to_string());
    }

    assert_eq!(speakers, vec!["a", "b", "c"]);
    assert_eq!(session.current_round(), 1);
    assert_eq!(session.turn_cursor(), 0);
    assert_eq!(session.next_speaker().id, "a");
    assert_eq!(session.state(), SessionState::Active);
    assert!(session.participants().iter().all(|p| p.turn_count == 1));
}

#[tokio::test]
async fn test_failure_does_not_advance_cursor() {
    let backend = ScriptedBackend::new();
    let mut session = debate(&backend, &["a", "b", "c"]).unwrap();

    session.advance_turn().await.unwrap();
    backend.push(Err(GenerationError::RateLimited));
    let len_before = session.snapshot().len();

    let err = session.advance_turn().await.unwrap_err();
    assert!(matches!(err, EngineError::Generation(GenerationError::RateLimited)));
    assert_eq!(session.snapshot().len(), len_before);
    assert_eq!(session.current_round(), 0);
    assert_eq!(session.next_speaker().id, "b");

    let retried = session.advance_turn().await.unwrap();
    assert_eq!(retried.speaker_id(), "b");
    let finished = session.advance_turn().await.unwrap();
    assert_eq!(finished.speaker_id(), "c");
    assert_eq!(session.current_round(), 1);
}

#[tokio::test]
async fn test_later_speaker_sees_earlier_turns_in_order() {
    let backend = ScriptedBackend::new();
    backend.push(Ok("Justice is harmony of the soul."));
    backend.push(Ok("Justice is the golden mean."));
    let mut session = debate(&backend, &["a", "b", "c"]).unwrap();

    session.advance_turn().await.unwrap();
    session.advance_turn().await.unwrap();
    session.advance_turn().await.unwrap();

    let request_for_c = &backend.requests()[2];
    let texts: Vec<&str> = request_for_c
        .transcript
        .iter()
        .map(|e| e.text.as_str())
        .collect();

    assert_eq!(texts.len(), 3);
    assert!(texts[0].contains("What is justice?"));
    assert_eq!(texts[1], "[A]: Justice is harmony of the soul.");
    assert_eq!(texts[2], "[B]: Justice is the golden mean.");
    let roles: Vec<Role> = request_for_c.transcript.iter().map(|e| e.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::User]);
    assert!(request_for_c.system_prompt.starts_with("You are c."));
    assert!(request_for_c.system_prompt.contains("Other participants: A, B"));
}

#[tokio::test]
async fn test_own_turns_keep_persona_role() {
    let backend = ScriptedBackend::new();
    let mut session = debate(&backend, &["a", "b"]).unwrap();

    for _ in 0..3 {
        session.advance_turn().await.unwrap();
    }

    let roles: Vec<Role> = backend
        .last_request()
        .transcript
        .iter()
        .map(|e| e.role)
        .collect();
    assert_eq!(roles, vec![Role::System, Role::Persona, Role::User]);
}

#[tokio::test]
async fn test_temperature_is_forwarded() {
    let backend = ScriptedBackend::new();
    let mut session = debate(&backend, &["a", "b"]).unwrap().with_temperature(0.8);

    for _ in 0..3 {
        session.advance_turn().await.unwrap();
    }

    let temperatures: Vec<Option<f32>> =
        backend.requests().iter().map(|r| r.temperature).collect();
    assert_eq!(
        temperatures,
        vec![Some(OPENING_TEMPERATURE), Some(OPENING_TEMPERATURE), Some(0.8)]
    );
}

#[tokio::test]
async fn test_first_contribution_is_an_opening_statement() {
    let backend = ScriptedBackend::new();
    let mut session = debate(&backend, &["a", "b"]).unwrap();

    session.advance_turn().await.unwrap();
    let opening = backend.last_request();
    assert!(opening.system_prompt.starts_with("You are a.\n\n"));
    assert!(opening.system_prompt.contains("brief opening statement (2-3 sentences)"));
    assert!(
        opening
            .system_prompt
            .contains("Your position (if any): To be determined through dialogue")
    );
    assert_eq!(opening.temperature, Some(0.9));

    session.advance_turn().await.unwrap();
    session.advance_turn().await.unwrap();
    let rebuttal = backend.last_request();
    assert!(!rebuttal.system_prompt.contains("opening statement"));
    assert!(rebuttal.system_prompt.contains("contribution number 2"));
    assert_eq!(rebuttal.temperature, None);
}

#[tokio::test]
async fn test_positions_and_description_reach_prompts() {
    let backend = ScriptedBackend::new();
    let mut session = seated(
        collaborators(&backend),
        vec![
            Participant::from(persona("a")).with_position("Justice is harmony"),
            Participant::from(persona("b")),
        ],
    )
    .unwrap()
    .with_description("Is justice more than the advantage of the stronger?")
    .unwrap();

    assert_eq!(
        session.participants()[0].position.as_deref(),
        Some("Justice is harmony")
    );
    assert_eq!(
        session.description(),
        Some("Is justice more than the advantage of the stronger?")
    );

    for _ in 0..3 {
        session.advance_turn().await.unwrap();
    }

    let requests = backend.requests();
    for prompt in [&requests[0].system_prompt, &requests[2].system_prompt] {
        assert!(prompt.contains("Your position (if any): Justice is harmony"));
        assert!(prompt.contains("advantage of the stronger"));
    }
    assert!(
        requests[1]
            .system_prompt
            .contains("Your position (if any): To be determined through dialogue")
    );
}

#[test]
fn test_invalid_position_or_description_rejected() {
    let backend = ScriptedBackend::new();

    let err = seated(
        collaborators(&backend),
        vec![
            Participant::from(persona("a")).with_position("   "),
            Participant::from(persona("b")),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let session = debate(&backend, &["a", "b"]).unwrap();
    assert!(matches!(
        session.with_description(""),
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn test_abandoned_turn_leaves_no_trace() {
    let mut session = seated(
        stalled_collaborators(),
        vec![persona("a").into(), persona("b").into()],
    )
    .unwrap();
    let len_before = session.snapshot().len();

    let outcome = tokio::time::timeout(Duration::from_millis(20), session.advance_turn()).await;

    assert!(outcome.is_err());
    assert_eq!(session.snapshot().len(), len_before);
    assert_eq!(session.turn_cursor(), 0);
    assert_eq!(session.current_round(), 0);
    assert_eq!(session.next_speaker().id, "a");
    assert_eq!(session.participants()[0].turn_count, 0);
    assert_eq!(session.state(), SessionState::Created);
}

#[tokio::test]
async fn test_interjection_only_between_rounds() {
    let backend = ScriptedBackend::new();
    let mut session = debate(&backend, &["a", "b"]).unwrap();

    session.advance_turn().await.unwrap();
    assert!(matches!(
        session.interject("What about fairness?"),
        Err(EngineError::Validation(_))
    ));

    session.advance_turn().await.unwrap();
    let note = session.interject("What about fairness?").unwrap();
    assert_eq!(note.role(), Role::User);

    session.advance_turn().await.unwrap();
    let last = backend.last_request();
    assert_eq!(
        last.transcript.last().unwrap().text,
        "[Audience]: What about fairness?"
    );
}

#[tokio::test]
async fn test_summary_records_nothing() {
    let backend = ScriptedBackend::new();
    let mut session = debate(&backend, &["a", "b"]).unwrap();
    session.advance_turn().await.unwrap();
    session.advance_turn().await.unwrap();
    let len_before = session.snapshot().len();

    backend.push(Ok(" Both agreed on little. "));
    let summary = session.summarize().await.unwrap();

    assert_eq!(summary, "Both agreed on little.");
    assert_eq!(session.snapshot().len(), len_before);
    let request = backend.last_request();
    assert!(request.system_prompt.contains("neutral moderator"));
    assert_eq!(request.temperature, Some(0.7));
}

#[tokio::test]
async fn test_summary_leaves_out_system_entries() {
    let backend = ScriptedBackend::new();
    let mut session = debate(&backend, &["a", "b"]).unwrap();
    session.advance_turn().await.unwrap();
    session.advance_turn().await.unwrap();

    session.summarize().await.unwrap();

    let transcript = backend.last_request().transcript;
    assert!(transcript.iter().all(|e| e.role != Role::System));
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[0].text, "[A]: reply 1");
}

#[tokio::test]
async fn test_closed_debate_rejects_turns() {
    let backend = ScriptedBackend::new();
    let mut session = debate(&backend, &["a", "b"]).unwrap();

    session.close();

    assert!(matches!(
        session.advance_turn().await,
        Err(EngineError::SessionNotFound(_))
    ));
    assert!(backend.requests().is_empty());
}
