//! Multi-turn pipeline scenarios with scripted capability agents.

use async_trait::async_trait;
use somni_application::TurnUseCase;
use somni_core::capability::{CapabilityError, CompletionAgent};
use somni_core::knowledge::BuiltinKnowledge;
use somni_core::schedule::{extract_schedule_section, parse_entries};
use somni_core::session::ChatMessage;
use somni_core::time::ClockTime;
use somni_core::turn::{OutputMode, TurnRequest, TurnResponse};
use std::sync::Arc;

const VALID_DOC: &str = "\
Your little one is doing great for 8 months - here's a rhythm to try.

## Suggested Schedule

- Wake: 6:45 AM
- Morning Nap: 9:00 AM
- Lunch: 12:00 PM
- Afternoon Nap: 2:30 PM
- Lights Out: 7:30 PM

## Notes

Keep wake windows consistent and adjust by 15 minutes at a time.
";

/// Answers each kind of capability request the pipeline can issue.
struct ScriptedCapability;

#[async_trait]
impl CompletionAgent for ScriptedCapability {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CapabilityError> {
        if prompt.contains("YES or NO") {
            Ok("YES".to_string())
        } else if prompt.contains("Return only a JSON object") {
            Ok("{}".to_string())
        } else {
            Ok(VALID_DOC.to_string())
        }
    }
}

fn usecase() -> TurnUseCase {
    let agent = Arc::new(ScriptedCapability);
    TurnUseCase::new(agent.clone(), agent, Arc::new(BuiltinKnowledge))
}

fn first_request(text: &str) -> TurnRequest {
    TurnRequest {
        messages: vec![ChatMessage::user(text)],
        session_id: None,
        extracted_fields: None,
        questions_asked: None,
        output_mode: None,
    }
}

#[tokio::test]
async fn two_turn_scenario_reaches_a_complete_schedule() {
    let usecase = usecase();

    // Turn 1: age comes from free text, wake time is still missing.
    let response = usecase
        .handle_turn(first_request(
            "8 month old wakes every 2 hours, no idea what to do",
        ))
        .await;
    let TurnResponse::NeedsInfo {
        session_id,
        extracted_fields,
        follow_up_question,
        quick_replies,
        questions_asked,
    } = response
    else {
        panic!("expected needs_info, got {response:?}");
    };
    assert_eq!(extracted_fields.age_months, Some(8));
    assert_eq!(extracted_fields.main_issue, None);
    assert!(follow_up_question.contains("wake up"));
    assert_eq!(quick_replies.len(), 5);
    assert_eq!(questions_asked, 1);

    // Turn 2: the wake-time chip resolves the last required slot.
    let response = usecase
        .handle_turn(TurnRequest {
            messages: vec![
                ChatMessage::user("8 month old wakes every 2 hours, no idea what to do"),
                ChatMessage::assistant(&follow_up_question),
                ChatMessage::user("6:30–7:00am"),
            ],
            session_id: Some(session_id.clone()),
            extracted_fields: Some(extracted_fields),
            questions_asked: Some(questions_asked),
            output_mode: None,
        })
        .await;
    let TurnResponse::Complete {
        session_id: final_session_id,
        extracted_fields,
        schedule_markdown,
        intro_message,
    } = response
    else {
        panic!("expected complete, got {response:?}");
    };
    assert_eq!(final_session_id, session_id);
    assert_eq!(extracted_fields.wake_time, Some(ClockTime::hm(6, 45)));
    assert!(!intro_message.is_empty());

    // Exactly one Wake row, and it is the first chronological entry.
    let section = extract_schedule_section(&schedule_markdown).unwrap();
    let entries = parse_entries(&section);
    let wake_rows: Vec<_> = entries
        .iter()
        .filter(|e| e.normalized_label.contains("wake"))
        .collect();
    assert_eq!(wake_rows.len(), 1);
    let earliest = entries.iter().filter_map(|e| e.time).min().unwrap();
    assert_eq!(wake_rows[0].time, Some(earliest));
}

#[tokio::test]
async fn off_topic_opening_is_redirected() {
    let response = usecase()
        .handle_turn(first_request("write me a poem about the sea"))
        .await;
    let TurnResponse::NeedsInfo {
        follow_up_question,
        quick_replies,
        questions_asked,
        ..
    } = response
    else {
        panic!("expected redirect, got {response:?}");
    };
    assert!(follow_up_question.contains("sleep"));
    assert!(quick_replies.is_empty());
    assert_eq!(questions_asked, 0);
}

#[tokio::test]
async fn disqualifier_beats_sleep_keywords() {
    let response = usecase()
        .handle_turn(first_request("my baby won't sleep, just kidding"))
        .await;
    let TurnResponse::NeedsInfo { quick_replies, .. } = response else {
        panic!("expected redirect, got {response:?}");
    };
    assert!(quick_replies.is_empty());
}

#[tokio::test]
async fn quick_replies_cannot_launder_an_off_topic_opening() {
    let usecase = usecase();
    let response = usecase
        .handle_turn(first_request("write me a poem about the sea"))
        .await;
    let TurnResponse::NeedsInfo { session_id, .. } = response else {
        panic!("expected redirect, got {response:?}");
    };

    // Adversarial client replays chip answers anyway.
    let response = usecase
        .handle_turn(TurnRequest {
            messages: vec![
                ChatMessage::user("write me a poem about the sea"),
                ChatMessage::user("4–6 months"),
                ChatMessage::user("6:30–7:00am"),
            ],
            session_id: Some(session_id),
            extracted_fields: None,
            questions_asked: Some(0),
            output_mode: None,
        })
        .await;
    assert!(
        matches!(response, TurnResponse::NeedsInfo { ref quick_replies, .. } if quick_replies.is_empty()),
        "chip bypass must still be refused, got {response:?}"
    );
}

#[tokio::test]
async fn unresolved_age_becomes_a_terminal_error() {
    let usecase = usecase();
    let mut messages = vec![ChatMessage::user(
        "my baby is really struggling with sleep lately",
    )];
    let mut session_id = None;
    let mut fields = None;
    let mut questions_asked = None;

    for _ in 0..3 {
        let response = usecase
            .handle_turn(TurnRequest {
                messages: messages.clone(),
                session_id: session_id.clone(),
                extracted_fields: fields.clone(),
                questions_asked,
                output_mode: None,
            })
            .await;
        let TurnResponse::NeedsInfo {
            session_id: sid,
            extracted_fields,
            follow_up_question,
            questions_asked: asked,
            ..
        } = response
        else {
            panic!("expected another question, got {response:?}");
        };
        messages.push(ChatMessage::assistant(&follow_up_question));
        messages.push(ChatMessage::user("I honestly could not say"));
        session_id = Some(sid);
        fields = Some(extracted_fields);
        questions_asked = Some(asked);
    }

    let response = usecase
        .handle_turn(TurnRequest {
            messages,
            session_id,
            extracted_fields: fields,
            questions_asked,
            output_mode: None,
        })
        .await;
    let TurnResponse::Error { error } = response else {
        panic!("expected terminal error, got {response:?}");
    };
    assert!(error.contains("age"), "error should ask for the age: {error}");
}

#[tokio::test]
async fn social_mode_completes_in_a_single_turn_with_defaults() {
    let response = usecase()
        .handle_turn(TurnRequest {
            messages: vec![ChatMessage::user("quick schedule for naps please")],
            session_id: None,
            extracted_fields: None,
            questions_asked: None,
            output_mode: Some(OutputMode::Social),
        })
        .await;
    let TurnResponse::Complete {
        extracted_fields, ..
    } = response
    else {
        panic!("expected complete, got {response:?}");
    };
    assert_eq!(extracted_fields.age_months, Some(12));
    assert_eq!(extracted_fields.wake_time, Some(ClockTime::hm(7, 0)));
    assert_eq!(extracted_fields.assumptions.len(), 2);
}
