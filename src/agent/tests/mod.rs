//! Turn execution tests against scripted runs.

pub(crate) mod helpers;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use self::helpers::{HangingChannel, Script, ScriptedOperator, ScriptedRun, StubChannel};
use super::{DecisionResolver, InterruptFlow, TurnController, run_attempt};
use crate::Error;
use crate::operator::Notice;
use crate::types::{
    AuthorizationHandle, Decision, MessageRecord, NodeUpdate, ResumePayload, RunInput, StreamUnit,
    SuspensionRequest, ThreadId,
};

fn send_email_auth() -> SuspensionRequest {
    SuspensionRequest::authorization(
        "OutlookMail_CreateAndSendEmail",
        "auth-abc",
        "https://auth.example/abc",
    )
}

fn approval(tool: &str) -> SuspensionRequest {
    SuspensionRequest::human_approval(tool, json!({"message_id": "m1"}))
}

fn controller(run: Arc<ScriptedRun>, channel: Arc<StubChannel>) -> TurnController {
    TurnController::new(run, DecisionResolver::new(channel))
}

// =============================================================================
// Stream consumer
// =============================================================================

#[tokio::test]
async fn test_attempt_keeps_arrival_order() {
    let run = ScriptedRun::new(vec![Script::Units(vec![
        StreamUnit::messages("model", vec![MessageRecord::ai("one")]),
        StreamUnit::Interrupts(vec![send_email_auth()]),
        StreamUnit::Updates(vec![
            NodeUpdate::new("tools", vec![MessageRecord::tool("two", "c1")]),
            NodeUpdate::new("model", vec![MessageRecord::ai("three"), MessageRecord::ai("four")]),
        ]),
        StreamUnit::Interrupts(vec![approval("OutlookMail_SendDraftEmail")]),
    ])]);
    let mut operator = ScriptedOperator::default();

    let attempt = run_attempt(
        run.as_ref(),
        &ThreadId::from("t"),
        RunInput::user("hi"),
        &mut operator,
    )
    .await
    .unwrap();

    assert_eq!(operator.rendered, vec!["one", "two", "three", "four"]);
    assert_eq!(attempt.records.len(), 4);
    assert_eq!(
        attempt.interrupts,
        vec![send_email_auth(), approval("OutlookMail_SendDraftEmail")]
    );
    assert!(attempt.is_suspended());
}

#[tokio::test]
async fn test_attempt_error_keeps_rendered_output() {
    let run = ScriptedRun::new(vec![Script::FailAfter(
        vec![StreamUnit::messages("model", vec![MessageRecord::ai("partial")])],
        "model crashed",
    )]);
    let mut operator = ScriptedOperator::default();

    let err = run_attempt(
        run.as_ref(),
        &ThreadId::from("t"),
        RunInput::user("hi"),
        &mut operator,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Run(ref m) if m == "model crashed"));
    assert_eq!(operator.rendered, vec!["partial"]);
}

// =============================================================================
// Decision resolver
// =============================================================================

#[tokio::test]
async fn test_unclassified_is_denied_without_io() {
    let channel = StubChannel::granting(&["anything"]);
    let resolver = DecisionResolver::new(channel.clone());
    let mut operator = ScriptedOperator::answering(&["yes"]);

    let decision = resolver
        .resolve(InterruptFlow::Unclassified, &mut operator)
        .await
        .unwrap();

    assert_eq!(decision, Decision::deny());
    assert!(channel.waited().is_empty());
    assert!(operator.prompts.is_empty());
    assert!(operator.notices.is_empty());
}

#[tokio::test]
async fn test_authorization_granted() {
    let channel = StubChannel::granting(&["auth-abc"]);
    let resolver = DecisionResolver::new(channel.clone());
    let mut operator = ScriptedOperator::default();
    let flow = InterruptFlow::Authorization {
        tool_name: "OutlookMail_WhoAmI".into(),
        handle: AuthorizationHandle {
            id: "auth-abc".into(),
            url: "https://auth.example/abc".into(),
        },
    };

    let decision = resolver.resolve(flow, &mut operator).await.unwrap();

    assert_eq!(decision, Decision::approve());
    assert_eq!(channel.waited(), vec!["auth-abc"]);
    assert_eq!(
        operator.notices,
        vec![
            Notice::AuthorizationRequired {
                tool_name: "OutlookMail_WhoAmI".into(),
                url: "https://auth.example/abc".into(),
            },
            Notice::AwaitingAuthorization,
            Notice::AuthorizationGranted,
        ]
    );
}

#[tokio::test]
async fn test_authorization_failure_is_denied() {
    let resolver = DecisionResolver::new(StubChannel::denying());
    let mut operator = ScriptedOperator::default();
    let flow = InterruptFlow::Authorization {
        tool_name: "OutlookMail_WhoAmI".into(),
        handle: AuthorizationHandle {
            id: "auth-x".into(),
            url: String::new(),
        },
    };

    let decision = resolver.resolve(flow, &mut operator).await.unwrap();

    assert_eq!(decision, Decision::deny());
    assert!(matches!(
        operator.notices.last(),
        Some(Notice::AuthorizationFailed { error }) if error.contains("auth-x")
    ));
}

#[tokio::test]
async fn test_authorization_wait_timeout_is_denied() {
    let resolver = DecisionResolver::new(Arc::new(HangingChannel))
        .with_wait_timeout(Some(Duration::from_millis(20)));
    let mut operator = ScriptedOperator::default();
    let flow = InterruptFlow::Authorization {
        tool_name: "OutlookMail_ListEmails".into(),
        handle: AuthorizationHandle {
            id: "slow".into(),
            url: "https://auth.example/slow".into(),
        },
    };

    let decision = resolver.resolve(flow, &mut operator).await.unwrap();

    assert_eq!(decision, Decision::deny());
    assert!(matches!(
        operator.notices.last(),
        Some(Notice::AuthorizationFailed { error }) if error.contains("timed out")
    ));
}

#[tokio::test]
async fn test_human_approval_answers() {
    let resolver = DecisionResolver::new(StubChannel::denying());
    let mut operator = ScriptedOperator::answering(&["Y", "no"]);
    let flow = || InterruptFlow::HumanApproval {
        tool_name: "OutlookMail_SendDraftEmail".into(),
        input: json!({"message_id": "m1"}),
    };

    assert_eq!(
        resolver.resolve(flow(), &mut operator).await.unwrap(),
        Decision::approve()
    );
    assert_eq!(
        resolver.resolve(flow(), &mut operator).await.unwrap(),
        Decision::deny()
    );
    // Input exhausted.
    assert_eq!(
        resolver.resolve(flow(), &mut operator).await.unwrap(),
        Decision::deny()
    );
    assert_eq!(operator.prompts.len(), 3);
    assert!(operator.prompts[0].starts_with("Do you approve this tool call?"));
    assert!(matches!(
        &operator.notices[0],
        Notice::ApprovalRequired { tool_name, input }
            if tool_name == "OutlookMail_SendDraftEmail" && input == &json!({"message_id": "m1"})
    ));
}

// =============================================================================
// Turn controller
// =============================================================================

#[tokio::test]
async fn test_turn_without_interrupts_completes() {
    let run = ScriptedRun::new(vec![Script::Units(vec![StreamUnit::messages(
        "model",
        vec![MessageRecord::ai("You have 3 unread emails.")],
    )])]);
    let channel = StubChannel::denying();
    let mut operator = ScriptedOperator::default();

    let report = controller(run.clone(), channel)
        .run_turn(&ThreadId::from("1"), "any unread mail?", &mut operator)
        .await
        .unwrap();

    assert_eq!(report.attempts, 1);
    assert_eq!(report.records, 1);
    assert!(report.resumes.is_empty());
    assert_eq!(
        run.calls(),
        vec![(ThreadId::from("1"), RunInput::user("any unread mail?"))]
    );
}

#[tokio::test]
async fn test_authorized_send_resumes_and_completes() {
    let run = ScriptedRun::new(vec![
        Script::Units(vec![StreamUnit::Interrupts(vec![send_email_auth()])]),
        Script::Units(vec![StreamUnit::messages(
            "agent",
            vec![MessageRecord::ai("Email sent.")],
        )]),
    ]);
    let channel = StubChannel::granting(&["auth-abc"]);
    let mut operator = ScriptedOperator::default();

    let report = controller(run.clone(), channel.clone())
        .run_turn(&ThreadId::from("1"), "email bob", &mut operator)
        .await
        .unwrap();

    let resume = ResumePayload::Single(Decision::approve());
    assert_eq!(report.attempts, 2);
    assert_eq!(report.resumes, vec![resume.clone()]);
    assert_eq!(operator.rendered, vec!["Email sent."]);
    assert_eq!(channel.waited(), vec!["auth-abc"]);

    let calls = run.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], (ThreadId::from("1"), RunInput::Resume(resume)));
    assert_eq!(
        serde_json::to_value(&report.resumes[0]).unwrap(),
        json!({"authorized": true})
    );
}

#[tokio::test]
async fn test_two_denials_resume_as_ordered_batch() {
    let run = ScriptedRun::new(vec![
        Script::Units(vec![StreamUnit::Interrupts(vec![
            send_email_auth(),
            approval("OutlookMail_SendDraftEmail"),
        ])]),
        Script::Units(vec![StreamUnit::messages(
            "agent",
            vec![MessageRecord::ai("Okay, nothing was sent.")],
        )]),
    ]);
    let mut operator = ScriptedOperator::answering(&["n"]);

    let report = controller(run.clone(), StubChannel::denying())
        .run_turn(&ThreadId::from("1"), "send the draft", &mut operator)
        .await
        .unwrap();

    assert_eq!(
        report.resumes,
        vec![ResumePayload::Batch(vec![Decision::deny(), Decision::deny()])]
    );
    assert_eq!(
        serde_json::to_value(&report.resumes[0]).unwrap(),
        json!([{"authorized": false}, {"authorized": false}])
    );
}

#[tokio::test]
async fn test_decisions_follow_request_order() {
    let run = ScriptedRun::new(vec![Script::Units(vec![
        StreamUnit::Interrupts(vec![approval("first")]),
        StreamUnit::Interrupts(vec![
            SuspensionRequest::new(json!({"unexpected": true})),
            send_email_auth(),
        ]),
    ])]);
    let mut operator = ScriptedOperator::answering(&["yes"]);

    let report = controller(run, StubChannel::granting(&["auth-abc"]))
        .run_turn(&ThreadId::from("1"), "go", &mut operator)
        .await
        .unwrap();

    assert_eq!(
        report.resumes,
        vec![ResumePayload::Batch(vec![
            Decision::approve(),
            Decision::deny(),
            Decision::approve(),
        ])]
    );
}

#[tokio::test]
async fn test_repeated_suspensions_keep_thread() {
    let run = ScriptedRun::new(vec![
        Script::Units(vec![StreamUnit::Interrupts(vec![send_email_auth()])]),
        Script::Units(vec![StreamUnit::Interrupts(vec![approval("OutlookMail_SendDraftEmail")])]),
        Script::Units(vec![StreamUnit::messages("agent", vec![MessageRecord::ai("Done.")])]),
    ]);
    let thread = ThreadId::from("thread-42");
    let mut operator = ScriptedOperator::answering(&["yes"]);

    let report = controller(run.clone(), StubChannel::granting(&["auth-abc"]))
        .run_turn(&thread, "send it", &mut operator)
        .await
        .unwrap();

    assert_eq!(report.attempts, 3);
    assert_eq!(report.resumes.len(), 2);
    assert!(run.calls().iter().all(|(t, _)| t == &thread));
}

#[tokio::test]
async fn test_run_failure_aborts_before_resolution() {
    let run = ScriptedRun::new(vec![Script::FailAfter(
        vec![StreamUnit::Interrupts(vec![send_email_auth()])],
        "upstream 500",
    )]);
    let channel = StubChannel::granting(&["auth-abc"]);
    let mut operator = ScriptedOperator::default();

    let err = controller(run.clone(), channel.clone())
        .run_turn(&ThreadId::from("1"), "email bob", &mut operator)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Run(_)));
    assert_eq!(run.calls().len(), 1);
    assert!(channel.waited().is_empty());
    assert!(operator.notices.is_empty());
}

#[tokio::test]
async fn test_failure_on_resume_aborts_turn() {
    let run = ScriptedRun::new(vec![
        Script::Units(vec![StreamUnit::Interrupts(vec![send_email_auth()])]),
        Script::FailToStart("connection refused"),
    ]);

    let err = controller(run.clone(), StubChannel::granting(&["auth-abc"]))
        .run_turn(&ThreadId::from("1"), "email bob", &mut ScriptedOperator::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Run(ref m) if m == "connection refused"));
    assert_eq!(run.calls().len(), 2);
}

#[tokio::test]
async fn test_resume_limit() {
    let run = ScriptedRun::new(vec![
        Script::Units(vec![StreamUnit::Interrupts(vec![approval("a")])]),
        Script::Units(vec![StreamUnit::Interrupts(vec![approval("b")])]),
    ]);
    let mut operator = ScriptedOperator::answering(&["y", "y"]);

    let err = controller(run.clone(), StubChannel::denying())
        .with_max_resumes(Some(1))
        .run_turn(&ThreadId::from("1"), "loop", &mut operator)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TurnLimit { limit: 1 }));
    assert_eq!(run.calls().len(), 2);
}
