use std::time::Duration;

use routinely::transport::ChannelState;
use routinely::{
    AppContext, ApprovalDecision, ApprovalView, PlannerError, Routine, Step, SubmissionState,
    SubmitError,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::channel_harness::{ChannelServer, dead_channel_url, test_config};

const SETTLE: Duration = Duration::from_secs(5);

async fn planner_returning(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-routine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn goal_to_approved_routine() {
    let planner = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-routine"))
        .and(body_json(json!({
            "goal": "lose 5kg in a month",
            "email": "runner@example.com",
            "gender": "f",
            "age": 29
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routine": [
                {"time": "7:00 AM", "message": "Morning run"},
                {"time": "9:00 PM", "message": "Plan meals"}
            ]
        })))
        .expect(1)
        .mount(&planner)
        .await;
    let mut channel = ChannelServer::start().await;

    let ctx = AppContext::start(test_config(&planner.uri(), &channel.url))
        .await
        .unwrap();
    assert_eq!(ctx.channel.wait_until_settled(SETTLE).await, ChannelState::Open);

    let routine = ctx.pipeline.submit("  lose 5kg in a month ").await.unwrap();

    assert_eq!(
        routine,
        Routine::Steps(vec![
            Step::new("7:00 AM", "Morning run"),
            Step::new("9:00 PM", "Plan meals"),
        ])
    );
    assert_eq!(ctx.pipeline.state(), SubmissionState::Delivered);
    assert_eq!(ctx.pipeline.approval_view(), Some(ApprovalView::Choices));
    assert_eq!(
        channel.next_frame().await,
        json!({"type": "goal", "data": "  lose 5kg in a month "})
    );

    assert!(ctx.pipeline.toggle_notify(1, true));
    let decision = ctx.pipeline.decide(true).unwrap();

    assert_eq!(decision, Some(ApprovalDecision::Approved));
    assert_eq!(
        channel.next_frame().await,
        json!({
            "type": "approval",
            "data": {"goal": "lose 5kg in a month", "approved": true}
        })
    );
    assert_eq!(
        ctx.pipeline
            .approval_view()
            .and_then(|view| view.summary()),
        Some("You have approved email reminders.".to_string())
    );

    // Terminal: a second decision sends nothing.
    assert_eq!(
        ctx.pipeline.decide(false).unwrap(),
        Some(ApprovalDecision::Approved)
    );
    assert!(channel.stays_quiet(Duration::from_millis(200)).await);

    ctx.shutdown().await;
}

#[tokio::test]
async fn planner_failure_surfaces_detail() {
    let planner = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "planner overloaded"})),
        )
        .mount(&planner)
        .await;
    let channel = ChannelServer::start().await;

    let ctx = AppContext::start(test_config(&planner.uri(), &channel.url))
        .await
        .unwrap();
    let err = ctx.pipeline.submit("run a 10k").await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to generate routine: planner overloaded");
    assert_eq!(ctx.pipeline.state(), SubmissionState::Failed);
    assert_eq!(ctx.pipeline.last_error(), Some(err));
    assert!(ctx.pipeline.routine().is_none());
    assert_eq!(ctx.pipeline.decide(true).unwrap(), None);

    ctx.shutdown().await;
}

#[tokio::test]
async fn empty_routine_is_reported() {
    let planner = planner_returning(json!({"routine": []})).await;
    let channel = ChannelServer::start().await;

    let ctx = AppContext::start(test_config(&planner.uri(), &channel.url))
        .await
        .unwrap();
    let err = ctx.pipeline.submit("run a 10k").await.unwrap_err();

    assert_eq!(err, SubmitError::Planner(PlannerError::EmptyResult));
    assert_eq!(
        err.to_string(),
        "No routine generated. Please try a different goal."
    );

    ctx.shutdown().await;
}

#[tokio::test]
async fn text_routine_is_delivered_as_text() {
    let planner = planner_returning(json!({"routine": "Walk every evening."})).await;
    let channel = ChannelServer::start().await;

    let ctx = AppContext::start(test_config(&planner.uri(), &channel.url))
        .await
        .unwrap();
    let routine = ctx.pipeline.submit("walk more").await.unwrap();

    assert_eq!(routine, Routine::Text("Walk every evening.".into()));
    assert!(!ctx.pipeline.toggle_notify(0, true));

    ctx.shutdown().await;
}

#[tokio::test]
async fn dead_channel_still_delivers_but_decision_is_not_sent() {
    let planner = planner_returning(json!({
        "routine": [{"time": "6:30 AM", "message": "Stretch"}]
    }))
    .await;
    let channel_url = dead_channel_url().await;

    let ctx = AppContext::start(test_config(&planner.uri(), &channel_url))
        .await
        .unwrap();
    assert_eq!(
        ctx.channel.wait_until_settled(SETTLE).await,
        ChannelState::Closed
    );

    let routine = ctx.pipeline.submit("stretch daily").await.unwrap();
    assert_eq!(routine.steps().len(), 1);

    let err = ctx.pipeline.decide(false).unwrap_err();
    assert_eq!(err.reason(), "transport-unavailable");
    assert_eq!(ctx.pipeline.decision(), ApprovalDecision::Rejected);

    ctx.shutdown().await;
}
