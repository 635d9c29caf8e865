//! Google Calendar adapter behaviour against a mock API.

mod support;

use cadence_core::TaskAdapter;
use cadence_domain::{IntegrationFamily, Priority, Provider, SyncFailure};
use cadence_infra::integrations::GoogleCalendarAdapter;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{describer, token_manager_with_credential, urgent_commitment};

async fn adapter(server: &MockServer) -> (GoogleCalendarAdapter, tempfile::TempDir) {
    let (tokens, temp) =
        token_manager_with_credential(IntegrationFamily::Calendar, Provider::Google).await;
    let adapter = GoogleCalendarAdapter::new(tokens, describer())
        .unwrap()
        .with_api_base(server.uri());
    (adapter, temp)
}

#[tokio::test]
async fn create_posts_event_with_scheduled_window() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(header("authorization", "Bearer test-token"))
        // Urgent work anchors to the morning slot.
        .and(body_string_contains("T09:00:00"))
        .and(body_string_contains("Send the revised proposal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "evt-123",
            "status": "confirmed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (adapter, _temp) = adapter(&server).await;
    let commitment = urgent_commitment();

    let event_id = adapter.create(&commitment).await.unwrap();
    assert_eq!(event_id, "evt-123");
}

#[tokio::test]
async fn create_normal_priority_anchors_afternoon() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(body_string_contains("T14:00:00"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "evt-124" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (adapter, _temp) = adapter(&server).await;
    let mut commitment = urgent_commitment();
    commitment.priority = Priority::Normal;

    adapter.create(&commitment).await.unwrap();
}

#[tokio::test]
async fn create_rejection_maps_to_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "message": "Invalid start time" }
        })))
        .mount(&server)
        .await;

    let (adapter, _temp) = adapter(&server).await;

    let result = adapter.create(&urgent_commitment()).await;
    match result {
        Err(SyncFailure::Rejected(detail)) => assert!(detail.contains("Invalid start time")),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn create_server_error_maps_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (adapter, _temp) = adapter(&server).await;

    let result = adapter.create(&urgent_commitment()).await;
    assert!(matches!(result, Err(SyncFailure::Unavailable(_))));
}

#[tokio::test]
async fn delete_treats_not_found_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/evt-gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (adapter, _temp) = adapter(&server).await;

    adapter.delete("p1", "evt-gone").await.unwrap();
}

#[tokio::test]
async fn delete_succeeds_on_gone_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/evt-cancelled"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let (adapter, _temp) = adapter(&server).await;

    adapter.delete("p1", "evt-cancelled").await.unwrap();
}

#[tokio::test]
async fn complete_is_a_successful_no_op() {
    let server = MockServer::start().await;
    let (adapter, _temp) = adapter(&server).await;

    adapter.complete("p1", "evt-1", Some("note")).await.unwrap();

    // No HTTP traffic for calendar completion.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn is_connected_reflects_credential_presence() {
    let server = MockServer::start().await;
    let (adapter, _temp) = adapter(&server).await;

    assert!(adapter.is_connected("p1").await);
    assert!(!adapter.is_connected("p2").await);
}

#[tokio::test]
async fn create_without_credential_is_not_connected() {
    let server = MockServer::start().await;
    let (adapter, _temp) = adapter(&server).await;

    let mut commitment = urgent_commitment();
    commitment.profile_id = "p2".into();

    let result = adapter.create(&commitment).await;
    assert!(matches!(result, Err(SyncFailure::NotConnected)));
}
