use std::sync::Arc;

use carelink_core::auth::{AccountType, SessionState, AUTH_TOKENS_KEY};
use carelink_core::client::{CareClient, EntryRoute};
use carelink_core::config::ClientConfig;
use carelink_core::error::ClientError;
use carelink_core::platform::clock::{Clock, ManualClock};
use carelink_core::reminders::{InMemoryNotifier, Reminder};
use carelink_core::storage::{InMemoryStorage, KeyValueStorage};
use chrono::{DateTime, Duration, NaiveTime};
use futures::future::join_all;
use httpmock::prelude::*;
use httpmock::MockServer;
use serde_json::json;

struct App {
    client: CareClient,
    clock: ManualClock,
    secure: Arc<InMemoryStorage>,
    notifier: Arc<InMemoryNotifier>,
}

fn app(server: &MockServer) -> App {
    let clock =
        ManualClock::new(DateTime::parse_from_rfc3339("2025-03-01T09:00:00+01:00").unwrap());
    let secure = Arc::new(InMemoryStorage::new());
    let notifier = Arc::new(InMemoryNotifier::new());
    let client = CareClient::builder(ClientConfig::for_backend(server.base_url(), "test-key"))
        .with_secure_storage(secure.clone())
        .with_general_storage(Arc::new(InMemoryStorage::new()))
        .with_notifier(notifier.clone())
        .with_clock(Arc::new(clock.clone()))
        .build()
        .expect("client");
    App {
        client,
        clock,
        secure,
        notifier,
    }
}

fn mock_login(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path("/login");
        then.status(200).json_body(json!({
            "idToken": "id-1",
            "refreshToken": "refresh-1",
            "expiresIn": "3600"
        }));
    })
}

#[tokio::test(flavor = "current_thread")]
async fn login_then_session_check_needs_no_network() {
    let server = MockServer::start();
    let login = mock_login(&server);
    let refresh = server.mock(|when, then| {
        when.method(POST).path("/v1/token");
        then.status(500);
    });
    let app = app(&server);

    let bundle = app
        .client
        .auth()
        .login("kid@example.com", "secret", AccountType::Child)
        .await
        .expect("login");

    assert_eq!(bundle.id_token(), "id-1");
    assert!(app.secure.get(AUTH_TOKENS_KEY).await.unwrap().is_some());
    assert!(app.client.session().is_logged_in().await);
    assert_eq!(app.client.entry_route().await, EntryRoute::Dashboard);
    login.assert_hits(1);
    refresh.assert_hits(0);
}

#[tokio::test(flavor = "current_thread")]
async fn expired_session_is_refreshed_once_for_concurrent_callers() {
    let server = MockServer::start();
    mock_login(&server);
    let refresh = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/token")
            .query_param("key", "test-key")
            .body_contains("refresh_token=refresh-1");
        then.status(200).json_body(json!({
            "id_token": "id-2",
            "refresh_token": "refresh-2",
            "expires_in": "3600"
        }));
    });
    let app = app(&server);
    app.client
        .auth()
        .login("ada@example.com", "secret", AccountType::Elder)
        .await
        .unwrap();

    app.clock.advance(Duration::hours(2));
    assert_eq!(
        app.client.session().state().await.unwrap(),
        SessionState::Stale
    );

    let session = app.client.session();
    let checks = join_all((0..10).map(|_| session.is_logged_in())).await;

    assert!(checks.into_iter().all(|logged_in| logged_in));
    refresh.assert_hits(1);
    assert_eq!(session.id_token().await.unwrap(), "id-2");
}

#[tokio::test(flavor = "current_thread")]
async fn rejected_refresh_token_ends_the_session() {
    let server = MockServer::start();
    mock_login(&server);
    let refresh = server.mock(|when, then| {
        when.method(POST).path("/v1/token");
        then.status(400)
            .json_body(json!({ "error": { "message": "INVALID_REFRESH_TOKEN" } }));
    });
    let app = app(&server);
    app.client
        .auth()
        .login("ada@example.com", "secret", AccountType::Elder)
        .await
        .unwrap();
    app.clock.advance(Duration::hours(2));

    let err = app
        .client
        .profiles()
        .fetch_user_details()
        .await
        .unwrap_err();

    assert_eq!(err, ClientError::SessionExpired);
    assert!(err.is_session_fatal());
    assert!(app.secure.is_empty());
    assert!(!app.client.session().is_logged_in().await);
    assert_eq!(app.client.entry_route().await, EntryRoute::Login);
    refresh.assert_hits(1);
}

#[tokio::test(flavor = "current_thread")]
async fn reminder_is_saved_then_scheduled() {
    let server = MockServer::start();
    mock_login(&server);
    let save = server.mock(|when, then| {
        when.method(POST)
            .path("/save-medicine-reminder")
            .json_body_partial(
                json!({ "idToken": "id-1", "medicine_id": "metformin", "dosage": "500mg" })
                    .to_string(),
            );
        then.status(200).json_body(json!({ "status": 200 }));
    });
    let app = app(&server);
    app.client
        .auth()
        .login("ada@example.com", "secret", AccountType::Elder)
        .await
        .unwrap();
    let now = app.clock.now();

    let reminder = Reminder::new(
        "Metformin",
        "500mg",
        NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
    )
    .with_take_alert()
    .with_refill(now + Duration::days(10), 3);
    let scheduled = app.client.reminders().create_reminder(&reminder).await.unwrap();

    save.assert();
    assert_eq!(
        scheduled.take_alert_at,
        Some(DateTime::parse_from_rfc3339("2025-03-02T08:00:00+01:00").unwrap())
    );
    assert_eq!(scheduled.refill_alert_at, Some(now + Duration::days(7)));
    let ids: Vec<_> = app
        .notifier
        .pending()
        .into_iter()
        .map(|notification| notification.id)
        .collect();
    assert_eq!(ids, vec!["metformin".to_string(), "refill-metformin".to_string()]);
}
