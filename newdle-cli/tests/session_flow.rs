//! End-to-end request flows through the real session store.
//!
//! A responder task plays the user at the login prompt while the requests
//! run against a wiremock server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use newdle_fetch::{ClientContext, ClientError, NewdleClient, SessionEvent, SessionState};
use newdle_store::{load_initial_token, read_token, spawn_token_sync, SessionStore};
use serde_json::json;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn client(server: &MockServer, session: &Arc<SessionStore>) -> NewdleClient {
    let ctx = ClientContext::builder(session.clone())
        .base_url(server.uri())
        .build()
        .unwrap();
    NewdleClient::from_context(ctx)
}

/// Answers every login prompt with `answer`, counting the prompts seen.
fn respond_to_prompts(
    session: Arc<SessionStore>,
    answer: Option<&'static str>,
) -> (JoinHandle<()>, Arc<AtomicUsize>) {
    let prompts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&prompts);
    let task = tokio::spawn(async move {
        let mut changes = session.subscribe();
        loop {
            if session.login_prompt().await.is_some() {
                seen.fetch_add(1, Ordering::SeqCst);
                // Let every waiting request observe the open prompt
                tokio::time::sleep(Duration::from_millis(100)).await;
                let event = match answer {
                    Some(token) => SessionEvent::UserLoggedIn(token.to_string()),
                    None => SessionEvent::LoginPromptAborted,
                };
                session.dispatch(event).await;
                continue;
            }
            if changes.changed().await.is_err() {
                break;
            }
        }
    });
    (task, prompts)
}

async fn mount_me(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/me/"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "token_expired"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/me/"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uid": "ada",
            "name": "Ada Lovelace",
            "email": "ada@example.com"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_concurrent_expiry_prompts_once() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    mount_me(&server).await;

    let session = Arc::new(SessionStore::new());
    session
        .dispatch(SessionEvent::UserLoggedIn("old".to_string()))
        .await;
    let (responder, prompts) = respond_to_prompts(Arc::clone(&session), Some("new"));
    let api = client(&server, &session);

    let (a, b, c) = tokio::join!(api.get_me(), api.get_me(), api.get_me());

    for result in [a, b, c] {
        assert_eq!(result.unwrap().uid, "ada");
    }
    assert_eq!(prompts.load(Ordering::SeqCst), 1);
    assert_eq!(session.token().await.as_deref(), Some("new"));
    responder.abort();
}

#[tokio::test]
async fn test_logged_out_request_prompts_then_sends_token() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    mount_me(&server).await;

    let session = Arc::new(SessionStore::new());
    let (responder, prompts) = respond_to_prompts(Arc::clone(&session), Some("new"));

    let me = client(&server, &session).get_me().await.unwrap();

    assert_eq!(me.email, "ada@example.com");
    assert_eq!(prompts.load(Ordering::SeqCst), 1);
    responder.abort();
}

#[tokio::test]
async fn test_aborted_prompt_fails_without_request() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/newdles/mine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let session = Arc::new(SessionStore::new());
    let (responder, _) = respond_to_prompts(Arc::clone(&session), None);

    let err = client(&server, &session)
        .get_my_newdles()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotLoggedIn { .. }));
    assert!(!session.is_acquiring_token().await);
    responder.abort();
}

#[tokio::test]
async fn test_renewed_token_is_persisted() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    mount_me(&server).await;

    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token");
    tokio::fs::write(&token_path, "old\n").await.unwrap();

    let session = Arc::new(SessionStore::new());
    assert!(load_initial_token(&session, &token_path).await.unwrap());
    let sync = spawn_token_sync(Arc::clone(&session), token_path.clone());
    let (responder, _) = respond_to_prompts(Arc::clone(&session), Some("new"));

    client(&server, &session).get_me().await.unwrap();
    responder.abort();
    sync.finish().await.unwrap();

    assert_eq!(read_token(&token_path).await.unwrap().as_deref(), Some("new"));
}

#[tokio::test]
async fn test_anonymous_request_ignores_expired_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/footer-links"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"title": "Privacy", "url": "https://example.com/p"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(SessionStore::new());
    let links = client(&server, &session).footer_links().await.unwrap();

    assert_eq!(links[0].title, "Privacy");
    assert!(session.login_prompt().await.is_none());
}
