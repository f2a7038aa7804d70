//! [`FormController`] against a mocked pdfy server.

use pdfy::client::FALLBACK_ERROR;
use pdfy::{FormController, FormError, PdfFile};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pdf() -> PdfFile {
    PdfFile {
        file_name: "report.pdf".to_string(),
        bytes: b"%PDF-1.4\n%%EOF".to_vec(),
    }
}

async fn server_replying(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summarize"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(template)
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn success_shows_summary() {
    let server = server_replying(
        ResponseTemplate::new(200).set_body_json(json!({ "summary": "# Title\n\nBody." })),
    )
    .await;
    let mut form = FormController::new(&server.uri()).unwrap();

    let state = form.submit(Some(pdf())).await.unwrap();
    assert_eq!(state.summary.as_deref(), Some("# Title\n\nBody."));
    assert_eq!(state.error, None);
    assert!(!state.loading);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"report.pdf\""));
    assert!(body.contains("application/pdf"));
}

#[tokio::test]
async fn server_error_message_is_displayed() {
    let server = server_replying(
        ResponseTemplate::new(500).set_body_json(json!({ "error": "File processing failed." })),
    )
    .await;
    let mut form = FormController::new(&server.uri()).unwrap();

    let state = form.submit(Some(pdf())).await.unwrap();
    assert_eq!(state.summary, None);
    assert_eq!(state.error.as_deref(), Some("File processing failed."));
    assert!(!state.loading);
}

#[tokio::test]
async fn error_reply_without_message_is_unknown() {
    let server = server_replying(ResponseTemplate::new(502).set_body_json(json!({}))).await;
    let mut form = FormController::new(&server.uri()).unwrap();

    let state = form.submit(Some(pdf())).await.unwrap();
    assert_eq!(state.error.as_deref(), Some("Unknown error"));
    assert!(!state.loading);
}

#[tokio::test]
async fn unreadable_reply_falls_back() {
    let server =
        server_replying(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .await;
    let mut form = FormController::new(&server.uri()).unwrap();

    let state = form.submit(Some(pdf())).await.unwrap();
    assert_eq!(state.error.as_deref(), Some(FALLBACK_ERROR));
    assert!(!state.loading);
}

#[tokio::test]
async fn network_failure_falls_back() {
    // Grab a free port and release it so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let uri = format!("http://127.0.0.1:{port}");

    let mut form = FormController::new(&uri).unwrap();
    let mut loading = form.subscribe_loading();

    let state = form.submit(Some(pdf())).await.unwrap();
    assert_eq!(state.summary, None);
    assert_eq!(state.error.as_deref(), Some(FALLBACK_ERROR));
    assert!(!state.loading);

    // Raised then lowered; the receiver sees the final value.
    assert!(loading.has_changed().unwrap());
    assert!(!*loading.borrow_and_update());
}

#[tokio::test]
async fn loading_is_raised_while_request_is_in_flight() {
    let server = server_replying(
        ResponseTemplate::new(200)
            .set_body_json(json!({ "summary": "ok" }))
            .set_delay(Duration::from_millis(500)),
    )
    .await;
    let mut form = FormController::new(&server.uri()).unwrap();
    let mut loading = form.subscribe_loading();

    let request = tokio::spawn(async move {
        let state = form.submit(Some(pdf())).await.unwrap().clone();
        (form, state)
    });

    loading.changed().await.unwrap();
    assert!(*loading.borrow_and_update());
    assert!(!request.is_finished());

    let (form, state) = request.await.unwrap();
    assert_eq!(state.summary.as_deref(), Some("ok"));
    assert!(!state.loading);
    assert!(!form.state().loading);
    assert!(!*loading.borrow());
}

#[tokio::test]
async fn resubmission_clears_previous_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summarize"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "ok" })))
        .mount(&server)
        .await;
    let mut form = FormController::new(&server.uri()).unwrap();

    let first = form.submit(Some(pdf())).await.unwrap().clone();
    assert_eq!(first.error.as_deref(), Some("boom"));

    let second = form.submit(Some(pdf())).await.unwrap();
    assert_eq!(second.summary.as_deref(), Some("ok"));
    assert_eq!(second.error, None);
}

#[tokio::test]
async fn missing_file_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let mut form = FormController::new(&server.uri()).unwrap();

    let err = form.submit(None).await.unwrap_err();
    assert!(matches!(err, FormError::FileRequired));
    assert!(!form.state().loading);
}
