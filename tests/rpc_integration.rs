//! Integration tests for signed NIP-86 calls against a mock relay.
//!
//! The relay is a local `wiremock` server; its `http://` address is handed to
//! the client as `ws://` so the URL conversion is exercised too.
//!
//! Run with:
//! ```bash
//! cargo test -p nostr-relay-admin --test rpc_integration
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use nostr_relay_admin::auth::native::{verify_event, KeySigner};
use nostr_relay_admin::auth::{
    decode_authorization_header, payload_digest, unix_now, validate_http_auth_event, HttpMethod,
    ValidationParams, KIND_HTTP_AUTH,
};
use nostr_relay_admin::client::RelayAdminClient;
use nostr_relay_admin::error::{AdminError, AuthError, HttpError};

const PK_A: &str = "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d";
const PK_B: &str = "82341f882b6eabcd2ba7f1ef90aad961cf074af15b9ef44a09f9d2a8fbfbe6a2";
const RPC_CONTENT_TYPE: &str = "application/nostr+json+rpc";

fn ws_url(server: &MockServer) -> String {
    server.uri().replacen("http://", "ws://", 1)
}

fn client_for(server: &MockServer, signer: &Arc<KeySigner>) -> RelayAdminClient {
    RelayAdminClient::builder()
        .relay_url(&ws_url(server))
        .signer(signer.clone())
        .build()
        .unwrap()
}

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": result }))
}

async fn mount_rpc(server: &MockServer, rpc_method: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", RPC_CONTENT_TYPE))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn requests_for(server: &MockServer, rpc_method: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| {
            serde_json::from_slice::<Value>(&r.body)
                .map(|v| v["method"] == rpc_method)
                .unwrap_or(false)
        })
        .collect()
}

fn authorization(request: &Request) -> &str {
    request
        .headers
        .get("authorization")
        .expect("authorization header")
        .to_str()
        .unwrap()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_banned_populates_state() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(
        &server,
        "listbannedpubkeys",
        rpc_result(json!([
            { "pubkey": PK_A, "reason": "spam" },
            { "pubkey": PK_B }
        ])),
    )
    .await;

    let client = client_for(&server, &signer);
    let entries = client.pubkeys().list_banned().await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].reason.as_deref(), Some("spam"));
    assert_eq!(entries[1].reason, None);

    let state = client.pubkeys().state().await;
    assert!(state.is_banned(PK_A));
    assert!(state.is_banned(&PK_B.to_uppercase()));
    assert!(!state.is_allowed(PK_A));
}

#[tokio::test]
async fn test_list_allowed_populates_state() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(
        &server,
        "listallowedpubkeys",
        rpc_result(json!([{ "pubkey": PK_A, "reason": "trusted" }])),
    )
    .await;

    let client = client_for(&server, &signer);
    client.pubkeys().list_allowed().await.unwrap();

    let state = client.pubkeys().state().await;
    assert_eq!(state.allowed().len(), 1);
    assert_eq!(state.allowed()[0].pubkey, PK_A);
    assert_eq!(state.allowed()[0].reason.as_deref(), Some("trusted"));
    assert!(state.is_allowed(PK_A));
    assert!(state.banned().is_empty());
}

#[tokio::test]
async fn test_ban_sends_exact_body_with_bound_credential() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(&server, "banpubkey", rpc_result(json!(true))).await;
    mount_rpc(&server, "listallowedpubkeys", rpc_result(json!([]))).await;
    mount_rpc(
        &server,
        "listbannedpubkeys",
        rpc_result(json!([{ "pubkey": PK_A, "reason": "spam" }])),
    )
    .await;

    let client = client_for(&server, &signer);
    client.pubkeys().ban(PK_A, Some("spam")).await.unwrap();

    let bans = requests_for(&server, "banpubkey").await;
    assert_eq!(bans.len(), 1);
    let request = &bans[0];

    let expected_body = format!(r#"{{"method":"banpubkey","params":["{}","spam"]}}"#, PK_A);
    assert_eq!(request.body, expected_body.as_bytes());

    let credential = decode_authorization_header(authorization(request)).unwrap();
    assert_eq!(credential.kind, KIND_HTTP_AUTH);
    assert_eq!(credential.pubkey, signer.public_key_hex());
    assert_eq!(credential.content, "");
    assert_eq!(credential.tag_value("u"), Some(server.uri().as_str()));
    assert_eq!(credential.tag_value("method"), Some("POST"));
    assert_eq!(
        credential.tag_value("payload"),
        Some(payload_digest(&request.body).as_str())
    );

    let params = ValidationParams::new(server.uri(), HttpMethod::Post, unix_now())
        .with_payload_hash(payload_digest(&request.body));
    validate_http_auth_event(&credential, &params).unwrap();
    verify_event(&credential).unwrap();

    let state = client.pubkeys().state().await;
    assert!(state.is_banned(PK_A));
    assert!(state.is_loaded());
    assert_eq!(state.notice().unwrap().text, "Pubkey banned");
}

#[tokio::test]
async fn test_each_call_gets_fresh_credential() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(&server, "listallowedpubkeys", rpc_result(json!([]))).await;

    let client = client_for(&server, &signer);
    client.pubkeys().list_allowed().await.unwrap();
    client.pubkeys().list_allowed().await.unwrap();

    let requests = requests_for(&server, "listallowedpubkeys").await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);

    let first = decode_authorization_header(authorization(&requests[0])).unwrap();
    let second = decode_authorization_header(authorization(&requests[1])).unwrap();
    assert_ne!(first.sig, second.sig);
    assert_eq!(first.tag_value("payload"), second.tag_value("payload"));
}

#[tokio::test]
async fn test_no_signer_makes_no_request() {
    let server = MockServer::start().await;
    mount_rpc(&server, "listbannedpubkeys", rpc_result(json!([]))).await;

    let client = RelayAdminClient::builder()
        .relay_url(&ws_url(&server))
        .build()
        .unwrap();

    let err = client.pubkeys().list_banned().await.unwrap_err();
    assert!(matches!(
        err,
        AdminError::Auth(AuthError::CapabilityUnavailable)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(
        &server,
        "listbannedpubkeys",
        ResponseTemplate::new(401).set_body_string("unauthorized"),
    )
    .await;

    let client = client_for(&server, &signer);
    let err = client.pubkeys().list_banned().await.unwrap_err();
    match err {
        AdminError::Http(HttpError::Status { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected HTTP status error, got: {other:?}"),
    }

    // POSTs are never retried.
    assert_eq!(requests_for(&server, "listbannedpubkeys").await.len(), 1);
}

#[tokio::test]
async fn test_envelope_error_surfaces_relay_message() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(
        &server,
        "banpubkey",
        ResponseTemplate::new(200).set_body_json(json!({ "error": "not authorized" })),
    )
    .await;

    let client = client_for(&server, &signer);
    let err = client.pubkeys().ban(PK_B, None).await.unwrap_err();
    assert!(matches!(&err, AdminError::Rpc(msg) if msg == "not authorized"));

    // No reload after a rejected mutation.
    assert!(requests_for(&server, "listbannedpubkeys").await.is_empty());

    let state = client.pubkeys().state().await;
    assert_eq!(state.notice().unwrap().text, "not authorized");
    assert!(!client.pubkeys().is_operating());
}

#[tokio::test]
async fn test_raw_call_passes_through_result() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(
        &server,
        "supportedmethods",
        rpc_result(json!(["supportedmethods", "banpubkey"])),
    )
    .await;

    let client = client_for(&server, &signer);
    let result = client.rpc().call("supportedmethods", vec![]).await.unwrap();
    assert_eq!(result, Some(json!(["supportedmethods", "banpubkey"])));

    let methods = client.relay().supported_methods().await.unwrap();
    assert_eq!(methods, vec!["supportedmethods", "banpubkey"]);
}

#[tokio::test]
async fn test_kinds_are_sent_as_numbers() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(&server, "allowkind", rpc_result(json!(true))).await;
    mount_rpc(&server, "listallowedkinds", rpc_result(json!([0, 1, 30023]))).await;

    let client = client_for(&server, &signer);
    client.kinds().allow(30023).await.unwrap();
    assert_eq!(client.kinds().list_allowed().await.unwrap(), vec![0, 1, 30023]);

    let sent = requests_for(&server, "allowkind").await;
    let body: Value = serde_json::from_slice(&sent[0].body).unwrap();
    assert_eq!(body["params"], json!([30023]));
}

#[tokio::test]
async fn test_block_ip_normalizes_address() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(&server, "blockip", rpc_result(json!(true))).await;

    let client = client_for(&server, &signer);
    client.ips().block(" 2001:DB8::0001 ", Some("abuse")).await.unwrap();

    let sent = requests_for(&server, "blockip").await;
    let body: Value = serde_json::from_slice(&sent[0].body).unwrap();
    assert_eq!(body["params"], json!(["2001:db8::1", "abuse"]));
}

#[tokio::test]
async fn test_relay_info_uses_nip11_accept_header() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("accept", "application/nostr+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Test Relay",
            "supported_nips": [1, 11, 86],
            "software": "git+https://example.com/relay",
            "limitation": { "auth_required": false }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, &signer);
    let info = client.relay().info().await.unwrap();

    assert_eq!(info.name.as_deref(), Some("Test Relay"));
    assert!(info.supports_management());
    assert!(info.extra.contains_key("limitation"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_list_from_previous_relay_is_discarded() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(
        &server,
        "listbannedpubkeys",
        rpc_result(json!([{ "pubkey": PK_A, "reason": "relay A ban" }]))
            .set_delay(Duration::from_millis(200)),
    )
    .await;

    let client = client_for(&server, &signer);
    let pending = {
        let client = client.clone();
        tokio::spawn(async move { client.pubkeys().list_banned().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.set_relay("wss://relay-b.example.com").await.unwrap();

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(AdminError::RelayChanged)));

    let state = client.pubkeys().state().await;
    assert!(state.banned().is_empty());
    assert!(!state.is_loaded());
}

#[tokio::test]
async fn test_mutation_does_not_reload_after_relay_switch() {
    let server = MockServer::start().await;
    let signer = Arc::new(KeySigner::generate());
    mount_rpc(
        &server,
        "banpubkey",
        rpc_result(json!(true)).set_delay(Duration::from_millis(200)),
    )
    .await;
    mount_rpc(&server, "listallowedpubkeys", rpc_result(json!([]))).await;
    mount_rpc(
        &server,
        "listbannedpubkeys",
        rpc_result(json!([{ "pubkey": PK_A }])),
    )
    .await;

    let client = client_for(&server, &signer);
    let pending = {
        let client = client.clone();
        tokio::spawn(async move { client.pubkeys().ban(PK_A, None).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.set_relay("wss://relay-b.example.com").await.unwrap();

    pending.await.unwrap().unwrap();
    assert_eq!(requests_for(&server, "banpubkey").await.len(), 1);
    assert!(requests_for(&server, "listallowedpubkeys").await.is_empty());
    assert!(requests_for(&server, "listbannedpubkeys").await.is_empty());

    let state = client.pubkeys().state().await;
    assert!(!state.is_loaded());
    assert!(state.notice().is_none());
    assert!(!client.pubkeys().is_operating());
}
