//! Live client tests against an in-process stand-in for the OAuth token
//! endpoint and the EDocs SOAP service.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use docbridge_core::xml::parse_document;
use docbridge_core::{
    AuthError, ClientError, DocumentClient, DocumentProcessor, EDocsClient, JobStatus,
    Orchestrator, OrchestratorConfig, ProcessorConfig, SourceConfig, SourceMode, UploadRequest,
};

const SOAP_PATH: &str = "/los/webservice/EDocsService.asmx";

/// A SOAP request as the stub saw it.
#[derive(Debug, Clone)]
struct SoapCall {
    action: String,
    operation: String,
    ticket: String,
    loan_number: Option<String>,
    content: Option<String>,
}

struct StubState {
    token_requests: AtomicUsize,
    expires_in: u64,
    fault_on_upload: bool,
    calls: Mutex<Vec<SoapCall>>,
}

impl StubState {
    fn calls(&self) -> Vec<SoapCall> {
        self.calls.lock().unwrap().clone()
    }
}

struct Stub {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl Stub {
    async fn start(expires_in: u64, fault_on_upload: bool) -> Self {
        let state = Arc::new(StubState {
            token_requests: AtomicUsize::new(0),
            expires_in,
            fault_on_upload,
            calls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/oauth/token", post(token))
            .route(SOAP_PATH, post(soap))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    fn config(&self, client_secret: &str) -> SourceConfig {
        SourceConfig {
            mode: SourceMode::Live,
            base_url: format!("http://{}/", self.addr),
            oauth_url: format!("http://{}/oauth/token", self.addr),
            client_id: "bridge-client".to_string(),
            client_secret: client_secret.to_string(),
            metadata_timeout_secs: 5,
            transfer_timeout_secs: 5,
            simulated_latency: false,
        }
    }

    fn client(&self) -> EDocsClient {
        EDocsClient::new(&self.config("s3cret")).unwrap()
    }

    fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }
}

async fn token(State(state): State<Arc<StubState>>, body: String) -> Response {
    let n = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;

    if !body.contains("grant_type=client_credentials") || !body.contains("client_secret=s3cret")
    {
        return (StatusCode::UNAUTHORIZED, "invalid_client").into_response();
    }

    Json(json!({
        "access_token": format!("tok-{}", n),
        "token_type": "Bearer",
        "expires_in": state.expires_in,
    }))
    .into_response()
}

async fn soap(State(state): State<Arc<StubState>>, headers: HeaderMap, body: String) -> Response {
    let action = headers
        .get("SOAPAction")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let operation = action
        .trim_matches('"')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();

    let envelope = parse_document(&body).unwrap();
    let param = |name: &str| envelope.find(name).map(|e| e.text().to_string());
    let loan_number = param("sLNm");
    state.calls.lock().unwrap().push(SoapCall {
        action,
        operation: operation.clone(),
        ticket: param("sTicket").unwrap_or_default(),
        loan_number: loan_number.clone(),
        content: param("sDataContent"),
    });

    let result = match operation.as_str() {
        "ListEdocsByLoanNumber" if loan_number.as_deref() == Some("EMPTY") => String::new(),
        "ListEdocsByLoanNumber" => "&lt;EDocs&gt;\
             &lt;EDoc docid=\"g-1\" doc_type=\"Appraisal\" folder_name=\"Collateral\" Size=\"2048\" /&gt;\
             &lt;EDoc docid=\"g-2\" doc_type=\"Credit Report\" folder_name=\"Credit\" /&gt;\
             &lt;/EDocs&gt;"
            .to_string(),
        "DownloadEdocsPdfById" => "JVBERi0xLjQK".to_string(),
        "UploadPDFDocument" if state.fault_on_upload => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                envelope_xml(
                    "<soap:Fault><faultcode>soap:Server</faultcode>\
                     <faultstring>Upload rejected</faultstring></soap:Fault>",
                ),
            )
                .into_response();
        }
        "UploadPDFDocument" => "OK".to_string(),
        _ => return (StatusCode::BAD_REQUEST, "unknown action").into_response(),
    };

    envelope_xml(&format!(
        "<{op}Response xmlns=\"http://www.lendersoffice.com/los/webservices/\">\
         <{op}Result>{result}</{op}Result></{op}Response>",
        op = operation,
        result = result
    ))
    .into_response()
}

fn envelope_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>{}</soap:Body></soap:Envelope>"#,
        body
    )
}

#[tokio::test]
async fn test_token_is_cached_across_calls() {
    let stub = Stub::start(14400, false).await;
    let client = stub.client();

    client.list_documents("LN-1").await.unwrap();
    client.list_documents("LN-1").await.unwrap();

    assert_eq!(stub.token_requests(), 1);
    let calls = stub.state.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.ticket == "Bearer tok-1"));
}

#[tokio::test]
async fn test_short_lived_token_is_refreshed() {
    // Lifetime inside the refresh margin: every use fetches a new token
    let stub = Stub::start(60, false).await;
    let client = stub.client();

    client.list_documents("LN-1").await.unwrap();
    client.list_documents("LN-1").await.unwrap();

    assert_eq!(stub.token_requests(), 2);
    let tickets: Vec<String> = stub.state.calls().into_iter().map(|c| c.ticket).collect();
    assert_eq!(tickets, vec!["Bearer tok-1", "Bearer tok-2"]);
}

#[tokio::test]
async fn test_authenticate_reports_token_details() {
    let stub = Stub::start(14400, false).await;

    let outcome = stub.client().authenticate().await.unwrap();

    assert_eq!(outcome.token_type, "Bearer");
    assert_eq!(outcome.expires_in, Some(14400));
}

#[tokio::test]
async fn test_rejected_secret_is_credential_error() {
    let stub = Stub::start(14400, false).await;
    let client = EDocsClient::new(&stub.config("wrong")).unwrap();

    let result = client.authenticate().await;

    assert!(matches!(
        result,
        Err(ClientError::Auth(AuthError::InvalidCredentials(_)))
    ));
    assert!(stub.state.calls().is_empty());
}

#[tokio::test]
async fn test_list_download_and_upload() {
    let stub = Stub::start(14400, false).await;
    let client = stub.client();

    let documents = client.list_documents("LN-42").await.unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].guid, "g-1");
    assert_eq!(documents[0].doc_type, "Appraisal");
    assert_eq!(documents[0].size, 2048);
    assert_eq!(documents[1].folder, "Credit");

    let downloaded = client.download_document(&documents[0]).await.unwrap();
    assert_eq!(downloaded.guid, "g-1");
    assert_eq!(downloaded.content, "JVBERi0xLjQK");

    let receipt = client
        .upload_document(&UploadRequest {
            loan_number: "LN-42".to_string(),
            document_type: "Processed - Appraisal".to_string(),
            content: "c3RhbXA=JVBERi0xLjQK".to_string(),
            notes: "Processed by test".to_string(),
        })
        .await
        .unwrap();
    assert!(receipt.success);
    assert_eq!(receipt.result, "OK");

    let calls = stub.state.calls();
    let operations: Vec<&str> = calls.iter().map(|c| c.operation.as_str()).collect();
    assert_eq!(
        operations,
        vec!["ListEdocsByLoanNumber", "DownloadEdocsPdfById", "UploadPDFDocument"]
    );
    assert_eq!(
        calls[0].action,
        "\"http://www.lendersoffice.com/los/webservices/ListEdocsByLoanNumber\""
    );
    assert_eq!(calls[2].content.as_deref(), Some("c3RhbXA=JVBERi0xLjQK"));
}

#[tokio::test]
async fn test_empty_list_is_not_an_error() {
    let stub = Stub::start(14400, false).await;

    let documents = stub.client().list_documents("EMPTY").await.unwrap();

    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_soap_fault_is_upstream_error() {
    let stub = Stub::start(14400, true).await;

    let result = stub
        .client()
        .upload_document(&UploadRequest {
            loan_number: "LN-1".to_string(),
            document_type: "Processed - Note".to_string(),
            content: "eA==".to_string(),
            notes: String::new(),
        })
        .await;

    match result {
        Err(ClientError::Upstream(message)) => assert!(message.contains("Upload rejected")),
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ticket_override_bypasses_oauth() {
    let stub = Stub::start(14400, false).await;
    let client = stub.client();
    let ticket = r#"<GENERIC_FRAMEWORK_USER_TICKET EncryptedTicket="abc" />"#;

    assert!(client.install_credential_override(ticket));
    client.list_documents("LN-7").await.unwrap();
    client.clear_credential_override();
    client.list_documents("LN-7").await.unwrap();

    assert_eq!(stub.token_requests(), 1);
    let tickets: Vec<String> = stub.state.calls().into_iter().map(|c| c.ticket).collect();
    assert_eq!(tickets, vec![ticket.to_string(), "Bearer tok-1".to_string()]);
}

#[tokio::test]
async fn test_orchestrator_runs_against_live_client() {
    let stub = Stub::start(14400, false).await;
    let orchestrator = Orchestrator::new(
        OrchestratorConfig::default(),
        Arc::new(stub.client()),
        DocumentProcessor::new(ProcessorConfig {
            delay_ms: 0,
            ..Default::default()
        }),
    );

    let job = orchestrator.run("LN-900").await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.documents_received, Some(2));
    assert_eq!(job.documents_returned, Some(2));

    let uploads: Vec<_> = stub
        .state
        .calls()
        .into_iter()
        .filter(|c| c.operation == "UploadPDFDocument")
        .collect();
    assert_eq!(uploads.len(), 2);
    assert!(uploads
        .iter()
        .all(|c| c.loan_number.as_deref() == Some("LN-900")));
    // Stamped content still ends with the downloaded payload
    assert!(uploads
        .iter()
        .all(|c| c.content.as_deref().unwrap().ends_with("JVBERi0xLjQK")));

}
