//! Orchestrator lifecycle integration tests.
//!
//! These tests drive complete jobs through the orchestrator against a mock
//! document service: authenticate -> receive -> process -> return.

use std::sync::Arc;
use std::time::Duration;

use docbridge_core::testing::{fixtures, MockDocumentClient, MockFailure, MockOperation};
use docbridge_core::{
    DocumentProcessor, JobMode, JobStatus, Orchestrator, OrchestratorConfig, OrchestratorError,
    ProcessorConfig, StepName, StepStatus,
};

/// Test helper wiring an orchestrator to a mock client.
struct TestHarness {
    client: Arc<MockDocumentClient>,
    orchestrator: Arc<Orchestrator>,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_client(MockDocumentClient::new())
    }

    fn with_client(client: MockDocumentClient) -> Self {
        let client = Arc::new(client);
        let config = OrchestratorConfig {
            upload_auth_delay_ms: 0,
            upload_receive_delay_ms: 0,
            history_limit: 0,
        };
        let processor = DocumentProcessor::new(ProcessorConfig {
            delay_ms: 0,
            ..Default::default()
        });
        let orchestrator = Arc::new(Orchestrator::new(config, client.clone(), processor));
        Self {
            client,
            orchestrator,
        }
    }

    /// Poll status until no job is running.
    async fn wait_idle(&self) {
        for _ in 0..200 {
            if !self.orchestrator.status().await.running {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job did not finish in time");
    }
}

#[tokio::test]
async fn test_successful_job_runs_all_steps() {
    let harness = TestHarness::new();

    let job = harness.orchestrator.run("LN-100").await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.mode, JobMode::Live);
    assert_eq!(job.loan_number, "LN-100");
    assert_eq!(job.documents_received, Some(2));
    assert_eq!(job.documents_processed, Some(2));
    assert_eq!(job.documents_returned, Some(2));
    assert!(job.error.is_none());
    assert!(job.completed_at.is_some());
    assert!(job.duration.is_some());

    let steps: Vec<_> = job.steps.iter().collect();
    assert_eq!(steps.len(), 4);
    let names: Vec<_> = steps.iter().map(|s| s.name).collect();
    assert_eq!(
        names,
        vec![
            StepName::Authenticate,
            StepName::Receive,
            StepName::Process,
            StepName::Return
        ]
    );
    assert!(steps.iter().all(|s| s.status == StepStatus::Completed));
}

#[tokio::test]
async fn test_uploads_carry_processed_content() {
    let harness = TestHarness::new();
    harness.orchestrator.run("LN-100").await.unwrap();

    let uploads = harness.client.uploads().await;
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].loan_number, "LN-100");
    assert_eq!(uploads[0].document_type, "Processed - Appraisal");
    assert_eq!(uploads[1].document_type, "Processed - Credit Report");
    assert!(uploads[0].content.ends_with("JVBERi0-doc-1"));
    assert!(uploads[0]
        .notes
        .starts_with("Processed by DocBridge-DocumentEngine at "));
}

#[tokio::test]
async fn test_empty_document_list_completes_with_zero_counts() {
    let harness = TestHarness::new();
    harness.client.set_documents(vec![]).await;

    let job = harness.orchestrator.run("LN-EMPTY").await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.documents_received, Some(0));
    assert_eq!(job.documents_processed, Some(0));
    assert_eq!(job.documents_returned, Some(0));
    assert!(harness.client.uploads().await.is_empty());
}

#[tokio::test]
async fn test_authentication_failure_fails_first_step() {
    let harness = TestHarness::new();
    harness
        .client
        .fail_on(
            MockOperation::Authenticate,
            MockFailure::Credential("client secret rejected".into()),
        )
        .await;

    let job = harness.orchestrator.run("LN-1").await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.steps.len(), 1);
    let step = job.steps.get(StepName::Authenticate).unwrap();
    assert_eq!(step.status, StepStatus::Failed);
    assert!(step.message.contains("client secret rejected"));
    assert_eq!(job.error.as_deref(), Some(step.message.as_str()));
    assert!(job.documents_received.is_none());
    assert!(job.completed_at.is_some());
}

#[tokio::test]
async fn test_download_failure_stops_at_receive() {
    let harness = TestHarness::new();
    harness
        .client
        .fail_on(MockOperation::DownloadDocument, MockFailure::Timeout)
        .await;

    let job = harness.orchestrator.run("LN-1").await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.steps.len(), 2);
    assert_eq!(
        job.steps.get(StepName::Authenticate).unwrap().status,
        StepStatus::Completed
    );
    assert_eq!(
        job.steps.get(StepName::Receive).unwrap().status,
        StepStatus::Failed
    );
    assert!(job.error.unwrap().contains("timed out"));
    assert!(harness.client.uploads().await.is_empty());
}

#[tokio::test]
async fn test_upload_failure_fails_return_step() {
    let harness = TestHarness::new();
    harness
        .client
        .fail_on(
            MockOperation::UploadDocument,
            MockFailure::Upstream("disk full".into()),
        )
        .await;

    let job = harness.orchestrator.run("LN-1").await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.steps.len(), 4);
    assert_eq!(
        job.steps.get(StepName::Return).unwrap().status,
        StepStatus::Failed
    );
    assert_eq!(job.documents_processed, Some(2));
    assert!(job.documents_returned.is_none());
}

#[tokio::test]
async fn test_concurrent_run_is_rejected_with_conflict() {
    let harness = TestHarness::new();
    harness.client.set_delay(Duration::from_millis(50)).await;

    let (first, second) = tokio::join!(
        harness.orchestrator.run("LN-A"),
        harness.orchestrator.run("LN-B")
    );

    let job = first.unwrap();
    match second {
        Err(OrchestratorError::Conflict { job_id }) => assert_eq!(job_id, job.id),
        other => panic!("expected conflict, got {:?}", other.map(|j| j.id)),
    }
    assert_eq!(harness.orchestrator.history().await.len(), 1);
}

#[tokio::test]
async fn test_slot_is_released_after_failure() {
    let harness = TestHarness::new();
    harness
        .client
        .fail_on(MockOperation::ListDocuments, MockFailure::Upstream("boom".into()))
        .await;
    let failed = harness.orchestrator.run("LN-1").await.unwrap();
    assert_eq!(failed.status, JobStatus::Failed);

    harness.client.clear_failures().await;
    let ok = harness.orchestrator.run("LN-1").await.unwrap();
    assert_eq!(ok.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_missing_loan_number_is_validation_error() {
    let harness = TestHarness::new();

    let result = harness.orchestrator.run("   ").await;

    assert!(matches!(result, Err(OrchestratorError::Validation(_))));
    assert!(harness.orchestrator.history().await.is_empty());
    assert!(harness.client.calls().await.is_empty());
}

#[tokio::test]
async fn test_status_and_history() {
    let harness = TestHarness::new();

    let idle = harness.orchestrator.status().await;
    assert!(!idle.running);
    assert!(idle.job.is_none());

    let first = harness.orchestrator.run("LN-1").await.unwrap();
    let second = harness.orchestrator.run("LN-2").await.unwrap();

    let status = harness.orchestrator.status().await;
    assert!(!status.running);
    assert_eq!(status.job.unwrap().id, second.id);

    let history = harness.orchestrator.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].id, first.id);
}

#[tokio::test]
async fn test_status_reports_running_job() {
    let harness = TestHarness::new();
    harness.client.set_delay(Duration::from_millis(30)).await;

    let job_id = harness
        .orchestrator
        .start_with_credential("LN-1", None)
        .await
        .unwrap();

    let status = harness.orchestrator.status().await;
    assert!(status.running);
    let job = status.job.unwrap();
    assert_eq!(job.id, job_id);
    assert!(!job.status.is_terminal());

    harness.wait_idle().await;
}

#[tokio::test]
async fn test_history_limit_discards_oldest() {
    let client = Arc::new(MockDocumentClient::new());
    let orchestrator = Orchestrator::new(
        OrchestratorConfig {
            upload_auth_delay_ms: 0,
            upload_receive_delay_ms: 0,
            history_limit: 2,
        },
        client,
        DocumentProcessor::new(ProcessorConfig {
            delay_ms: 0,
            ..Default::default()
        }),
    );

    for loan in ["LN-1", "LN-2", "LN-3"] {
        orchestrator.run(loan).await.unwrap();
    }

    let history = orchestrator.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].loan_number, "LN-3");
    assert_eq!(history[1].loan_number, "LN-2");
}

#[tokio::test]
async fn test_credential_override_used_for_one_job_only() {
    let harness = TestHarness::new();

    let job = harness
        .orchestrator
        .run_with_credential("LN-1", Some("<TICKET/>".to_string()))
        .await
        .unwrap();

    assert_eq!(job.mode, JobMode::TicketLaunched);
    assert_eq!(job.status, JobStatus::Completed);
    let ticket_calls = harness.client.calls().await;
    assert!(!ticket_calls.is_empty());
    assert!(ticket_calls.iter().all(|c| c.credential == "<TICKET/>"));
    assert!(harness.client.active_override().is_none());

    let next = harness.orchestrator.run("LN-2").await.unwrap();
    assert_eq!(next.mode, JobMode::Live);
    let calls = harness.client.calls().await;
    assert!(calls[ticket_calls.len()..]
        .iter()
        .all(|c| c.credential == docbridge_core::testing::MOCK_DEFAULT_CREDENTIAL));
}

#[tokio::test]
async fn test_override_cleared_after_failed_job() {
    let harness = TestHarness::new();
    harness
        .client
        .fail_on(MockOperation::ListDocuments, MockFailure::Upstream("bad ticket".into()))
        .await;

    let job = harness
        .orchestrator
        .run_with_credential("LN-1", Some("<TICKET/>".to_string()))
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert!(harness.client.active_override().is_none());
}

#[tokio::test]
async fn test_override_not_installed_on_conflict() {
    let harness = TestHarness::new();
    harness.client.set_delay(Duration::from_millis(30)).await;

    harness
        .orchestrator
        .start_with_credential("LN-1", Some("first".to_string()))
        .await
        .unwrap();
    let conflict = harness
        .orchestrator
        .start_with_credential("LN-2", Some("second".to_string()))
        .await;

    assert!(matches!(conflict, Err(OrchestratorError::Conflict { .. })));
    assert_eq!(harness.client.override_history(), vec!["first".to_string()]);
    assert_eq!(harness.client.active_override().as_deref(), Some("first"));

    harness.wait_idle().await;
    assert!(harness.client.active_override().is_none());
}

#[tokio::test]
async fn test_ignored_override_keeps_default_mode() {
    let harness = TestHarness::with_client(MockDocumentClient::simulated());

    let job = harness
        .orchestrator
        .run_with_credential("LN-1", Some("ticket".to_string()))
        .await
        .unwrap();

    assert_eq!(job.mode, JobMode::Simulated);
    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_supplied_documents_skip_fetch() {
    let harness = TestHarness::new();
    let documents = vec![
        fixtures::document("w2.pdf", "Upload"),
        fixtures::document("paystub.pdf", "Upload"),
    ];

    let job = harness
        .orchestrator
        .run_with_documents("UPLOAD-TEST", documents)
        .await
        .unwrap();

    assert_eq!(job.mode, JobMode::DocumentUpload);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.documents_received, Some(2));
    assert_eq!(job.uploaded_files.len(), 2);
    assert_eq!(job.uploaded_files[0].name, "w2.pdf");
    assert_eq!(job.processing_results.len(), 2);
    assert_eq!(job.processing_results[1].name, "PROCESSED_paystub.pdf");

    let receive = job.steps.get(StepName::Receive).unwrap();
    assert!(receive.message.contains("w2.pdf, paystub.pdf"));

    assert!(harness
        .client
        .calls_for(MockOperation::ListDocuments)
        .await
        .is_empty());
    assert!(harness
        .client
        .calls_for(MockOperation::Authenticate)
        .await
        .is_empty());
    assert_eq!(harness.client.uploads().await.len(), 2);
}

#[tokio::test]
async fn test_supplied_documents_require_at_least_one() {
    let harness = TestHarness::new();
    let result = harness
        .orchestrator
        .run_with_documents("UPLOAD-TEST", vec![])
        .await;
    assert!(matches!(result, Err(OrchestratorError::Validation(_))));
}

#[tokio::test]
async fn test_auth_check_reports_outcome() {
    let harness = TestHarness::new();
    let ok = harness.orchestrator.test_auth().await;
    assert!(ok.success);
    assert_eq!(ok.token_type.as_deref(), Some("Bearer"));

    harness
        .client
        .fail_on(MockOperation::Authenticate, MockFailure::Credential("nope".into()))
        .await;
    let failed = harness.orchestrator.test_auth().await;
    assert!(!failed.success);
    assert_eq!(failed.error.as_deref(), Some("Invalid credentials: nope"));
}
