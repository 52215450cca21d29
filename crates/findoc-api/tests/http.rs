use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use findoc_core::{AnalyzerError, DEFAULT_QUERY, GenerationBackend, INVESTMENT_INSIGHT_POLICY};
use tempfile::TempDir;

use findoc_api::config::AppConfig;
use findoc_api::routes::build_router;
use findoc_api::state::AppState;

const FINAL_PAYLOAD: &str = r#"{"revenue_analysis":"A","profitability_analysis":"B","cash_flow_analysis":"C","risk_assessment":"D","investment_insight":"buy now"}"#;

struct ScriptedBackend {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedBackend {
    fn replying(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, AnalyzerError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AnalyzerError::Backend("script exhausted".to_string()))
    }
}

struct TestHarness {
    server: TestServer,
    _dirs: (TempDir, TempDir),
    upload_dir: std::path::PathBuf,
    output_dir: std::path::PathBuf,
}

fn harness(backend: Arc<ScriptedBackend>) -> TestHarness {
    let upload = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let config = AppConfig {
        listen_addr: "127.0.0.1:0".into(),
        upload_dir: upload.path().to_path_buf(),
        output_dir: output.path().to_path_buf(),
    };

    let state = AppState::with_backend(&config, backend);
    let server = TestServer::new(build_router(state)).unwrap();

    TestHarness {
        server,
        upload_dir: upload.path().to_path_buf(),
        output_dir: output.path().to_path_buf(),
        _dirs: (upload, output),
    }
}

fn dir_entries(dir: &Path) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

/// Small but structurally valid single-chain PDF; xref offsets are computed
/// from the serialized bytes so the file parses without recovery.
fn minimal_pdf(text: &str) -> Vec<u8> {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)");
    let stream = format!("BT /F1 12 Tf 72 720 Td ({escaped}) Tj ET");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [4 0 R] /Count 1 >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 3 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", idx + 1, body));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    out.into_bytes()
}

fn pdf_form(file_name: &str, bytes: Vec<u8>, query: Option<&str>) -> MultipartForm {
    let part = Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_type("application/pdf");
    let mut form = MultipartForm::new().add_part("file", part);
    if let Some(query) = query {
        form = form.add_text("query", query.to_string());
    }
    form
}

#[tokio::test]
async fn root_reports_service_running() {
    let harness = harness(ScriptedBackend::replying(&[]));

    let response = harness.server.get("/").await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["message"], "Financial Document Analyzer API is running");
}

#[tokio::test]
async fn health_live_reports_ok() {
    let harness = harness(ScriptedBackend::replying(&[]));

    let response = harness.server.get("/health/live").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<serde_json::Value>()["status"], "ok");
}

#[tokio::test]
async fn non_pdf_filename_is_rejected() {
    let harness = harness(ScriptedBackend::replying(&[]));

    let response = harness
        .server
        .post("/analyze")
        .multipart(pdf_form("report.txt", b"plain text".to_vec(), None))
        .await;

    assert_eq!(response.status_code(), 400);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"], "Only PDF uploads are supported.");
    assert!(dir_entries(&harness.upload_dir).is_empty());
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let harness = harness(ScriptedBackend::replying(&[]));

    let response = harness
        .server
        .post("/analyze")
        .multipart(pdf_form("empty.pdf", Vec::new(), None))
        .await;

    assert_eq!(response.status_code(), 400);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"], "Uploaded file is empty.");
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let harness = harness(ScriptedBackend::replying(&[]));

    let form = MultipartForm::new().add_text("query", "where is the file?");
    let response = harness.server.post("/analyze").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"], "A PDF file upload is required.");
}

#[tokio::test]
async fn successful_analysis_overrides_investment_insight() {
    let backend = ScriptedBackend::replying(&["EVIDENCE", "SECTIONS", "RISKS", FINAL_PAYLOAD]);
    let harness = harness(backend);

    let response = harness
        .server
        .post("/analyze")
        .multipart(pdf_form(
            "report.pdf",
            minimal_pdf("Total revenue was 10.2 million in fiscal 2024"),
            Some("How did revenue develop?"),
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["status"], "success");
    assert_eq!(body["analysis"]["revenue_analysis"], "A");
    assert_eq!(body["analysis"]["profitability_analysis"], "B");
    assert_eq!(body["analysis"]["cash_flow_analysis"], "C");
    assert_eq!(body["analysis"]["risk_assessment"], "D");
    assert_eq!(
        body["analysis"]["investment_insight"],
        INVESTMENT_INSIGHT_POLICY
    );

    // The uploaded temp file is gone once the response is produced.
    assert!(dir_entries(&harness.upload_dir).is_empty());

    // One analysis record was persisted, matching the response.
    let outputs = dir_entries(&harness.output_dir);
    assert_eq!(outputs.len(), 1);
    let output_file = body["output_file"].as_str().unwrap();
    assert_eq!(Path::new(output_file), outputs[0].as_path());

    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&outputs[0]).unwrap()).unwrap();
    assert_eq!(record["file_name"], "report.pdf");
    assert_eq!(record["query"], "How did revenue develop?");
    assert_eq!(
        record["analysis"]["investment_insight"],
        INVESTMENT_INSIGHT_POLICY
    );
    assert!(record["generated_at_utc"].is_string());
}

#[tokio::test]
async fn blank_query_falls_back_to_default() {
    let backend = ScriptedBackend::replying(&["EVIDENCE", "SECTIONS", "RISKS", FINAL_PAYLOAD]);
    let harness = harness(backend);

    let response = harness
        .server
        .post("/analyze")
        .multipart(pdf_form(
            "report.pdf",
            minimal_pdf("Net income rose"),
            Some("   "),
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    let outputs = dir_entries(&harness.output_dir);
    let record: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&outputs[0]).unwrap()).unwrap();
    assert_eq!(record["query"], DEFAULT_QUERY);
}

#[tokio::test]
async fn malformed_final_output_yields_422() {
    let backend = ScriptedBackend::replying(&["EVIDENCE", "SECTIONS", "RISKS", "not json"]);
    let harness = harness(backend);

    let response = harness
        .server
        .post("/analyze")
        .multipart(pdf_form(
            "report.pdf",
            minimal_pdf("Net income rose"),
            None,
        ))
        .await;

    assert_eq!(response.status_code(), 422);
    let body = response.json::<serde_json::Value>();
    assert!(
        body["error"].as_str().unwrap().contains("not valid JSON"),
        "unexpected error body: {body}"
    );

    // Cleanup happens on the failure path too.
    assert!(dir_entries(&harness.upload_dir).is_empty());
    assert!(dir_entries(&harness.output_dir).is_empty());
}

#[tokio::test]
async fn backend_failure_yields_500() {
    // Script exhausted on the first call: the pipeline aborts mid-run.
    let backend = ScriptedBackend::replying(&[]);
    let harness = harness(backend);

    let response = harness
        .server
        .post("/analyze")
        .multipart(pdf_form(
            "report.pdf",
            minimal_pdf("Net income rose"),
            None,
        ))
        .await;

    assert_eq!(response.status_code(), 500);
    let body = response.json::<serde_json::Value>();
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Internal processing error"));
    assert!(message.contains("verification"));
    assert!(dir_entries(&harness.upload_dir).is_empty());
}
