//! Destinations for validated records.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde_json::{Value, json};
use tracing::{debug, info};

use intake_core::models::config::{CrmConfig, CrmTransport};
use intake_core::models::crm::CrmPayload;

/// Where `sync` sends records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SinkKind {
    /// POST each payload to the workflow webhook
    Webhook,
    /// Create company, contact and activity through the CRM REST API
    Direct,
    /// Append payloads to a JSON-lines file without any network access
    DryRun,
}

impl From<CrmTransport> for SinkKind {
    fn from(transport: CrmTransport) -> Self {
        match transport {
            CrmTransport::Webhook => SinkKind::Webhook,
            CrmTransport::Direct => SinkKind::Direct,
        }
    }
}

/// A configured record sink.
pub enum Sink {
    Webhook(WebhookSink),
    Direct(DirectSink),
    File(FileSink),
}

impl Sink {
    /// Build the sink of the requested kind from CRM configuration.
    pub fn from_config(
        kind: SinkKind,
        config: &CrmConfig,
        dry_run_path: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        match kind {
            SinkKind::Webhook => {
                let url = config
                    .webhook_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("Webhook URL not configured (crm.webhook_url)"))?;
                Ok(Sink::Webhook(WebhookSink::new(url, timeout(config))?))
            }
            SinkKind::Direct => {
                let base_url = config
                    .api_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("CRM API URL not configured (crm.api_url)"))?;
                Ok(Sink::Direct(DirectSink::new(
                    base_url,
                    config.api_key.clone(),
                    timeout(config),
                )?))
            }
            SinkKind::DryRun => {
                let path = dry_run_path.unwrap_or_else(|| PathBuf::from("crm-dry-run.jsonl"));
                Ok(Sink::File(FileSink::new(path)))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sink::Webhook(_) => "webhook",
            Sink::Direct(_) => "direct",
            Sink::File(_) => "dry-run",
        }
    }

    /// Deliver one payload.
    pub async fn submit(&self, payload: &CrmPayload) -> anyhow::Result<()> {
        match self {
            Sink::Webhook(sink) => sink.submit(payload).await,
            Sink::Direct(sink) => sink.submit(payload).await,
            Sink::File(sink) => sink.submit(payload),
        }
    }

    /// Test the connection without submitting a record.
    pub async fn check(&self) -> anyhow::Result<String> {
        match self {
            Sink::Webhook(sink) => sink.check().await,
            Sink::Direct(sink) => sink.check().await,
            Sink::File(sink) => Ok(format!("writing to {}", sink.path.display())),
        }
    }
}

fn timeout(config: &CrmConfig) -> Duration {
    Duration::from_secs(config.timeout_secs)
}

fn client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Workflow webhook receiving the whole payload.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: client(timeout)?,
            url,
        })
    }

    async fn submit(&self, payload: &CrmPayload) -> anyhow::Result<()> {
        info!("Sending {} to webhook", payload.company.name);

        self.client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timeout - the workflow may still be processing")
                } else {
                    anyhow::anyhow!("Failed to send to webhook: {}", e)
                }
            })?;

        Ok(())
    }

    async fn check(&self) -> anyhow::Result<String> {
        let ping = json!({
            "test": true,
            "timestamp": chrono::Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S").to_string(),
            "message": "Connection test from consultation intake",
        });

        let response = self.client.post(&self.url).json(&ping).send().await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            anyhow::bail!("Webhook answered {}", status);
        }
        Ok(format!("webhook answered {}", status))
    }
}

/// CRM REST API: one company, one contact and one activity per record.
pub struct DirectSink {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl DirectSink {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// POST one resource and return the id the CRM assigned to it.
    async fn create(&self, resource: &str, body: &Value) -> anyhow::Result<String> {
        let url = format!("{}/{}", self.base_url, resource);
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| anyhow::anyhow!("Failed to send to CRM ({}): {}", resource, e))?;

        let created: Value = response
            .json()
            .await
            .with_context(|| format!("CRM returned an unreadable {} response", resource))?;
        let id = created
            .get("id")
            .and_then(id_string)
            .ok_or_else(|| anyhow::anyhow!("CRM response for {} carries no id", resource))?;

        debug!("Created {} {}", resource, id);
        Ok(id)
    }

    async fn submit(&self, payload: &CrmPayload) -> anyhow::Result<()> {
        info!("Creating CRM records for {}", payload.company.name);

        // Contact and activity are linked by id, so each step needs the one before it.
        let company_id = self
            .create("companies", &serde_json::to_value(&payload.company)?)
            .await?;

        let mut contact = serde_json::to_value(&payload.contact)?;
        contact["companyId"] = json!(company_id);
        let contact_id = self.create("contacts", &contact).await?;

        let mut activity = serde_json::to_value(&payload.consultation)?;
        activity["companyId"] = json!(company_id);
        activity["contactId"] = json!(contact_id);
        self.create("activities", &activity).await?;

        Ok(())
    }

    async fn check(&self) -> anyhow::Result<String> {
        let mut request = self.client.get(format!("{}/health", self.base_url));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let status = request.send().await?.status();
        if status.is_client_error() || status.is_server_error() {
            anyhow::bail!("CRM API answered {}", status);
        }
        Ok(format!("CRM API answered {}", status))
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Appends one JSON payload per line to a local file.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn submit(&self, payload: &CrmPayload) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        writeln!(file, "{}", serde_json::to_string(payload)?)?;
        debug!("Wrote {} to {}", payload.company.name, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use intake_core::{FormExtractor, FormParser};
    use intake_core::models::config::IntakeConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Requests = Arc<Mutex<Vec<(String, Value)>>>;

    /// Local CRM stand-in answering every request with `200` and `body`.
    async fn crm_server(body: &'static str) -> (String, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests: Requests = Arc::default();
        let log = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                let header_end = loop {
                    let n = stream.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        return;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                };

                let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
                let length = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                while buf.len() < header_end + length {
                    let n = stream.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                let request_line = head.lines().next().unwrap_or_default().to_string();
                let request_body = serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null);
                log.lock().unwrap().push((request_line, request_body));

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
            }
        });

        (base_url, requests)
    }

    fn acme_payload() -> CrmPayload {
        let parser = FormParser::from_config(&IntakeConfig::default());
        let parsed = parser
            .extract_from_text("Business Name: Acme Co\nContact Name: Ana Lopez\nSession Date: 07/08/2025")
            .unwrap();
        CrmPayload::from_record(&parsed.record, chrono::Local::now().naive_local())
    }

    fn request_lines(requests: &Requests) -> Vec<String> {
        requests.lock().unwrap().iter().map(|(line, _)| line.clone()).collect()
    }

    #[tokio::test]
    async fn test_direct_sink_links_created_ids() {
        let (base_url, requests) = crm_server(r#"{"id": 41}"#).await;
        let sink = DirectSink::new(base_url, None, Duration::from_secs(5)).unwrap();

        sink.submit(&acme_payload()).await.unwrap();

        let lines = request_lines(&requests);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("POST /companies "));
        assert!(lines[1].starts_with("POST /contacts "));
        assert!(lines[2].starts_with("POST /activities "));

        let requests = requests.lock().unwrap();
        assert_eq!(requests[1].1["companyId"], "41");
        assert_eq!(requests[2].1["contactId"], "41");
    }

    #[tokio::test]
    async fn test_direct_sink_stops_on_unreadable_response() {
        let (base_url, requests) = crm_server("").await;
        let sink = DirectSink::new(base_url, None, Duration::from_secs(5)).unwrap();

        let err = sink.submit(&acme_payload()).await.unwrap_err();

        assert!(err.to_string().contains("unreadable companies response"));
        assert_eq!(request_lines(&requests).len(), 1);
    }

    #[tokio::test]
    async fn test_direct_sink_stops_without_company_id() {
        let (base_url, requests) = crm_server(r#"{"name": "Acme Co"}"#).await;
        let sink = DirectSink::new(base_url, None, Duration::from_secs(5)).unwrap();

        let err = sink.submit(&acme_payload()).await.unwrap_err();

        assert!(err.to_string().contains("companies carries no id"));
        assert_eq!(request_lines(&requests).len(), 1);
    }

    #[test]
    fn test_file_sink_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("nested").join("crm.jsonl"));
        let payload = acme_payload();

        sink.submit(&payload).unwrap();
        sink.submit(&payload).unwrap();

        let written = fs::read_to_string(&sink.path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["company"]["name"], "Acme Co");
    }
}
