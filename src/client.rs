use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::analysis::AnalysisResult;
use crate::error::{CheckError, GENERIC_FAILURE, UNREACHABLE};

const ANALYZE_PATH: &str = "/api/analyze";

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
}

/// Client for the upstream analysis service.
///
/// No timeout is set: a check surfaces whatever the upstream eventually does.
#[derive(Clone)]
pub struct AnalyzeClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AnalyzeClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, CheckError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest { text })
            .send()
            .await
            .map_err(|e| {
                warn!("[aichecking] Upstream request to {} failed: {:?}", self.endpoint, e);
                CheckError::Transport {
                    status: None,
                    message: UNREACHABLE.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!("[aichecking] Reading upstream response body failed: {:?}", e);
            CheckError::Transport {
                status: Some(status.as_u16()),
                message: GENERIC_FAILURE.to_string(),
            }
        })?;

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| GENERIC_FAILURE.to_string());
            warn!("[aichecking] Upstream returned {}: {}", status, message);
            return Err(CheckError::Transport {
                status: Some(status.as_u16()),
                message,
            });
        }

        let result: AnalysisResult = serde_json::from_slice(&body).map_err(|e| {
            warn!("[aichecking] Upstream returned a malformed analysis result: {}", e);
            CheckError::MalformedResponse(e.to_string())
        })?;

        info!(
            "[aichecking] Upstream analysis: {} ({:.2}), {} sentences",
            result.label,
            result.score,
            result.sentence_scores.len()
        );
        Ok(result)
    }
}

/// The `detail` string of an error body, if it has one.
fn error_detail(body: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(body).ok()?;
    json.get("detail")
        .and_then(|d| d.as_str())
        .filter(|d| !d.trim().is_empty())
        .map(str::to_string)
}

/// Whether a request `Host` names a loopback or development host.
pub fn is_loopback_host(host: &str) -> bool {
    let name = host_name(host).to_ascii_lowercase();
    matches!(name.as_str(), "localhost" | "127.0.0.1" | "::1" | "0.0.0.0")
}

/// Base URL for the analysis service: empty (same origin) on loopback hosts,
/// the production origin everywhere else.
pub fn resolve_base_url<'a>(host: &str, production_origin: &'a str) -> &'a str {
    if is_loopback_host(host) {
        ""
    } else {
        production_origin
    }
}

/// Strip the port (and IPv6 brackets) from a `host[:port]` string.
fn host_name(host: &str) -> &str {
    let host = host.trim();
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    if host.matches(':').count() == 1 {
        host.split(':').next().unwrap_or(host)
    } else {
        host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn analysis_body() -> Value {
        json!({
            "score": 80.0,
            "label": "AI-generated",
            "confidence": "high",
            "metrics": {
                "perplexity": 12.34,
                "perplexity_score": 90.0,
                "burstiness": 0.123,
                "burstiness_score": 85.0,
                "repetition": 0.045,
                "repetition_score": 20.0
            },
            "sentence_scores": [{"text": "Hello world.", "score": 95.0}],
            "is_reliable": true
        })
    }

    #[tokio::test]
    async fn test_analyze_posts_json_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"text": "Some text to analyze."})))
            .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnalyzeClient::new(&format!("{}/", server.uri())).unwrap();
        assert_eq!(client.endpoint(), format!("{}/api/analyze", server.uri()));

        let result = client.analyze("Some text to analyze.").await.unwrap();
        assert_eq!(result.label, "AI-generated");
        assert_eq!(result.sentence_scores.len(), 1);
    }

    #[tokio::test]
    async fn test_error_detail_is_surfaced_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"detail": "No valid sentences found in text"})),
            )
            .mount(&server)
            .await;

        let client = AnalyzeClient::new(&server.uri()).unwrap();
        let err = client.analyze("..........").await.unwrap_err();
        assert_eq!(
            err,
            CheckError::Transport {
                status: Some(400),
                message: "No valid sentences found in text".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_non_string_detail_falls_back_to_generic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [{"loc": ["body", "text"], "msg": "too short"}]
            })))
            .mount(&server)
            .await;

        let client = AnalyzeClient::new(&server.uri()).unwrap();
        let err = client.analyze("short text here").await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_unparseable_error_body_falls_back_to_generic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let client = AnalyzeClient::new(&server.uri()).unwrap();
        let err = client.analyze("some longer text").await.unwrap_err();
        assert_eq!(
            err,
            CheckError::Transport {
                status: Some(502),
                message: GENERIC_FAILURE.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"score": 50})))
            .mount(&server)
            .await;

        let client = AnalyzeClient::new(&server.uri()).unwrap();
        let err = client.analyze("some longer text").await.unwrap_err();
        assert!(matches!(err, CheckError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let client = AnalyzeClient::new("http://127.0.0.1:1").unwrap();
        let err = client.analyze("some longer text").await.unwrap_err();
        assert_eq!(
            err,
            CheckError::Transport {
                status: None,
                message: UNREACHABLE.to_string(),
            }
        );
    }

    #[test]
    fn test_loopback_hosts() {
        assert!(is_loopback_host("localhost"));
        assert!(is_loopback_host("LOCALHOST:3000"));
        assert!(is_loopback_host("127.0.0.1:8080"));
        assert!(is_loopback_host("[::1]:3000"));
        assert!(is_loopback_host("::1"));
        assert!(!is_loopback_host("aichecking.me"));
        assert!(!is_loopback_host("www.aichecking.me:443"));
    }

    #[test]
    fn test_resolve_base_url() {
        let production = "https://api.aichecking.me";
        assert_eq!(resolve_base_url("localhost:3000", production), "");
        assert_eq!(resolve_base_url("aichecking.me", production), production);
    }
}
