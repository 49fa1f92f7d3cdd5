//! Describer backed by an OpenAI-compatible chat-completions endpoint.

use std::fmt::Write as _;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use docmodules_shared::{DocModulesError, Result, ServiceConfig, StructuredModules, USER_AGENT};
use docmodules_structure::cleanup::truncate_chars;

use super::Describer;

const SYSTEM_PROMPT: &str = "You are an expert at analyzing software documentation and \
                             extracting structured module information.";

/// Main-content snippets quoted per module.
const PROMPT_SNIPPETS: usize = 3;
/// Characters quoted per main-content snippet.
const PROMPT_SNIPPET_CHARS: usize = 200;
/// Characters quoted per submodule preview.
const PROMPT_PREVIEW_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// ServiceDescriber
// ---------------------------------------------------------------------------

/// Sends one prompt covering all modules and parses the JSON array reply.
pub struct ServiceDescriber {
    config: ServiceConfig,
    client: Client,
}

impl ServiceDescriber {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(DocModulesError::config("service credential is empty"));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DocModulesError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Send `prompt`, retrying per the configured budget.
    ///
    /// Rate limits wait `backoff_base * 2^attempt`; other retryable failures
    /// wait `retry_delay`. Non-retryable failures return immediately.
    #[instrument(skip_all, fields(model = %self.config.model, max_retries = self.config.max_retries))]
    pub async fn query(&self, prompt: &str) -> Result<String> {
        let mut last_error = DocModulesError::Service("no attempts made".into());

        for attempt in 0..self.config.max_retries {
            let err = match self.chat_completion(prompt).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            let wait = self.retry_wait(&err, attempt);
            warn!(attempt, error = %err, wait_secs = wait.as_secs_f64(), "service call failed");

            if attempt + 1 < self.config.max_retries {
                tokio::time::sleep(wait).await;
            }
            last_error = err;
        }

        Err(last_error)
    }

    /// Wait before retrying after `err` on the zero-based `attempt`.
    fn retry_wait(&self, err: &DocModulesError, attempt: u32) -> Duration {
        if err.is_rate_limit() {
            self.config
                .backoff_base
                .saturating_mul(2u32.saturating_pow(attempt))
        } else {
            self.config.retry_delay
        }
    }

    async fn chat_completion(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url.trim_end_matches('/')))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocModulesError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let envelope: ChatResponse = response
            .json()
            .await
            .map_err(|e| DocModulesError::parse(format!("invalid completion envelope: {e}")))?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DocModulesError::parse("completion has no content"))
    }
}

#[async_trait]
impl Describer for ServiceDescriber {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn describe(&self, structured: &StructuredModules) -> Result<Vec<Value>> {
        let prompt = build_prompt(structured);
        debug!(chars = prompt.len(), "prompt built");

        let reply = self.query(&prompt).await?;
        parse_response(&reply)
    }
}

fn classify_failure(status: StatusCode, body: &str) -> DocModulesError {
    let message = format!("{status}: {}", truncate_chars(body.trim(), 300));
    if status == StatusCode::TOO_MANY_REQUESTS || body.to_lowercase().contains("rate limit") {
        DocModulesError::RateLimited(message)
    } else {
        DocModulesError::Service(message)
    }
}

/// Prompt summarizing every module's content and candidate submodules.
pub fn build_prompt(structured: &StructuredModules) -> String {
    let mut prompt = String::from(
        "Analyze the following documentation content and identify:\n\
         1. Main modules (high-level feature categories)\n\
         2. Submodules (specific features or functions within each module)\n\
         3. Descriptions for both modules and submodules, based on the content\n\n\
         Group related features, avoid near-duplicate modules, and focus on \
         user-facing functionality.\n\nDocumentation content:\n",
    );

    for (name, module) in structured {
        let _ = writeln!(prompt, "\n--- Module: {name} ---");

        if !module.main_content.is_empty() {
            prompt.push_str("Main Content:\n");
            for snippet in module.main_content.iter().take(PROMPT_SNIPPETS) {
                let _ = writeln!(prompt, "- {}...", truncate_chars(snippet, PROMPT_SNIPPET_CHARS));
            }
        }

        if !module.submodules.is_empty() {
            prompt.push_str("Potential Submodules:\n");
            for (sub, content) in &module.submodules {
                let preview = content
                    .first()
                    .map(|c| truncate_chars(c, PROMPT_PREVIEW_CHARS))
                    .unwrap_or_default();
                let _ = writeln!(prompt, "- {sub}: {preview}...");
            }
        }
    }

    prompt.push_str(
        "\nReturn a JSON array in exactly this format:\n\
         [\n  {\n    \"module\": \"Module Name\",\n    \
         \"Description\": \"Description of the module\",\n    \
         \"Submodules\": {\n      \"Submodule Name\": \"Description of the submodule\"\n    }\n  }\n]\n",
    );

    prompt
}

/// Extract the JSON array from a reply that may be wrapped in prose.
///
/// The outermost bracketed span is tried first, then the whole reply.
pub fn parse_response(reply: &str) -> Result<Vec<Value>> {
    static ARRAY_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"));

    let parsed = ARRAY_RE
        .find(reply)
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .map_or_else(|| serde_json::from_str::<Value>(reply.trim()), Ok)
        .map_err(|e| DocModulesError::parse(format!("reply is not JSON: {e}")))?;

    match parsed {
        Value::Array(items) => Ok(items),
        other => Err(DocModulesError::parse(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use docmodules_shared::{AppConfig, StructuredModule};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::describe::extract_with;

    fn config(server: &MockServer) -> ServiceConfig {
        let mut config = ServiceConfig::from_app_config(&AppConfig::default(), "sk-test");
        config.base_url = server.uri();
        config.backoff_base = Duration::ZERO;
        config.retry_delay = Duration::ZERO;
        config
    }

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
    }

    fn structured() -> StructuredModules {
        let mut modules = StructuredModules::new();
        modules.insert(
            "Billing".into(),
            StructuredModule {
                main_content: vec!["Invoices are sent monthly to the account owner.".into()],
                submodules: [(
                    "Payment Method".into(),
                    vec!["Update your card from the billing page.".into()],
                )]
                .into_iter()
                .collect(),
            },
        );
        modules
    }

    #[tokio::test]
    async fn prose_wrapped_reply_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(completion(
                "Here is the analysis:\n[{\"module\": \"Payments\", \"Description\": \"Cards\", \
                 \"Submodules\": {\"Refunds\": \"Issue refunds\"}}]\nLet me know!",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let describer = ServiceDescriber::new(config(&server)).unwrap();
        let out = extract_with(&structured(), Some(&describer)).await;

        assert_eq!(out.describer, "openai");
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].module, "Payments");
        assert_eq!(out.records[0].submodules["Refunds"], "Issue refunds");
    }

    async fn rate_limited_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit reached"))
            .expect(3)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn rate_limit_exhausts_retry_budget() {
        let server = rate_limited_server().await;

        let describer = ServiceDescriber::new(config(&server)).unwrap();
        let err = describer.query("hello").await.unwrap_err();

        assert!(err.is_rate_limit());
    }

    #[tokio::test]
    async fn rate_limit_falls_back_to_heuristics() {
        let server = rate_limited_server().await;

        let describer = ServiceDescriber::new(config(&server)).unwrap();
        let out = extract_with(&structured(), Some(&describer)).await;
        assert_eq!(out.describer, "heuristic");
        assert!(out.records[0].description.contains("Billing and Payments"));
    }

    #[tokio::test]
    async fn malformed_envelope_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let describer = ServiceDescriber::new(config(&server)).unwrap();
        let err = describer.query("hello").await.unwrap_err();
        assert!(matches!(err, DocModulesError::Parse { .. }));
    }

    #[tokio::test]
    async fn server_error_recovers_on_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream error"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion("[]"))
            .mount(&server)
            .await;

        let describer = ServiceDescriber::new(config(&server)).unwrap();
        assert_eq!(describer.query("hello").await.unwrap(), "[]");
    }

    #[test]
    fn rate_limits_back_off_exponentially() {
        let mut config = ServiceConfig::from_app_config(&AppConfig::default(), "sk-test");
        config.backoff_base = Duration::from_secs(1);
        config.retry_delay = Duration::from_secs(5);
        let describer = ServiceDescriber::new(config).unwrap();

        let limited = DocModulesError::RateLimited("429".into());
        assert_eq!(describer.retry_wait(&limited, 0), Duration::from_secs(1));
        assert_eq!(describer.retry_wait(&limited, 1), Duration::from_secs(2));
        assert_eq!(describer.retry_wait(&limited, 2), Duration::from_secs(4));
        assert_eq!(
            describer.retry_wait(&limited, 40),
            Duration::from_secs(u64::from(u32::MAX))
        );

        for err in [
            DocModulesError::Service("500".into()),
            DocModulesError::Network("reset".into()),
        ] {
            assert_eq!(describer.retry_wait(&err, 0), Duration::from_secs(5));
            assert_eq!(describer.retry_wait(&err, 2), Duration::from_secs(5));
        }
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion("[]").set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let mut config = config(&server);
        config.max_retries = 1;
        config.timeout = Duration::from_millis(200);
        let describer = ServiceDescriber::new(config).unwrap();

        let err = describer.query("hello").await.unwrap_err();
        assert!(matches!(err, DocModulesError::Network(_)), "{err}");
    }

    #[test]
    fn empty_credential_is_rejected() {
        let config = ServiceConfig::from_app_config(&AppConfig::default(), "  ");
        assert!(ServiceDescriber::new(config).is_err());
    }

    #[test]
    fn prompt_quotes_snippets_and_previews() {
        let mut modules = structured();
        modules.get_mut("Billing").unwrap().main_content = vec![
            "a".repeat(300),
            "second".into(),
            "third".into(),
            "fourth snippet".into(),
        ];

        let prompt = build_prompt(&modules);

        assert!(prompt.contains("--- Module: Billing ---"));
        assert!(prompt.contains(&format!("- {}...\n", "a".repeat(200))));
        assert!(!prompt.contains(&"a".repeat(201)));
        assert!(!prompt.contains("fourth snippet"));
        assert!(prompt.contains("- Payment Method: Update your card from the billing page...."));
        assert!(prompt.contains("\"Submodules\""));
    }

    #[test]
    fn parse_response_variants() {
        assert_eq!(parse_response("[]").unwrap().len(), 0);
        assert_eq!(
            parse_response("Sure! [{\"module\": \"A\"}] done").unwrap().len(),
            1
        );
        assert!(parse_response("{\"module\": \"A\"}").is_err());
        assert!(parse_response("I could not find any modules.").is_err());
        assert!(parse_response("[not, json]").is_err());
    }
}
