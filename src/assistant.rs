use async_trait::async_trait;
use csv::Writer;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::AssistantConfig;
use crate::constants::*;
use crate::error::{DashboardError, Result};
use crate::observability::metrics;
use crate::types::AlumniRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// A chat-completion backend
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(DashboardError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.model, "messages": messages }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::Assistant {
                message: format!("completion API returned {}: {}", status, body),
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DashboardError::Assistant {
                message: "completion API returned no choices".to_string(),
            })
    }
}

/// Answers free-form questions about the clean record set.
///
/// The whole set goes into the system prompt as CSV; the dataset is small
/// enough that no retrieval step is needed.
pub struct Assistant<C: CompletionClient + ?Sized> {
    client: Box<C>,
}

impl<C: CompletionClient + ?Sized> Assistant<C> {
    pub fn new(client: Box<C>) -> Self {
        Self { client }
    }

    /// Ask one question. `history` holds earlier turns of the conversation,
    /// kept by the caller.
    pub async fn ask(
        &self,
        records: &[AlumniRecord],
        history: &[ChatMessage],
        question: &str,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt(&serialize_records(records)?)));
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::user(question));

        match self.client.complete(&messages).await {
            Ok(answer) => {
                info!(history = history.len(), "Assistant answered");
                metrics::assistant::request_finished(true);
                Ok(answer)
            }
            Err(e) => {
                warn!("Assistant request failed: {}", e);
                metrics::assistant::request_finished(false);
                Err(e)
            }
        }
    }
}

pub fn system_prompt(csv: &str) -> String {
    format!(
        "You are a helpful assistant for an alumni database.\n\
         Here is the data in CSV format:\n\n\
         {csv}\n\
         Answer the user's question based ONLY on this data.\n\
         If the answer is a list of people, format it nicely.\n\
         If you can't find the answer, say so."
    )
}

/// The full clean set as CSV, every canonical column plus `Name`.
pub fn serialize_records(records: &[AlumniRecord]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record([
        FIRST_NAME,
        LAST_NAME,
        EMAIL,
        GRADUATION_YEAR,
        COMPANY,
        POSITION,
        INDUSTRY,
        FAVORITE_POSITION,
        CURRENT_LOCATION,
        OPEN_TO_CONTACT,
        RECEIVE_UPDATES,
        COMMENTS,
        NAME,
    ])?;

    for r in records {
        let year = r.graduation_year.map(|y| y.to_string()).unwrap_or_default();
        writer.write_record([
            r.first_name.as_str(),
            r.last_name.as_str(),
            r.email.as_str(),
            year.as_str(),
            r.company.as_str(),
            r.position.as_str(),
            r.industry.as_str(),
            r.favorite_position.as_str(),
            r.current_location.as_str(),
            yes_no(r.open_to_contact),
            yes_no(r.receive_updates),
            r.comments.as_deref().unwrap_or(""),
            r.full_name().as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| DashboardError::Assistant {
        message: format!("dataset is not valid UTF-8: {}", e),
    })
}

fn yes_no(value: bool) -> &'static str {
    if value {
        CONSENT_ANSWER
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct MockClient {
        seen: Arc<Mutex<Vec<ChatMessage>>>,
        reply: Result<String>,
    }

    #[async_trait]
    impl CompletionClient for MockClient {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.seen.lock().unwrap().extend(messages.iter().cloned());
            match &self.reply {
                Ok(answer) => Ok(answer.clone()),
                Err(e) => Err(DashboardError::Assistant { message: e.to_string() }),
            }
        }
    }

    fn record() -> AlumniRecord {
        AlumniRecord {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            graduation_year: Some(2015),
            company: "Acme".to_string(),
            position: "Analyst".to_string(),
            industry: "Finance".to_string(),
            favorite_position: "Scrum Half".to_string(),
            current_location: "New York, NY".to_string(),
            open_to_contact: false,
            receive_updates: true,
            comments: None,
        }
    }

    #[test]
    fn test_serialize_records_includes_every_record() {
        let csv = serialize_records(&[record()]).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().ends_with("Comments,Name"));
        assert_eq!(
            lines.next().unwrap(),
            "Ann,Lee,ann@example.com,2015,Acme,Analyst,Finance,Scrum Half,\"New York, NY\",No,Yes,,Ann Lee"
        );
    }

    #[tokio::test]
    async fn test_ask_sends_data_history_and_question() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let assistant = Assistant::new(Box::new(MockClient {
            seen: seen.clone(),
            reply: Ok("Ann Lee works in Finance.".to_string()),
        }));

        let history = vec![ChatMessage::user("hi"), ChatMessage {
            role: "assistant".to_string(),
            content: "hello".to_string(),
        }];
        let answer = assistant
            .ask(&[record()], &history, "Who works in Finance?")
            .await
            .unwrap();
        assert_eq!(answer, "Ann Lee works in Finance.");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0].role, "system");
        assert!(seen[0].content.contains("ann@example.com"));
        assert!(seen[0].content.contains("based ONLY on this data"));
        assert_eq!(seen[3], ChatMessage::user("Who works in Finance?"));
    }

    #[tokio::test]
    async fn test_ask_propagates_backend_failure() {
        let assistant = Assistant::new(Box::new(MockClient {
            seen: Arc::new(Mutex::new(Vec::new())),
            reply: Err(DashboardError::Assistant { message: "rate limited".to_string() }),
        }));

        let err = assistant.ask(&[], &[], "anything").await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = AssistantConfig::default();
        assert!(matches!(
            OpenAiClient::from_config(&config),
            Err(DashboardError::MissingApiKey)
        ));
    }
}
