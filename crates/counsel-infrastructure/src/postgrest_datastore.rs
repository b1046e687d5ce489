//! PostgrestDatastore - REST implementation of the repositories.
//!
//! Talks to a Supabase-style PostgREST endpoint at `{url}/rest/v1/{table}`.
//! Only the three operations the client needs are used: select with an
//! equality filter and ordering, insert-one-and-return, and update by id.

use async_trait::async_trait;
use counsel_core::config::DatastoreSettings;
use counsel_core::conversation::{Conversation, ConversationRepository, NewConversation};
use counsel_core::error::{CounselError, Result};
use counsel_core::message::{Message, MessageRepository, NewMessage};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const REST_PATH: &str = "rest/v1";
const CONVERSATIONS: &str = "conversations";
const MESSAGES: &str = "messages";

/// Datastore client for a PostgREST endpoint.
#[derive(Clone)]
pub struct PostgrestDatastore {
    client: Client,
    rest_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl PostgrestDatastore {
    /// Creates a client for the project at `url` using the public API key.
    pub fn new(url: impl AsRef<str>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            rest_url: format!("{}/{}", url.as_ref().trim_end_matches('/'), REST_PATH),
            api_key: api_key.into(),
            access_token: None,
        }
    }

    /// Sends the user's access token as bearer instead of the API key.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Builds the client from the `[datastore]` config section.
    pub fn from_settings(settings: &DatastoreSettings) -> Result<Self> {
        let url = settings
            .url
            .as_deref()
            .ok_or_else(|| CounselError::config("datastore.url is required for the postgrest datastore"))?;
        let api_key = settings
            .api_key
            .as_deref()
            .ok_or_else(|| CounselError::config("datastore.api_key is required for the postgrest datastore"))?;

        let mut datastore = Self::new(url, api_key);
        if let Some(token) = settings.access_token.as_deref() {
            datastore = datastore.with_access_token(token);
        }
        Ok(datastore)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, table: &str, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|err| {
            CounselError::network(format!("Datastore request to '{}' failed: {}", table, err))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read datastore error body".to_string());
            return Err(map_http_error(table, status, body));
        }

        Ok(response)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
        ascending: bool,
    ) -> Result<Vec<T>> {
        let order = if ascending {
            "created_at.asc"
        } else {
            "created_at.desc"
        };
        let builder = self.request(Method::GET, table).query(&[
            ("select", "*".to_string()),
            (column, format!("eq.{}", value)),
            ("order", order.to_string()),
        ]);

        let response = self.send(table, builder).await?;
        response.json().await.map_err(|err| {
            CounselError::data_access(format!("Failed to parse '{}' rows: {}", table, err))
        })
    }

    async fn insert_one<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body);

        let response = self.send(table, builder).await?;
        let rows: Vec<T> = response.json().await.map_err(|err| {
            CounselError::data_access(format!("Failed to parse inserted '{}' row: {}", table, err))
        })?;

        rows.into_iter().next().ok_or_else(|| {
            CounselError::data_access(format!("Insert into '{}' returned no row", table))
        })
    }
}

#[async_trait]
impl ConversationRepository for PostgrestDatastore {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        self.select(CONVERSATIONS, "user_id", user_id, false).await
    }

    async fn insert(&self, conversation: &NewConversation) -> Result<Conversation> {
        self.insert_one(CONVERSATIONS, conversation).await
    }

    async fn update_title(&self, conversation_id: &str, title: &str) -> Result<()> {
        let builder = self
            .request(Method::PATCH, CONVERSATIONS)
            .query(&[("id", format!("eq.{}", conversation_id))])
            .header("Prefer", "return=minimal")
            .json(&TitleUpdate { title });

        self.send(CONVERSATIONS, builder).await?;
        tracing::debug!("[Datastore] Renamed conversation {}", conversation_id);
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for PostgrestDatastore {
    async fn list_for_conversation(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.select(MESSAGES, "conversation_id", conversation_id, true)
            .await
    }

    async fn insert(&self, message: &NewMessage) -> Result<Message> {
        self.insert_one(MESSAGES, message).await
    }
}

#[derive(Serialize)]
struct TitleUpdate<'a> {
    title: &'a str,
}

/// PostgREST error body.
#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

fn map_http_error(table: &str, status: StatusCode, body: String) -> CounselError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|error| match error.code {
            Some(code) => format!("{} ({})", error.message, code),
            None => error.message,
        })
        .unwrap_or(body);

    CounselError::http(status.as_u16(), format!("'{}': {}", table, message))
}
