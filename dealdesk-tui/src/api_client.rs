//! REST client for the CRM collection endpoints.

use crate::config::TuiConfig;
use async_trait::async_trait;
use dealdesk_core::{
    CollectionApi, CollectionError, CollectionPage, Comment, Interaction, Lead, QueryDescriptor,
    Record, SessionContext,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Config error: {0}")]
    Config(String),
}

impl From<ApiClientError> for CollectionError {
    fn from(err: ApiClientError) -> Self {
        match err {
            ApiClientError::Http(e) if e.is_decode() => CollectionError::Decode(e.to_string()),
            ApiClientError::Http(e) => CollectionError::Transport(e.to_string()),
            ApiClientError::Serde(e) => CollectionError::Decode(e.to_string()),
            ApiClientError::Api {
                status,
                code,
                message,
            } => match status {
                409 | 422 => CollectionError::Rejected(format!("{}: {}", code, message)),
                _ => CollectionError::Status {
                    status,
                    message: format!("{}: {}", code, message),
                },
            },
            ApiClientError::Status { status, body } => CollectionError::Status {
                status,
                message: body,
            },
            ApiClientError::Config(reason) => CollectionError::Rejected(reason),
        }
    }
}

/// Error body returned by the backend on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    message: String,
}

/// A record type served under its own REST collection.
pub trait RestResource: Record + DeserializeOwned {
    /// Collection path below the base URL.
    const PATH: &'static str;
}

impl RestResource for Lead {
    const PATH: &'static str = "/api/v1/leads";
}

impl RestResource for Interaction {
    const PATH: &'static str = "/api/v1/interactions";
}

impl RestResource for Comment {
    const PATH: &'static str = "/api/v1/comments";
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    session_headers: HeaderMap,
}

impl RestClient {
    pub fn new(config: &TuiConfig, session: &SessionContext) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session_headers: build_session_headers(session)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list<R: RestResource>(
        &self,
        query: &QueryDescriptor,
    ) -> Result<CollectionPage<R>, ApiClientError> {
        self.get_json(R::PATH, Some(query)).await
    }

    pub async fn delete<R: RestResource>(&self, id: &R::Id) -> Result<(), ApiClientError> {
        let url = self.url(&format!("{}/{}", R::PATH, id));
        let response = self
            .client
            .delete(url)
            .headers(self.session_headers.clone())
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await?;
        Err(error_from_body(status.as_u16(), &text))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let mut request = self
            .client
            .get(self.url(path))
            .headers(self.session_headers.clone());
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request.send().await?;
        self.parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(serde_json::from_str(&text)?)
        } else {
            Err(error_from_body(status.as_u16(), &text))
        }
    }
}

/// [`CollectionApi`] for one REST resource.
pub struct RestCollection<R> {
    client: RestClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> RestCollection<R> {
    pub fn new(client: RestClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R: RestResource> CollectionApi<R> for RestCollection<R> {
    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<CollectionPage<R>, CollectionError> {
        Ok(self.client.list::<R>(query).await?)
    }

    async fn delete_record(&self, id: &R::Id) -> Result<(), CollectionError> {
        Ok(self.client.delete::<R>(id).await?)
    }
}

fn error_from_body(status: u16, text: &str) -> ApiClientError {
    match serde_json::from_str::<ApiErrorBody>(text) {
        Ok(body) => ApiClientError::Api {
            status,
            code: body.code,
            message: body.message,
        },
        Err(_) => ApiClientError::Status {
            status,
            body: text.to_string(),
        },
    }
}

fn build_session_headers(session: &SessionContext) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    for (name, value) in session.headers() {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}
