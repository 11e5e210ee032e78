//! HTTP client for the content query and mutation APIs

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SanityConfig;

/// Errors from the content API
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to content API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("content API returned {status}: {description}")]
    Api { status: StatusCode, description: String },

    #[error("unexpected response from content API: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no write token configured (set SANITY_API_TOKEN)")]
    MissingToken,
}

/// Query response envelope
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Result of a mutation transaction
#[derive(Debug, Clone, Deserialize)]
pub struct MutationResult {
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(default)]
    pub results: Vec<MutationOutcome>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MutationOutcome {
    pub id: String,
    #[serde(default)]
    pub operation: Option<String>,
}

#[derive(Serialize)]
struct Mutations<'a, D> {
    mutations: [CreateMutation<'a, D>; 1],
}

#[derive(Serialize)]
struct CreateMutation<'a, D> {
    create: &'a D,
}

/// Error body shapes the API uses
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    description: Option<String>,
}

/// Client for one project and dataset
#[derive(Debug, Clone)]
pub struct SanityClient {
    http: Client,
    query_url: String,
    mutate_url: String,
    token: Option<String>,
}

impl SanityClient {
    /// Create a client from configuration
    pub fn new(config: &SanityConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("sanity-blog/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(config, http))
    }

    /// Create a client around an existing HTTP client
    pub fn with_client(config: &SanityConfig, http: Client) -> Self {
        let version = config.version_segment();
        Self {
            http,
            query_url: format!(
                "{}/{}/data/query/{}",
                config.query_host(),
                version,
                config.dataset
            ),
            mutate_url: format!(
                "{}/{}/data/mutate/{}",
                config.mutation_host(),
                version,
                config.dataset
            ),
            token: config.token.clone(),
        }
    }

    /// Run a GROQ query and decode its `result`
    ///
    /// Each parameter is sent as `$name=<json>` next to the query, so
    /// values never end up inside the query text.
    pub async fn fetch<T>(&self, query: &str, params: &[(&str, Value)]) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let mut pairs = Vec::with_capacity(params.len() + 1);
        pairs.push(("query".to_string(), query.to_string()));
        for (name, value) in params {
            pairs.push((format!("${}", name), serde_json::to_string(value)?));
        }

        tracing::debug!("GROQ query: {}", query.split_whitespace().collect::<Vec<_>>().join(" "));

        let response = self.http.get(&self.query_url).query(&pairs).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let envelope: QueryResponse<T> = serde_json::from_slice(&body)?;
        Ok(envelope.result)
    }

    /// Create a new document
    pub async fn create<D>(&self, document: &D) -> Result<MutationResult, ClientError>
    where
        D: Serialize,
    {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        let body = Mutations {
            mutations: [CreateMutation { create: document }],
        };

        let response = self
            .http
            .post(&self.mutate_url)
            .query(&[("returnIds", "true")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status, &bytes));
        }

        let result: MutationResult = serde_json::from_slice(&bytes)?;
        tracing::debug!("Mutation committed in transaction {}", result.transaction_id);
        Ok(result)
    }
}

fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    let description = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| {
            parsed
                .error
                .and_then(|detail| detail.description)
                .or(parsed.message)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

    ClientError::Api {
        status,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> SanityConfig {
        SanityConfig {
            project_id: "p1".to_string(),
            api_host: Some(server.uri()),
            token: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_params_separately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2021-03-25/data/query/production"))
            .and(query_param("query", "*[slug.current == $slug]"))
            .and(query_param("$slug", "\"hello-world\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ms": 3,
                "query": "*[slug.current == $slug]",
                "result": [{"title": "Hello"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SanityClient::new(&config(&server)).unwrap();
        let result: Vec<Value> = client
            .fetch("*[slug.current == $slug]", &[("slug", json!("hello-world"))])
            .await
            .unwrap();
        assert_eq!(result, vec![json!({"title": "Hello"})]);
    }

    #[tokio::test]
    async fn test_fetch_query_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"description": "expected ']' following expression", "type": "queryParseError"}
            })))
            .mount(&server)
            .await;

        let client = SanityClient::new(&config(&server)).unwrap();
        let err = client.fetch::<Value>("*[", &[]).await.unwrap_err();
        match err {
            ClientError::Api {
                status,
                description,
            } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(description.contains("expected ']'"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "nope"})))
            .mount(&server)
            .await;

        let client = SanityClient::new(&config(&server)).unwrap();
        let err = client.fetch::<Vec<Value>>("*", &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_create_posts_mutation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2021-03-25/data/mutate/production"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_json(json!({
                "mutations": [{"create": {"_type": "comment", "name": "Alice"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transactionId": "tx1",
                "results": [{"id": "c1", "operation": "create"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SanityClient::new(&config(&server)).unwrap();
        let result = client
            .create(&json!({"_type": "comment", "name": "Alice"}))
            .await
            .unwrap();
        assert_eq!(result.transaction_id, "tx1");
        assert_eq!(result.results[0].id, "c1");
    }

    #[tokio::test]
    async fn test_create_without_token() {
        let server = MockServer::start().await;
        let mut config = config(&server);
        config.token = None;

        let client = SanityClient::new(&config).unwrap();
        let err = client.create(&json!({})).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingToken));
    }
}
