// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::card_record::CardId;
use crate::types::card_record::CardRecord;

/// The AnkiConnect API version we speak.
pub const API_VERSION: u32 = 6;

/// Where cards come from.
pub trait DeckSource {
    /// The identifiers of every card in the named deck.
    async fn find_card_ids(&self, deck_name: &str) -> Fallible<Vec<CardId>>;

    /// Full records for the given cards.
    async fn cards_info(&self, ids: &[CardId]) -> Fallible<Vec<CardRecord>>;
}

/// Talks to AnkiConnect over HTTP.
pub struct AnkiClient {
    http: Client,
    url: String,
    auth_token: Option<String>,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    action: &'a str,
    version: u32,
    params: Value,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

impl AnkiClient {
    pub fn new(url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            auth_token,
        }
    }

    async fn request<T: DeserializeOwned>(&self, action: &str, params: Value) -> Fallible<T> {
        let body = ApiRequest {
            action,
            version: API_VERSION,
            params,
        };
        let mut builder = self.http.post(&self.url).json(&body);
        if let Some(token) = &self.auth_token {
            builder = builder.header(AUTHORIZATION, format!("Token {token}"));
        }
        log::debug!("AnkiConnect: {action}");
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return fail(
                ErrorKind::Network,
                format!("AnkiConnect answered {action} with HTTP {status}"),
            );
        }
        let text = response.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            ErrorReport::new(
                ErrorKind::Protocol,
                format!("AnkiConnect returned an invalid response to {action}: {e}"),
            )
        })?;
        match envelope {
            ApiResponse {
                error: Some(error), ..
            } => fail(ErrorKind::Remote, format!("AnkiConnect error: {error}")),
            ApiResponse {
                result: Some(result),
                error: None,
            } => Ok(result),
            ApiResponse {
                result: None,
                error: None,
            } => fail(
                ErrorKind::Protocol,
                format!("AnkiConnect returned no result for {action}"),
            ),
        }
    }
}

impl DeckSource for AnkiClient {
    async fn find_card_ids(&self, deck_name: &str) -> Fallible<Vec<CardId>> {
        let params = json!({ "query": deck_query(deck_name) });
        self.request("findCards", params).await
    }

    async fn cards_info(&self, ids: &[CardId]) -> Fallible<Vec<CardRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = json!({ "cards": ids });
        self.request("cardsInfo", params).await
    }
}

/// A search query matching every card in a deck.
pub fn deck_query(deck_name: &str) -> String {
    format!("deck:\"{}\"", deck_name.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use axum::Json;
    use axum::Router;
    use axum::http::HeaderMap;
    use axum::http::StatusCode;
    use axum::routing::post;

    use super::*;
    use crate::helper::spawn_mock_server;
    use crate::helper::unreachable_url;

    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    /// A fake AnkiConnect that answers every request with `reply` and
    /// records what it was sent.
    async fn fake_anki(reply: Value) -> Fallible<(String, Seen)> {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let app = Router::new().route(
            "/",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let reply = reply.clone();
                let recorder = recorder.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(|v| v.to_string());
                    recorder.lock().unwrap().push((auth, body));
                    Json(reply)
                }
            }),
        );
        let url = spawn_mock_server(app).await?;
        Ok((format!("{url}/"), seen))
    }

    #[test]
    fn test_deck_query() {
        assert_eq!(deck_query("My portuguese"), "deck:\"My portuguese\"");
        assert_eq!(deck_query("a\"b"), "deck:\"a\\\"b\"");
    }

    #[tokio::test]
    async fn test_find_card_ids() -> Fallible<()> {
        let (url, seen) = fake_anki(json!({"result": [11, 22], "error": null})).await?;
        let client = AnkiClient::new(url, None);
        let ids = client.find_card_ids("My portuguese").await?;
        assert_eq!(ids, vec![11, 22]);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, body) = &seen[0];
        assert_eq!(auth, &None);
        assert_eq!(
            body,
            &json!({
                "action": "findCards",
                "version": 6,
                "params": {"query": "deck:\"My portuguese\""}
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_auth_token_is_sent() -> Fallible<()> {
        let (url, seen) = fake_anki(json!({"result": [], "error": null})).await?;
        let client = AnkiClient::new(url, Some("s3cret".to_string()));
        client.find_card_ids("x").await?;
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0.as_deref(), Some("Token s3cret"));
        Ok(())
    }

    #[tokio::test]
    async fn test_cards_info() -> Fallible<()> {
        let reply = json!({
            "result": [{
                "cardId": 11,
                "queue": 0,
                "type": 2,
                "lapses": 3,
                "factor": 2100,
                "mod": 1700000000000i64,
                "fields": {"Front": {"value": "dog", "order": 0}, "Back": {"value": "cão", "order": 1}}
            }],
            "error": null
        });
        let (url, seen) = fake_anki(reply).await?;
        let client = AnkiClient::new(url, None);
        let cards = client.cards_info(&[11]).await?;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front(), "dog");
        assert_eq!(cards[0].back(), "cão");
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].1["action"], "cardsInfo");
        assert_eq!(seen[0].1["params"], json!({"cards": [11]}));
        Ok(())
    }

    #[tokio::test]
    async fn test_cards_info_without_ids_skips_request() -> Fallible<()> {
        let client = AnkiClient::new(unreachable_url()?, None);
        let cards = client.cards_info(&[]).await?;
        assert!(cards.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_error() -> Fallible<()> {
        let (url, _) = fake_anki(json!({"result": null, "error": "deck not found"})).await?;
        let client = AnkiClient::new(url, None);
        let err = client.find_card_ids("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.to_string(), "error: AnkiConnect error: deck not found");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_result_is_protocol_error() -> Fallible<()> {
        let (url, _) = fake_anki(json!({"result": null, "error": null})).await?;
        let client = AnkiClient::new(url, None);
        let err = client.find_card_ids("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        Ok(())
    }

    #[tokio::test]
    async fn test_card_without_back_is_protocol_error() -> Fallible<()> {
        let reply = json!({
            "result": [{
                "cardId": 1, "queue": 0, "type": 2, "lapses": 0, "factor": 2500, "mod": 0,
                "fields": {"Front": {"value": "cat", "order": 0}}
            }],
            "error": null
        });
        let (url, _) = fake_anki(reply).await?;
        let client = AnkiClient::new(url, None);
        let err = client.cards_info(&[1]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_body_is_protocol_error() -> Fallible<()> {
        let app = Router::new().route("/", post(|| async { "<html>not json</html>" }));
        let url = spawn_mock_server(app).await?;
        let client = AnkiClient::new(url, None);
        let err = client.find_card_ids("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        Ok(())
    }

    #[tokio::test]
    async fn test_http_error_is_network_error() -> Fallible<()> {
        let app = Router::new().route("/", post(|| async { StatusCode::FORBIDDEN }));
        let url = spawn_mock_server(app).await?;
        let client = AnkiClient::new(url, None);
        let err = client.find_card_ids("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_is_network_error() -> Fallible<()> {
        let client = AnkiClient::new(unreachable_url()?, None);
        let err = client.find_card_ids("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        Ok(())
    }
}
