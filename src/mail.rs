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
use reqwest::StatusCode;
use serde::Serialize;

use crate::error::Fallible;

const SENDER_NAME: &str = "Vocabro Larry";
const RECIPIENT_NAME: &str = "Language Learner";

/// Delivers finished stories.
pub trait Notifier {
    /// Sends an HTML email. Returns `Ok(false)` when the body is empty or
    /// the provider refuses the message; errors only when the provider
    /// cannot be reached.
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Fallible<bool>;
}

/// Mailjet's v3.1 send API.
pub struct MailjetClient {
    http: Client,
    base_url: String,
    api_key: String,
    secret_key: String,
    sender_email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendRequest<'a> {
    messages: Vec<OutgoingMessage<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct OutgoingMessage<'a> {
    from: Contact<'a>,
    to: Vec<Contact<'a>>,
    subject: &'a str,
    #[serde(rename = "HTMLPart")]
    html_part: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Contact<'a> {
    email: &'a str,
    name: &'a str,
}

impl MailjetClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        sender_email: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            sender_email: sender_email.into(),
        }
    }
}

impl Notifier for MailjetClient {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Fallible<bool> {
        if html_body.is_empty() {
            log::warn!("Mailjet: refusing to send an empty email.");
            return Ok(false);
        }
        let body = SendRequest {
            messages: vec![OutgoingMessage {
                from: Contact {
                    email: &self.sender_email,
                    name: SENDER_NAME,
                },
                to: vec![Contact {
                    email: to,
                    name: RECIPIENT_NAME,
                }],
                subject,
                html_part: html_body,
            }],
        };
        let url = format!("{}/send", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .basic_auth(&self.api_key, Some(&self.secret_key))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::OK {
            log::info!("Mailjet: email sent (HTTP {status}).");
            Ok(true)
        } else {
            let detail = response.text().await.unwrap_or_default();
            log::error!("Mailjet: failed to send email (HTTP {status}): {detail}");
            Ok(false)
        }
    }
}
