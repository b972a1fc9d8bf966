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

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;

pub const DEFAULT_ANKICONNECT_URL: &str = "http://localhost:8765";
pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1:free";
pub const DEFAULT_MAILJET_BASE_URL: &str = "https://api.mailjet.com/v3.1";
pub const PLACEHOLDER_SENDER: &str = "your_verified_sender@example.com";

/// Where the deck lives.
#[derive(Clone, Debug, PartialEq)]
pub struct DeckSettings {
    pub url: String,
    pub auth_token: Option<String>,
}

/// The language model provider.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// The mail provider.
#[derive(Clone, Debug, PartialEq)]
pub struct MailSettings {
    pub base_url: String,
    pub api_key: String,
    pub secret_key: String,
    pub sender_email: String,
}

/// Everything needed to talk to the three services, read from the
/// environment. Empty values count as unset.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub deck: DeckSettings,
    pub llm: LlmSettings,
    pub mail: MailSettings,
    pub recipient_email: Option<String>,
}

impl DeckSettings {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            url: get("ANKICONNECT_URL").unwrap_or_else(|| DEFAULT_ANKICONNECT_URL.to_string()),
            auth_token: get("ANKICONNECT_AUTH_TOKEN"),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }
}

impl Settings {
    pub fn from_env() -> Fallible<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Builds settings from `lookup`, failing with a configuration error if
    /// a required credential is missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Fallible<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                ErrorReport::new(
                    ErrorKind::Configuration,
                    format!("environment variable {key} is not set."),
                )
            })
        };

        let deck = DeckSettings::from_lookup(&lookup);

        let llm = LlmSettings {
            base_url: get("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            api_key: require("OPENROUTER_API_KEY")?,
            model: get("LLM_MODEL_TO_USE").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        let mail = MailSettings {
            base_url: get("MAILJET_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MAILJET_BASE_URL.to_string()),
            api_key: require("MAILJET_API_KEY")?,
            secret_key: require("MAILJET_SECRET_KEY")?,
            sender_email: get("MAILJET_SENDER_EMAIL")
                .unwrap_or_else(|| PLACEHOLDER_SENDER.to_string()),
        };
        if mail.sender_email == PLACEHOLDER_SENDER {
            log::warn!(
                "MAILJET_SENDER_EMAIL is not set or uses the placeholder. Configure a verified sender."
            );
        }

        Ok(Self {
            deck,
            llm,
            mail,
            recipient_email: get("RECIPIENT_EMAIL"),
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
