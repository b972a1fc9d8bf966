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

use crate::anki::AnkiClient;
use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail;
use crate::llm::LlmClient;
use crate::mail::MailjetClient;
use crate::pipeline::Pipeline;
use crate::pipeline::Request;
use crate::select::Criteria;
use crate::settings::Settings;
use crate::types::timestamp::Timestamp;

pub struct SendOptions {
    pub deck_name: String,
    pub recipient: Option<String>,
    pub language: String,
    pub theme: Option<String>,
    pub criteria: Criteria,
}

/// Runs the whole pipeline once. Configuration problems are errors; every
/// other failure is logged and reported as `Ok(false)`.
pub async fn send_story(options: SendOptions) -> Fallible<bool> {
    let settings = Settings::from_env()?;
    let Some(recipient) = options.recipient.or(settings.recipient_email) else {
        return fail(
            ErrorKind::Configuration,
            "no recipient: pass --recipient or set RECIPIENT_EMAIL.",
        );
    };

    let deck = AnkiClient::new(settings.deck.url, settings.deck.auth_token);
    let mut writer = LlmClient::new(
        settings.llm.base_url,
        settings.llm.api_key,
        settings.llm.model,
    );
    if let Some(theme) = options.theme {
        writer = writer.with_theme(theme);
    }
    let notifier = MailjetClient::new(
        settings.mail.base_url,
        settings.mail.api_key,
        settings.mail.secret_key,
        settings.mail.sender_email,
    );
    let pipeline = Pipeline::new(deck, writer, notifier, options.criteria);

    let request = Request {
        deck_name: options.deck_name,
        recipient,
        language: options.language,
    };
    let ok = pipeline.run(&request, Timestamp::now()).await;
    if ok {
        println!("Story sent to {}.", request.recipient);
    } else {
        println!("No story was sent.");
    }
    Ok(ok)
}
