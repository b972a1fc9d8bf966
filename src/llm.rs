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
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail;
use crate::html::strip_code_fence;
use crate::select::StruggleCard;

pub const DEFAULT_THEME: &str = "A scene in Seinfeld, reimagined with a story to fit the words";

/// Writes stories and titles.
pub trait StoryWriter {
    /// A short HTML story in `language` using every card's vocabulary, with
    /// an English translation.
    async fn generate_story(&self, language: &str, cards: &[StruggleCard]) -> Fallible<String>;

    /// A short title for a plain-text story.
    async fn generate_title(&self, story_text: &str) -> Fallible<String>;
}

/// A chat-completions client (OpenRouter or any OpenAI-compatible endpoint).
pub struct LlmClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    theme: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl LlmClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            theme: DEFAULT_THEME.to_string(),
        }
    }

    pub fn with_theme(self, theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            ..self
        }
    }

    /// Sends a single user message and returns the first choice's text.
    /// Every failure is reported as a generation error.
    async fn complete(&self, prompt: &str) -> Fallible<String> {
        self.try_complete(prompt)
            .await
            .map_err(|e| e.with_kind(ErrorKind::Generation))
    }

    async fn try_complete(&self, prompt: &str) -> Fallible<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };
        log::debug!("Requesting completion from {}", self.model);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return fail(
                ErrorKind::Generation,
                format!("completion request failed with HTTP {status}: {detail}"),
            );
        }
        let completion: CompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return fail(ErrorKind::Generation, "the model returned no content");
        }
        Ok(content)
    }
}

impl StoryWriter for LlmClient {
    async fn generate_story(&self, language: &str, cards: &[StruggleCard]) -> Fallible<String> {
        let prompt = story_prompt(language, &self.theme, cards);
        let content = self.complete(&prompt).await?;
        let story = strip_code_fence(&content);
        if story.is_empty() {
            return fail(ErrorKind::Generation, "the model returned an empty story");
        }
        Ok(story.to_string())
    }

    async fn generate_title(&self, story_text: &str) -> Fallible<String> {
        let prompt = title_prompt(story_text);
        let content = self.complete(&prompt).await?;
        let title = content.trim().trim_matches('"').trim();
        if title.is_empty() {
            return fail(ErrorKind::Generation, "the model returned an empty title");
        }
        Ok(title.to_string())
    }
}

pub fn story_prompt(language: &str, theme: &str, cards: &[StruggleCard]) -> String {
    let vocabulary: String = cards
        .iter()
        .map(|card| format!("    - {} / {}\n", card.front, card.back))
        .collect();
    format!(
        "You are an expert language tutor and creative writer. Your task is to generate a short, \
engaging text in {language} that naturally incorporates a list of vocabulary words or phrases, \
followed by the English translation of that text. The words or phrases the learner is studying \
must be bolded with <b> tags in both versions.

---
**Input Details:**
**1. Target Language:** {language}
**2. Vocabulary (each line is `front / back`; the front is usually English and the back is usually {language}):**
{vocabulary}**3. Desired Text Characteristics:**
    - **Type:** Short story
    - **Topic/Theme:** {theme}
    - **Tone:** Peaceful, slightly reflective, with dry humor and puns where possible
    - **Length:** Approximately 200-350 words
    - **Key Requirement:** Every vocabulary item above MUST be used naturally and correctly.
---
**Output Instructions:**
1. Write the complete text in {language}.
2. Then write its translation into English.
3. Do NOT include definitions or translations inside the story itself.
4. Do NOT include conversational filler or meta-commentary.
5. Do NOT wrap the output in markdown code fences such as ```html.
6. Return only a raw HTML fragment, formatted to be as readable as possible.
"
    )
}

pub fn title_prompt(story_text: &str) -> String {
    format!(
        "You are an expert at titling Seinfeld episodes. Create a concise, funny and memorable \
title (typically 2-5 words) for the following story.

Focus on the core conflict, a peculiar quirk or incident, and the absurdity of everyday \
situations. Alliteration and puns are welcome. Avoid generic titles and titles that give \
away the plot.

---
{story_text}
---

Reply with the title only, without quotes or commentary.
"
    )
}
