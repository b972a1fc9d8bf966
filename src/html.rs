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

use std::sync::LazyLock;

use maud::DOCTYPE;
use maud::PreEscaped;
use maud::html;
use regex::Regex;

use crate::select::StruggleCard;

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>").unwrap()
});

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

// A `<` only opens a tag when a name, `/`, `!` or `?` follows it.
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[A-Za-z!?][^>]*>").unwrap());

/// Converts an HTML fragment to plain text. Each run of text between tags is
/// trimmed, empty runs are dropped, and the rest are joined with a space.
pub fn html_to_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let html = SCRIPT_OR_STYLE.replace_all(html, " ");
    let html = COMMENT.replace_all(&html, " ");
    TAG.split(&html)
        .map(|chunk| html_escape::decode_html_entities(chunk))
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the contents of the first markdown code fence in the text, or the
/// whole text if it has none. Anything around the fence is dropped.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some((_, rest)) = trimmed.split_once("```") else {
        return trimmed;
    };
    // Drop the info string (`html`, etc.) on the opening line.
    let Some((_, body)) = rest.split_once('\n') else {
        return trimmed;
    };
    match body.split_once("```") {
        Some((inner, _)) => inner.trim(),
        None => body.trim(),
    }
}

/// Builds the email body: the story, followed by the vocabulary it uses.
pub fn email_document(story_html: &str, cards: &[StruggleCard]) -> String {
    let markup = html! {
        (DOCTYPE)
        html {
            body {
                (PreEscaped(story_html))
                @if !cards.is_empty() {
                    hr;
                    h3 { "Words in this story" }
                    ul {
                        @for card in cards {
                            li {
                                (html_to_text(&card.front))
                                ": "
                                b { (html_to_text(&card.back)) }
                            }
                        }
                    }
                }
            }
        }
    };
    markup.into_string()
}
