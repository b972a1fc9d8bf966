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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;

use crate::anki::AnkiClient;
use crate::error::Fallible;
use crate::pipeline::fetch_struggle_cards;
use crate::select::Criteria;
use crate::select::StruggleCard;
use crate::settings::DeckSettings;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy, PartialEq, Debug)]
pub enum CardsFormat {
    /// JSON output.
    Json,
    /// One `front / back` pair per line.
    Text,
}

impl Display for CardsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CardsFormat::Json => write!(f, "json"),
            CardsFormat::Text => write!(f, "text"),
        }
    }
}

pub async fn print_struggle_cards(
    deck_name: &str,
    criteria: &Criteria,
    format: CardsFormat,
) -> Fallible<bool> {
    let settings = DeckSettings::from_env();
    let client = AnkiClient::new(settings.url, settings.auth_token);
    match fetch_struggle_cards(&client, deck_name, criteria, Timestamp::now()).await? {
        Some(cards) => {
            println!("{}", render_cards(&cards, format)?);
        }
        None => {
            println!("No cards found in deck '{deck_name}'.");
        }
    }
    Ok(true)
}

fn render_cards(cards: &[StruggleCard], format: CardsFormat) -> Fallible<String> {
    match format {
        CardsFormat::Json => Ok(serde_json::to_string_pretty(cards)?),
        CardsFormat::Text => Ok(cards
            .iter()
            .map(|card| format!("{} / {}", card.front, card.back))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards() -> Vec<StruggleCard> {
        vec![StruggleCard::new("cat", "gato"), StruggleCard::new("dog", "cão")]
    }

    #[test]
    fn test_render_text() -> Fallible<()> {
        assert_eq!(render_cards(&cards(), CardsFormat::Text)?, "cat / gato\ndog / cão");
        Ok(())
    }

    #[test]
    fn test_render_json() -> Fallible<()> {
        let json = render_cards(&cards(), CardsFormat::Json)?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(
            value,
            serde_json::json!([
                {"front": "cat", "back": "gato"},
                {"front": "dog", "back": "cão"}
            ])
        );
        Ok(())
    }

    #[test]
    fn test_render_empty() -> Fallible<()> {
        assert_eq!(render_cards(&[], CardsFormat::Text)?, "");
        assert_eq!(render_cards(&[], CardsFormat::Json)?, "[]");
        Ok(())
    }
}
