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

use crate::anki::DeckSource;
use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::html::email_document;
use crate::html::html_to_text;
use crate::llm::StoryWriter;
use crate::mail::Notifier;
use crate::select::Criteria;
use crate::select::StruggleCard;
use crate::select::select_struggle_cards;
use crate::types::timestamp::Timestamp;

/// The steps of a run, in order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    FetchIds,
    FetchInfo,
    Select,
    GenerateStory,
    ConvertText,
    GenerateTitle,
    Send,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::FetchIds => "fetching card IDs",
            Stage::FetchInfo => "fetching card info",
            Stage::Select => "selecting struggle cards",
            Stage::GenerateStory => "generating the story",
            Stage::ConvertText => "converting the story to text",
            Stage::GenerateTitle => "generating the title",
            Stage::Send => "sending the email",
        };
        write!(f, "{name}")
    }
}

/// What a single run is about.
#[derive(Clone, Debug)]
pub struct Request {
    pub deck_name: String,
    pub recipient: String,
    pub language: String,
}

/// How a run ended, short of an error.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The story was emailed.
    Sent { subject: String },
    /// The deck has no cards.
    NoCards,
    /// No card met the selection criteria.
    NoStruggleCards,
    /// The mail provider refused the message.
    Rejected,
}

/// A failure, tagged with the stage it happened in.
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub error: ErrorReport,
}

impl Display for StageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed while {} ({}): {}", self.stage, self.error.kind(), self.error)
    }
}

impl From<StageError> for ErrorReport {
    fn from(value: StageError) -> Self {
        let message = format!("failed while {}: {}", value.stage, value.error.message());
        ErrorReport::new(value.error.kind(), message)
    }
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, StageError>;
}

impl<T> AtStage<T> for Fallible<T> {
    fn at(self, stage: Stage) -> Result<T, StageError> {
        self.map_err(|error| StageError { stage, error })
    }
}

fn enter(stage: Stage) {
    log::debug!("Stage: {stage}.");
}

pub fn default_title(language: &str) -> String {
    format!("Your {language} Story")
}

/// Fetches cards, picks the hard ones, has a story written about them, and
/// mails it. Runs each stage once, in order, and stops at the first failure.
pub struct Pipeline<D, W, N> {
    deck: D,
    writer: W,
    notifier: N,
    criteria: Criteria,
}

impl<D: DeckSource, W: StoryWriter, N: Notifier> Pipeline<D, W, N> {
    pub fn new(deck: D, writer: W, notifier: N, criteria: Criteria) -> Self {
        Self {
            deck,
            writer,
            notifier,
            criteria,
        }
    }

    /// Runs the pipeline, logging any failure. True only if an email went out.
    pub async fn run(&self, request: &Request, now: Timestamp) -> bool {
        match self.execute(request, now).await {
            Ok(Outcome::Sent { subject }) => {
                log::info!("Sent '{subject}' to {}.", request.recipient);
                true
            }
            Ok(Outcome::NoCards) => {
                log::warn!("No cards found in deck '{}'.", request.deck_name);
                false
            }
            Ok(Outcome::NoStruggleCards) => {
                log::warn!("No struggle cards match the criteria.");
                false
            }
            Ok(Outcome::Rejected) => {
                log::error!("The mail provider did not accept the email.");
                false
            }
            Err(e) => {
                log::error!("Pipeline {e}");
                false
            }
        }
    }

    pub async fn execute(&self, request: &Request, now: Timestamp) -> Result<Outcome, StageError> {
        let fetched =
            fetch_struggle_cards(&self.deck, &request.deck_name, &self.criteria, now).await?;
        let Some(cards) = fetched else {
            return Ok(Outcome::NoCards);
        };
        if cards.is_empty() {
            return Ok(Outcome::NoStruggleCards);
        }

        enter(Stage::GenerateStory);
        log::info!("Generating a {} story...", request.language);
        let story = self
            .writer
            .generate_story(&request.language, &cards)
            .await
            .at(Stage::GenerateStory)?;

        enter(Stage::ConvertText);
        let story_text = html_to_text(&story);
        if story_text.is_empty() {
            return Err(StageError {
                stage: Stage::ConvertText,
                error: ErrorReport::new(ErrorKind::Generation, "the story has no text content"),
            });
        }

        enter(Stage::GenerateTitle);
        log::info!("Generating a title...");
        let subject = match self.writer.generate_title(&story_text).await {
            Ok(title) => title,
            Err(e) => {
                let fallback = default_title(&request.language);
                log::warn!("Title generation failed ({e}); using '{fallback}'.");
                fallback
            }
        };

        enter(Stage::Send);
        log::info!("Sending '{subject}' to {}...", request.recipient);
        let body = email_document(&story, &cards);
        let sent = self
            .notifier
            .send_email(&request.recipient, &subject, &body)
            .await
            .at(Stage::Send)?;
        if sent {
            Ok(Outcome::Sent { subject })
        } else {
            Ok(Outcome::Rejected)
        }
    }
}

/// The selection half of a run: fetch the deck and pick its struggle cards.
/// `None` means the deck is empty.
pub async fn fetch_struggle_cards(
    deck: &impl DeckSource,
    deck_name: &str,
    criteria: &Criteria,
    now: Timestamp,
) -> Result<Option<Vec<StruggleCard>>, StageError> {
    enter(Stage::FetchIds);
    log::info!("Fetching card IDs for deck '{deck_name}'...");
    let ids = deck.find_card_ids(deck_name).await.at(Stage::FetchIds)?;
    if ids.is_empty() {
        return Ok(None);
    }

    enter(Stage::FetchInfo);
    log::info!("Found {} cards. Fetching card info...", ids.len());
    let records = deck.cards_info(&ids).await.at(Stage::FetchInfo)?;

    enter(Stage::Select);
    let cards = select_struggle_cards(&records, criteria, now);
    log::info!("Selected {} struggle cards.", cards.len());
    for card in &cards {
        log::debug!("  {} / {}", card.front, card.back);
    }
    Ok(Some(cards))
}
