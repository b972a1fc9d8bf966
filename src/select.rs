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

use serde::Serialize;

use crate::types::card_record::CardRecord;
use crate::types::timestamp::Timestamp;

/// The default maximum number of cards put into one story.
pub const DEFAULT_LIMIT: usize = 15;

/// Which cards count as struggle cards.
#[derive(Clone, Debug, PartialEq)]
pub struct Criteria {
    /// Minimum number of lapses.
    pub min_lapses: u32,
    /// Maximum ease factor, if any.
    pub max_factor: Option<i64>,
    /// Only cards modified within this many days, if set.
    pub recent_days: Option<u32>,
    /// Whether cards in learning or relearning are always included, ahead
    /// of everything else.
    pub prioritize_active_learning: bool,
    /// Maximum number of cards returned.
    pub limit: usize,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            min_lapses: 1,
            max_factor: None,
            recent_days: None,
            prioritize_active_learning: true,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Why a card was selected. Variant order is sort order: greater sorts first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Priority {
    OlderStruggle,
    ActiveLearning,
}

/// A selected card: the vocabulary pair the story must use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StruggleCard {
    pub front: String,
    pub back: String,
}

impl StruggleCard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

struct Candidate<'a> {
    card: &'a CardRecord,
    priority: Priority,
}

impl Candidate<'_> {
    fn sort_key(&self) -> (Priority, Timestamp) {
        (self.priority, self.card.modified)
    }
}

/// Picks the cards the learner is struggling with, most urgent first.
///
/// Suspended and buried cards are never selected. When active learning is
/// prioritized, cards in learning or relearning are selected unconditionally;
/// every other card must pass the lapse, ease and recency thresholds. The
/// result is ordered active-learning first, then most recently modified
/// first. Ties keep their input order.
pub fn select_struggle_cards(
    cards: &[CardRecord],
    criteria: &Criteria,
    now: Timestamp,
) -> Vec<StruggleCard> {
    let mut candidates: Vec<Candidate> = cards
        .iter()
        .filter(|card| !card.is_suspended_or_buried())
        .filter_map(|card| {
            classify(card, criteria, now).map(|priority| Candidate { card, priority })
        })
        .collect();
    // `sort_by` is stable, so equal keys keep their input order.
    candidates.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    candidates
        .into_iter()
        .take(criteria.limit)
        .map(|c| StruggleCard::new(c.card.front(), c.card.back()))
        .collect()
}

fn classify(card: &CardRecord, criteria: &Criteria, now: Timestamp) -> Option<Priority> {
    if criteria.prioritize_active_learning && card.is_active_learning() {
        return Some(Priority::ActiveLearning);
    }
    if card.lapses < criteria.min_lapses {
        return None;
    }
    if let Some(max_factor) = criteria.max_factor {
        if card.factor > max_factor {
            return None;
        }
    }
    if let Some(recent_days) = criteria.recent_days {
        if card.modified.days_before(now) > f64::from(recent_days) {
            return None;
        }
    }
    Some(Priority::OlderStruggle)
}
