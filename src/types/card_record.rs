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

use serde::Deserialize;

use crate::types::timestamp::Timestamp;

/// The deck manager's identifier for a card.
pub type CardId = u64;

/// Card type code for a card in its first learning steps.
pub const TYPE_LEARNING: i64 = 1;

/// Card type code for a lapsed card going through the relearning steps.
pub const TYPE_RELEARNING: i64 = 3;

/// One card as reported by the deck manager's `cardsInfo` action.
#[derive(Clone, Debug, Deserialize)]
pub struct CardRecord {
    #[serde(rename = "cardId")]
    #[allow(dead_code)]
    pub id: CardId,
    /// Scheduling queue. Negative values mean suspended or buried.
    pub queue: i64,
    /// Learning phase.
    #[serde(rename = "type")]
    pub card_type: i64,
    /// How many times the card was forgotten.
    pub lapses: u32,
    /// Ease factor in permille. Lower is harder.
    pub factor: i64,
    #[serde(rename = "mod")]
    pub modified: Timestamp,
    pub fields: CardFields,
}

/// The note fields of a card. Other fields the note type may define are
/// ignored; `Front` and `Back` must be present or decoding fails.
#[derive(Clone, Debug, Deserialize)]
pub struct CardFields {
    #[serde(rename = "Front")]
    pub front: Field,
    #[serde(rename = "Back")]
    pub back: Field,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Field {
    pub value: String,
}

impl CardRecord {
    pub fn is_suspended_or_buried(&self) -> bool {
        self.queue < 0
    }

    pub fn is_active_learning(&self) -> bool {
        self.card_type == TYPE_LEARNING || self.card_type == TYPE_RELEARNING
    }

    pub fn front(&self) -> &str {
        &self.fields.front.value
    }

    pub fn back(&self) -> &str {
        &self.fields.back.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_decode_cards_info_entry() -> Fallible<()> {
        let json = r#"{
            "answer": "gato",
            "question": "cat",
            "deckName": "My portuguese",
            "cardId": 1498938915662,
            "fields": {
                "Front": {"value": "cat", "order": 0},
                "Back": {"value": "gato", "order": 1},
                "Extra": {"value": "", "order": 2}
            },
            "queue": 1,
            "type": 3,
            "lapses": 4,
            "factor": 2050,
            "mod": 1700000000000,
            "interval": 1
        }"#;
        let card: CardRecord = serde_json::from_str(json)?;
        assert_eq!(card.id, 1498938915662);
        assert_eq!(card.front(), "cat");
        assert_eq!(card.back(), "gato");
        assert_eq!(card.lapses, 4);
        assert_eq!(card.factor, 2050);
        assert_eq!(card.modified, Timestamp::from_millis(1_700_000_000_000));
        assert!(card.is_active_learning());
        assert!(!card.is_suspended_or_buried());
        Ok(())
    }

    #[test]
    fn test_missing_back_field_is_rejected() {
        let json = r#"{
            "cardId": 1, "queue": 0, "type": 2, "lapses": 0, "factor": 2500, "mod": 0,
            "fields": {"Front": {"value": "cat", "order": 0}}
        }"#;
        assert!(serde_json::from_str::<CardRecord>(json).is_err());
    }

    #[test]
    fn test_buried_queue() -> Fallible<()> {
        let json = r#"{
            "cardId": 1, "queue": -2, "type": 2, "lapses": 0, "factor": 2500, "mod": 0,
            "fields": {"Front": {"value": "a"}, "Back": {"value": "b"}}
        }"#;
        let card: CardRecord = serde_json::from_str(json)?;
        assert!(card.is_suspended_or_buried());
        assert!(!card.is_active_learning());
        Ok(())
    }
}
