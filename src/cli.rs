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

use clap::Args;
use clap::Parser;

use crate::cmd::cards::CardsFormat;
use crate::cmd::cards::print_struggle_cards;
use crate::cmd::send::SendOptions;
use crate::cmd::send::send_story;
use crate::error::Fallible;
use crate::select::Criteria;
use crate::select::DEFAULT_LIMIT;

const DEFAULT_DECK: &str = "My portuguese";
const DEFAULT_LANGUAGE: &str = "Portuguese";

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Write a story from the cards you struggle with and email it.
    Send {
        /// Name of the deck to draw cards from.
        #[arg(long, default_value = DEFAULT_DECK)]
        deck: String,
        /// Recipient address. Defaults to $RECIPIENT_EMAIL.
        #[arg(long)]
        recipient: Option<String>,
        /// The language the story is written in.
        #[arg(long, default_value = DEFAULT_LANGUAGE)]
        language: String,
        /// Theme of the story.
        #[arg(long)]
        theme: Option<String>,
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Print the cards that would go into a story, without sending anything.
    Cards {
        /// Name of the deck to draw cards from.
        #[arg(long, default_value = DEFAULT_DECK)]
        deck: String,
        /// Output format.
        #[arg(long, default_value_t = CardsFormat::Json)]
        format: CardsFormat,
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
}

#[derive(Args, Debug)]
struct CriteriaArgs {
    /// Minimum number of lapses for a card that is not being learned.
    #[arg(long, default_value_t = 1)]
    min_lapses: u32,
    /// Only cards with at most this ease factor (permille).
    #[arg(long)]
    max_factor: Option<i64>,
    /// Only cards modified within this many days.
    #[arg(long)]
    recent_days: Option<u32>,
    /// Do not put cards in learning or relearning first.
    #[arg(long)]
    no_prioritize_active: bool,
    /// Maximum number of cards in the story.
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,
}

impl From<CriteriaArgs> for Criteria {
    fn from(args: CriteriaArgs) -> Self {
        Criteria {
            min_lapses: args.min_lapses,
            max_factor: args.max_factor,
            recent_days: args.recent_days,
            prioritize_active_learning: !args.no_prioritize_active,
            limit: args.limit,
        }
    }
}

/// Parses the command line and runs the command. Returns whether it
/// succeeded.
pub async fn entrypoint() -> Fallible<bool> {
    let cli: Command = Command::parse();
    match cli {
        Command::Send {
            deck,
            recipient,
            language,
            theme,
            criteria,
        } => {
            let options = SendOptions {
                deck_name: deck,
                recipient,
                language,
                theme,
                criteria: criteria.into(),
            };
            send_story(options).await
        }
        Command::Cards {
            deck,
            format,
            criteria,
        } => print_struggle_cards(&deck, &criteria.into(), format).await,
    }
}
