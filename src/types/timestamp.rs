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

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A point in time as milliseconds since the Unix epoch, the way the deck
/// manager reports modification times.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[cfg(test)]
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    #[cfg(test)]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Fractional days elapsed between `self` and the later instant `now`.
    pub fn days_before(self, now: Timestamp) -> f64 {
        now.0.saturating_sub(self.0) as f64 / MILLIS_PER_DAY
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_millis())
    }
}
