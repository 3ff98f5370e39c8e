// Ballpark - League document types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeagueFormat {
    #[serde(rename = "roto")]
    Roto,
    #[serde(rename = "h2h-points")]
    HeadToHeadPoints,
    #[serde(rename = "h2h-category")]
    HeadToHeadCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftType {
    Auction,
    Snake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BattingCategory {
    R,
    Hr,
    Rbi,
    Sb,
    Avg,
    Obp,
    Slg,
    Ops,
    H,
    #[serde(rename = "2B")]
    Doubles,
    #[serde(rename = "3B")]
    Triples,
    Bb,
    K,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PitchingCategory {
    W,
    Sv,
    K,
    Era,
    Whip,
    Qs,
    Ip,
    H,
    Bb,
    Hr,
    L,
    Hld,
    #[serde(rename = "SV+HLD")]
    SavesPlusHolds,
}

/// Roster slot counts per position. Missing slots take the standard
/// 5x5 defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSlots {
    #[serde(rename = "C", default = "one")]
    pub catcher: u32,
    #[serde(rename = "1B", default = "one")]
    pub first_base: u32,
    #[serde(rename = "2B", default = "one")]
    pub second_base: u32,
    #[serde(rename = "3B", default = "one")]
    pub third_base: u32,
    #[serde(rename = "SS", default = "one")]
    pub shortstop: u32,
    #[serde(rename = "OF", default = "three")]
    pub outfield: u32,
    #[serde(rename = "UTIL", default)]
    pub utility: u32,
    #[serde(rename = "SP", default = "five")]
    pub starting_pitchers: u32,
    #[serde(rename = "RP", default = "two")]
    pub relief_pitchers: u32,
    #[serde(rename = "P", default)]
    pub pitchers: u32,
    #[serde(rename = "BENCH", default)]
    pub bench: u32,
}

fn one() -> u32 {
    1
}
fn two() -> u32 {
    2
}
fn three() -> u32 {
    3
}
fn five() -> u32 {
    5
}

impl Default for RosterSlots {
    fn default() -> Self {
        Self {
            catcher: 1,
            first_base: 1,
            second_base: 1,
            third_base: 1,
            shortstop: 1,
            outfield: 3,
            utility: 0,
            starting_pitchers: 5,
            relief_pitchers: 2,
            pitchers: 0,
            bench: 0,
        }
    }
}

/// League settings as submitted by an administrator or seeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueInput {
    pub external_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub format: LeagueFormat,
    pub draft_type: DraftType,
    pub batting_categories: Vec<BattingCategory>,
    pub pitching_categories: Vec<PitchingCategory>,
    #[serde(default)]
    pub roster_slots: RosterSlots,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_budget: Option<u32>,
    #[serde(default)]
    pub is_default: bool,
    /// Per-category weighting for projections, keyed by category label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_weights: Option<BTreeMap<String, f64>>,
}

impl LeagueInput {
    pub fn normalize(mut self) -> Result<Self, ApiError> {
        self.external_id = self.external_id.trim().to_string();
        self.name = self.name.trim().to_string();
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let invalid = |msg: &str| Err(ApiError::Validation(msg.to_string()));

        if self.external_id.is_empty() {
            return invalid("League externalId is required");
        }
        if self.name.is_empty() {
            return invalid("League name is required");
        }
        if self.batting_categories.is_empty() {
            return invalid("At least one batting category is required");
        }
        if self.pitching_categories.is_empty() {
            return invalid("At least one pitching category is required");
        }
        if self.total_budget == Some(0) {
            return invalid("Total budget must be at least 1");
        }
        if let Some(weights) = &self.category_weights {
            if weights.values().any(|w| !w.is_finite()) {
                return invalid("Category weights must be finite numbers");
            }
        }

        Ok(self)
    }
}

/// A stored league as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: Uuid,
    #[serde(flatten)]
    pub league: LeagueInput,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
