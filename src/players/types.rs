// Ballpark - Player document types
//
// `PlayerInput` is what the sync feed and the store exchange; `Player` adds
// the store id and timestamps for API responses. Enumerations serialize to
// the abbreviations fantasy tools use ("1B", "SP", "il-10").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    Shortstop,
    #[serde(rename = "OF")]
    Outfield,
    #[serde(rename = "DH")]
    DesignatedHitter,
    #[serde(rename = "SP")]
    StartingPitcher,
    #[serde(rename = "RP")]
    ReliefPitcher,
}

/// MLB league affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MlbLeague {
    #[serde(rename = "AL")]
    American,
    #[serde(rename = "NL")]
    National,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    Hitter,
    Pitcher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthChartStatus {
    Starter,
    Backup,
    Reserve,
    Minors,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjuryStatus {
    #[default]
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "day-to-day")]
    DayToDay,
    #[serde(rename = "il-10")]
    Il10,
    #[serde(rename = "il-15")]
    Il15,
    #[serde(rename = "il-60")]
    Il60,
    #[serde(rename = "out")]
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatSide {
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "S")]
    Switch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PitchHand {
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "L")]
    Left,
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitterStats {
    /// Batting average, 0.0 to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ba: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hr: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbi: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sb: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitcherStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wins: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub losses: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saves: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikeouts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub innings: Option<f64>,
}

/// One season line, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayerStat {
    Hitter { season: String, data: HitterStats },
    Pitcher { season: String, data: PitcherStats },
}

impl PlayerStat {
    fn validate(&self) -> Result<(), String> {
        match self {
            PlayerStat::Hitter { data, .. } => {
                if let Some(ba) = data.ba {
                    if !(0.0..=1.0).contains(&ba) {
                        return Err("Batting average must be between 0 and 1".to_string());
                    }
                }
            }
            PlayerStat::Pitcher { data, .. } => {
                if data.era.is_some_and(|v| v.is_nan() || v < 0.0) {
                    return Err("ERA must be non-negative".to_string());
                }
                if data.innings.is_some_and(|v| v.is_nan() || v < 0.0) {
                    return Err("Innings pitched must be non-negative".to_string());
                }
            }
        }
        Ok(())
    }
}

// ─── Player ──────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

/// Player fields as written by the sync job or an administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInput {
    /// Upstream statistics-provider id. Upserts are keyed on it.
    pub external_id: String,
    pub name: String,
    /// Three-letter team code.
    pub team: String,
    pub positions: Vec<Position>,
    pub league: MlbLeague,
    pub player_type: PlayerType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stats: Vec<PlayerStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_chart_status: Option<DepthChartStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_chart_order: Option<u32>,
    #[serde(default)]
    pub injury_status: InjuryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mlb_debut_date: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Hitters only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bat_side: Option<BatSide>,
    /// Pitchers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_hand: Option<PitchHand>,
}

impl PlayerInput {
    /// Trim and uppercase where the stored form requires it, then check the
    /// field constraints.
    pub fn normalize(mut self) -> Result<Self, ApiError> {
        self.external_id = self.external_id.trim().to_string();
        self.name = self.name.trim().to_string();
        self.team = self.team.trim().to_uppercase();

        let invalid = |msg: &str| Err(ApiError::Validation(msg.to_string()));

        if self.external_id.is_empty() {
            return invalid("Player externalId is required");
        }
        if self.name.is_empty() {
            return invalid("Player name is required");
        }
        if self.team.chars().count() != 3 {
            return invalid("Team must be a three-letter code");
        }
        if self.positions.is_empty() {
            return invalid("Player must have at least one position");
        }
        if self.depth_chart_order == Some(0) {
            return invalid("Depth chart order starts at 1");
        }
        if self.player_type == PlayerType::Pitcher && self.bat_side.is_some() {
            return invalid("batSide applies to hitters only");
        }
        if self.player_type == PlayerType::Hitter && self.pitch_hand.is_some() {
            return invalid("pitchHand applies to pitchers only");
        }
        for stat in &self.stats {
            stat.validate().map_err(ApiError::Validation)?;
        }

        Ok(self)
    }
}

/// A stored player as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    #[serde(flatten)]
    pub player: PlayerInput,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
