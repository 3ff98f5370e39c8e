// Ballpark - Leagues Module
//
// Fantasy league settings: scoring format, categories and roster slots.

mod service;
pub(crate) mod types;

pub use service::LeaguesService;
pub use types::{
    BattingCategory, DraftType, League, LeagueFormat, LeagueInput, PitchingCategory, RosterSlots,
};
