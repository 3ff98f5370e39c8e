// Ballpark - Players Module
//
// Player documents served by the data API and written by the roster sync.

mod service;
pub(crate) mod types;

pub use service::PlayersService;
pub use types::{
    BatSide, DepthChartStatus, HitterStats, InjuryStatus, MlbLeague, PitchHand, PitcherStats,
    Player, PlayerInput, PlayerStat, PlayerType, Position,
};
