// Ballpark - Background Jobs

mod sync_players;

pub use sync_players::{JsonFileSource, PlayerSource, PlayerSyncJob, SyncError, SyncReport};
