pub mod fake_feed;
pub mod feed;
pub mod fixture_fetch;
pub mod formation;
pub mod http_cache;
pub mod http_client;
pub mod league_fetch;
pub mod persist;
pub mod positions;
pub mod state;
