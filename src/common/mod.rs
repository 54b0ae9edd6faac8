pub mod state;

pub use state::{AppState, CachedPayload, PayloadCache};
