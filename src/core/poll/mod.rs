pub mod poll_models;
pub mod poll_service;
pub mod read_cache;
pub mod response_store;

pub use poll_models::{tally_votes, PollResponse, VoteCount, POLL_OPTIONS};
pub use poll_service::{PollError, PollService};
pub use response_store::{ResponseStore, StoreError};
