pub mod anime;
pub mod episode;
pub mod season;

pub use super::{StoreError, StoreResult};
