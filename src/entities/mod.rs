pub mod prelude;

pub mod anime;
pub mod episode;
pub mod season;
