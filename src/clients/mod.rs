pub mod http;
pub mod jikan;
