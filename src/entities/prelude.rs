pub use super::anime::Entity as Anime;
pub use super::episode::Entity as Episode;
pub use super::season::Entity as Season;
