mod recent;
mod sync;

pub use recent::cmd_recent;
pub use sync::{cmd_add_anime, cmd_update_episodes};
