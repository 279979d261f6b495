pub mod table;
pub mod ratelimit;

pub use table::{Align, Table};
pub use ratelimit::{check_cooldown, get_cooldown_seconds};
