mod fs_utils;
mod guard;
mod layout;
mod store;

pub use fs_utils::{remove_file_if_exists, write_atomic};
pub use guard::{
    acquire, current_unix_timestamp, GuardLease, GuardStatus, MarkerFileGuard, MarkerHolder,
    TransactionGuard, DEFAULT_STALE_AFTER,
};
pub use layout::{default_home, StateLayout};
pub use store::{JsonStateStore, StateStore};
