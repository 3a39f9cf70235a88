pub mod natural;
pub mod persistence;

pub use natural::natural_cmp;
pub use persistence::{load_policy, save_policy, PolicyStoreError};
