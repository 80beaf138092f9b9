pub mod tags;
pub mod types;

pub use tags::{CLUSTER_ID_TAG, INVESTIGATION_ID_TAG, USERNAME_TAG};
pub use types::*;
