mod loro_store;

pub use loro_store::{LoroStore, DESK_DIR};
