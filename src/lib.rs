pub mod cli;
pub mod collection;
pub mod config;
pub mod entity;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod panel;
pub mod search;
pub mod seed;
pub mod session;
pub mod status;
pub mod storage;
pub mod view;

pub use collection::CollectionStore;
pub use error::{OpsdeskError, Result};
pub use panel::ControlPanel;
