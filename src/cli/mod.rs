mod commands;
mod handlers;

pub use commands::{Cli, Commands, ListArgs};
pub use handlers::{
    handle_add, handle_delete, handle_get, handle_init, handle_list, handle_login, handle_logout,
    handle_metrics, handle_reorder_signers, handle_transition, handle_update,
};
