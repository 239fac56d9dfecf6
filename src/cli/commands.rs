use clap::{Args, Parser, Subcommand};

use crate::search::SortKey;
use crate::view::ViewMode;

#[derive(Parser, Debug)]
#[command(name = "opsdesk")]
#[command(version, about = "Business records for small teams: contacts, sales, invoices, expenses and more")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new opsdesk workspace in the current directory
    Init {
        /// Load demo records into every module
        #[arg(long)]
        seed: bool,
    },

    /// Sign in to the workspace
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Sign out of the workspace
    Logout,

    /// Create a record
    Add {
        /// Module (contact, opportunity, expense, document, invoice, quality_check, signature)
        #[arg(value_name = "KIND")]
        kind: String,

        /// Field values (can be specified multiple times)
        #[arg(long = "field", short = 'f', value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List records of one module
    List(ListArgs),

    /// Show a single record
    Get {
        #[arg(value_name = "KIND")]
        kind: String,

        /// Record reference (sequence number like "3" or id prefix like "a1b2c")
        #[arg(value_name = "REF")]
        reference: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit fields of a record
    Update {
        #[arg(value_name = "KIND")]
        kind: String,

        #[arg(value_name = "REF")]
        reference: String,

        /// Field values; an empty value clears optional fields
        #[arg(long = "field", short = 'f', value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a record to the next status in its module's cycle
    Cycle {
        #[arg(value_name = "KIND")]
        kind: String,

        #[arg(value_name = "REF")]
        reference: String,
    },

    /// Approve a pending record (expenses, quality checks)
    Approve {
        #[arg(value_name = "KIND")]
        kind: String,

        #[arg(value_name = "REF")]
        reference: String,
    },

    /// Reject a pending record (expenses, quality checks)
    Reject {
        #[arg(value_name = "KIND")]
        kind: String,

        #[arg(value_name = "REF")]
        reference: String,
    },

    /// Delete one or more records
    Delete {
        #[arg(value_name = "KIND")]
        kind: String,

        #[arg(value_name = "REF", required = true)]
        references: Vec<String>,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Show totals and ratios across all modules
    Metrics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a signer of a signature request to another position (1-based)
    ReorderSigners {
        #[arg(value_name = "REF")]
        reference: String,

        from: usize,

        to: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(value_name = "KIND")]
    pub kind: String,

    /// Search text and filters (status:paid tag:q3 created:>2025-01-01)
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Status filter ("all" for every status)
    #[arg(long)]
    pub status: Option<String>,

    /// Sort by name, created, amount or status
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// table or kanban (defaults to the workspace setting)
    #[arg(long)]
    pub view: Option<ViewMode>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (defaults to the workspace setting)
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
