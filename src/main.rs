use clap::Parser;
use opsdesk::cli::{
    handle_add, handle_delete, handle_get, handle_init, handle_list, handle_login, handle_logout,
    handle_metrics, handle_reorder_signers, handle_transition, handle_update, Cli, Commands,
};
use opsdesk::status::Transition;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --json
    let filter = EnvFilter::try_from_env("OPSDESK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Commands::Init { seed } => handle_init(seed),
        Commands::Login { email, password } => handle_login(email, password),
        Commands::Logout => handle_logout(),
        Commands::Add { kind, fields, json } => handle_add(kind, fields, json),
        Commands::List(args) => handle_list(args),
        Commands::Get {
            kind,
            reference,
            json,
        } => handle_get(kind, reference, json),
        Commands::Update {
            kind,
            reference,
            fields,
            json,
        } => handle_update(kind, reference, fields, json),
        Commands::Cycle { kind, reference } => handle_transition(kind, reference, Transition::Cycle),
        Commands::Approve { kind, reference } => {
            handle_transition(kind, reference, Transition::Approve)
        }
        Commands::Reject { kind, reference } => {
            handle_transition(kind, reference, Transition::Reject)
        }
        Commands::Delete {
            kind,
            references,
            force,
        } => handle_delete(kind, references, force),
        Commands::Metrics { json } => handle_metrics(json),
        Commands::ReorderSigners {
            reference,
            from,
            to,
            json,
        } => handle_reorder_signers(reference, from, to, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
