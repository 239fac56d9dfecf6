use std::collections::BTreeSet;
use std::env;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;

use super::commands::ListArgs;
use crate::config::DeskConfig;
use crate::entity::{
    Contact, Document, Entity, EntityKind, Expense, Invoice, Opportunity, QualityCheck,
    SignatureRequest, SignatureUpdate,
};
use crate::error::{OpsdeskError, Result};
use crate::metrics::{DeskMetrics, Records};
use crate::notify::TerminalSink;
use crate::panel::{describe, ControlPanel, FormData, FromForm};
use crate::search::{Pagination, Query, Sort, SortOrder, StatusFilter};
use crate::seed;
use crate::session::{Credentials, FileFlagStore, NavigationGuard, Session, SimulatedTransport};
use crate::status::Transition;
use crate::storage::{LoroStore, DESK_DIR};
use crate::view::{actions_for, format_date, KanbanBoard, TableRow, TableView, ViewMode};

/// A module the CLI can drive: form input plus table rendering.
trait Record: FromForm + TableRow {}

impl<T: FromForm + TableRow> Record for T {}

/// Run a generic handler with the concrete record type for `kind`.
macro_rules! for_kind {
    ($kind:expr, $handler:ident($($arg:expr),*)) => {
        match $kind {
            EntityKind::Contact => $handler::<Contact>($($arg),*),
            EntityKind::Opportunity => $handler::<Opportunity>($($arg),*),
            EntityKind::Expense => $handler::<Expense>($($arg),*),
            EntityKind::Document => $handler::<Document>($($arg),*),
            EntityKind::Invoice => $handler::<Invoice>($($arg),*),
            EntityKind::QualityCheck => $handler::<QualityCheck>($($arg),*),
            EntityKind::Signature => $handler::<SignatureRequest>($($arg),*),
        }
    };
}

/// Find the project root by looking for .opsdesk/ or .git/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(DESK_DIR).exists() || current.join(".git").exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn get_git_author() -> Option<String> {
    std::process::Command::new("git")
        .args(["config", "user.name"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            } else {
                None
            }
        })
}

fn parse_kind(raw: &str) -> Result<EntityKind> {
    raw.parse()
        .map_err(|_| OpsdeskError::InvalidEntityType(raw.to_string()))
}

/// An opened workspace: the document plus its settings.
struct Workspace {
    store: LoroStore,
    config: DeskConfig,
}

impl Workspace {
    fn open() -> Result<Self> {
        let root = find_project_root();
        let store = LoroStore::open(&root)?;
        let config = DeskConfig::load(store.desk_dir())?;
        Ok(Self { store, config })
    }

    /// Open for a module command; refuses when sign-in is required and missing.
    fn open_guarded() -> Result<Self> {
        let workspace = Self::open()?;
        NavigationGuard::new(workspace.config.require_login)
            .check(&FileFlagStore::new(workspace.store.desk_dir()))?;
        Ok(workspace)
    }

    fn panel<E: Record>(&self, quiet: bool) -> Result<ControlPanel<E, TerminalSink>> {
        let mut panel = ControlPanel::new(self.store.load_store()?, TerminalSink::new(quiet));
        panel.set_view_mode(self.config.default_view);
        panel.set_pagination(Pagination::new(1, self.config.page_size));
        Ok(panel)
    }

    /// Write the panel's collection back if anything changed.
    fn commit<E: Record>(&mut self, panel: ControlPanel<E, TerminalSink>) -> Result<()> {
        if panel.changes() == 0 {
            return Ok(());
        }
        let (store, _) = panel.into_parts();
        self.store.persist(store.list())?;
        self.store.save()
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn handle_init(with_seed: bool) -> Result<()> {
    let root = env::current_dir()?;

    let mut store = LoroStore::init(&root)?;
    DeskConfig::default().save(store.desk_dir())?;

    if with_seed {
        store.persist(&seed::contacts())?;
        store.persist(&seed::opportunities())?;
        store.persist(&seed::expenses())?;
        store.persist(&seed::documents())?;
        store.persist(&seed::invoices())?;
        store.persist(&seed::quality_checks())?;
        store.persist(&seed::signatures())?;
        store.save()?;
    }

    println!("Initialized opsdesk workspace in {}", root.display());
    if with_seed {
        println!("  Loaded demo records into every module");
    }

    Ok(())
}

pub fn handle_login(email: String, password: String) -> Result<()> {
    let workspace = Workspace::open()?;
    let mut session = Session::new(FileFlagStore::new(workspace.store.desk_dir()))?;
    let transport =
        SimulatedTransport::new(Duration::from_millis(workspace.config.login_latency_ms));
    let credentials = Credentials::new(email.clone(), password);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(session.login(&transport, &credentials))?;

    println!("Signed in as {}", email);
    Ok(())
}

pub fn handle_logout() -> Result<()> {
    let workspace = Workspace::open()?;
    let mut session = Session::new(FileFlagStore::new(workspace.store.desk_dir()))?;
    session.logout()?;

    println!("Signed out");
    Ok(())
}

fn add<E: Record>(fields: &[String], json: bool) -> Result<()> {
    let mut workspace = Workspace::open_guarded()?;
    let form = FormData::parse_pairs(fields)?;

    let mut panel = workspace.panel::<E>(json)?.with_author(get_git_author());
    let entity = panel.create(&form)?;
    workspace.commit(panel)?;

    if json {
        print_json(&entity)?;
    }
    Ok(())
}

pub fn handle_add(kind: String, fields: Vec<String>, json: bool) -> Result<()> {
    for_kind!(parse_kind(&kind)?, add(&fields, json))
}

fn list<E: Record>(args: &ListArgs) -> Result<()> {
    let workspace = Workspace::open_guarded()?;
    let mut panel = workspace.panel::<E>(args.json)?;

    let mut query = Query::parse(&args.query.join(" "));
    if let Some(status) = &args.status {
        query.status = StatusFilter::parse(status);
    }
    panel.set_query(query);

    let order = if args.desc {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    panel.set_sort(args.sort.map(|key| Sort::new(key, order)));
    if let Some(mode) = args.view {
        panel.set_view_mode(mode);
    }
    let per_page = args.per_page.unwrap_or(workspace.config.page_size);
    panel.set_pagination(Pagination::new(args.page, per_page));

    let fmt = workspace.config.display_format();
    match panel.view_mode() {
        ViewMode::Table => {
            let page = panel.page();
            if args.json {
                return print_json(&page);
            }

            if page.items.is_empty() && page.total > 0 {
                println!(
                    "Page {} is past the end: {} {} on {} page(s).",
                    page.page,
                    page.total,
                    E::KIND.heading().to_lowercase(),
                    page.total_pages
                );
                return Ok(());
            }

            let table = TableView::build(&page.items, panel.selected_ids(), &fmt);
            print!("{}", table);
            if !table.is_empty() {
                let count = panel.record_count();
                println!(
                    "\nShowing {} of {} {} (page {} of {})",
                    page.items.len(),
                    count.visible,
                    E::KIND.heading().to_lowercase(),
                    page.page,
                    page.total_pages
                );
            }
        }
        ViewMode::Kanban => {
            let board = KanbanBoard::build(&panel.visible(), &fmt);
            if args.json {
                return print_json(&board);
            }
            print!("{}", board);
        }
    }

    Ok(())
}

pub fn handle_list(args: ListArgs) -> Result<()> {
    for_kind!(parse_kind(&args.kind)?, list(&args))
}

fn get<E: Record>(reference: &str, json: bool) -> Result<()> {
    let workspace = Workspace::open_guarded()?;
    let store = workspace.store.load_store::<E>()?;
    let entity = store.resolve(reference)?;

    if json {
        return print_json(entity);
    }

    let fmt = workspace.config.display_format();
    let base = entity.base();
    println!("{}", describe(entity));
    for (column, cell) in E::COLUMNS.iter().zip(entity.cells(&fmt)) {
        println!("  {:<14}{}", format!("{}:", column), cell);
    }
    if !base.tags.is_empty() {
        println!("  {:<14}{}", "Tags:", base.tags.join(", "));
    }
    println!(
        "  {:<14}{}",
        "Created:",
        format_date(Some(base.created_at.date_naive()))
    );
    if let Some(author) = &base.created_by {
        println!("  {:<14}{}", "Created by:", author);
    }
    let actions: Vec<String> = actions_for(entity).iter().map(|a| a.to_string()).collect();
    println!("  {:<14}{}", "Actions:", actions.join(", "));

    Ok(())
}

pub fn handle_get(kind: String, reference: String, json: bool) -> Result<()> {
    for_kind!(parse_kind(&kind)?, get(&reference, json))
}

fn update<E: Record>(reference: &str, fields: &[String], json: bool) -> Result<()> {
    let mut workspace = Workspace::open_guarded()?;
    let form = FormData::parse_pairs(fields)?;

    let mut panel = workspace.panel::<E>(json)?;
    let id = panel.store().resolve(reference)?.id().to_string();
    let entity = panel.edit(&id, &form)?;
    workspace.commit(panel)?;

    if json {
        print_json(&entity)?;
    }
    Ok(())
}

pub fn handle_update(kind: String, reference: String, fields: Vec<String>, json: bool) -> Result<()> {
    for_kind!(parse_kind(&kind)?, update(&reference, &fields, json))
}

fn transition<E: Record>(reference: &str, transition: Transition) -> Result<()> {
    let mut workspace = Workspace::open_guarded()?;

    let mut panel = workspace.panel::<E>(false)?;
    let id = panel.store().resolve(reference)?.id().to_string();
    panel.transition(&id, transition)?;
    workspace.commit(panel)
}

/// `cycle`, `approve` and `reject`.
pub fn handle_transition(kind: String, reference: String, action: Transition) -> Result<()> {
    for_kind!(parse_kind(&kind)?, transition(&reference, action))
}

fn delete<E: Record>(references: &[String], force: bool) -> Result<()> {
    let mut workspace = Workspace::open_guarded()?;
    let mut panel = workspace.panel::<E>(false)?;

    let mut ids = BTreeSet::new();
    let mut labels = Vec::new();
    for reference in references {
        let entity = panel.store().resolve(reference)?;
        if ids.insert(entity.id().to_string()) {
            labels.push(describe(entity));
        }
    }

    // Confirm deletion unless --force is used
    if !force {
        for label in &labels {
            eprintln!("  {}", label);
        }
        eprintln!(
            "Delete {} {}? [y/N] ",
            labels.len(),
            E::KIND.heading().to_lowercase()
        );

        // Check if stdin is a tty for interactive confirmation
        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(OpsdeskError::ConfirmationRequired);
        }
    }

    for id in &ids {
        panel.toggle_selected(id);
    }
    let removed = panel.delete_selected();
    tracing::info!(kind = %E::KIND, removed = removed.len(), "deleted records");
    workspace.commit(panel)
}

pub fn handle_delete(kind: String, references: Vec<String>, force: bool) -> Result<()> {
    for_kind!(parse_kind(&kind)?, delete(&references, force))
}

pub fn handle_metrics(json: bool) -> Result<()> {
    let workspace = Workspace::open_guarded()?;
    let store = &workspace.store;

    let contacts = store.load::<Contact>()?;
    let opportunities = store.load::<Opportunity>()?;
    let expenses = store.load::<Expense>()?;
    let documents = store.load::<Document>()?;
    let invoices = store.load::<Invoice>()?;
    let quality_checks = store.load::<QualityCheck>()?;
    let signatures = store.load::<SignatureRequest>()?;

    let metrics = DeskMetrics::compute(
        Records {
            contacts: &contacts,
            opportunities: &opportunities,
            expenses: &expenses,
            documents: &documents,
            invoices: &invoices,
            quality_checks: &quality_checks,
            signatures: &signatures,
        },
        Utc::now().date_naive(),
        &workspace.config.display_format(),
    );

    if json {
        return print_json(&metrics);
    }
    print!("{}", metrics);
    Ok(())
}

/// Positions are 1-based on the command line.
pub fn handle_reorder_signers(reference: String, from: usize, to: usize, json: bool) -> Result<()> {
    let mut workspace = Workspace::open_guarded()?;
    let mut panel = workspace.panel::<SignatureRequest>(json)?;

    let request = panel.store().resolve(&reference)?;
    let len = request.signers.len();
    let position = |n: usize| {
        n.checked_sub(1)
            .ok_or(OpsdeskError::IndexOutOfRange { index: n, len })
    };
    let signers = request.reordered_signers(position(from)?, position(to)?)?;
    let id = request.id().to_string();

    let updated = panel.update(
        &id,
        SignatureUpdate {
            signers: Some(signers.into_iter().map(|s| s.name).collect()),
            ..Default::default()
        },
    )?;
    workspace.commit(panel)?;

    if json {
        return print_json(&updated);
    }
    for (i, signer) in updated.signers.iter().enumerate() {
        let mark = if signer.signed { " (signed)" } else { "" };
        println!("  {}. {}{}", i + 1, signer.name, mark);
    }
    Ok(())
}
