use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn opsdesk_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_opsdesk"))
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    opsdesk_cmd()
        .current_dir(dir.path())
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Initialized workspace with sign-in turned off.
fn workspace(seed: bool) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let args: &[&str] = if seed { &["init", "--seed"] } else { &["init"] };
    let output = run(&tmp, args);
    assert!(output.status.success(), "init failed: {}", stderr(&output));

    fs::write(
        tmp.path().join(".opsdesk/config.yaml"),
        "require_login: false\nlogin_latency_ms: 0\n",
    )
    .unwrap();
    tmp
}

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();

    let output = run(&tmp, &["init"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Initialized opsdesk workspace"));
    assert!(tmp.path().join(".opsdesk/desk.loro").exists());
    assert!(tmp.path().join(".opsdesk/config.yaml").exists());
}

#[test]
fn test_init_twice_fails() {
    let tmp = TempDir::new().unwrap();
    run(&tmp, &["init"]);

    let output = run(&tmp, &["init"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Already initialized"));
}

#[test]
fn test_add_without_init_fails() {
    let tmp = TempDir::new().unwrap();

    let output = run(&tmp, &["add", "contact", "-f", "name=Ann"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Not in an opsdesk project"));
}

#[test]
fn test_guard_requires_login() {
    let tmp = TempDir::new().unwrap();
    run(&tmp, &["init"]);
    fs::write(
        tmp.path().join(".opsdesk/config.yaml"),
        "login_latency_ms: 0\n",
    )
    .unwrap();

    let output = run(&tmp, &["list", "contact"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Not signed in"));

    let output = run(&tmp, &["login", "--email", "not-an-email", "--password", "pw"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Sign-in failed"));

    let output = run(&tmp, &["login", "--email", "ann@example.com", "--password", "pw"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Signed in as ann@example.com"));

    let output = run(&tmp, &["list", "contact"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No contacts found."));

    let output = run(&tmp, &["logout"]);
    assert!(output.status.success());

    let output = run(&tmp, &["list", "contact"]);
    assert!(!output.status.success());
}

#[test]
fn test_invoice_workflow() {
    let tmp = workspace(false);

    let output = run(
        &tmp,
        &[
            "add",
            "invoice",
            "-f",
            "number=INV-001",
            "-f",
            "customer=Acme Corporation",
            "-f",
            "amount=1250",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Invoice created"));
    assert!(out.contains("001"));
    assert!(out.contains("INV-001"));

    let output = run(&tmp, &["list", "invoices"]);
    let out = stdout(&output);
    assert!(out.contains("INV-001"));
    assert!(out.contains("$1,250.00"));
    assert!(out.contains("Showing 1 of 1 invoices"));

    let output = run(&tmp, &["cycle", "invoice", "1"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Invoice sent"));

    let output = run(&tmp, &["get", "invoice", "1", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["status"], "sent");

    let output = run(
        &tmp,
        &["update", "invoice", "1", "-f", "amount=99.5", "--json"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["amount"], 99.5);
    assert_eq!(parsed["number"], "INV-001");

    let output = run(&tmp, &["get", "invoice", "1"]);
    let out = stdout(&output);
    assert!(out.contains("$99.50"));
    assert!(out.contains("Actions:"));
}

#[test]
fn test_validation_error_leaves_module_unchanged() {
    let tmp = workspace(false);

    let output = run(
        &tmp,
        &["add", "invoice", "-f", "number=INV-001", "-f", "amount=lots"],
    );

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("customer: is required"));
    assert!(err.contains("amount: must be a number"));

    let output = run(&tmp, &["list", "invoice"]);
    assert!(stdout(&output).contains("No invoices found."));
}

#[test]
fn test_unknown_field_is_rejected() {
    let tmp = workspace(false);

    let output = run(
        &tmp,
        &["add", "contact", "-f", "name=Ann", "-f", "email=ann@example.com", "-f", "shoe=42"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("shoe: unknown field"));
}

#[test]
fn test_approval_flow() {
    let tmp = workspace(true);

    let output = run(&tmp, &["approve", "expense", "2"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Expense approved"));

    let output = run(&tmp, &["reject", "expense", "2"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Cannot reject"));

    let output = run(&tmp, &["cycle", "expense", "4"]);
    assert!(!output.status.success());

    let output = run(&tmp, &["get", "expense", "2", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["status"], "approved");
}

#[test]
fn test_search_and_status_filter() {
    let tmp = workspace(true);

    let output = run(&tmp, &["list", "contact", "acme"]);
    let out = stdout(&output);
    assert!(out.contains("John Smith"));
    assert!(!out.contains("Sarah Johnson"));

    let output = run(&tmp, &["list", "contact", "--status", "lead"]);
    let out = stdout(&output);
    assert!(out.contains("Michael Brown"));
    assert!(out.contains("Emily Davis"));
    assert!(!out.contains("John Smith"));

    let output = run(&tmp, &["list", "contact", "status:archived"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No contacts found."));
}

#[test]
fn test_kanban_view_groups_by_stage() {
    let tmp = workspace(true);

    let output = run(&tmp, &["list", "opportunity", "--view", "kanban"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("NEW (1)"));
    assert!(out.contains("WON (1)  $12,000.00"));
    assert!(out.contains("Support renewal"));
}

#[test]
fn test_list_json_is_paged() {
    let tmp = workspace(true);

    let output = run(
        &tmp,
        &["list", "contact", "--sort", "name", "--per-page", "3", "--page", "2", "--json"],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["total"], 4);
    assert_eq!(parsed["total_pages"], 2);
    let items = parsed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Sarah Johnson");
}

#[test]
fn test_page_past_the_end() {
    let tmp = workspace(true);

    let output = run(&tmp, &["list", "contact", "--per-page", "3", "--page", "5"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Page 5 is past the end: 4 contacts on 2 page(s)."));
    assert!(!out.contains("No contacts found."));
}

#[test]
fn test_edit_signers_keeps_signed_state() {
    let tmp = workspace(true);

    let output = run(
        &tmp,
        &["update", "signature", "1", "-f", "signers=Sarah Johnson, Dana Park", "--json"],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["signers"][0]["name"], "Sarah Johnson");
    assert_eq!(parsed["signers"][0]["signed"], true);
    assert_eq!(parsed["signers"][1]["name"], "Dana Park");
    assert_eq!(parsed["signers"][1]["signed"], false);
}

#[test]
fn test_delete_requires_force_when_not_interactive() {
    let tmp = workspace(true);

    let output = run(&tmp, &["delete", "contact", "1"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--force"));

    let output = run(&tmp, &["delete", "contact", "1", "2", "--force"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Contact deleted"));

    let output = run(&tmp, &["list", "contact"]);
    let out = stdout(&output);
    assert!(!out.contains("John Smith"));
    assert!(out.contains("Showing 2 of 2 contacts"));

    let output = run(&tmp, &["get", "contact", "1"]);
    assert!(!output.status.success());
}

#[test]
fn test_metrics_on_empty_workspace() {
    let tmp = workspace(false);

    let output = run(&tmp, &["metrics"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("QC pass rate:       n/a"));
    assert!(out.contains("Win rate:           n/a"));
}

#[test]
fn test_metrics_on_seeded_workspace() {
    let tmp = workspace(true);

    let output = run(&tmp, &["metrics", "--json"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["pass_rate"], 50.0);
    assert_eq!(parsed["modules"].as_array().unwrap().len(), 7);
}

#[test]
fn test_reorder_signers() {
    let tmp = workspace(true);

    let output = run(&tmp, &["reorder-signers", "1", "2", "1"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("1. John Smith"));
    assert!(out.contains("2. Sarah Johnson (signed)"));

    let output = run(&tmp, &["reorder-signers", "1", "1", "5"]);
    assert!(!output.status.success());

    let output = run(&tmp, &["get", "signature", "1", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["signers"][0]["name"], "John Smith");
}

#[test]
fn test_invalid_entity_type() {
    let tmp = workspace(false);

    let output = run(&tmp, &["list", "payroll"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid entity type: payroll"));
}

#[test]
fn test_changes_persist_across_invocations() {
    let tmp = workspace(false);

    run(
        &tmp,
        &["add", "contact", "-f", "name=Ann Lee", "-f", "email=ann@example.com"],
    );
    run(
        &tmp,
        &["add", "contact", "-f", "name=Bob Ray", "-f", "email=bob@example.com", "-f", "tags=vip"],
    );

    let output = run(&tmp, &["list", "contact", "tag:vip"]);
    let out = stdout(&output);
    assert!(out.contains("Bob Ray"));
    assert!(!out.contains("Ann Lee"));

    let output = run(&tmp, &["get", "contact", "2", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["name"], "Bob Ray");
}
