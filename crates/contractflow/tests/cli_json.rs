use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn contractflow_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_contractflow"))
}

fn run_cli(args: &[&str], home: &Path) -> Output {
    Command::new(contractflow_bin())
        .args(args)
        .env("CONTRACTFLOW_HOME", home)
        .env_remove("CONTRACTFLOW_CONFIG")
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to execute contractflow CLI")
}

fn run_cli_json<T: DeserializeOwned>(args: &[&str], home: &Path) -> T {
    let output = run_cli(args, home);
    assert!(
        output.status.success(),
        "command failed: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "failed to parse JSON output: {}\nstdout:\n{}",
            err,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[derive(Debug, Deserialize)]
struct BlueprintItem {
    id: String,
    name: String,
    fields: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ContractItem {
    id: String,
    status: String,
    history: Vec<HistoryItem>,
    #[serde(default)]
    available_actions: Vec<String>,
    values: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct HistoryItem {
    status: String,
}

#[derive(Debug, Deserialize)]
struct Stats {
    total: usize,
    active: usize,
    signed: usize,
    pending: usize,
}

#[derive(Debug, Deserialize)]
struct RunOutput {
    steps: Vec<StepItem>,
    contracts: Vec<ContractItem>,
}

#[derive(Debug, Deserialize)]
struct StepItem {
    op: String,
    outcome: String,
}

#[test]
fn test_seeded_listing() {
    let home = TempDir::new().expect("create temp home");

    let blueprints: Vec<BlueprintItem> = run_cli_json(&["blueprints", "--json"], home.path());
    assert_eq!(blueprints.len(), 2);
    assert_eq!(blueprints[0].id, "bp_1");
    assert_eq!(blueprints[0].fields.len(), 5);
    assert_eq!(blueprints[1].name, "Freelance Service Agreement");

    let signed: Vec<ContractItem> =
        run_cli_json(&["contracts", "--filter", "signed", "--json"], home.path());
    assert_eq!(signed.len(), 1);
    assert_eq!(signed[0].id, "ct_1");
    assert_eq!(signed[0].history.len(), 4);

    let stats: Stats = run_cli_json(&["stats", "--json"], home.path());
    assert_eq!((stats.total, stats.active, stats.signed, stats.pending), (2, 1, 1, 0));
}

#[test]
fn test_show_lists_actions() {
    let home = TempDir::new().expect("create temp home");
    let detail: ContractItem = run_cli_json(&["show", "ct_2", "--json"], home.path());
    assert_eq!(detail.status, "approved");
    assert_eq!(detail.available_actions, vec!["send", "revoke"]);
    assert_eq!(detail.values["f_3"], "5000");
}

#[test]
fn test_show_unknown_contract_fails_with_suggestion() {
    let home = TempDir::new().expect("create temp home");
    let output = run_cli(&["show", "ct_nope"], home.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Contract not found: ct_nope"), "stderr: {stderr}");
    assert!(stderr.contains("TRY:"));
}

#[test]
fn test_no_seed_starts_empty() {
    let home = TempDir::new().expect("create temp home");
    let contracts: Vec<ContractItem> = run_cli_json(&["--no-seed", "contracts", "--json"], home.path());
    assert!(contracts.is_empty());
}

#[test]
fn test_config_file_disables_seeding() {
    let home = TempDir::new().expect("create temp home");
    fs::write(
        home.path().join("config.toml"),
        "[store]\nseed_samples = false\n\n[logging]\nfile = false\n",
    )
    .unwrap();

    let stats: Stats = run_cli_json(&["stats", "--json"], home.path());
    assert_eq!(stats.total, 0);
    assert!(!home.path().join("logs").exists());
}

#[test]
fn test_run_script() {
    let home = TempDir::new().expect("create temp home");
    let script = home.path().join("flow.json");
    fs::write(
        &script,
        r#"[
            {"op": "set_status", "contract": "ct_2", "status": "sent"},
            {"op": "sign", "contract": "ct_2", "signature": "Jordan Lee"},
            {"op": "set_status", "contract": "ct_2", "status": "locked"},
            {"op": "set_status", "contract": "ct_2", "status": "revoked"}
        ]"#,
    )
    .unwrap();

    let script_arg = script.to_string_lossy().to_string();
    let output: RunOutput = run_cli_json(&["run", &script_arg, "--json"], home.path());
    let outcomes: Vec<&str> = output.steps.iter().map(|s| s.outcome.as_str()).collect();
    assert_eq!(
        outcomes,
        vec!["approved -> sent", "sent -> signed", "signed -> locked", "unchanged (locked)"]
    );
    assert_eq!(output.steps[1].op, "sign");

    let website = output.contracts.iter().find(|c| c.id == "ct_2").unwrap();
    assert_eq!(website.status, "locked");
    let statuses: Vec<&str> = website.history.iter().map(|h| h.status.as_str()).collect();
    assert_eq!(statuses, vec!["created", "approved", "sent", "signed", "locked"]);
    assert_eq!(website.values["f_5"], "Jordan Lee");
}

#[test]
fn test_run_script_rejects_skips() {
    let home = TempDir::new().expect("create temp home");
    let script = home.path().join("skip.json");
    fs::write(
        &script,
        r#"[{"op": "set_status", "contract": "ct_2", "status": "locked"}]"#,
    )
    .unwrap();

    let script_arg = script.to_string_lossy().to_string();
    let output = run_cli(&["run", &script_arg], home.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Step 1 (set_status) failed"), "stderr: {stderr}");
    assert!(stderr.contains("invalid transition from approved to locked"));
}
