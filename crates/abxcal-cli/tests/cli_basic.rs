//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway data directory and verify
//! outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_abxcal"))
        .args(args)
        .env("ABXCAL_DATA_DIR", data_dir)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    stdout
}

/// Pull the id out of a "<Label>: <id>" line.
fn created_id(stdout: &str, label: &str) -> String {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(label))
        .map(|rest| rest.trim().to_string())
        .unwrap_or_else(|| panic!("no '{label}' line in {stdout}"))
}

#[test]
fn test_event_add_and_list_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(
        dir.path(),
        &["event", "add", "2024-05-06T09:00", "--end", "2024-05-06T10:00", "--title", "Infusion"],
    );
    let id = created_id(&out, "Event created:");

    let list = run_ok(dir.path(), &["event", "list", "--json"]);
    let events: serde_json::Value = serde_json::from_str(&list).unwrap();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], id.as_str());
    assert_eq!(events[0]["title"], "Infusion");
    assert_eq!(events[0]["confirmed"], true);
}

#[test]
fn test_event_add_rejects_inverted_range() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["event", "add", "2024-05-06T10:00", "--end", "2024-05-06T09:00"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_recurring_contact_gets_projected_appointment() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["antibiotic", "set", "Cefazolin", "1.5"]);
    let out = run_ok(
        dir.path(),
        &["contact", "add", "Jane", "--antibiotic", "Cefazolin", "--every", "1", "--unit", "week"],
    );
    let contact = created_id(&out, "Contact created:");

    // Friday 2024-05-03
    run_ok(dir.path(), &["event", "add", "2024-05-03T09:00", "--contact", &contact]);

    let day = run_ok(dir.path(), &["event", "day", "2024-05-10", "--json"]);
    let day: serde_json::Value = serde_json::from_str(&day).unwrap();
    let events = day["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["confirmed"], false);
    assert_eq!(events[0]["contactId"], contact.as_str());
    assert_eq!(events[0]["start"], "2024-05-10T08:00:00");
    assert_eq!(events[0]["end"], "2024-05-10T09:30:00");
    assert_eq!(day["confirmed"], 0);
}

#[test]
fn test_confirm_moves_projection_forward() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["contact", "add", "Bob", "--every", "2", "--unit", "day"]);
    let contact = created_id(&out, "Contact created:");
    run_ok(
        dir.path(),
        &["event", "add", "2024-05-06T09:00", "--end", "2024-05-06T10:00", "--contact", &contact],
    );

    let out = run_ok(dir.path(), &["event", "confirm", &contact]);
    assert!(out.contains("Event confirmed:"));
    assert!(out.contains("Next: 2024-05-10"));

    let list = run_ok(dir.path(), &["event", "list", "--json"]);
    let events: serde_json::Value = serde_json::from_str(&list).unwrap();
    let confirmed = events
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["confirmed"] == true)
        .count();
    assert_eq!(confirmed, 2);
}

#[test]
fn test_event_complete_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["event", "add", "2024-05-06T13:00"]);
    let id = created_id(&out, "Event created:");

    run_ok(dir.path(), &["event", "complete", &id]);
    let list = run_ok(dir.path(), &["event", "list", "--json"]);
    let events: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(events[0]["isCompleted"], true);
    assert_eq!(events[0]["end"], "2024-05-06T14:00:00");

    run_ok(dir.path(), &["event", "delete", &id]);
    let (_, _, code) = run_cli(dir.path(), &["event", "delete", &id]);
    assert_eq!(code, 1);
    assert!(run_ok(dir.path(), &["event", "list"]).contains("No events"));
}

#[test]
fn test_week_total() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["event", "add", "2024-05-06T09:00", "--end", "2024-05-06T10:30"]);
    run_ok(dir.path(), &["event", "add", "2024-05-09T09:00", "--end", "2024-05-09T10:00"]);
    run_ok(dir.path(), &["event", "add", "2024-05-13T09:00", "--end", "2024-05-13T10:00"]);

    let out = run_ok(dir.path(), &["event", "week", "2024-05-08"]);
    assert!(out.contains("Week of 2024-05-06"));
    assert!(out.contains("2h30 (2.50h)"));
}

#[test]
fn test_slot_suggest_skips_busy_hour() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["event", "add", "2024-05-06T08:00", "--end", "2024-05-06T09:00"]);

    let out = run_ok(dir.path(), &["slot", "suggest", "2024-05-06", "--json"]);
    let slot: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(slot["start"], "2024-05-06T09:00:00");
    assert_eq!(slot["end"], "2024-05-06T10:00:00");
}

#[test]
fn test_contact_archive_hides_from_list() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["contact", "add", "Ann"]);
    let id = created_id(&out, "Contact created:");

    run_ok(dir.path(), &["contact", "archive", &id]);
    let visible: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["contact", "list", "--json"])).unwrap();
    assert!(visible.as_array().unwrap().is_empty());

    let all: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["contact", "list", "--all", "--json"])).unwrap();
    assert_eq!(all[0]["isArchived"], true);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(dir.path(), &["config", "get", "scheduling.day_start_hour"]).trim(), "8");

    run_ok(dir.path(), &["config", "set", "scheduling.day_start_hour", "10"]);
    assert_eq!(run_ok(dir.path(), &["config", "get", "scheduling.day_start_hour"]).trim(), "10");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "scheduling.day_start_hour", "20"]);
    assert_eq!(code, 1);

    let out = run_ok(dir.path(), &["slot", "suggest", "2024-05-06", "--json"]);
    let slot: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(slot["start"], "2024-05-06T10:00:00");

    run_ok(dir.path(), &["config", "reset"]);
    assert_eq!(run_ok(dir.path(), &["config", "get", "scheduling.day_start_hour"]).trim(), "8");
}

#[test]
fn test_out_of_range_inputs_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["contact", "add", "Huge", "--every", "4000000000"]);
    assert_eq!(code, 2, "{stderr}");
    let (_, stderr, code) = run_cli(dir.path(), &["contact", "add", "Huge", "--every", "3651", "--unit", "week"]);
    assert_eq!(code, 2, "{stderr}");

    let (_, stderr, code) = run_cli(dir.path(), &["antibiotic", "set", "Forever", "1e12"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("at most 24"), "{stderr}");
    run_ok(dir.path(), &["antibiotic", "set", "Vancomycin", "24"]);

    // the largest accepted interval still projects a ghost
    let out = run_ok(dir.path(), &["contact", "add", "Rare", "--every", "3650", "--unit", "week", "--antibiotic", "Vancomycin"]);
    let contact = created_id(&out, "Contact created:");
    run_ok(dir.path(), &["event", "add", "2024-05-06T09:00", "--contact", &contact]);

    let list = run_ok(dir.path(), &["event", "list", "--json"]);
    let events: serde_json::Value = serde_json::from_str(&list).unwrap();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["end"], "2024-05-07T09:00:00");
}

#[test]
fn test_event_add_has_no_ghost_flag() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["contact", "add", "Ann", "--every", "1", "--unit", "day"]);
    let contact = created_id(&out, "Contact created:");

    let (_, _, code) = run_cli(
        dir.path(),
        &["event", "add", "2024-05-06T09:00", "--contact", &contact, "--ghost"],
    );
    assert_eq!(code, 2);
    assert!(run_ok(dir.path(), &["event", "list"]).contains("No events"));
}

#[test]
fn test_config_list_and_set_echo_settings() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["config", "set", "scheduling.day_end_hour", "17"]);
    assert_eq!(out.trim(), "scheduling.day_end_hour = 17");

    let list = run_ok(dir.path(), &["config", "list"]);
    assert!(list.lines().any(|l| l == "scheduling.day_end_hour = 17"), "{list}");
    assert!(list.lines().any(|l| l == "logging.level = info"), "{list}");

    let json: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["config", "list", "--json"])).unwrap();
    assert_eq!(json["scheduling"]["day_end_hour"], 17);

    assert!(run_ok(dir.path(), &["config", "reset"]).contains("08:00-18:00"));
}
