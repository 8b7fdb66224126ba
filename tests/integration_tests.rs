//! Integration tests for the ptrack CLI
//!
//! Each test gets its own config file and data file in a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Env {
    tmp: TempDir,
}

impl Env {
    /// Temp directory with a fresh, current data file
    fn new() -> Self {
        let env = Self::empty();
        env.cmd()
            .args(["file", "new"])
            .arg(env.data_file())
            .assert()
            .success();
        env
    }

    /// Temp directory with no data file
    fn empty() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    fn data_file(&self) -> PathBuf {
        self.tmp.path().join("parts.db")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ptrack").unwrap();
        cmd.env("PARTSTRACKER_CONFIG", self.tmp.path().join("config.yaml"))
            .env_remove("PARTSTRACKER_FILE")
            .env_remove("RUST_LOG")
            .current_dir(self.tmp.path());
        cmd
    }

    fn run(&self, args: &[&str]) {
        self.cmd().args(args).assert().success();
    }

    fn stdout(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).output().unwrap();
        assert!(output.status.success(), "{:?} failed: {:?}", args, output);
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn add_part(&self, number: &str, description: &str) {
        self.run(&["part", "new", number, "--description", description]);
    }

    fn add_item(&self, part: &str, assembly: &str, quantity: &str) {
        self.run(&[
            "item", "new", "--part", part, "--assembly", assembly, "--quantity", quantity,
        ]);
    }
}

// ============================================================================
// File commands
// ============================================================================

#[test]
fn test_file_new_creates_and_remembers() {
    let env = Env::new();
    assert!(env.data_file().exists());

    env.cmd()
        .args(["file", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("parts.db"))
        .stdout(predicate::str::contains("Parts"));

    env.cmd()
        .args(["file", "recent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1."))
        .stdout(predicate::str::contains("parts.db"));
}

#[test]
fn test_file_new_refuses_existing_file() {
    let env = Env::new();
    env.cmd()
        .args(["file", "new"])
        .arg(env.data_file())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_no_file_open_is_an_error() {
    let env = Env::empty();
    env.cmd()
        .args(["part", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no data file is open"));
}

#[test]
fn test_close_then_reopen_recent() {
    let env = Env::new();
    env.run(&["file", "close"]);
    env.cmd().args(["part", "list"]).assert().failure();

    env.run(&["file", "recent", "1"]);
    env.cmd().args(["part", "list"]).assert().success();
}

#[test]
fn test_file_flag_overrides_current_file() {
    let env = Env::new();
    let other = env.tmp.path().join("other.db");
    env.cmd().args(["file", "new"]).arg(&other).assert().success();
    env.add_part("ONLY-HERE", "In other.db");

    let data_file = env.data_file();
    let parts = env.stdout(&["--file", data_file.to_str().unwrap(), "part", "list", "-f", "id"]);
    assert!(parts.trim().is_empty());
}

#[test]
fn test_open_missing_file_fails() {
    let env = Env::empty();
    env.cmd()
        .args(["file", "open", "nowhere.db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Parts and items
// ============================================================================

#[test]
fn test_part_new_upper_cases_number() {
    let env = Env::new();
    env.add_part("b7a-6051", "Head gasket");

    env.cmd()
        .args(["part", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("B7A-6051,Head gasket"));
}

#[test]
fn test_part_new_requires_description() {
    let env = Env::new();
    env.cmd()
        .args(["part", "new", "X-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("description"));

    assert!(env.stdout(&["part", "list", "-f", "id"]).trim().is_empty());
}

#[test]
fn test_part_new_rejects_duplicate() {
    let env = Env::new();
    env.add_part("X-1", "Bolt");
    env.cmd()
        .args(["part", "new", "x-1", "-d", "Other bolt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_part_show_totals() {
    let env = Env::new();
    env.add_part("B7A-6051", "Head gasket");
    env.add_item("B7A-6051", "AB", "2");
    env.add_item("B7A-6051", "C", "1");

    env.cmd()
        .args(["part", "show", "b7a-6051"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Head gasket"))
        .stdout(predicate::str::contains("Total quantity: 3"));
}

#[test]
fn test_item_rejects_bad_assembly() {
    let env = Env::new();
    env.cmd()
        .args(["item", "new", "--part", "X-1", "--assembly", "A1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Assembly"));
}

#[test]
fn test_item_tree_filters_by_assembly() {
    let env = Env::new();
    env.add_part("P-1", "Piston");
    env.add_part("P-2", "Pump");
    env.add_item("P-1", "a", "4");
    env.add_item("P-1", "AB", "1");
    env.add_item("P-2", "B", "1");

    let tree = env.stdout(&["item", "tree", "--assembly", "a", "-f", "tsv"]);
    assert!(tree.contains("Piston"));
    assert!(!tree.contains("Pump"));

    let all = env.stdout(&["item", "tree"]);
    assert!(all.contains("Pump"));
}

#[test]
fn test_item_edit_and_delete() {
    let env = Env::new();
    env.add_item("P-1", "A", "1");

    env.run(&["item", "edit", "1", "--quantity", "3", "--installed", "yes"]);
    env.cmd()
        .args(["item", "show", "1", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"quantity\": 3"))
        .stdout(predicate::str::contains("\"installed\": true"));

    env.run(&["item", "delete", "1"]);
    env.cmd()
        .args(["item", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_item_quantity_out_of_range() {
    let env = Env::new();
    env.cmd()
        .args(["item", "new", "-p", "P-1", "-a", "A", "-n", "101"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Quantity"));
}

// ============================================================================
// Bulk operations and export
// ============================================================================

#[test]
fn test_asm_rename_moves_subtree() {
    let env = Env::new();
    env.add_item("P-1", "AB", "1");
    env.add_item("P-1", "ABC", "1");
    env.add_item("P-1", "B", "1");

    env.cmd()
        .args(["asm", "rename", "ab", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 item(s)"));

    let ids = env.stdout(&["item", "tree", "--assembly", "X", "-f", "id"]);
    assert_eq!(ids.lines().count(), 2);
}

#[test]
fn test_asm_export_range() {
    let env = Env::new();
    env.add_part("P-1", "Piston");
    env.add_item("P-1", "A", "1");
    env.add_item("P-1", "AB", "2");
    env.add_item("P-1", "B", "1");

    let csv = env.stdout(&["asm", "export", "A", "B"]);
    let lines: Vec<&str> = csv.lines().collect();
    assert!(lines[0].starts_with("Assembly,Item,Part Number"));
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| !l.starts_with("B,")));
}

#[test]
fn test_asm_export_to_file() {
    let env = Env::new();
    env.add_item("P-1", "A", "1");
    let out = env.tmp.path().join("list.csv");

    env.cmd()
        .args(["asm", "export", "A", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 item(s)"));

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("P-1"));
}

#[test]
fn test_part_renumber_updates_items() {
    let env = Env::new();
    env.add_part("OLD-1", "Bracket");
    env.add_item("OLD-1", "A", "1");

    env.run(&["part", "renumber", "old-1", "new-1"]);

    env.cmd().args(["part", "show", "OLD-1"]).assert().failure();
    env.cmd()
        .args(["part", "show", "NEW-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total quantity: 1"));
}

#[test]
fn test_part_renumber_refuses_existing_target() {
    let env = Env::new();
    env.add_part("P-1", "One");
    env.add_part("P-2", "Two");
    env.cmd().args(["part", "renumber", "P-1", "P-2"]).assert().failure();
}

// ============================================================================
// Orders
// ============================================================================

#[test]
fn test_order_with_lines() {
    let env = Env::new();
    env.run(&[
        "order", "new", "PO-1", "--date", "03/15/2024", "--source", "Moss", "--subtotal", "25",
        "--total", "25",
    ]);
    env.run(&["order", "line", "add", "PO-1", "-p", "P-1", "-c", "10", "-n", "2"]);
    env.run(&["order", "line", "add", "PO-1", "-p", "P-2", "-c", "5", "-n", "1"]);

    env.cmd()
        .args(["order", "show", "PO-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("03/15/2024"))
        .stdout(predicate::str::contains("Lines subtotal: 25.00"));

    env.cmd()
        .args(["order", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PO-1,03/15/2024,Moss"));
}

#[test]
fn test_order_requires_valid_date() {
    let env = Env::new();
    env.cmd()
        .args(["order", "new", "PO-1", "--date", "13/45/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Date"));
}

#[test]
fn test_order_delete_keeps_lines_unless_asked() {
    let env = Env::new();
    env.run(&["order", "new", "PO-1", "-d", "2024-01-02"]);
    env.run(&["order", "line", "add", "PO-1", "-p", "P-1", "-n", "1"]);

    env.cmd()
        .args(["order", "delete", "PO-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--lines"));

    env.run(&["order", "delete", "PO-1", "--lines"]);
    env.cmd().args(["order", "show", "PO-1"]).assert().failure();
}

// ============================================================================
// Lookup lists
// ============================================================================

#[test]
fn test_condition_and_source_lists() {
    let env = Env::new();
    env.run(&["condition", "add", "Rebuilt", "-r", "Shop rebuilt"]);
    env.run(&["source", "add", "Moss Motors"]);

    env.cmd()
        .args(["condition", "list", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebuilt\tShop rebuilt"));

    env.cmd()
        .args(["source", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moss Motors"));

    env.run(&["source", "delete", "Moss Motors"]);
    env.cmd()
        .args(["source", "delete", "Moss Motors"])
        .assert()
        .failure();
}

#[test]
fn test_completions_generate() {
    Command::cargo_bin("ptrack")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ptrack"));
}
