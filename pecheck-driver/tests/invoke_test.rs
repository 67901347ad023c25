// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

/// Runs the driver inside `cwd` so no stray pecheck.toml is picked up.
fn run_driver(cwd: &Path, args: &[&str]) -> Output {
    let command_path = env!("CARGO_BIN_EXE_pecheck-driver");
    Command::new(command_path)
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("Failed to run pecheck-driver")
}

fn run_driver_with_log_level(cwd: &Path, args: &[&str], level: &str) -> Output {
    let command_path = env!("CARGO_BIN_EXE_pecheck-driver");
    Command::new(command_path)
        .current_dir(cwd)
        .env("RUST_LOG", level)
        .args(args)
        .output()
        .expect("Failed to run pecheck-driver")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn describe(output: &Output) -> String {
    format!(
        "status: {:?}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn test_no_arguments_runs_and_scenario() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(temp_dir.path(), &[]);
    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(
        stdout_of(&output),
        "0, 0, 0, 0
0, 1, 0, 0
0, 2, 0, 0
0, 3, 0, 0
1, 0, 0, 0
1, 1, 1, 1
1, 2, 0, 0
1, 3, 1, 1
2, 0, 0, 0
2, 1, 0, 0
2, 2, 2, 2
2, 3, 2, 2
3, 0, 0, 0
3, 1, 1, 1
3, 2, 2, 2
3, 3, 3, 3
Success
"
    );
}

#[test]
fn test_version_subcommand() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(temp_dir.path(), &["version"]);
    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(stdout_of(&output).trim(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_mismatching_vectors_fail_the_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let vectors_path = temp_dir.path().join("bad.toml");
    std::fs::write(
        &vectors_path,
        "rows = [[1, 1, 1], [2, 3, 3]]\n\n[config]\noperation_selector = 19\n",
    )
    .unwrap();

    let output = run_driver(
        temp_dir.path(),
        &["run", "--vectors", vectors_path.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    assert_eq!(
        stdout_of(&output),
        "1, 1, 1, 1
2, 3, 3, 2
FAILURE: 1 of 2 rows mismatched; first: operand_a=2, operand_b=3, expected=3, actual=2
"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("mismatch"), "stderr: {}", stderr);
}

#[test]
fn test_no_assert_reports_success_despite_mismatch() {
    let temp_dir = tempfile::tempdir().unwrap();
    let vectors_path = temp_dir.path().join("bad.toml");
    std::fs::write(&vectors_path, "rows = [[2, 3, 3]]\n").unwrap();

    let output = run_driver(
        temp_dir.path(),
        &[
            "run",
            "--no-assert",
            "--vectors",
            vectors_path.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(stdout_of(&output), "2, 3, 3, 2\nSuccess\n");
}

#[test]
fn test_empty_vectors_are_marked_vacuous() {
    let temp_dir = tempfile::tempdir().unwrap();
    let vectors_path = temp_dir.path().join("empty.toml");
    std::fs::write(&vectors_path, "rows = []\n").unwrap();

    let output = run_driver(
        temp_dir.path(),
        &["run", "--vectors", vectors_path.to_str().unwrap()],
    );
    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(stdout_of(&output), "Success (vacuous: no rows evaluated)\n");
}

#[test]
fn test_vectors_subcommand_round_trips_through_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(temp_dir.path(), &["vectors", "--op", "xor"]);
    assert!(output.status.success(), "{}", describe(&output));

    let text = stdout_of(&output);
    let (table, config) = pecheck::TruthTable::from_toml_str(&text).unwrap();
    assert_eq!(table.len(), 16);
    assert!(table.rows().contains(&pecheck::Row::new(1, 3, 2)));
    assert_eq!(config.unwrap().operation_selector, 0x14);

    let vectors_path = temp_dir.path().join("xor.toml");
    std::fs::write(&vectors_path, text).unwrap();
    let output = run_driver(
        temp_dir.path(),
        &["run", "--vectors", vectors_path.to_str().unwrap()],
    );
    assert!(output.status.success(), "{}", describe(&output));
    assert!(stdout_of(&output).ends_with("\nSuccess\n"));
}

#[test]
fn test_signed_max_over_larger_domain() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(
        temp_dir.path(),
        &["run", "--op", "max", "--signed", "true", "--domain", "8"],
    );
    assert!(output.status.success(), "{}", describe(&output));
    let text = stdout_of(&output);
    assert_eq!(text.lines().count(), 65);
    // ge carries `a - b` on the result; the comparison goes to the predicate.
    assert!(text.contains("\n2, 5, 65533, 65533\n"));
    assert!(text.contains("\n5, 2, 3, 3\n"));
}

#[test]
fn test_harness_subcommand() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(temp_dir.path(), &["harness"]);
    assert!(output.status.success(), "{}", describe(&output));
    let text = stdout_of(&output);
    assert!(text.starts_with("#include \"Vtest_pe_comp_unq1.h\"\n"));
    assert!(text.contains("    top->op_code = 19;\n"));
    assert!(text.contains("        assert(top->res == test[2]);\n"));
    assert!(text.contains("unsigned int tests[16][3] = {"));
}

#[test]
fn test_harness_no_assert_and_top() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(temp_dir.path(), &["harness", "--top", "pe", "--no-assert"]);
    assert!(output.status.success(), "{}", describe(&output));
    let text = stdout_of(&output);
    assert!(text.contains("    Vpe* top = new Vpe;\n"));
    assert!(text.contains("        //assert(top->res == test[2]);\n"));
}

#[test]
fn test_config_file_in_working_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("pecheck.toml"),
        "[sweep]\nop = \"xor\"\n",
    )
    .unwrap();
    let output = run_driver(temp_dir.path(), &[]);
    assert!(output.status.success(), "{}", describe(&output));
    assert!(stdout_of(&output).contains("\n1, 3, 2, 2\n"));
}

#[test]
fn test_config_file_can_disable_assertions() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("exploratory.toml");
    let vectors_path = temp_dir.path().join("bad.toml");
    std::fs::write(&vectors_path, "rows = [[3, 3, 0]]\n").unwrap();
    std::fs::write(
        &config_path,
        format!(
            "[sweep]\nassertions = false\nvectors = \"{}\"\n",
            vectors_path.to_str().unwrap()
        ),
    )
    .unwrap();
    let output = run_driver(
        temp_dir.path(),
        &["--config", config_path.to_str().unwrap()],
    );
    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(stdout_of(&output), "3, 3, 0, 3\nSuccess\n");
}

#[test]
fn test_unsupported_data_width_is_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(temp_dir.path(), &["run", "--data_width", "64"]);
    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("construction"), "stderr: {}", stderr);
}

#[test]
fn test_add_ignores_bit0_in_result() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(temp_dir.path(), &["run", "--op", "add", "--bit0", "1"]);
    assert!(output.status.success(), "{}", describe(&output));
    let text = stdout_of(&output);
    assert!(text.contains("\n2, 3, 5, 5\n"), "{}", text);
}

#[test]
fn test_sel_follows_bit0() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(temp_dir.path(), &["run", "--op", "sel", "--bit0", "1"]);
    assert!(output.status.success(), "{}", describe(&output));
    assert!(stdout_of(&output).contains("\n1, 3, 1, 1\n"));

    let output = run_driver(
        temp_dir.path(),
        &["run", "--op", "sel", "--data_path_select", "1"],
    );
    assert!(output.status.success(), "{}", describe(&output));
    assert!(stdout_of(&output).contains("\n1, 3, 3, 3\n"));
}

#[test]
fn test_oversized_domain_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(temp_dir.path(), &["run", "--domain", "100000"]);
    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("domain 100000 exceeds"), "stderr: {}", stderr);
}

#[test]
fn test_domain_wider_than_datapath_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(
        temp_dir.path(),
        &["vectors", "--data_width", "2", "--domain", "5"],
    );
    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_no_assert_warning_logged_once() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver_with_log_level(temp_dir.path(), &["run", "--no-assert"], "warn");
    assert!(output.status.success(), "{}", describe(&output));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr.matches("assertions disabled").count(),
        1,
        "stderr: {}",
        stderr
    );
}
