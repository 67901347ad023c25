// SPDX-License-Identifier: Apache-2.0

//! Command line driver that verifies the PE datapath against truth tables.
//!
//! Commands are given like:
//!
//! ```text
//! pecheck-driver <global-options> <command> <command-args-and-options>
//! ```
//!
//! Commands are:
//!
//! - run: Sweeps a truth table through the PE model and prints one line per
//!   row followed by a verdict. This is what runs when no command is given.
//! - vectors: Prints a TOML vector file for an operation.
//! - harness: Prints the Verilator C++ test bench for the compiled RTL.
//!
//! Sample usage:
//!
//! ```shell
//! $ cargo run
//! $ cargo run -- run --op max --signed true --domain 8
//! $ cargo run -- vectors --op xor > xor.toml
//! $ cargo run -- run --vectors xor.toml
//! $ cargo run -- harness --top test_pe_comp_unq1 > sim_test_pe_comp_unq1.cpp
//! ```
//!
//! Defaults can be placed in a `[sweep]` table of a `pecheck.toml` file,
//! either named via `--config` or found in the current directory.

mod common;
mod harness;
mod report_cli_error;
mod run;
mod sweep_config;
mod vectors;

use clap::{Arg, ArgAction};
use once_cell::sync::Lazy;
use report_cli_error::report_cli_error_and_exit;
use serde::Deserialize;
use sweep_config::SweepConfig;

static OP_NAMES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut names: Vec<&'static str> = pecheck::PeOp::ALL.iter().map(|op| op.name()).collect();
    names.extend(["max", "min"]);
    names
});

#[derive(Deserialize)]
struct PecheckToml {
    #[serde(default)]
    sweep: SweepConfig,
}

trait AppExt {
    fn add_bool_arg(self, long: &'static str, help: &'static str) -> Self;
    fn add_u64_arg(self, long: &'static str, help: &'static str) -> Self;
    fn add_op_args(self) -> Self;
    fn add_table_args(self) -> Self;
    fn add_no_assert_arg(self) -> Self;
}

impl AppExt for clap::Command {
    /// Adds a boolean argument to the command; boolean flags take an explicit
    /// `true`/`false` value so they can also override the config file.
    fn add_bool_arg(self, long: &'static str, help: &'static str) -> Self {
        (self as clap::Command).arg(
            Arg::new(long)
                .long(long)
                .value_name("BOOL")
                .action(ArgAction::Set)
                .value_parser(["true", "false"])
                .num_args(1)
                .help(help),
        )
    }

    fn add_u64_arg(self, long: &'static str, help: &'static str) -> Self {
        (self as clap::Command).arg(
            Arg::new(long)
                .long(long)
                .value_name("N")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(u64))
                .help(help),
        )
    }

    fn add_op_args(self) -> Self {
        (self as clap::Command)
            .arg(
                Arg::new("op")
                    .long("op")
                    .value_name("OP")
                    .help("ALU operation to select (default: and)")
                    .action(ArgAction::Set)
                    .value_parser(clap::builder::PossibleValuesParser::new(
                        OP_NAMES.iter().copied(),
                    )),
            )
            .add_bool_arg("signed", "Set the signed bit of the op code")
            .add_u64_arg("shift_enable", "Value for the shift enable port")
            .add_u64_arg("data_path_select", "Value for the data-path select port")
            .add_u64_arg("flag_select", "Value for the flag select port")
            .add_u64_arg(
                "bit0",
                "Value for the bit0 register (select line for sel, carry-in for add flags)",
            )
    }

    fn add_table_args(self) -> Self {
        (self as clap::Command)
            .arg(
                Arg::new("data_width")
                    .long("data_width")
                    .value_name("BITS")
                    .help("Datapath width of the PE model (default: 16)")
                    .action(ArgAction::Set)
                    .value_parser(clap::value_parser!(u32)),
            )
            .add_u64_arg(
                "domain",
                "Operands range over 0..N when a table is generated (default: 4, at most 1024)",
            )
    }

    fn add_no_assert_arg(self) -> Self {
        (self as clap::Command).arg(
            Arg::new("no_assert")
                .long("no-assert")
                .help("Report mismatching rows without failing the run")
                .action(ArgAction::SetTrue),
        )
    }
}

fn vectors_arg() -> Arg {
    Arg::new("vectors")
        .long("vectors")
        .value_name("VECTORS_TOML")
        .help("TOML vector file holding the truth table to use")
        .action(ArgAction::Set)
}

fn build_cli() -> clap::Command {
    clap::Command::new("pecheck-driver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Exhaustive truth-table verification of the PE datapath")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PECHECK_TOML")
                .help("Path to a pecheck.toml file with a [sweep] table")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            clap::Command::new("run")
                .about("Sweeps a truth table through the PE model and reports a verdict")
                .add_op_args()
                .add_table_args()
                .add_no_assert_arg()
                .arg(vectors_arg()),
        )
        .subcommand(
            clap::Command::new("vectors")
                .about("Prints a TOML vector file for the selected operation")
                .add_op_args()
                .add_table_args(),
        )
        .subcommand(
            clap::Command::new("harness")
                .about("Prints the Verilator C++ harness for the selected operation")
                .add_op_args()
                .add_table_args()
                .add_no_assert_arg()
                .arg(vectors_arg())
                .arg(
                    Arg::new("top")
                        .long("top")
                        .value_name("TOP_MODULE")
                        .help("RTL top module name (default: test_pe_comp_unq1)")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(clap::Command::new("version").about("Prints the driver version"))
}

fn load_sweep_config(matches: &clap::ArgMatches) -> Option<SweepConfig> {
    let mut toml_path: Option<std::path::PathBuf> = matches
        .get_one::<String>("config")
        .map(std::path::PathBuf::from);

    // Without a --config flag, pick up a pecheck.toml in the current directory.
    if toml_path.is_none() {
        if let Ok(cwd) = std::env::current_dir() {
            let cwd_toml_path = cwd.join("pecheck.toml");
            if cwd_toml_path.exists() {
                log::info!(
                    "Using pecheck.toml in current directory: {}",
                    cwd_toml_path.display()
                );
                toml_path = Some(cwd_toml_path);
            }
        }
    }

    let path = toml_path?;
    let path_str = path.display().to_string();
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            let error = e.to_string();
            report_cli_error_and_exit(
                "could not read config file",
                None,
                vec![("path", path_str.as_str()), ("error", error.as_str())],
            )
        }
    };
    match toml::from_str::<PecheckToml>(&text) {
        Ok(parsed) => Some(parsed.sweep),
        Err(e) => {
            let error = e.to_string();
            report_cli_error_and_exit(
                "could not parse config file",
                None,
                vec![("path", path_str.as_str()), ("error", error.as_str())],
            )
        }
    }
}

fn main() {
    let _ = env_logger::try_init();

    log::info!(
        "pecheck-driver starting; version: {}",
        env!("CARGO_PKG_VERSION")
    );

    let mut matches = build_cli().get_matches();
    if matches.subcommand().is_none() {
        let mut args: Vec<std::ffi::OsString> = std::env::args_os().collect();
        args.push("run".into());
        matches = build_cli().get_matches_from(args);
    }

    let config = load_sweep_config(&matches);

    match matches.subcommand() {
        Some(("run", sub_matches)) => run::handle_run(sub_matches, &config),
        Some(("vectors", sub_matches)) => vectors::handle_vectors(sub_matches, &config),
        Some(("harness", sub_matches)) => harness::handle_harness(sub_matches, &config),
        Some(("version", _)) => println!("{}", env!("CARGO_PKG_VERSION")),
        _ => report_cli_error_and_exit("No valid subcommand provided.", None, vec![]),
    }
}
