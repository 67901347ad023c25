// SPDX-License-Identifier: Apache-2.0

use crate::common::resolve_sweep_plan;
use crate::report_cli_error::report_cli_error_and_exit;
use crate::sweep_config::SweepConfig;

/// Prints a vector file for the selected operation so it can be reviewed,
/// edited, and fed back through `run --vectors`.
pub fn handle_vectors(matches: &clap::ArgMatches, config: &Option<SweepConfig>) {
    let plan = match resolve_sweep_plan(matches, config) {
        Ok(plan) => plan,
        Err(e) => report_cli_error_and_exit(&e.to_string(), Some("vectors"), vec![]),
    };
    match plan.table.to_toml_string(Some(&plan.config)) {
        Ok(text) => print!("{}", text),
        Err(e) => report_cli_error_and_exit(&e.to_string(), Some("vectors"), vec![]),
    }
}
