// SPDX-License-Identifier: Apache-2.0

use pecheck::{Dut, HarnessBuilder, PeModel};

use crate::common::{resolve_sweep_plan, DEFAULT_TOP};
use crate::report_cli_error::report_cli_error_and_exit;
use crate::sweep_config::{flag_value, get_policy, SweepConfig};

pub fn handle_harness(matches: &clap::ArgMatches, config: &Option<SweepConfig>) {
    let top: String = flag_value(matches, "top")
        .cloned()
        .or_else(|| config.as_ref().and_then(|c| c.top.clone()))
        .unwrap_or_else(|| DEFAULT_TOP.to_string());
    let plan = match resolve_sweep_plan(matches, config) {
        Ok(plan) => plan,
        Err(e) => report_cli_error_and_exit(&e.to_string(), Some("harness"), vec![]),
    };
    let policy = get_policy(matches, config);

    // The model supplies the port list; it is never evaluated here.
    let model = match PeModel::new(plan.data_width) {
        Ok(model) => model,
        Err(e) => report_cli_error_and_exit(&e.to_string(), Some("harness"), vec![]),
    };
    match HarnessBuilder::new(&top, model.ports()).build(&plan.config, &plan.table, policy) {
        Ok(source) => print!("{}", source),
        Err(e) => report_cli_error_and_exit(
            &e.to_string(),
            Some("harness"),
            vec![("top", top.as_str())],
        ),
    }
}
