// SPDX-License-Identifier: Apache-2.0

use pecheck::{verify, PeModel};

use crate::common::resolve_sweep_plan;
use crate::report_cli_error::report_cli_error_and_exit;
use crate::sweep_config::{get_policy, SweepConfig};

pub fn handle_run(matches: &clap::ArgMatches, config: &Option<SweepConfig>) {
    let plan = match resolve_sweep_plan(matches, config) {
        Ok(plan) => plan,
        Err(e) => report_cli_error_and_exit(&e.to_string(), Some("run"), vec![]),
    };
    let policy = get_policy(matches, config);

    let coverage = plan.table.coverage(plan.domain);
    if !coverage.is_exact() {
        log::warn!(
            "table does not cover the {0}x{0} domain exactly once; missing: {1} duplicated: {2} out of domain: {3}",
            plan.domain,
            coverage.missing.len(),
            coverage.duplicated.len(),
            coverage.out_of_domain.len()
        );
    }

    let data_width = plan.data_width.to_string();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = match verify(
        || PeModel::new(plan.data_width),
        &plan.config,
        &plan.table,
        policy,
        &mut out,
    ) {
        Ok(report) => report,
        Err(e) => report_cli_error_and_exit(
            &e.to_string(),
            Some("run"),
            vec![("data width", data_width.as_str())],
        ),
    };

    let exit_code = report.verdict().exit_code();
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
