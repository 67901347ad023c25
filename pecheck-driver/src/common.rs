// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use clap::ArgMatches;
use pecheck::pe_model::{reference_result, MAX_DATA_WIDTH, MIN_DATA_WIDTH};
use pecheck::truth_table::AND_TABLE_DOMAIN;
use pecheck::{and_truth_table, PeOp, PecheckError, StaticConfig, TruthTable};

use crate::sweep_config::{
    get_control, get_data_width, get_domain, get_op, get_signed, get_vectors_path,
    op_given_on_cmdline, SweepConfig,
};

pub const DEFAULT_TOP: &str = "test_pe_comp_unq1";

/// Largest `--domain` accepted; a generated table has `domain * domain` rows.
pub const MAX_DOMAIN: u64 = 1024;

/// Rejects domains whose operands do not fit `data_width` bits or whose
/// table would exceed `MAX_DOMAIN` squared rows.
pub fn check_domain(domain: u64, data_width: u32) -> Result<(), PecheckError> {
    let width_limit = 1u64 << data_width;
    let limit = width_limit.min(MAX_DOMAIN);
    if domain > limit {
        return Err(PecheckError::Domain(format!(
            "domain {} exceeds the limit of {} for a {}-bit datapath (at most {} operand values)",
            domain, limit, data_width, MAX_DOMAIN
        )));
    }
    Ok(())
}

/// Everything a subcommand needs to run or describe one sweep.
#[derive(Debug)]
pub struct SweepPlan {
    pub config: StaticConfig,
    pub table: TruthTable,
    pub data_width: u32,
    pub domain: u64,
}

/// Resolves the configuration and truth table for a subcommand.
///
/// Configuration comes from the `--op` flag if given, else from the vector
/// file's `[config]` table, else from the `op` in the config file, else the
/// `and` operation. Without a vector file, `and` over the default domain uses
/// the literal table and every other combination is generated from the
/// reference model.
pub fn resolve_sweep_plan(
    matches: &ArgMatches,
    sweep_config: &Option<SweepConfig>,
) -> Result<SweepPlan, PecheckError> {
    let signed = get_signed(matches, sweep_config);
    let data_width = get_data_width(matches, sweep_config);
    let domain = get_domain(matches, sweep_config);
    if !(MIN_DATA_WIDTH..=MAX_DATA_WIDTH).contains(&data_width) {
        return Err(PecheckError::Construction(format!(
            "data width {} is outside the supported range {}..={}",
            data_width, MIN_DATA_WIDTH, MAX_DATA_WIDTH
        )));
    }
    check_domain(domain, data_width)?;

    let loaded = match get_vectors_path(matches, sweep_config) {
        Some(path) => Some(TruthTable::load(Path::new(&path))?),
        None => None,
    };
    let file_config = loaded.as_ref().and_then(|(_, config)| *config);

    let op = get_op(matches, sweep_config)?.unwrap_or(PeOp::And);
    let mut config = match file_config {
        Some(file_config) if !op_given_on_cmdline(matches) => file_config,
        _ => StaticConfig::for_op(op, signed)?,
    };
    if let Some(value) = get_control(matches, sweep_config, "shift_enable") {
        config.shift_enable = value;
    }
    if let Some(value) = get_control(matches, sweep_config, "data_path_select") {
        config.data_path_select = value;
    }
    if let Some(value) = get_control(matches, sweep_config, "flag_select") {
        config.flag_select = value;
    }
    if let Some(value) = get_control(matches, sweep_config, "bit0") {
        config.bit0 = value;
    }

    let table = match loaded {
        Some((table, _)) => table,
        None if op == PeOp::And && domain == AND_TABLE_DOMAIN => and_truth_table(),
        None => {
            let d = config.bit0;
            log::info!(
                "generating {}x{} table for `{}` (signed: {})",
                domain,
                domain,
                op,
                signed
            );
            TruthTable::complete(domain, |a, b| {
                reference_result(op, signed, a, b, d, data_width)
            })
        }
    };

    Ok(SweepPlan {
        config,
        table,
        data_width,
        domain,
    })
}
