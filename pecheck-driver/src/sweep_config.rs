// SPDX-License-Identifier: Apache-2.0

use clap::ArgMatches;
use pecheck::{AssertionPolicy, PeOp, PecheckError};
use serde::Deserialize;

/// Defaults read from the `[sweep]` table of a `pecheck.toml` file. Command
/// line flags override every field.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Operation name, e.g. `and` or `max`.
    pub op: Option<String>,

    /// Whether the op code's signed bit is set.
    pub signed: Option<bool>,

    pub data_width: Option<u32>,

    /// Operands are drawn from `0..domain` when a table is generated.
    pub domain: Option<u64>,

    /// Setting this to false disables per-row assertions.
    pub assertions: Option<bool>,

    /// Path to a TOML vector file to use instead of a generated table.
    pub vectors: Option<String>,

    pub shift_enable: Option<u64>,
    pub data_path_select: Option<u64>,
    pub flag_select: Option<u64>,
    pub bit0: Option<u64>,

    /// RTL top module name used by the harness emitter.
    pub top: Option<String>,
}

/// Returns the string value of `id` if the subcommand defines it and it was
/// given.
pub fn flag_value<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a String> {
    matches.try_get_one::<String>(id).ok().flatten()
}

fn flag_u64(matches: &ArgMatches, id: &str) -> Option<u64> {
    matches.try_get_one::<u64>(id).ok().flatten().copied()
}

pub fn get_op(
    matches: &ArgMatches,
    config: &Option<SweepConfig>,
) -> Result<Option<PeOp>, PecheckError> {
    if let Some(op) = flag_value(matches, "op") {
        return op.parse().map(Some);
    }
    match config.as_ref().and_then(|c| c.op.as_deref()) {
        Some(op) => op.parse().map(Some),
        None => Ok(None),
    }
}

/// True when the operation was named on the command line itself.
pub fn op_given_on_cmdline(matches: &ArgMatches) -> bool {
    flag_value(matches, "op").is_some()
}

pub fn get_signed(matches: &ArgMatches, config: &Option<SweepConfig>) -> bool {
    match flag_value(matches, "signed") {
        Some(value) => value == "true",
        None => config.as_ref().and_then(|c| c.signed).unwrap_or(false),
    }
}

pub fn get_data_width(matches: &ArgMatches, config: &Option<SweepConfig>) -> u32 {
    matches
        .try_get_one::<u32>("data_width")
        .ok()
        .flatten()
        .copied()
        .or_else(|| config.as_ref().and_then(|c| c.data_width))
        .unwrap_or(pecheck::DEFAULT_DATA_WIDTH)
}

pub fn get_domain(matches: &ArgMatches, config: &Option<SweepConfig>) -> u64 {
    flag_u64(matches, "domain")
        .or_else(|| config.as_ref().and_then(|c| c.domain))
        .unwrap_or(pecheck::truth_table::AND_TABLE_DOMAIN)
}

pub fn get_vectors_path(matches: &ArgMatches, config: &Option<SweepConfig>) -> Option<String> {
    flag_value(matches, "vectors")
        .cloned()
        .or_else(|| config.as_ref().and_then(|c| c.vectors.clone()))
}

/// Helper for the one-shot control values: the command line flag, else
/// the config file, else `None` to keep whatever the table or op provides.
pub fn get_control(matches: &ArgMatches, config: &Option<SweepConfig>, id: &str) -> Option<u64> {
    flag_u64(matches, id).or_else(|| {
        config.as_ref().and_then(|c| match id {
            "shift_enable" => c.shift_enable,
            "data_path_select" => c.data_path_select,
            "flag_select" => c.flag_select,
            "bit0" => c.bit0,
            _ => None,
        })
    })
}

pub fn get_policy(matches: &ArgMatches, config: &Option<SweepConfig>) -> AssertionPolicy {
    let no_assert = matches
        .try_get_one::<bool>("no_assert")
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false);
    if no_assert {
        log::warn!("assertions disabled via --no-assert");
        return AssertionPolicy::Disabled;
    }
    if config.as_ref().and_then(|c| c.assertions) == Some(false) {
        log::warn!("assertions disabled via `assertions = false` in the config file");
        return AssertionPolicy::Disabled;
    }
    AssertionPolicy::Enforce
}
