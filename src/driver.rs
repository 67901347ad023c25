// SPDX-License-Identifier: Apache-2.0

//! The evaluate-and-compare sweep.
//!
//! Configuration is applied once, then each truth-table row is written,
//! evaluated and read back in table order. Every row produces one diagnostic
//! line `operand_a, operand_b, expected, actual`; `verify` follows them with a
//! single verdict line.

use std::io::Write;

use crate::dut::{Dut, OPERAND_A, OPERAND_B, RESULT};
use crate::static_config::StaticConfig;
use crate::truth_table::{Row, TruthTable};
use crate::PecheckError;

/// Whether a mismatching row fails the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssertionPolicy {
    #[default]
    Enforce,
    /// Exploratory runs: rows are still printed but mismatches are only
    /// counted.
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOutcome {
    pub row: Row,
    pub actual: u64,
}

impl RowOutcome {
    pub fn passed(&self) -> bool {
        self.actual == self.row.expected
    }
}

impl std::fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.row, self.actual)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    /// No rows were evaluated, so nothing could fail.
    Vacuous,
    /// Assertions were disabled; `mismatches` rows disagreed.
    Unchecked { mismatches: usize },
    Failure {
        total: usize,
        mismatches: Vec<RowOutcome>,
    },
}

impl Verdict {
    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Failure { .. })
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_failure() {
            1
        } else {
            0
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Success | Verdict::Unchecked { .. } => write!(f, "Success"),
            Verdict::Vacuous => write!(f, "Success (vacuous: no rows evaluated)"),
            Verdict::Failure { total, mismatches } => {
                write!(f, "FAILURE: {} of {} rows mismatched", mismatches.len(), total)?;
                if let Some(first) = mismatches.first() {
                    write!(
                        f,
                        "; first: operand_a={}, operand_b={}, expected={}, actual={}",
                        first.row.operand_a, first.row.operand_b, first.row.expected, first.actual
                    )?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub outcomes: Vec<RowOutcome>,
    pub policy: AssertionPolicy,
}

impl SweepReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn verdict(&self) -> Verdict {
        if self.outcomes.is_empty() {
            return Verdict::Vacuous;
        }
        let mismatches: Vec<RowOutcome> = self.mismatches().copied().collect();
        match self.policy {
            AssertionPolicy::Disabled => Verdict::Unchecked {
                mismatches: mismatches.len(),
            },
            AssertionPolicy::Enforce if mismatches.is_empty() => Verdict::Success,
            AssertionPolicy::Enforce => Verdict::Failure {
                total: self.outcomes.len(),
                mismatches,
            },
        }
    }
}

/// Applies `config` to `dut` and evaluates every row of `table`, writing one
/// diagnostic line per row to `out`.
pub fn sweep<D, W>(
    dut: &mut D,
    config: &StaticConfig,
    table: &TruthTable,
    policy: AssertionPolicy,
    out: &mut W,
) -> Result<SweepReport, PecheckError>
where
    D: Dut + ?Sized,
    W: Write + ?Sized,
{
    config.apply(dut)?;

    let mut outcomes = Vec::with_capacity(table.len());
    for row in table.rows() {
        dut.set_input(OPERAND_A, row.operand_a)?;
        dut.set_input(OPERAND_B, row.operand_b)?;
        dut.evaluate();
        let outcome = RowOutcome {
            row: *row,
            actual: dut.get_output(RESULT)?,
        };
        writeln!(out, "{}", outcome)?;
        if !outcome.passed() && policy == AssertionPolicy::Enforce {
            log::error!(
                "mismatch: operand_a={} operand_b={} expected={} actual={}",
                row.operand_a,
                row.operand_b,
                row.expected,
                outcome.actual
            );
        }
        outcomes.push(outcome);
    }
    Ok(SweepReport { outcomes, policy })
}

/// Runs a complete verification: constructs the device, sweeps `table`,
/// writes the verdict line and tears the device down.
///
/// A construction failure is returned before anything is written.
pub fn verify<D, F, W>(
    construct: F,
    config: &StaticConfig,
    table: &TruthTable,
    policy: AssertionPolicy,
    out: &mut W,
) -> Result<SweepReport, PecheckError>
where
    D: Dut,
    F: FnOnce() -> Result<D, PecheckError>,
    W: Write + ?Sized,
{
    let mut dut = construct()?;
    log::info!(
        "verify; rows: {} operation_selector: {:#x}",
        table.len(),
        config.operation_selector
    );
    let report = sweep(&mut dut, config, table, policy, out)?;

    let verdict = report.verdict();
    match &verdict {
        Verdict::Vacuous => log::warn!("truth table is empty; nothing was verified"),
        Verdict::Unchecked { mismatches } if *mismatches > 0 => {
            log::warn!("{} mismatching rows were not asserted", mismatches)
        }
        _ => {}
    }
    writeln!(out, "{}", verdict)?;
    out.flush()?;

    log::debug!("verify; tearing down device");
    drop(dut);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pe_model::{PeModel, PeOp};
    use crate::truth_table::and_truth_table;

    #[test]
    fn test_verify_and_table_output() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut out: Vec<u8> = Vec::new();
        let report = verify(
            || PeModel::new(16),
            &StaticConfig::for_op(PeOp::And, false).unwrap(),
            &and_truth_table(),
            AssertionPolicy::Enforce,
            &mut out,
        )
        .unwrap();
        assert_eq!(report.verdict(), Verdict::Success);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 17);
        assert_eq!(lines[0], "0, 0, 0, 0");
        assert_eq!(lines[7], "1, 3, 1, 1");
        assert_eq!(lines[15], "3, 3, 3, 3");
        assert_eq!(lines[16], "Success");
    }

    #[test]
    fn test_failure_display_names_first_mismatch() {
        let verdict = Verdict::Failure {
            total: 16,
            mismatches: vec![RowOutcome {
                row: Row::new(1, 2, 0),
                actual: 3,
            }],
        };
        assert_eq!(
            verdict.to_string(),
            "FAILURE: 1 of 16 rows mismatched; first: operand_a=1, operand_b=2, expected=0, actual=3"
        );
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn test_verdict_exit_codes() {
        assert_eq!(Verdict::Success.exit_code(), 0);
        assert_eq!(Verdict::Vacuous.exit_code(), 0);
        assert_eq!(Verdict::Unchecked { mismatches: 3 }.exit_code(), 0);
    }

    #[test]
    fn test_vacuous_marker_differs_from_success() {
        assert_ne!(Verdict::Vacuous.to_string(), Verdict::Success.to_string());
        assert!(Verdict::Vacuous.to_string().contains("vacuous"));
    }
}
