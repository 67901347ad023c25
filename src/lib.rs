// SPDX-License-Identifier: Apache-2.0

//! Exhaustive truth-table verification of combinational processing-element
//! datapaths.
//!
//! A device under test is anything implementing [`Dut`]. The [`driver`]
//! module applies a [`StaticConfig`] once, sweeps a [`TruthTable`] through
//! the device and renders a [`Verdict`]. [`PeModel`] is the in-process
//! functional model of the PE; [`harness`] emits the equivalent Verilator
//! test bench for the compiled RTL.

pub mod bit_format;
pub mod driver;
pub mod dut;
pub mod harness;
pub mod pe_model;
pub mod pecheck_error;
pub mod static_config;
pub mod test_utils;
pub mod truth_table;

pub use driver::{sweep, verify, AssertionPolicy, RowOutcome, SweepReport, Verdict};
pub use dut::{Dut, PortDirection, PortSpec};
pub use harness::HarnessBuilder;
pub use pe_model::{PeModel, PeOp, DEFAULT_DATA_WIDTH};
pub use pecheck_error::PecheckError;
pub use static_config::StaticConfig;
pub use truth_table::{and_truth_table, Row, TruthTable};
