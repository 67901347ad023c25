// SPDX-License-Identifier: Apache-2.0

//! Device wrappers used by tests to observe and perturb a sweep.

use crate::dut::{Dut, PortSpec, OPERAND_A, OPERAND_B, RESULT};
use crate::PecheckError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DutEvent {
    SetInput(String, u64),
    Evaluate,
}

/// Forwards to `inner` and records every input write and evaluation.
pub struct RecordingDut<D: Dut> {
    pub inner: D,
    pub events: Vec<DutEvent>,
}

impl<D: Dut> RecordingDut<D> {
    pub fn new(inner: D) -> Self {
        RecordingDut {
            inner,
            events: Vec::new(),
        }
    }

    pub fn evaluate_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| **e == DutEvent::Evaluate)
            .count()
    }
}

impl<D: Dut> Dut for RecordingDut<D> {
    fn ports(&self) -> &[PortSpec] {
        self.inner.ports()
    }

    fn set_input(&mut self, port: &str, value: u64) -> Result<(), PecheckError> {
        self.events.push(DutEvent::SetInput(port.to_string(), value));
        self.inner.set_input(port, value)
    }

    fn evaluate(&mut self) {
        self.events.push(DutEvent::Evaluate);
        self.inner.evaluate()
    }

    fn get_output(&self, port: &str) -> Result<u64, PecheckError> {
        self.inner.get_output(port)
    }
}

/// Corrupts `result` by XOR-ing `flip` into it whenever the operands equal
/// `at`.
pub struct FaultyDut<D: Dut> {
    inner: D,
    at: (u64, u64),
    flip: u64,
    operands: (u64, u64),
}

impl<D: Dut> FaultyDut<D> {
    pub fn new(inner: D, at: (u64, u64), flip: u64) -> Self {
        FaultyDut {
            inner,
            at,
            flip,
            operands: (0, 0),
        }
    }
}

impl<D: Dut> Dut for FaultyDut<D> {
    fn ports(&self) -> &[PortSpec] {
        self.inner.ports()
    }

    fn set_input(&mut self, port: &str, value: u64) -> Result<(), PecheckError> {
        match port {
            OPERAND_A => self.operands.0 = value,
            OPERAND_B => self.operands.1 = value,
            _ => {}
        }
        self.inner.set_input(port, value)
    }

    fn evaluate(&mut self) {
        self.inner.evaluate()
    }

    fn get_output(&self, port: &str) -> Result<u64, PecheckError> {
        let value = self.inner.get_output(port)?;
        if port == RESULT && self.operands == self.at {
            Ok(value ^ self.flip)
        } else {
            Ok(value)
        }
    }
}
