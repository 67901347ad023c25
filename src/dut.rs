// SPDX-License-Identifier: Apache-2.0

//! Port-level contract between the verification driver and whatever
//! simulation engine hosts the device under test.
//!
//! Callers write inputs, call `evaluate()`, then read outputs. The device is
//! combinational, so there is no clock and no state carried between
//! evaluations.

use crate::PecheckError;

pub const OPERAND_A: &str = "operand_a";
pub const OPERAND_B: &str = "operand_b";
pub const OPERATION_SELECTOR: &str = "operation_selector";
pub const SHIFT_ENABLE: &str = "shift_enable";
pub const DATA_PATH_SELECT: &str = "data_path_select";
pub const FLAG_SELECT: &str = "flag_select";
pub const BIT0: &str = "bit0";
pub const BIT1: &str = "bit1";
pub const BIT2: &str = "bit2";
pub const LUT_CODE: &str = "lut_code";

pub const RESULT: &str = "result";
pub const RESULT_PREDICATE: &str = "result_predicate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    /// Name used through the `Dut` trait.
    pub name: &'static str,
    /// Name of the corresponding port on the compiled RTL top.
    pub rtl_name: &'static str,
    pub width: u32,
    pub direction: PortDirection,
}

impl PortSpec {
    pub fn mask(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }
}

/// Looks up `name` in `ports` with the given direction.
pub fn find_port<'a>(
    ports: &'a [PortSpec],
    name: &str,
    direction: PortDirection,
) -> Result<&'a PortSpec, PecheckError> {
    ports
        .iter()
        .find(|p| p.name == name && p.direction == direction)
        .ok_or_else(|| PecheckError::UnknownPort(name.to_string()))
}

/// A combinational device under test, addressed by port name.
///
/// Implementations truncate written values to the port's bit width rather
/// than rejecting them. Reading an output before the first `evaluate()` is a
/// caller bug and implementations may panic. Resources are released on drop.
pub trait Dut {
    fn ports(&self) -> &[PortSpec];

    fn set_input(&mut self, port: &str, value: u64) -> Result<(), PecheckError>;

    /// Recomputes every output from the current inputs.
    fn evaluate(&mut self);

    fn get_output(&self, port: &str) -> Result<u64, PecheckError>;
}

impl<D: Dut + ?Sized> Dut for Box<D> {
    fn ports(&self) -> &[PortSpec] {
        (**self).ports()
    }

    fn set_input(&mut self, port: &str, value: u64) -> Result<(), PecheckError> {
        (**self).set_input(port, value)
    }

    fn evaluate(&mut self) {
        (**self).evaluate()
    }

    fn get_output(&self, port: &str) -> Result<u64, PecheckError> {
        (**self).get_output(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTS: &[PortSpec] = &[
        PortSpec {
            name: OPERAND_A,
            rtl_name: "op_a",
            width: 16,
            direction: PortDirection::Input,
        },
        PortSpec {
            name: RESULT,
            rtl_name: "res",
            width: 64,
            direction: PortDirection::Output,
        },
    ];

    #[test]
    fn test_find_port_respects_direction() {
        assert_eq!(
            find_port(PORTS, OPERAND_A, PortDirection::Input)
                .unwrap()
                .rtl_name,
            "op_a"
        );
        assert_eq!(
            find_port(PORTS, OPERAND_A, PortDirection::Output),
            Err(PecheckError::UnknownPort(OPERAND_A.to_string()))
        );
    }

    #[test]
    fn test_port_mask() {
        assert_eq!(PORTS[0].mask(), 0xffff);
        assert_eq!(PORTS[1].mask(), u64::MAX);
    }
}
