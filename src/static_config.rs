// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::dut::{
    Dut, PortDirection, BIT0, BIT1, BIT2, DATA_PATH_SELECT, FLAG_SELECT, LUT_CODE,
    OPERATION_SELECTOR, SHIFT_ENABLE,
};
use crate::pe_model::{encode_op_code, PeOp};
use crate::PecheckError;

/// Mode values written once before a sweep and held for its duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticConfig {
    pub operation_selector: u64,
    pub shift_enable: u64,
    pub data_path_select: u64,
    pub flag_select: u64,
    pub lut_code: u64,
    pub bit0: u64,
    pub bit1: u64,
    pub bit2: u64,
}

impl StaticConfig {
    pub fn for_op(op: PeOp, signed: bool) -> Result<Self, PecheckError> {
        Ok(StaticConfig {
            operation_selector: encode_op_code(op, signed)?,
            ..StaticConfig::default()
        })
    }

    pub fn port_values(&self) -> [(&'static str, u64); 8] {
        [
            (OPERATION_SELECTOR, self.operation_selector),
            (SHIFT_ENABLE, self.shift_enable),
            (DATA_PATH_SELECT, self.data_path_select),
            (FLAG_SELECT, self.flag_select),
            (LUT_CODE, self.lut_code),
            (BIT0, self.bit0),
            (BIT1, self.bit1),
            (BIT2, self.bit2),
        ]
    }

    /// Writes every configuration port of `dut`.
    ///
    /// The selector, shift enable and data-path select are always written.
    /// The remaining controls are skipped when the device does not declare
    /// them and they are zero; a non-zero value for an undeclared port is an
    /// error.
    pub fn apply<D: Dut + ?Sized>(&self, dut: &mut D) -> Result<(), PecheckError> {
        for (port, value) in self.port_values() {
            let required = matches!(port, OPERATION_SELECTOR | SHIFT_ENABLE | DATA_PATH_SELECT);
            let declared = dut
                .ports()
                .iter()
                .any(|p| p.name == port && p.direction == PortDirection::Input);
            if !required && !declared && value == 0 {
                continue;
            }
            log::debug!("StaticConfig::apply; {} = {}", port, value);
            dut.set_input(port, value)?;
        }
        Ok(())
    }
}
