// SPDX-License-Identifier: Apache-2.0

//! In-process functional model of the CGRA processing element.
//!
//! The model stands in for a compiled RTL simulation behind the `Dut` trait
//! and doubles as the oracle for generating exhaustive truth tables.

use crate::bit_format::BitFormat;
use crate::dut::{
    find_port, Dut, PortDirection, PortSpec, BIT0, BIT1, BIT2, DATA_PATH_SELECT, FLAG_SELECT,
    LUT_CODE, OPERAND_A, OPERAND_B, OPERATION_SELECTOR, RESULT, RESULT_PREDICATE, SHIFT_ENABLE,
};
use crate::PecheckError;

pub const DEFAULT_DATA_WIDTH: u32 = 16;
pub const MIN_DATA_WIDTH: u32 = 2;
pub const MAX_DATA_WIDTH: u32 = 32;

/// Layout of the op code word: LUT enable, a zero bit, dual, signed, then the
/// five-bit ALU operation.
pub const OP_CODE_FORMAT: &str = "l0dsooooo";
pub const OP_CODE_WIDTH: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeOp {
    Add,
    Sub,
    Abs,
    Ge,
    Le,
    Eq,
    Sel,
    Lshr,
    Ashr,
    Lshl,
    Or,
    And,
    Xor,
    Inv,
}

impl PeOp {
    pub const ALL: [PeOp; 14] = [
        PeOp::Add,
        PeOp::Sub,
        PeOp::Abs,
        PeOp::Ge,
        PeOp::Le,
        PeOp::Eq,
        PeOp::Sel,
        PeOp::Lshr,
        PeOp::Ashr,
        PeOp::Lshl,
        PeOp::Or,
        PeOp::And,
        PeOp::Xor,
        PeOp::Inv,
    ];

    pub fn code(self) -> u64 {
        match self {
            PeOp::Add => 0x0,
            PeOp::Sub => 0x1,
            PeOp::Abs => 0x3,
            PeOp::Ge => 0x4,
            PeOp::Le => 0x5,
            PeOp::Eq => 0x6,
            PeOp::Sel => 0x8,
            PeOp::Lshr => 0xf,
            PeOp::Ashr => 0x10,
            PeOp::Lshl => 0x11,
            PeOp::Or => 0x12,
            PeOp::And => 0x13,
            PeOp::Xor => 0x14,
            PeOp::Inv => 0x15,
        }
    }

    pub fn from_code(code: u64) -> Option<PeOp> {
        PeOp::ALL.iter().copied().find(|op| op.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            PeOp::Add => "add",
            PeOp::Sub => "sub",
            PeOp::Abs => "abs",
            PeOp::Ge => "ge",
            PeOp::Le => "le",
            PeOp::Eq => "eq",
            PeOp::Sel => "sel",
            PeOp::Lshr => "lshr",
            PeOp::Ashr => "ashr",
            PeOp::Lshl => "lshl",
            PeOp::Or => "or",
            PeOp::And => "and",
            PeOp::Xor => "xor",
            PeOp::Inv => "inv",
        }
    }

    fn clears_overflow(self) -> bool {
        matches!(
            self,
            PeOp::And | PeOp::Or | PeOp::Xor | PeOp::Lshl | PeOp::Lshr | PeOp::Sel
        )
    }
}

impl std::fmt::Display for PeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for PeOp {
    type Err = PecheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "max"/"min" are aliases for ge/le.
        match s {
            "max" => return Ok(PeOp::Ge),
            "min" => return Ok(PeOp::Le),
            _ => {}
        }
        PeOp::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| PecheckError::UnknownOp(s.to_string()))
    }
}

/// Returns the op code word selecting `op`, in `OP_CODE_FORMAT` layout.
pub fn encode_op_code(op: PeOp, signed: bool) -> Result<u64, PecheckError> {
    BitFormat::parse(OP_CODE_FORMAT)?.pack(&[('o', op.code()), ('s', signed as u64)])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub zero: bool,
    pub carry: bool,
    pub negative: bool,
    pub overflow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluOutput {
    pub result: u64,
    pub flags: Flags,
    /// Carry out for add/sub, the comparison outcome for ge/le/eq.
    pub alu_predicate: bool,
}

/// Evaluates one ALU operation at `width` bits. `d` is the one-bit `bit0`
/// register: the select line for sel and the carry-in seen by the add flags.
/// The add result itself is `a + b`.
pub fn alu(op: PeOp, signed: bool, a: u64, b: u64, d: u64, width: u32) -> AluOutput {
    assert!(
        (MIN_DATA_WIDTH..=MAX_DATA_WIDTH).contains(&width),
        "unsupported data width {}",
        width
    );
    let mask = (1u64 << width) - 1;
    let msb = 1u64 << (width - 1);
    let a = a & mask;
    let b = b & mask;
    let d = d & 1;
    let not_b = !b & mask;

    let is_neg = |x: u64| x & msb != 0;
    let as_signed = |x: u64| -> i64 {
        if is_neg(x) {
            x as i64 - (1i64 << width)
        } else {
            x as i64
        }
    };
    let carry_of = |full: u64| (full >> width) & 1 == 1;

    let ge = if signed {
        as_signed(a) >= as_signed(b)
    } else {
        a >= b
    };
    let le = if signed {
        as_signed(a) <= as_signed(b)
    } else {
        a <= b
    };
    // The shifter only looks at as many low bits of `b` as it takes to
    // address every bit position.
    let shift_amount = b & u64::from(width.next_power_of_two() - 1);
    let shift_out = shift_amount >= u64::from(width);

    let (result, alu_predicate) = match op {
        PeOp::Add => {
            let full = a + b;
            (full & mask, carry_of(full))
        }
        PeOp::Sub => {
            let full = a + not_b + 1;
            (full & mask, carry_of(full))
        }
        PeOp::Abs => (if is_neg(a) { a.wrapping_neg() & mask } else { a }, false),
        PeOp::Ge => (a.wrapping_sub(b) & mask, ge),
        PeOp::Le => (a.wrapping_sub(b) & mask, le),
        PeOp::Eq => (a.wrapping_sub(b) & mask, a == b),
        PeOp::Sel => (if d == 1 { a } else { b }, false),
        PeOp::Lshr => (if shift_out { 0 } else { a >> shift_amount }, false),
        PeOp::Ashr => {
            let amount = shift_amount.min(u64::from(width) - 1);
            ((as_signed(a) >> amount) as u64 & mask, false)
        }
        PeOp::Lshl => (
            if shift_out {
                0
            } else {
                (a << shift_amount) & mask
            },
            false,
        ),
        PeOp::Or => (a | b, false),
        PeOp::And => (a & b, false),
        PeOp::Xor => (a ^ b, false),
        PeOp::Inv => (!a & mask, false),
    };

    let carry = match op {
        PeOp::Add => carry_of(a + b + d),
        PeOp::Sub => carry_of(a + not_b + 1),
        PeOp::Abs => carry_of((!a & mask) + 1),
        _ => carry_of(a + b),
    };
    let overflow = match op {
        op if op.clears_overflow() => false,
        PeOp::Add => is_neg(a) == is_neg(b) && is_neg(a) != is_neg((a + b + d) & mask),
        PeOp::Sub => is_neg(a) != is_neg(b) && is_neg(a) != is_neg(result),
        PeOp::Abs => a == msb,
        _ => {
            let sum = (a + b) & mask;
            is_neg(a) == is_neg(b) && is_neg(a) != is_neg(sum)
        }
    };

    AluOutput {
        result,
        flags: Flags {
            zero: result == 0,
            carry,
            negative: is_neg(result),
            overflow,
        },
        alu_predicate,
    }
}

/// Result of `op` for the given operands; the oracle used when generating
/// truth tables.
pub fn reference_result(op: PeOp, signed: bool, a: u64, b: u64, d: u64, width: u32) -> u64 {
    alu(op, signed, a, b, d, width).result
}

/// Three-input lookup table: bit `bit2:bit1:bit0` of `code`.
pub fn lut(code: u64, bit0: u64, bit1: u64, bit2: u64) -> bool {
    let index = ((bit2 & 1) << 2) | ((bit1 & 1) << 1) | (bit0 & 1);
    (code >> index) & 1 == 1
}

/// Picks the predicate output according to the four-bit flag select.
pub fn select_flag(flag_select: u64, flags: Flags, alu_predicate: bool, lut_out: bool) -> bool {
    let Flags {
        zero: z,
        carry: c,
        negative: n,
        overflow: v,
    } = flags;
    match flag_select & 0xf {
        0x0 => z,
        0x1 => !z,
        0x2 => c,
        0x3 => !c,
        0x4 => n,
        0x5 => !n,
        0x6 => v,
        0x7 => !v,
        0x8 => c && !z,
        0x9 => !c || z,
        0xa => n == v,
        0xb => n != v,
        0xc => !z && n == v,
        0xd => z || n != v,
        0xe => lut_out,
        _ => alu_predicate,
    }
}

fn pe_ports(width: u32) -> Vec<PortSpec> {
    let input = |name: &'static str, rtl_name: &'static str, width: u32| PortSpec {
        name,
        rtl_name,
        width,
        direction: PortDirection::Input,
    };
    let output = |name: &'static str, rtl_name: &'static str, width: u32| PortSpec {
        name,
        rtl_name,
        width,
        direction: PortDirection::Output,
    };
    vec![
        input(OPERAND_A, "op_a", width),
        input(OPERAND_B, "op_b", width),
        input(OPERATION_SELECTOR, "op_code", OP_CODE_WIDTH),
        input(SHIFT_ENABLE, "op_a_shift", 1),
        input(DATA_PATH_SELECT, "op_d_p", 1),
        input(FLAG_SELECT, "flag_sel", 4),
        input(BIT0, "bit0", 1),
        input(BIT1, "bit1", 1),
        input(BIT2, "bit2", 1),
        input(LUT_CODE, "lut_code", 8),
        output(RESULT, "res", width),
        output(RESULT_PREDICATE, "res_p", 1),
    ]
}

#[derive(Debug, Clone, Copy, Default)]
struct InputLatch {
    operand_a: u64,
    operand_b: u64,
    operation_selector: u64,
    // Latched for completeness; the datapath does not consume them.
    #[allow(dead_code)]
    shift_enable: u64,
    #[allow(dead_code)]
    data_path_select: u64,
    flag_select: u64,
    bit0: u64,
    bit1: u64,
    bit2: u64,
    lut_code: u64,
}

#[derive(Debug, Clone, Copy)]
struct OutputLatch {
    result: u64,
    result_predicate: bool,
}

#[derive(Debug, Clone)]
pub struct PeModel {
    width: u32,
    ports: Vec<PortSpec>,
    op_code_format: BitFormat,
    inputs: InputLatch,
    outputs: Option<OutputLatch>,
}

impl PeModel {
    pub fn new(width: u32) -> Result<Self, PecheckError> {
        if !(MIN_DATA_WIDTH..=MAX_DATA_WIDTH).contains(&width) {
            return Err(PecheckError::Construction(format!(
                "data width {} is outside the supported range {}..={}",
                width, MIN_DATA_WIDTH, MAX_DATA_WIDTH
            )));
        }
        let op_code_format = BitFormat::parse(OP_CODE_FORMAT)?;
        log::debug!("PeModel::new; width: {}", width);
        Ok(PeModel {
            width,
            ports: pe_ports(width),
            op_code_format,
            inputs: InputLatch::default(),
            outputs: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}

impl Dut for PeModel {
    fn ports(&self) -> &[PortSpec] {
        &self.ports
    }

    fn set_input(&mut self, port: &str, value: u64) -> Result<(), PecheckError> {
        let value = value & find_port(&self.ports, port, PortDirection::Input)?.mask();
        let slot = match port {
            OPERAND_A => &mut self.inputs.operand_a,
            OPERAND_B => &mut self.inputs.operand_b,
            OPERATION_SELECTOR => &mut self.inputs.operation_selector,
            SHIFT_ENABLE => &mut self.inputs.shift_enable,
            DATA_PATH_SELECT => &mut self.inputs.data_path_select,
            FLAG_SELECT => &mut self.inputs.flag_select,
            BIT0 => &mut self.inputs.bit0,
            BIT1 => &mut self.inputs.bit1,
            BIT2 => &mut self.inputs.bit2,
            LUT_CODE => &mut self.inputs.lut_code,
            _ => return Err(PecheckError::UnknownPort(port.to_string())),
        };
        *slot = value;
        Ok(())
    }

    fn evaluate(&mut self) {
        let inputs = self.inputs;
        let signed = self
            .op_code_format
            .extract(inputs.operation_selector, 's')
            .map_or(false, |s| s == 1);
        let op = self
            .op_code_format
            .extract(inputs.operation_selector, 'o')
            .and_then(PeOp::from_code);

        let lut_out = lut(inputs.lut_code, inputs.bit0, inputs.bit1, inputs.bit2);
        let outputs = match op {
            Some(op) => {
                let out = alu(
                    op,
                    signed,
                    inputs.operand_a,
                    inputs.operand_b,
                    inputs.bit0,
                    self.width,
                );
                OutputLatch {
                    result: out.result,
                    result_predicate: select_flag(
                        inputs.flag_select,
                        out.flags,
                        out.alu_predicate,
                        lut_out,
                    ),
                }
            }
            None => {
                log::debug!(
                    "PeModel::evaluate; op code {:#x} selects no ALU operation",
                    inputs.operation_selector
                );
                OutputLatch {
                    result: 0,
                    result_predicate: false,
                }
            }
        };
        self.outputs = Some(outputs);
    }

    fn get_output(&self, port: &str) -> Result<u64, PecheckError> {
        find_port(&self.ports, port, PortDirection::Output)?;
        let outputs = match &self.outputs {
            Some(outputs) => outputs,
            None => panic!("PeModel: output `{}` read before evaluate()", port),
        };
        match port {
            RESULT => Ok(outputs.result),
            RESULT_PREDICATE => Ok(outputs.result_predicate as u64),
            _ => Err(PecheckError::UnknownPort(port.to_string())),
        }
    }
}
