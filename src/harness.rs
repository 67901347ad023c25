// SPDX-License-Identifier: Apache-2.0

//! Emits the Verilator C++ test bench that runs the same sweep against the
//! compiled RTL.

use crate::driver::AssertionPolicy;
use crate::dut::{
    find_port, PortDirection, PortSpec, DATA_PATH_SELECT, OPERAND_A, OPERAND_B,
    OPERATION_SELECTOR, RESULT, SHIFT_ENABLE,
};
use crate::static_config::StaticConfig;
use crate::truth_table::TruthTable;
use crate::PecheckError;

pub struct HarnessBuilder<'a> {
    top: &'a str,
    ports: &'a [PortSpec],
    lines: Vec<String>,
}

impl<'a> HarnessBuilder<'a> {
    /// `top` is the RTL top module; Verilator names its class `V<top>`.
    pub fn new(top: &'a str, ports: &'a [PortSpec]) -> Self {
        HarnessBuilder {
            top,
            ports,
            lines: Vec::new(),
        }
    }

    fn rtl_name(&self, port: &str, direction: PortDirection) -> Result<&'a str, PecheckError> {
        find_port(self.ports, port, direction).map(|p| p.rtl_name)
    }

    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn add_prologue(&mut self) {
        let top = self.top;
        self.line(format!("#include \"V{}.h\"", top));
        self.line("#include \"verilated.h\"");
        self.line("#include <cassert>");
        self.line("#include <iostream>");
        self.line("");
        self.line("int main(int argc, char **argv, char **env) {");
        self.line("    Verilated::commandArgs(argc, argv);");
        self.line(format!("    V{0}* top = new V{0};", top));
        self.line("");
    }

    fn add_table(&mut self, table: &TruthTable) -> Result<(), PecheckError> {
        self.line(format!("    unsigned int tests[{}][3] = {{", table.len()));
        for row in table.rows() {
            for value in [row.operand_a, row.operand_b, row.expected] {
                if value > u64::from(u32::MAX) {
                    return Err(PecheckError::Harness(format!(
                        "value {} in row `{}` does not fit an unsigned int",
                        value, row
                    )));
                }
            }
            self.line(format!("        {{ {} }},", row));
        }
        self.line("    };");
        self.line("");
        Ok(())
    }

    fn add_config(&mut self, config: &StaticConfig) -> Result<(), PecheckError> {
        for (port, value) in config.port_values() {
            let required = matches!(port, OPERATION_SELECTOR | SHIFT_ENABLE | DATA_PATH_SELECT);
            if !required && value == 0 {
                continue;
            }
            let spec = find_port(self.ports, port, PortDirection::Input)?;
            self.line(format!(
                "    top->{} = {};",
                spec.rtl_name,
                value & spec.mask()
            ));
        }
        self.line("");
        Ok(())
    }

    fn add_loop(&mut self, rows: usize, policy: AssertionPolicy) -> Result<(), PecheckError> {
        let op_a = self.rtl_name(OPERAND_A, PortDirection::Input)?;
        let op_b = self.rtl_name(OPERAND_B, PortDirection::Input)?;
        let res = self.rtl_name(RESULT, PortDirection::Output)?;
        let assertion = format!("assert(top->{} == test[2]);", res);
        self.line(format!("    for(int i = 0; i < {}; i++) {{", rows));
        self.line("        unsigned int* test = tests[i];");
        self.line(format!("        top->{} = test[0];", op_a));
        self.line(format!("        top->{} = test[1];", op_b));
        self.line("        top->eval();");
        self.line(format!(
            "        std::cout << test[0] << \", \" << test[1] << \", \" << test[2] << \", \" << top->{} << \"\\n\";",
            res
        ));
        match policy {
            AssertionPolicy::Enforce => self.line(format!("        {}", assertion)),
            AssertionPolicy::Disabled => self.line(format!("        //{}", assertion)),
        }
        self.line("    }");
        self.line("");
        Ok(())
    }

    fn add_epilogue(&mut self) {
        self.line("    delete top;");
        self.line("    std::cout << \"Success\" << std::endl;");
        self.line("    exit(0);");
        self.line("}");
    }

    pub fn build(
        mut self,
        config: &StaticConfig,
        table: &TruthTable,
        policy: AssertionPolicy,
    ) -> Result<String, PecheckError> {
        if table.is_empty() {
            return Err(PecheckError::Harness(
                "refusing to emit a harness for an empty truth table".to_string(),
            ));
        }
        log::info!(
            "HarnessBuilder::build; top: {} rows: {}",
            self.top,
            table.len()
        );
        self.add_prologue();
        self.add_table(table)?;
        self.add_config(config)?;
        self.add_loop(table.len(), policy)?;
        self.add_epilogue();
        Ok(self.lines.join("\n") + "\n")
    }
}
