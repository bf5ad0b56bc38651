//! CPU configuration.

/// What the CPU does with an opcode byte that has no documented operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IllegalOpcodePolicy {
    /// Stop before executing it. PC is left on the opcode byte.
    #[default]
    Stop,
    /// Execute it as a one-byte, two-cycle NOP.
    Nop,
}

/// Configuration for a 6502 instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub illegal_opcodes: IllegalOpcodePolicy,
    /// Honour the D flag in ADC/SBC. When false (Ricoh 2A03 style) D is
    /// still stored and pushed but arithmetic is always binary.
    pub decimal_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            illegal_opcodes: IllegalOpcodePolicy::Stop,
            decimal_mode: true,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"illegal_opcodes":"Nop"}"#).unwrap();
        assert_eq!(config.illegal_opcodes, IllegalOpcodePolicy::Nop);
        assert!(config.decimal_mode);
    }
}
