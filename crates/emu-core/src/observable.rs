//! Observability trait for inspecting component state.
//!
//! State-dump tooling reads the CPU through this trait. Queries never
//! touch the bus and never change emulation state.

use std::fmt;

/// A dynamically-typed value for state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Single flag or condition.
    Bool(bool),
    /// 8-bit register.
    U8(u8),
    /// 16-bit register or address.
    U16(u16),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", u8::from(*v)),
            Value::U8(v) => write!(f, "${v:02X}"),
            Value::U16(v) => write!(f, "${v:04X}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a specific property by path.
    ///
    /// Paths are hierarchical, separated by dots:
    /// - `pc` - Program counter
    /// - `a` - Accumulator
    /// - `flags.z` - Zero flag
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// List all available query paths.
    fn query_paths(&self) -> &'static [&'static str];

    /// Render every known path as `path=value` pairs, in `query_paths` order.
    fn dump(&self) -> String {
        let mut out = String::new();
        for path in self.query_paths() {
            if let Some(value) = self.query(path) {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(path);
                out.push('=');
                out.push_str(&value.to_string());
            }
        }
        out
    }
}
