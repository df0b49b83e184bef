//! Program counter values as they show up in traces.

use std::num::ParseIntError;

/// How the `pc` column of a trace is written.
///
/// Traces normally carry `0x`-prefixed hex, but a column made only of plain
/// decimal integers is taken to already be numeric.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PcRadix {
    Hex,
    Decimal,
}

impl PcRadix {
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut values = values.into_iter().peekable();

        if values.peek().is_some() && values.all(is_plain_decimal) {
            PcRadix::Decimal
        } else {
            PcRadix::Hex
        }
    }

    pub fn parse(self, raw: &str) -> Result<u64, ParseIntError> {
        let raw = raw.trim();
        match self {
            PcRadix::Hex => u64::from_str_radix(strip_hex_prefix(raw), 16),
            PcRadix::Decimal => raw.parse(),
        }
    }
}

fn is_plain_decimal(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Parses a hex pc, the `0x` prefix is optional.
pub fn parse_pc(raw: &str) -> Result<u64, ParseIntError> {
    PcRadix::Hex.parse(raw)
}

/// `0x00010074`
pub fn format_pc(pc: u64) -> String {
    format!("0x{pc:08x}")
}
