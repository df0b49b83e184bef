use super::{Analysis, Reporter, Section};
use crate::{error::AnalysisError, trace::Trace};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

lazy_static! {
    static ref LOAD_ADDRESS: Regex = Regex::new(r"load:(0x[0-9a-fA-F]+)").unwrap();
    static ref STORE_ADDRESS: Regex = Regex::new(r"store:(0x[0-9a-fA-F]+)").unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    Load,
    Store,
}

impl AccessKind {
    fn marker(self) -> &'static str {
        match self {
            AccessKind::Load => "load",
            AccessKind::Store => "store",
        }
    }

    /// Plain substring check, case sensitive.
    pub fn matches(self, mem_access: &str) -> bool {
        mem_access.contains(self.marker())
    }

    /// The `0x...` after `load:`/`store:`. Not finding one is fine.
    pub fn address(self, mem_access: &str) -> Option<&str> {
        let re: &Regex = match self {
            AccessKind::Load => &LOAD_ADDRESS,
            AccessKind::Store => &STORE_ADDRESS,
        };

        re.captures(mem_access)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemorySummary {
    pub loads: usize,
    pub stores: usize,
    /// `None` when there were no loads at all
    pub unique_load_addresses: Option<usize>,
    pub unique_store_addresses: Option<usize>,
}

impl MemorySummary {
    pub fn from_trace(trace: &Trace) -> Self {
        let accesses: Vec<&str> = trace
            .iter()
            .filter_map(|row| row.mem_access.as_deref())
            .collect();

        let (loads, unique_load_addresses) = tally(AccessKind::Load, &accesses);
        let (stores, unique_store_addresses) = tally(AccessKind::Store, &accesses);

        Self {
            loads,
            stores,
            unique_load_addresses,
            unique_store_addresses,
        }
    }

    pub fn total(&self) -> usize {
        self.loads + self.stores
    }
}

fn tally(kind: AccessKind, accesses: &[&str]) -> (usize, Option<usize>) {
    let matching: Vec<&str> = accesses
        .iter()
        .copied()
        .filter(|access| kind.matches(access))
        .collect();

    if matching.is_empty() {
        return (0, None);
    }

    let unique = matching
        .iter()
        .filter_map(|access| kind.address(access))
        .unique()
        .count();

    (matching.len(), Some(unique))
}

impl fmt::Display for MemorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory Access Analysis:")?;
        writeln!(f, "  Total loads: {}", self.loads)?;
        writeln!(f, "  Total stores: {}", self.stores)?;
        writeln!(f, "  Total memory accesses: {}", self.total())?;
        if let Some(unique) = self.unique_load_addresses {
            writeln!(f, "  Unique load addresses: {}", unique)?;
        }
        if let Some(unique) = self.unique_store_addresses {
            writeln!(f, "  Unique store addresses: {}", unique)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MemoryReporter;

impl Reporter for MemoryReporter {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn report(&self, analysis: &Analysis) -> Result<Section, AnalysisError> {
        Ok(Section::Memory(MemorySummary::from_trace(analysis.trace())))
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessKind, MemorySummary};
    use crate::trace::{Trace, TraceRow};

    fn trace(accesses: &[Option<&str>]) -> Trace {
        Trace::from_rows(
            accesses
                .iter()
                .enumerate()
                .map(|(i, access)| TraceRow::new(i as i64, "0x100", "nop", *access))
                .collect(),
        )
    }

    #[test]
    fn addresses() {
        assert_eq!(AccessKind::Load.address("load:0x1000"), Some("0x1000"));
        assert_eq!(AccessKind::Store.address("store:0xBEEF"), Some("0xBEEF"));
        assert_eq!(AccessKind::Load.address("store:0x1000"), None);
        assert_eq!(AccessKind::Load.address("load:1000"), None);
        assert_eq!(AccessKind::Load.address(""), None);
    }

    #[test]
    fn case_sensitive() {
        assert!(AccessKind::Load.matches("load:0x10"));
        assert!(!AccessKind::Load.matches("LOAD:0x10"));
        assert!(AccessKind::Store.matches("prefix store suffix"));
    }

    #[test]
    fn summary() {
        let summary = MemorySummary::from_trace(&trace(&[
            Some("load:0x1000"),
            Some("store:0x2000"),
            Some(""),
            Some("load:0x1000"),
        ]));

        assert_eq!(
            summary,
            MemorySummary {
                loads: 2,
                stores: 1,
                unique_load_addresses: Some(1),
                unique_store_addresses: Some(1),
            }
        );
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn missing_values_are_skipped() {
        let summary = MemorySummary::from_trace(&trace(&[None, Some("load:0x10"), None]));
        assert_eq!(summary.loads, 1);
        assert_eq!(summary.stores, 0);
        assert_eq!(summary.unique_store_addresses, None);
    }

    #[test]
    fn load_without_address() {
        let summary = MemorySummary::from_trace(&trace(&[Some("load"), Some("load:0x8")]));
        assert_eq!(summary.loads, 2);
        assert_eq!(summary.unique_load_addresses, Some(1));
    }

    #[test]
    fn display() {
        let summary = MemorySummary::from_trace(&trace(&[Some("store:0x20"), Some("store:0x24")]));
        assert_eq!(
            summary.to_string(),
            "Memory Access Analysis:\n  Total loads: 0\n  Total stores: 2\n  \
             Total memory accesses: 2\n  Unique store addresses: 2\n"
        );
    }
}
