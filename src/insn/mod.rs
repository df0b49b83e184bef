//! Instruction text handling. We never decode anything, the trace already has
//! the disassembly, so all we do is look at the mnemonic.

pub mod groups;

pub use groups::Category;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("instruction has no mnemonic")]
pub struct EmptyMnemonic;

/// First whitespace separated token, lower case.
pub fn mnemonic(instr: &str) -> Result<String, EmptyMnemonic> {
    instr
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
        .ok_or(EmptyMnemonic)
}

pub fn categorize(instr: &str) -> Result<Category, EmptyMnemonic> {
    Ok(groups::lookup(&mnemonic(instr)?))
}

#[cfg(test)]
mod tests {
    use super::{categorize, mnemonic, Category, EmptyMnemonic};

    #[test]
    fn categories() {
        assert_eq!(categorize("lw x1, 0(x2)"), Ok(Category::Load));
        assert_eq!(categorize("sw x1, 0(x2)"), Ok(Category::Store));
        assert_eq!(categorize("beq x1, x2, label"), Ok(Category::Branch));
        assert_eq!(categorize("ecall"), Ok(Category::System));
        assert_eq!(categorize("addi x1, x2, 5"), Ok(Category::Alu));
        assert_eq!(categorize("li x1, 10"), Ok(Category::Alu));
    }

    #[test]
    fn case_and_spacing() {
        assert_eq!(categorize("  LW\tx1, 0(x2)"), Ok(Category::Load));
        assert_eq!(categorize("Jal ra, 0x100"), Ok(Category::Branch));
        assert_eq!(mnemonic(" ADDI x1,x2,5 "), Ok("addi".to_string()));
    }

    #[test]
    fn no_partial_matches() {
        // prefixes of real mnemonics are not the mnemonic
        assert_eq!(categorize("lwx x1"), Ok(Category::Alu));
        assert_eq!(categorize("jalx 0x10"), Ok(Category::Alu));
        assert_eq!(categorize("sw.rl x1"), Ok(Category::Alu));
    }

    #[test]
    fn empty() {
        assert_eq!(categorize(""), Err(EmptyMnemonic));
        assert_eq!(categorize(" \t "), Err(EmptyMnemonic));
    }
}
