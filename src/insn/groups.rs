//! The mnemonic -> category table. This is the only place that knows which
//! instruction goes where, everything else asks [`lookup`].

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter};

/// Coarse instruction class. Anything we don't recognise is [`Category::Alu`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, AsRefStr, EnumIter, Serialize,
)]
pub enum Category {
    #[strum(serialize = "ALU")]
    #[serde(rename = "ALU")]
    Alu,
    Load,
    Store,
    Branch,
    System,
}

macro_rules! mnemonic_table {
    ($($category:ident => [$($mnemonic:literal),* $(,)?]),* $(,)?) => {
        /// Every mnemonic with a category other than the fallback, lower case.
        pub const MNEMONICS: &[(&str, Category)] = &[
            $( $( ($mnemonic, Category::$category), )* )*
        ];
    };
}

mnemonic_table!(
    Load => ["lw", "lh", "lb", "lbu", "lhu", "ld", "lwu"],
    Store => ["sw", "sh", "sb", "sd"],
    Branch => [
        "beq", "bne", "blt", "bge", "bltu", "bgeu", "blez", "bgtz",
        "j", "jal", "jalr", "jr",
    ],
    System => ["ecall", "ebreak"],
);

/// `mnemonic` must already be lower case.
pub fn lookup(mnemonic: &str) -> Category {
    MNEMONICS
        .iter()
        .find(|(m, _)| *m == mnemonic)
        .map(|(_, category)| *category)
        .unwrap_or(Category::Alu)
}
