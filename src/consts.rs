// Layout constants for the generated CSR bank.

/// Upper bound on event sources per manager.
/// Whole-register values are carried as `Bitmap<MAX_EVENT_SOURCES>`.
pub const MAX_EVENT_SOURCES: usize = 1024;

/// Width of one CSR bus word, in bits.
/// Word W of a register covers bits [W*32, W*32+31].
pub const CSR_DATA_WIDTH: usize = 32;

/// Byte stride between consecutive CSR words.
pub const CSR_WORD_BYTES: usize = CSR_DATA_WIDTH / 8;

/// Name of the status register, first in the bank.
pub const STATUS_REG_NAME: &str = "status";

/// Name of the pending register, second in the bank.
pub const PENDING_REG_NAME: &str = "pending";

/// Name of the enable register, last in the bank.
pub const ENABLE_REG_NAME: &str = "enable";

/// Prefix of the positional field name used for unnamed sources (`event0`, `event1`, ...).
pub const FALLBACK_NAME_PREFIX: &str = "event";

/// Upper bound on comb evaluation passes before the simulator gives up settling.
pub const MAX_SETTLE_PASSES: usize = 64;

/// Number of CSR words needed to hold a register of `width` bits.
pub const fn csr_words(width: usize) -> usize {
    width.div_ceil(CSR_DATA_WIDTH)
}
