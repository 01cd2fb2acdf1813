use crate::consts::CSR_DATA_WIDTH;

/// Packs the bits of CSR word `word` into a bus value. Bit `i` of the
/// register is read through `bit`; bits past the register end read as 0.
pub(crate) fn pack_word(word: usize, width: usize, bit: impl Fn(usize) -> bool) -> u32 {
    let bit_index_start = word * CSR_DATA_WIDTH;
    let mut val: u32 = 0;
    let mut bit_mask: u32 = 1;
    for i in 0..CSR_DATA_WIDTH {
        let index = bit_index_start + i;
        if index < width && bit(index) {
            val |= bit_mask;
        }
        bit_mask = bit_mask.wrapping_shl(1);
    }
    val
}

/// Bit `index` of the register as it appears in a written word `word`.
pub(crate) fn word_bit(val: usize, word: usize, index: usize) -> Option<bool> {
    if index / CSR_DATA_WIDTH != word {
        return None;
    }
    Some((val >> (index % CSR_DATA_WIDTH)) & 1 != 0)
}
