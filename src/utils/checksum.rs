/// 16-bit XOR checksum carried in every frame header.
pub struct CheckSum;

impl CheckSum {
    /// Folds the payload two bytes at a time into a 16-bit word.
    ///
    /// An odd trailing byte is folded in as the high byte of a final word.
    pub fn new(payload: &[u8]) -> u16 {
        let mut checksum: u16 = 0;
        for pair in payload.chunks(2) {
            let word = match pair {
                [high, low] => u16::from_be_bytes([*high, *low]),
                [high] => u16::from_be_bytes([*high, 0]),
                _ => 0,
            };
            checksum ^= word;
        }
        checksum
    }

    /// Returns `true` when `checksum` matches the one computed for `payload`.
    pub fn check(checksum: u16, payload: &[u8]) -> bool {
        checksum == CheckSum::new(payload)
    }
}
