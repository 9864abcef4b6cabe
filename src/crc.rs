/// Sensirion CRC-8 over one 2-byte word.
///
/// Polynomial `0x31` (x⁸ + x⁵ + x⁴ + 1), seed `0xFF`, no final XOR.
pub fn crc(word: &[u8; 2]) -> u8 {
    let mut crc: u8 = 0xFF;
    for byte in word.iter().copied() {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 == 0 {
                crc <<= 1;
            } else {
                crc = (crc << 1) ^ 0x31u8;
            }
        }
    }
    crc
}
