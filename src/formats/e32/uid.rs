//! Checked-UID computation

/// CRC-16/CCITT (poly 0x1021, init 0, unreflected)
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, &byte| {
        let mut crc = crc ^ (u16::from(byte) << 8);
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
        crc
    })
}

/// Checksum stored in `iUidChecksum` for a UID triplet.
///
/// The low half is the CRC of the even-indexed bytes of the 12-byte
/// little-endian UID block, the high half the CRC of the odd-indexed bytes.
pub fn uid_checksum(uid1: u32, uid2: u32, uid3: u32) -> u32 {
    let mut block = [0u8; 12];
    block[0..4].copy_from_slice(&uid1.to_le_bytes());
    block[4..8].copy_from_slice(&uid2.to_le_bytes());
    block[8..12].copy_from_slice(&uid3.to_le_bytes());

    let even: Vec<u8> = block.iter().step_by(2).copied().collect();
    let odd: Vec<u8> = block.iter().skip(1).step_by(2).copied().collect();

    (u32::from(crc16_ccitt(&odd)) << 16) | u32::from(crc16_ccitt(&even))
}
