//! CRC-64/ECMA-182 (reflected)
//!
//! Table-driven, bit-reflected CRC-64 using the ECMA-182 polynomial with an
//! all-ones initial register and an all-ones output mask. This is the variant
//! published as CRC-64/XZ; its check value for `"123456789"` is
//! `0x995dc9bbdf1939fa`.

/// ECMA-182 polynomial, already in reflected form
pub const POLYNOMIAL: u64 = 0xC96C_5795_D787_0F42;

const INIT: u64 = 0xFFFF_FFFF_FFFF_FFFF;
const XOROUT: u64 = 0xFFFF_FFFF_FFFF_FFFF;

/// Byte-indexed partial remainders, built at compile time
static TABLE: [u64; 256] = generate_table();

const fn generate_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u64;
        let mut j = 0;
        while j < 8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Incremental CRC-64 accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc64 {
    crc: u64,
}

impl Crc64 {
    /// Create an accumulator with the all-ones initial register
    pub fn new() -> Self {
        Self { crc: INIT }
    }

    /// Feed more bytes; state carries across calls
    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.crc;
        for &byte in data {
            crc = TABLE[((crc ^ u64::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
        }
        self.crc = crc;
    }

    /// Final checksum value
    pub fn value(&self) -> u64 {
        self.crc ^ XOROUT
    }

    /// Final checksum as 16 lowercase hex characters
    pub fn hex(&self) -> String {
        format!("{:016x}", self.value())
    }

    /// Final checksum as 8 little-endian bytes, independent of host byte order
    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.value().to_le_bytes()
    }
}

impl Default for Crc64 {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot CRC-64 of a buffer
pub fn checksum(data: &[u8]) -> u64 {
    let mut crc = Crc64::new();
    crc.update(data);
    crc.value()
}
