//! Reference payload
//!
//! The encoded login routine shipped with the unlock program, and the
//! weighted checksum its plaintext must have.

/// Byte length of the reference payload
pub const PAYLOAD_LEN: usize = 197;

/// `WeightedChecksum::payload` of the correctly decoded routine
pub const EXPECTED_PAYLOAD_CHECKSUM: u32 = 0x0020_1b0f;

/// Login routine, XOR-encoded under the checksum of the real password
pub const ENCODED_PAYLOAD: [u8; PAYLOAD_LEN] = [
    0x68, 0x68, 0x89, 0x65, 0x75, 0xa9, 0x7d, 0x48, 0x75, 0xa9, 0x75, 0x40,
    0x75, 0x98, 0xe2, 0xd3, 0xf7, 0x78, 0xe1, 0x3c, 0xdd, 0xdb, 0x48, 0x09,
    0x78, 0xce, 0xc7, 0xc5, 0xcb, 0x87, 0xd4, 0x58, 0xa8, 0x46, 0xc7, 0xc5,
    0xc7, 0xa3, 0xb2, 0xc8, 0x85, 0xaa, 0x36, 0x26, 0x09, 0xae, 0xe3, 0x17,
    0xa9, 0x68, 0x89, 0xc5, 0xdd, 0xe7, 0x45, 0x68, 0xe8, 0x98, 0xbc, 0x4a,
    0x5b, 0xe7, 0x45, 0x6c, 0x8a, 0xa0, 0x48, 0x47, 0x78, 0xf2, 0x00, 0x80,
    0x3d, 0x20, 0xc7, 0xc5, 0xe7, 0x20, 0x00, 0x80, 0x3d, 0x46, 0xc7, 0xc5,
    0xe3, 0x20, 0x00, 0xc8, 0xbe, 0x5d, 0xc0, 0x8e, 0x49, 0x27, 0xb8, 0x80,
    0x3d, 0x20, 0x00, 0x6b, 0x63, 0xe7, 0x45, 0x7c, 0x3d, 0x20, 0x00, 0x80,
    0xd6, 0x68, 0x8b, 0xc5, 0xc1, 0x68, 0x63, 0x50, 0x75, 0xab, 0x45, 0x48,
    0x75, 0x21, 0xd0, 0x8f, 0x8b, 0x30, 0x8b, 0xc5, 0xc1, 0x68, 0x98, 0x8f,
    0x8b, 0x64, 0x05, 0x6e, 0x0c, 0xe2, 0x8b, 0xc5, 0xc1, 0x68, 0x98, 0x08,
    0x69, 0x25, 0xd2, 0x0b, 0x78, 0xdc, 0x48, 0x18, 0x32, 0x96, 0x54, 0x85,
    0xef, 0xab, 0x45, 0x7c, 0x75, 0xb8, 0x0f, 0x36, 0x79, 0x25, 0xe0, 0xb8,
    0xff, 0x54, 0x07, 0x38, 0x3d, 0x20, 0x00, 0x80, 0xd6, 0x31, 0x83, 0xc5,
    0xc1, 0x21, 0x8b, 0xc5, 0xc1, 0xa3, 0xf8, 0x8d, 0x4b, 0x90, 0xb8, 0x81,
    0x3d, 0x20, 0x00, 0xdd, 0xfe,
];
