//! Script opcode constants.
//!
//! Only the subset the SDK exercises is named individually; everything
//! else round-trips through `opcode_to_string`/`string_to_opcode` as
//! `OP_UNKNOWN_xx` for ASM purposes.

/// Push an empty byte vector (also known as OP_FALSE).
pub const OP_0: u8 = 0x00;
/// Direct pushes of 1..=75 bytes use the length itself as the opcode.
pub const OP_DATA_1: u8 = 0x01;
pub const OP_DATA_20: u8 = 0x14;
pub const OP_DATA_32: u8 = 0x20;
pub const OP_DATA_33: u8 = 0x21;
pub const OP_DATA_75: u8 = 0x4b;
/// The next byte holds the push length.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// The next two bytes (LE) hold the push length.
pub const OP_PUSHDATA2: u8 = 0x4d;
/// The next four bytes (LE) hold the push length.
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_RESERVED: u8 = 0x50;
/// Push the number 1 (also known as OP_TRUE). OP_2..OP_16 follow.
pub const OP_1: u8 = 0x51;
pub const OP_2: u8 = 0x52;
pub const OP_3: u8 = 0x53;
pub const OP_16: u8 = 0x60;

pub const OP_NOP: u8 = 0x61;
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_VERIFY: u8 = 0x69;
/// Marks an output as provably unspendable; trailing bytes carry data.
pub const OP_RETURN: u8 = 0x6a;

pub const OP_DUP: u8 = 0x76;

pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;

pub const OP_RIPEMD160: u8 = 0xa6;
pub const OP_SHA256: u8 = 0xa8;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_HASH256: u8 = 0xaa;
/// Signature hashing restarts after the most recent occurrence; removed
/// from subscripts before digesting.
pub const OP_CODESEPARATOR: u8 = 0xab;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

/// True for OP_1..=OP_16.
pub fn is_small_int(op: u8) -> bool {
    (OP_1..=OP_16).contains(&op)
}

/// Decode OP_0 / OP_1..=OP_16 to its numeric value.
pub fn decode_small_int(op: u8) -> Option<u8> {
    if op == OP_0 {
        Some(0)
    } else if is_small_int(op) {
        Some(op - OP_1 + 1)
    } else {
        None
    }
}

/// Encode 0..=16 as OP_0 / OP_1..=OP_16.
pub fn encode_small_int(n: u8) -> Option<u8> {
    match n {
        0 => Some(OP_0),
        1..=16 => Some(OP_1 + n - 1),
        _ => None,
    }
}

/// The canonical OP_xxx name for an opcode byte.
pub fn opcode_to_string(op: u8) -> String {
    let name = match op {
        OP_0 => "OP_0",
        OP_PUSHDATA1 => "OP_PUSHDATA1",
        OP_PUSHDATA2 => "OP_PUSHDATA2",
        OP_PUSHDATA4 => "OP_PUSHDATA4",
        OP_1NEGATE => "OP_1NEGATE",
        OP_RESERVED => "OP_RESERVED",
        OP_NOP => "OP_NOP",
        OP_IF => "OP_IF",
        OP_NOTIF => "OP_NOTIF",
        OP_ELSE => "OP_ELSE",
        OP_ENDIF => "OP_ENDIF",
        OP_VERIFY => "OP_VERIFY",
        OP_RETURN => "OP_RETURN",
        OP_DUP => "OP_DUP",
        OP_EQUAL => "OP_EQUAL",
        OP_EQUALVERIFY => "OP_EQUALVERIFY",
        OP_RIPEMD160 => "OP_RIPEMD160",
        OP_SHA256 => "OP_SHA256",
        OP_HASH160 => "OP_HASH160",
        OP_HASH256 => "OP_HASH256",
        OP_CODESEPARATOR => "OP_CODESEPARATOR",
        OP_CHECKSIG => "OP_CHECKSIG",
        OP_CHECKSIGVERIFY => "OP_CHECKSIGVERIFY",
        OP_CHECKMULTISIG => "OP_CHECKMULTISIG",
        OP_CHECKMULTISIGVERIFY => "OP_CHECKMULTISIGVERIFY",
        _ => {
            if is_small_int(op) {
                return format!("OP_{}", op - OP_1 + 1);
            }
            return format!("OP_UNKNOWN_{:#04x}", op);
        }
    };
    name.to_string()
}

/// Parse a canonical OP_xxx name back to its opcode byte.
pub fn string_to_opcode(s: &str) -> Option<u8> {
    match s {
        "OP_0" | "OP_FALSE" => Some(OP_0),
        "OP_PUSHDATA1" => Some(OP_PUSHDATA1),
        "OP_PUSHDATA2" => Some(OP_PUSHDATA2),
        "OP_PUSHDATA4" => Some(OP_PUSHDATA4),
        "OP_1NEGATE" => Some(OP_1NEGATE),
        "OP_RESERVED" => Some(OP_RESERVED),
        "OP_1" | "OP_TRUE" => Some(OP_1),
        "OP_NOP" => Some(OP_NOP),
        "OP_IF" => Some(OP_IF),
        "OP_NOTIF" => Some(OP_NOTIF),
        "OP_ELSE" => Some(OP_ELSE),
        "OP_ENDIF" => Some(OP_ENDIF),
        "OP_VERIFY" => Some(OP_VERIFY),
        "OP_RETURN" => Some(OP_RETURN),
        "OP_DUP" => Some(OP_DUP),
        "OP_EQUAL" => Some(OP_EQUAL),
        "OP_EQUALVERIFY" => Some(OP_EQUALVERIFY),
        "OP_RIPEMD160" => Some(OP_RIPEMD160),
        "OP_SHA256" => Some(OP_SHA256),
        "OP_HASH160" => Some(OP_HASH160),
        "OP_HASH256" => Some(OP_HASH256),
        "OP_CODESEPARATOR" => Some(OP_CODESEPARATOR),
        "OP_CHECKSIG" => Some(OP_CHECKSIG),
        "OP_CHECKSIGVERIFY" => Some(OP_CHECKSIGVERIFY),
        "OP_CHECKMULTISIG" => Some(OP_CHECKMULTISIG),
        "OP_CHECKMULTISIGVERIFY" => Some(OP_CHECKMULTISIGVERIFY),
        _ => {
            // OP_2..OP_16
            let n: u8 = s.strip_prefix("OP_")?.parse().ok()?;
            if (2..=16).contains(&n) {
                Some(OP_1 + n - 1)
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_int_codec() {
        assert_eq!(decode_small_int(OP_0), Some(0));
        assert_eq!(decode_small_int(OP_1), Some(1));
        assert_eq!(decode_small_int(OP_16), Some(16));
        assert_eq!(decode_small_int(OP_DUP), None);
        assert_eq!(encode_small_int(2), Some(OP_2));
        assert_eq!(encode_small_int(17), None);
    }

    #[test]
    fn test_opcode_name_roundtrip() {
        for op in [OP_0, OP_1, OP_16, OP_DUP, OP_HASH160, OP_CHECKMULTISIG, OP_RETURN] {
            let name = opcode_to_string(op);
            assert_eq!(string_to_opcode(&name), Some(op), "roundtrip for {}", name);
        }
    }

    #[test]
    fn test_unknown_opcode_name() {
        assert_eq!(opcode_to_string(0xff), "OP_UNKNOWN_0xff");
        assert_eq!(string_to_opcode("OP_BOGUS"), None);
    }
}
