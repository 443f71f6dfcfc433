//! Script chunk parsing and encoding.
//!
//! A script chunk is either a bare opcode or a data push with its
//! payload. Decoding is push-aware: OP_PUSHDATA1/2/4 prefixes and direct
//! pushes are resolved into structured chunks, with truncation reported
//! rather than silently clamped.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes) this is the length.
    pub op: u8,
    /// The data payload, if this chunk is a push operation.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// A bare opcode chunk.
    pub fn op(op: u8) -> Self {
        ScriptChunk { op, data: None }
    }

    /// True when this chunk pushes data (including the empty OP_0 push).
    pub fn is_push(&self) -> bool {
        self.op <= OP_PUSHDATA4
    }

    /// Render this chunk for space-separated ASM output.
    ///
    /// Data pushes render as hex, opcodes as their canonical name.
    pub fn to_asm_string(&self) -> String {
        if self.op > OP_0 && self.op <= OP_PUSHDATA4 {
            if let Some(ref data) = self.data {
                return hex::encode(data);
            }
        }
        opcode_to_string(self.op)
    }
}

/// Decode raw script bytes into a vector of `ScriptChunk` values.
///
/// Fails with `MalformedScript` when a push runs past the end of the
/// script.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let op = bytes[pos];

        match op {
            OP_PUSHDATA1 => {
                if bytes.len() < pos + 2 {
                    return Err(truncated(pos));
                }
                let length = bytes[pos + 1] as usize;
                pos += 2;
                if bytes.len() < pos + length {
                    return Err(truncated(pos));
                }
                chunks.push(ScriptChunk { op, data: Some(bytes[pos..pos + length].to_vec()) });
                pos += length;
            }
            OP_PUSHDATA2 => {
                if bytes.len() < pos + 3 {
                    return Err(truncated(pos));
                }
                let length = u16::from_le_bytes([bytes[pos + 1], bytes[pos + 2]]) as usize;
                pos += 3;
                if bytes.len() < pos + length {
                    return Err(truncated(pos));
                }
                chunks.push(ScriptChunk { op, data: Some(bytes[pos..pos + length].to_vec()) });
                pos += length;
            }
            OP_PUSHDATA4 => {
                if bytes.len() < pos + 5 {
                    return Err(truncated(pos));
                }
                let length = u32::from_le_bytes([
                    bytes[pos + 1],
                    bytes[pos + 2],
                    bytes[pos + 3],
                    bytes[pos + 4],
                ]) as usize;
                pos += 5;
                if bytes.len() < pos + length {
                    return Err(truncated(pos));
                }
                chunks.push(ScriptChunk { op, data: Some(bytes[pos..pos + length].to_vec()) });
                pos += length;
            }
            OP_DATA_1..=OP_DATA_75 => {
                let length = op as usize;
                if bytes.len() < pos + 1 + length {
                    return Err(truncated(pos));
                }
                chunks.push(ScriptChunk {
                    op,
                    data: Some(bytes[pos + 1..pos + 1 + length].to_vec()),
                });
                pos += 1 + length;
            }
            _ => {
                chunks.push(ScriptChunk { op, data: None });
                pos += 1;
            }
        }
    }

    Ok(chunks)
}

fn truncated(pos: usize) -> ScriptError {
    ScriptError::MalformedScript(format!("push runs past end of script at byte {}", pos))
}

/// Compute the push prefix bytes for a payload of the given length.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= 75 {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xff {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xffff {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xffff_ffff {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple_pushes() {
        let bytes = hex::decode("05000102030401ff02abcd").unwrap();
        let parts = decode_script(&bytes).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].data.as_deref(), Some(&[0u8, 1, 2, 3, 4][..]));
        assert_eq!(parts[1].data.as_deref(), Some(&[0xffu8][..]));
        assert_eq!(parts[2].data.as_deref(), Some(&[0xabu8, 0xcd][..]));
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_script(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_p2pkh_shape() {
        let bytes = hex::decode("76a914e10c5d2235a634b329673fe2498197b4cb033f9c88ac").unwrap();
        let parts = decode_script(&bytes).unwrap();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0].op, OP_DUP);
        assert_eq!(parts[1].op, OP_HASH160);
        assert_eq!(parts[2].data.as_ref().unwrap().len(), 20);
        assert_eq!(parts[3].op, OP_EQUALVERIFY);
        assert_eq!(parts[4].op, OP_CHECKSIG);
    }

    #[test]
    fn test_decode_truncated_direct_push() {
        // 0x05 says "push 5 bytes" but only 3 follow.
        assert!(decode_script(&hex::decode("05000000").unwrap()).is_err());
    }

    #[test]
    fn test_decode_truncated_pushdata() {
        assert!(decode_script(&[OP_PUSHDATA1]).is_err());
        assert!(decode_script(&[OP_PUSHDATA1, 0x05, 0x00]).is_err());
        assert!(decode_script(&[OP_PUSHDATA2, 0x05]).is_err());
        assert!(decode_script(&[OP_PUSHDATA4, 0x05, 0x00]).is_err());
    }

    #[test]
    fn test_decode_pushdata1_valid() {
        let data = b"testing";
        let mut script_bytes = vec![OP_PUSHDATA1, data.len() as u8];
        script_bytes.extend_from_slice(data);
        let parts = decode_script(&script_bytes).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].op, OP_PUSHDATA1);
        assert_eq!(parts[0].data.as_deref(), Some(&data[..]));
    }

    #[test]
    fn test_push_data_prefix_boundaries() {
        assert_eq!(push_data_prefix(20).unwrap(), vec![20u8]);
        assert_eq!(push_data_prefix(75).unwrap(), vec![75u8]);
        assert_eq!(push_data_prefix(76).unwrap(), vec![OP_PUSHDATA1, 76]);
        assert_eq!(push_data_prefix(255).unwrap(), vec![OP_PUSHDATA1, 255]);
        assert_eq!(push_data_prefix(256).unwrap(), vec![OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(push_data_prefix(65536).unwrap(), vec![OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_chunk_asm_rendering() {
        let push = ScriptChunk { op: OP_DATA_20, data: Some(vec![0xab; 20]) };
        assert_eq!(push.to_asm_string(), "ab".repeat(20));
        assert_eq!(ScriptChunk::op(OP_DUP).to_asm_string(), "OP_DUP");
    }
}
