//! Wire format for the per-generation dispatch round.
//!
//! The header is a fixed 8-byte broadcast: the shared generation seed and
//! the maximum payload length across all ranks. Each rank then receives a
//! fixed-length payload buffer holding its assigned RPN strings,
//! comma-delimited with a trailing delimiter and a NUL terminator, and
//! answers with a flat little-endian f32 fitness vector sized to its slice.

use crate::error::{Result, TreegpError};

pub const DELIMITER: char = ',';
const TERMINATOR: u8 = 0;

/// Fixed-size header broadcast to every rank at the start of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub seed: u32,
    pub max_len: i32,
}

impl Header {
    pub const ENCODED_LEN: usize = 8;

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::ENCODED_LEN);
        buf.extend_from_slice(&self.seed.to_le_bytes());
        buf.extend_from_slice(&self.max_len.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != Self::ENCODED_LEN {
            return Err(TreegpError::Protocol(format!(
                "Header must be {} bytes, got {}",
                Self::ENCODED_LEN,
                buf.len()
            )));
        }
        let seed = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let max_len = i32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        Ok(Self { seed, max_len })
    }
}

/// Contiguous slice sizes for partitioning `population_size` individuals
/// over `ranks` workers: base size `population_size / ranks`, with the
/// first `population_size % ranks` ranks taking one extra each.
pub fn partition(population_size: usize, ranks: usize) -> Vec<usize> {
    let base = population_size / ranks;
    let extras = population_size % ranks;
    (0..ranks)
        .map(|rank| if rank < extras { base + 1 } else { base })
        .collect()
}

/// Translates a worker-local position into a global population index:
/// the prefix sum of earlier ranks' slice sizes plus the local offset.
pub fn global_index(slice_sizes: &[usize], rank: usize, local: usize) -> usize {
    slice_sizes[..rank].iter().sum::<usize>() + local
}

/// Length in bytes of the encoded (unpadded) payload for a set of
/// expressions: every string followed by a delimiter, then the terminator.
pub fn payload_len(rpns: &[String]) -> usize {
    rpns.iter().map(|rpn| rpn.len() + 1).sum::<usize>() + 1
}

/// Encodes a rank's assigned expressions into a buffer of exactly
/// `max_len` bytes: comma-delimited with a trailing delimiter, NUL
/// terminated, zero padded.
pub fn encode_payload(rpns: &[String], max_len: usize) -> Result<Vec<u8>> {
    if payload_len(rpns) > max_len {
        return Err(TreegpError::Protocol(format!(
            "Payload of {} bytes exceeds declared maximum {}",
            payload_len(rpns),
            max_len
        )));
    }

    let mut buf = Vec::with_capacity(max_len);
    for rpn in rpns {
        buf.extend_from_slice(rpn.as_bytes());
        buf.push(DELIMITER as u8);
    }
    buf.push(TERMINATOR);
    buf.resize(max_len, 0);
    Ok(buf)
}

/// Decodes a received payload buffer back into RPN strings. The buffer
/// must be exactly the length declared in the header; anything else is a
/// protocol violation, not a truncation.
pub fn decode_payload(buf: &[u8], declared_len: usize) -> Result<Vec<String>> {
    if buf.len() != declared_len {
        return Err(TreegpError::Protocol(format!(
            "Payload is {} bytes but the header declared {}",
            buf.len(),
            declared_len
        )));
    }

    let end = buf
        .iter()
        .position(|&b| b == TERMINATOR)
        .ok_or_else(|| TreegpError::Protocol("Payload missing NUL terminator".to_string()))?;

    let content = std::str::from_utf8(&buf[..end])
        .map_err(|e| TreegpError::Protocol(format!("Payload is not valid UTF-8: {e}")))?;

    Ok(content
        .split(DELIMITER)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect())
}

/// Encodes a fitness vector as flat little-endian f32 values.
pub fn encode_fitness(values: &[f32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(values.len() * 4);
    for value in values {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    buf
}

/// Decodes a fitness message; its length must match the slice size the
/// master recorded for the sending rank.
pub fn decode_fitness(buf: &[u8], expected: usize) -> Result<Vec<f32>> {
    if buf.len() != expected * 4 {
        return Err(TreegpError::Protocol(format!(
            "Fitness message is {} bytes, expected {} values",
            buf.len(),
            expected
        )));
    }
    Ok(buf
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = Header {
            seed: 0xDEAD_BEEF,
            max_len: 512,
        };
        assert_eq!(Header::decode(&header.encode()).unwrap(), header);
    }

    #[test]
    fn header_rejects_wrong_size() {
        assert!(Header::decode(&[0; 7]).is_err());
        assert!(Header::decode(&[0; 9]).is_err());
    }

    #[test]
    fn partition_biases_extras_to_low_ranks() {
        // 10 individuals over 3 ranks: 10 / 3 = 3 each, remainder 1 goes
        // to rank 0.
        assert_eq!(partition(10, 3), vec![4, 3, 3]);
        assert_eq!(partition(9, 3), vec![3, 3, 3]);
        assert_eq!(partition(2, 4), vec![1, 1, 0, 0]);
    }

    #[test]
    fn global_index_is_prefix_sum_plus_local() {
        let sizes = [4, 3, 3];
        assert_eq!(global_index(&sizes, 0, 2), 2);
        assert_eq!(global_index(&sizes, 1, 0), 4);
        assert_eq!(global_index(&sizes, 2, 0), 7);
        assert_eq!(global_index(&sizes, 2, 2), 9);
    }

    #[test]
    fn payload_round_trip() {
        let rpns = vec!["x 1 +".to_string(), "x x *".to_string()];
        let len = payload_len(&rpns) + 10; // Padded buffer.
        let buf = encode_payload(&rpns, len).unwrap();
        assert_eq!(buf.len(), len);
        assert_eq!(decode_payload(&buf, len).unwrap(), rpns);
    }

    #[test]
    fn empty_assignment_round_trip() {
        let rpns: Vec<String> = Vec::new();
        let buf = encode_payload(&rpns, 8).unwrap();
        assert!(decode_payload(&buf, 8).unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_length_mismatch() {
        let rpns = vec!["x".to_string()];
        let buf = encode_payload(&rpns, 16).unwrap();
        assert!(decode_payload(&buf, 17).is_err());
    }

    #[test]
    fn fitness_round_trip() {
        let values = [0.5_f32, 1.25, f32::INFINITY];
        let buf = encode_fitness(&values);
        assert_eq!(decode_fitness(&buf, 3).unwrap(), values);
        assert!(decode_fitness(&buf, 2).is_err());
    }
}
