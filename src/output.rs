//! # Result Buffer and Width-Adaptive Output Encoder
//!
//! Sigil programs produce output by appending integers to a result buffer
//! (`r` opcode). Nothing is written while the program runs; on termination,
//! normal or not, the whole sequence is flushed to the host sink in one of
//! three fixed widths.
//!
//! ## Width selection
//! The encoder scans the buffer once and picks the narrowest signed width
//! that losslessly represents every entry:
//! - 8-bit if every value is in `[-128, 127]`
//! - else 16-bit if every value is in `[-32768, 32767]`
//! - else the full 64-bit width
//!
//! The packed stream is header-less and in host byte order; a single value
//! outside a range promotes the entire output. An empty buffer produces
//! zero bytes.
//!
//! ## Memory behavior
//! Appends reserve fallibly so an allocation failure surfaces as
//! [`VmError::Mem`] instead of aborting. If the narrowed byte buffer itself
//! cannot be reserved at flush time, the emitter streams the full-width
//! sequence one element at a time rather than giving up.

use std::io::{self, Write};

use crate::error::VmError;

/// Emission width chosen for a flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Width {
    W8,
    W16,
    W64,
}

/// Append-only sequence of integers produced during execution.
#[derive(Debug, Default)]
pub struct ResultBuffer {
    values: Vec<i64>,
}

impl ResultBuffer {
    pub fn new() -> Self {
        ResultBuffer { values: Vec::new() }
    }

    /// Append one value. Growth is fallible so the interpreter can report
    /// exhaustion as a terminal status.
    pub fn append(&mut self, value: i64) -> Result<(), VmError> {
        self.values.try_reserve(1).map_err(|_| VmError::Mem)?;
        self.values.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The recorded values, oldest first. The REPL renders these directly
    /// instead of decoding the packed stream.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Narrowest signed width that fits every recorded value.
    fn narrowest(&self) -> Width {
        let mut width = Width::W8;
        for &value in &self.values {
            if (-128..=127).contains(&value) {
                continue;
            }
            if (-32768..=32767).contains(&value) {
                width = Width::W16;
                continue;
            }
            return Width::W64;
        }
        width
    }

    /// Pack the sequence at its narrowest width, in host byte order.
    pub fn encode(&self) -> Result<Vec<u8>, VmError> {
        let width = self.narrowest();
        let stride = match width {
            Width::W8 => 1,
            Width::W16 => 2,
            Width::W64 => 8,
        };
        let mut out = Vec::new();
        out.try_reserve_exact(self.values.len() * stride)
            .map_err(|_| VmError::Mem)?;
        for &value in &self.values {
            match width {
                Width::W8 => out.extend_from_slice(&(value as i8).to_ne_bytes()),
                Width::W16 => out.extend_from_slice(&(value as i16).to_ne_bytes()),
                Width::W64 => out.extend_from_slice(&value.to_ne_bytes()),
            }
        }
        Ok(out)
    }

    /// Flush the packed stream to the sink. Runs on every termination path.
    ///
    /// If the narrowing buffer cannot be reserved, fall through to writing
    /// the full 64-bit sequence element by element.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        match self.encode() {
            Ok(bytes) => sink.write_all(&bytes),
            Err(_) => {
                for &value in &self.values {
                    sink.write_all(&value.to_ne_bytes())?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_encodes_to_nothing() {
        let buffer = ResultBuffer::new();
        assert_eq!(buffer.encode().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn small_values_pack_as_single_bytes() {
        let mut buffer = ResultBuffer::new();
        for v in [0, 9, -128, 127] {
            buffer.append(v).unwrap();
        }
        assert_eq!(buffer.encode().unwrap(), vec![0x00, 0x09, 0x80, 0x7f]);
    }

    #[test]
    fn one_wide_value_promotes_the_whole_stream_to_16_bits() {
        let mut buffer = ResultBuffer::new();
        buffer.append(1).unwrap();
        buffer.append(1000).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&1i16.to_ne_bytes());
        expected.extend_from_slice(&1000i16.to_ne_bytes());
        assert_eq!(buffer.encode().unwrap(), expected);
    }

    #[test]
    fn boundary_values_stay_at_16_bits() {
        let mut buffer = ResultBuffer::new();
        buffer.append(-32768).unwrap();
        buffer.append(32767).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&(-32768i16).to_ne_bytes());
        expected.extend_from_slice(&32767i16.to_ne_bytes());
        assert_eq!(buffer.encode().unwrap(), expected);
    }

    #[test]
    fn out_of_16_bit_range_promotes_to_64_bits() {
        let mut buffer = ResultBuffer::new();
        buffer.append(5).unwrap();
        buffer.append(32768).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&5i64.to_ne_bytes());
        expected.extend_from_slice(&32768i64.to_ne_bytes());
        assert_eq!(buffer.encode().unwrap(), expected);
    }

    #[test]
    fn negative_wide_values_promote_too() {
        let mut buffer = ResultBuffer::new();
        buffer.append(-40000).unwrap();
        assert_eq!(buffer.encode().unwrap(), (-40000i64).to_ne_bytes().to_vec());
    }

    #[test]
    fn write_to_emits_the_encoded_stream() {
        let mut buffer = ResultBuffer::new();
        buffer.append(3).unwrap();
        buffer.append(7).unwrap();
        let mut sink = Vec::new();
        buffer.write_to(&mut sink).unwrap();
        assert_eq!(sink, vec![0x03, 0x07]);
    }
}
