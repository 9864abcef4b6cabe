//! Wire format shared by every command and response.
//!
//! A frame written to the sensor is the 16-bit command code, MSB first,
//! followed by one word group per argument. Every response is a sequence of
//! word groups. A word group is two data bytes and their CRC.

use arrayvec::ArrayVec;

use crate::commands::Command;
use crate::crc::crc;

/// A 2-byte data word as it appears on the bus.
pub type Word = [u8; 2];

/// Size of one word group on the wire.
pub const GROUP_LEN: usize = 3;

/// The longest command takes two argument words.
pub const MAX_ARGS: usize = 2;

/// Command code plus [`MAX_ARGS`] word groups.
pub const MAX_FRAME_LEN: usize = 2 + GROUP_LEN * MAX_ARGS;

/// Bytes written to the bus for a single command.
pub type Frame = ArrayVec<u8, MAX_FRAME_LEN>;

/// Errors raised while validating a response, independent of the bus.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The CRC of word group `group` did not match.
    ChecksumMismatch { group: usize, expected: u8, actual: u8 },
    /// The response had `actual` bytes where `expected` were needed.
    MalformedResponse { expected: usize, actual: usize },
}

/// Builds the frame for `command` with its argument words.
///
/// # Panics
///
/// Panics if more than [`MAX_ARGS`] arguments are given. No command takes more.
pub fn build_frame(command: Command, args: &[Word]) -> Frame {
    let mut frame = Frame::new();
    frame.extend(command.code().to_be_bytes());
    for word in args {
        frame.extend(word.iter().copied());
        frame.push(crc(word));
    }
    frame
}

/// Validates `raw` as `words.len()` word groups and copies their data words
/// into `words`.
///
/// Stops at the first group whose CRC fails, `words` must then be considered
/// garbage.
pub fn decode(raw: &[u8], words: &mut [Word]) -> Result<(), FrameError> {
    let expected = GROUP_LEN * words.len();
    if raw.len() != expected {
        return Err(FrameError::MalformedResponse {
            expected,
            actual: raw.len(),
        });
    }

    for (group, (chunk, word)) in raw.chunks_exact(GROUP_LEN).zip(words.iter_mut()).enumerate() {
        let data = [chunk[0], chunk[1]];
        let expected = crc(&data);
        if expected != chunk[2] {
            return Err(FrameError::ChecksumMismatch {
                group,
                expected,
                actual: chunk[2],
            });
        }
        *word = data;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_argument_frame() {
        let frame = build_frame(Command::ReadMeasuredValues, &[]);
        assert_eq!(frame.as_slice(), &[0x03, 0x00]);
    }

    #[test]
    fn start_measurement_frame() {
        let frame = build_frame(Command::StartMeasurement, &[[0x03, 0x00]]);
        assert_eq!(frame.as_slice(), &[0x00, 0x10, 0x03, 0x00, 0xac]);
    }

    #[test]
    fn frame_length() {
        let args = [[0x00, 0x09], [0x3a, 0x80]];
        let frame = build_frame(Command::WriteAutoCleaningInterval, &args);
        assert_eq!(frame.len(), 2 + 3 * 2);
    }

    #[test]
    fn framer_and_decoder_agree() {
        let args = [[0x00, 0x00], [0xff, 0xff]];
        let frame = build_frame(Command::WriteAutoCleaningInterval, &args);
        let mut words = [[0u8; 2]; 2];
        decode(&frame[2..], &mut words).unwrap();
        assert_eq!(words, args);
    }

    #[test]
    fn decode_groups() {
        let raw = [0x00, 0x01, 0xb0, 0xbe, 0xef, 0x92];
        let mut words = [[0u8; 2]; 2];
        decode(&raw, &mut words).unwrap();
        assert_eq!(words, [[0x00, 0x01], [0xbe, 0xef]]);
    }

    #[test]
    fn length_mismatch() {
        let mut words = [[0u8; 2]; 2];
        assert_eq!(
            decode(&[0x00, 0x01, 0xb0], &mut words),
            Err(FrameError::MalformedResponse {
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn single_corruption_reports_its_group() {
        let valid = [
            0x00, 0x00, 0x81, 0xbe, 0xef, 0x92, 0xff, 0xff, 0xac, 0x00, 0x01, 0xb0,
        ];
        for index in 0..valid.len() {
            let mut raw = valid;
            raw[index] ^= 0x01;
            let mut words = [[0u8; 2]; 4];
            match decode(&raw, &mut words) {
                Err(FrameError::ChecksumMismatch { group, .. }) => {
                    assert_eq!(group, index / GROUP_LEN, "byte {}", index)
                }
                other => panic!("byte {}: unexpected {:?}", index, other),
            }
        }
    }

    #[test]
    fn mismatch_reports_checksums() {
        let mut words = [[0u8; 2]; 1];
        assert_eq!(
            decode(&[0xbe, 0xef, 0x00], &mut words),
            Err(FrameError::ChecksumMismatch {
                group: 0,
                expected: 0x92,
                actual: 0x00
            })
        );
    }
}
