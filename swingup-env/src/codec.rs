//! Wire format of the rotary pendulum controller.
//!
//! The controller sends fixed-size ASCII telemetry frames:
//!
//! | bytes  | field          |
//! |--------|----------------|
//! | 0..4   | timestamp      |
//! | 4..7   | base angle     |
//! | 7..9   | pendulum angle |
//! | 9..12  | PWM duty       |
//! | 12     | checksum       |
//! | 13     | `'\n'`         |
//!
//! Every field byte is a digit `b` with value `b - 0x30` in `0..=0x3f`, most
//! significant first. The checksum is `(sum of bytes 0..12) & 0x3f` plus `0x30`.
//!
//! Commands go the other way as the 8 big-endian bytes of an IEEE-754 `f64`.
use swingup_core::SwingupError;
use thiserror::Error;

/// Length of a telemetry frame in bytes.
pub const TELEMETRY_LEN: usize = 14;

/// Length of an encoded command in bytes.
pub const COMMAND_LEN: usize = 8;

const DIGIT_OFFSET: u8 = 0x30;
const DIGIT_MASK: u8 = 0x3f;
const DIGIT_BITS: u32 = 6;
const TERMINATOR: u8 = b'\n';
const PAYLOAD_LEN: usize = 12;

// Byte ranges of the digit groups.
const TIMESTAMP: (usize, usize) = (0, 4);
const BASE_ANGLE: (usize, usize) = (4, 7);
const PENDULUM_ANGLE: (usize, usize) = (7, 9);
const PWM_DUTY: (usize, usize) = (9, 12);

/// Reasons for rejecting a frame.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame does not have the expected length.
    #[error("frame must be {expected} bytes, but {actual}")]
    InvalidLength {
        /// Expected length.
        expected: usize,
        /// Received length.
        actual: usize,
    },

    /// The last byte of a telemetry frame is not `'\n'`.
    #[error("invalid terminator {0:#04x}")]
    InvalidTerminator(u8),

    /// The checksum byte does not match the payload.
    #[error("checksum expected {computed:#04x}, but {received:#04x}")]
    ChecksumMismatch {
        /// Checksum computed from the payload.
        computed: u8,
        /// Checksum byte in the frame.
        received: u8,
    },

    /// A payload byte is not a digit.
    #[error("digit {0:#04x} out of range")]
    DigitOutOfRange(u8),
}

impl From<DecodeError> for SwingupError {
    fn from(e: DecodeError) -> Self {
        SwingupError::TransportFault(e.to_string())
    }
}

/// Raw telemetry as reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    /// Milliseconds on the controller clock.
    pub timestamp: u32,

    /// Raw encoder count of the base.
    pub base_angle: u32,

    /// Raw potentiometer reading of the pendulum.
    pub pendulum_angle: u32,

    /// Raw PWM duty. Bit 16 holds the direction.
    pub pwm_duty: u32,
}

impl Telemetry {
    /// Decodes a telemetry frame.
    ///
    /// Checks are done in order: length, terminator, checksum and digits.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() != TELEMETRY_LEN {
            return Err(DecodeError::InvalidLength {
                expected: TELEMETRY_LEN,
                actual: buf.len(),
            });
        }

        let terminator = buf[TELEMETRY_LEN - 1];
        if terminator != TERMINATOR {
            return Err(DecodeError::InvalidTerminator(terminator));
        }

        let payload = &buf[..PAYLOAD_LEN];
        let computed = checksum(payload);
        let received = buf[PAYLOAD_LEN];
        if computed != received {
            return Err(DecodeError::ChecksumMismatch { computed, received });
        }

        Ok(Self {
            timestamp: decode_digits(&payload[TIMESTAMP.0..TIMESTAMP.1])?,
            base_angle: decode_digits(&payload[BASE_ANGLE.0..BASE_ANGLE.1])?,
            pendulum_angle: decode_digits(&payload[PENDULUM_ANGLE.0..PENDULUM_ANGLE.1])?,
            pwm_duty: decode_digits(&payload[PWM_DUTY.0..PWM_DUTY.1])?,
        })
    }

    /// Encodes the telemetry into a frame.
    ///
    /// Bits that do not fit in a field are dropped.
    pub fn encode(&self) -> [u8; TELEMETRY_LEN] {
        let mut buf = [0u8; TELEMETRY_LEN];
        encode_digits(self.timestamp, &mut buf[TIMESTAMP.0..TIMESTAMP.1]);
        encode_digits(self.base_angle, &mut buf[BASE_ANGLE.0..BASE_ANGLE.1]);
        encode_digits(self.pendulum_angle, &mut buf[PENDULUM_ANGLE.0..PENDULUM_ANGLE.1]);
        encode_digits(self.pwm_duty, &mut buf[PWM_DUTY.0..PWM_DUTY.1]);
        buf[PAYLOAD_LEN] = checksum(&buf[..PAYLOAD_LEN]);
        buf[TELEMETRY_LEN - 1] = TERMINATOR;
        buf
    }
}

/// Checksum byte of a payload.
pub fn checksum(payload: &[u8]) -> u8 {
    let sum = payload.iter().fold(0u32, |acc, &b| acc + b as u32);
    (sum & DIGIT_MASK as u32) as u8 + DIGIT_OFFSET
}

fn decode_digits(digits: &[u8]) -> Result<u32, DecodeError> {
    digits.iter().try_fold(0u32, |acc, &b| {
        let d = b.wrapping_sub(DIGIT_OFFSET);
        if b < DIGIT_OFFSET || d > DIGIT_MASK {
            return Err(DecodeError::DigitOutOfRange(b));
        }
        Ok((acc << DIGIT_BITS) | d as u32)
    })
}

fn encode_digits(mut value: u32, digits: &mut [u8]) {
    for b in digits.iter_mut().rev() {
        *b = (value & DIGIT_MASK as u32) as u8 + DIGIT_OFFSET;
        value >>= DIGIT_BITS;
    }
}

/// Encodes a motor command.
pub fn encode_command(v: f64) -> [u8; COMMAND_LEN] {
    v.to_be_bytes()
}

/// Decodes a motor command.
pub fn decode_command(buf: &[u8]) -> Result<f64, DecodeError> {
    let bytes: [u8; COMMAND_LEN] = buf.try_into().map_err(|_| DecodeError::InvalidLength {
        expected: COMMAND_LEN,
        actual: buf.len(),
    })?;
    Ok(f64::from_be_bytes(bytes))
}
