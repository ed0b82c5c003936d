//! Conversions from raw telemetry to physical units.
use crate::codec::Telemetry;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use swingup_core::SwingupError;

/// Scales of the rotary pendulum sensors and motor driver.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct UnitScales {
    /// Encoder counts per revolution of the base.
    pub encoder_max: u32,

    /// Potentiometer counts per revolution of the pendulum.
    pub potentiometer_max: u32,

    /// PWM duty of a stopped motor.
    pub pwm_max_duty: u32,

    /// Motor voltage at zero duty.
    pub pwm_max_voltage: f64,
}

impl Default for UnitScales {
    fn default() -> Self {
        Self {
            encoder_max: 262000,
            potentiometer_max: 1024,
            pwm_max_duty: 12500,
            pwm_max_voltage: 5.0,
        }
    }
}

/// Telemetry in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds on the controller clock.
    pub time: f64,

    /// Base angle in radians.
    pub base_angle: f64,

    /// Pendulum angle in radians.
    pub pendulum_angle: f64,

    /// Motor voltage.
    pub voltage: f64,
}

impl Sample {
    /// Angular velocities of the base and the pendulum since `prev`.
    ///
    /// Returns `None` unless time has strictly advanced.
    pub fn velocities_since(&self, prev: &Sample) -> Option<[f64; 2]> {
        let dt = self.time - prev.time;
        if dt <= 0.0 {
            return None;
        }
        Some([
            (self.base_angle - prev.base_angle) / dt,
            (self.pendulum_angle - prev.pendulum_angle) / dt,
        ])
    }
}

/// Interprets a raw count as signed, `max` being one full revolution.
///
/// Counts in the upper half of the range are negative.
pub fn to_signed(raw: u32, max: u32) -> i64 {
    let half = (max / 2) as i64;
    let raw = raw as i64;
    if raw < half {
        raw % half
    } else {
        raw % half - half
    }
}

/// Angle of a raw count, `max` being one full revolution.
fn count_to_rad(raw: u32, max: u32) -> f64 {
    to_signed(raw, max) as f64 / (max / 2) as f64 * PI
}

impl UnitScales {
    /// Checks that every conversion is defined.
    pub fn validate(&self) -> Result<(), SwingupError> {
        if self.encoder_max < 2 || self.potentiometer_max < 2 {
            return Err(SwingupError::Configuration(format!(
                "encoder_max and potentiometer_max must be at least 2, but {} and {}",
                self.encoder_max, self.potentiometer_max
            )));
        }
        if self.pwm_max_duty == 0 {
            return Err(SwingupError::Configuration(
                "pwm_max_duty must be positive".to_string(),
            ));
        }
        if !self.pwm_max_voltage.is_finite() {
            return Err(SwingupError::Configuration(format!(
                "pwm_max_voltage must be finite, but {}",
                self.pwm_max_voltage
            )));
        }
        Ok(())
    }

    /// Base angle in radians.
    pub fn encoder_to_rad(&self, raw: u32) -> f64 {
        count_to_rad(raw, self.encoder_max)
    }

    /// Pendulum angle in radians.
    pub fn potentiometer_to_rad(&self, raw: u32) -> f64 {
        count_to_rad(raw, self.potentiometer_max)
    }

    /// Motor voltage. Bit 16 set means negative.
    pub fn pwm_duty_to_voltage(&self, raw: u32) -> f64 {
        let sign = if (raw >> 16) & 1 == 0 { 1.0 } else { -1.0 };
        let duty = (raw & 0xffff) as f64;
        let max_duty = self.pwm_max_duty as f64;
        sign * (max_duty - duty) / max_duty * self.pwm_max_voltage
    }

    /// Converts telemetry to physical units.
    pub fn sample(&self, t: &Telemetry) -> Sample {
        Sample {
            time: t.timestamp as f64 / 1000.0,
            base_angle: self.encoder_to_rad(t.base_angle),
            pendulum_angle: self.potentiometer_to_rad(t.pendulum_angle),
            voltage: self.pwm_duty_to_voltage(t.pwm_duty),
        }
    }
}

/// Wraps the angle from `reference` to `angle` into `[-pi, pi]`.
pub fn relative_angle(reference: f64, angle: f64) -> f64 {
    let d = angle - reference;
    if d > PI {
        d - 2.0 * PI
    } else if d < -PI {
        d + 2.0 * PI
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round2(v: f64) -> f64 {
        (v * 100.0).round() / 100.0
    }

    #[test]
    fn test_pwm_duty_to_voltage() {
        let scales = UnitScales::default();
        assert_eq!(round2(scales.pwm_duty_to_voltage(12499)), 0.0);
        assert_eq!(round2(scales.pwm_duty_to_voltage(0)), 5.0);
        assert_eq!(round2(scales.pwm_duty_to_voltage(0x10000)), -5.0);
        assert_eq!(round2(scales.pwm_duty_to_voltage(6250 + 0x10000)), -2.5);
    }

    #[test]
    fn test_to_signed() {
        assert_eq!(to_signed(0, 1024), 0);
        assert_eq!(to_signed(511, 1024), 511);
        assert_eq!(to_signed(512, 1024), -512);
        assert_eq!(to_signed(1023, 1024), -1);
    }

    #[test]
    fn test_angles() {
        let scales = UnitScales::default();
        assert!((scales.potentiometer_to_rad(256) - PI / 2.0).abs() < 1e-12);
        assert!((scales.potentiometer_to_rad(768) + PI / 2.0).abs() < 1e-12);
        assert!((scales.encoder_to_rad(65500) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_odd_count_uses_integer_half() {
        let scales = UnitScales {
            potentiometer_max: 1025,
            ..UnitScales::default()
        };
        assert_eq!(scales.potentiometer_to_rad(256), 256.0 / 512.0 * PI);
        assert_eq!(scales.potentiometer_to_rad(512), -PI);
    }

    #[test]
    fn test_validate() {
        assert!(UnitScales::default().validate().is_ok());

        let encoder = UnitScales {
            encoder_max: 1,
            ..UnitScales::default()
        };
        let potentiometer = UnitScales {
            potentiometer_max: 0,
            ..UnitScales::default()
        };
        let duty = UnitScales {
            pwm_max_duty: 0,
            ..UnitScales::default()
        };
        for scales in [encoder, potentiometer, duty] {
            assert!(matches!(
                scales.validate(),
                Err(SwingupError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_velocities() {
        let prev = Sample {
            time: 1.0,
            base_angle: 0.0,
            pendulum_angle: 0.5,
            voltage: 0.0,
        };
        let cur = Sample {
            time: 1.02,
            base_angle: 0.02,
            pendulum_angle: 0.4,
            ..prev
        };
        let v = cur.velocities_since(&prev).unwrap();
        assert!((v[0] - 1.0).abs() < 1e-9);
        assert!((v[1] + 5.0).abs() < 1e-9);
        assert_eq!(prev.velocities_since(&prev), None);
        assert_eq!(prev.velocities_since(&cur), None);
    }

    #[test]
    fn test_relative_angle() {
        assert!((relative_angle(3.0, -3.0) - (2.0 * PI - 6.0)).abs() < 1e-12);
        assert!((relative_angle(-3.0, 3.0) + (2.0 * PI - 6.0)).abs() < 1e-12);
        assert_eq!(relative_angle(0.5, 1.0), 0.5);
    }
}
