//! Physical-limit checks for incoming readings.
//!
//! Capacitive RH sensors drift slightly past 0 % and 100 %, so humidity
//! gets a small margin.  Anything non-finite is never plausible.

use super::Signal;

/// Accepted humidity range, %RH.
const HUMIDITY_RANGE: (f32, f32) = (-2.0, 102.0);
/// Accepted CO2 range, ppm.  Indoor sensors saturate well below 40 000.
const CO2_RANGE: (f32, f32) = (0.0, 40_000.0);
/// Accepted VOC range (index or ppb, sensor dependent).
const VOC_RANGE: (f32, f32) = (0.0, 60_000.0);

pub fn is_plausible(signal: Signal, value: f32) -> bool {
    if !value.is_finite() {
        return false;
    }
    let (lo, hi) = match signal {
        Signal::Humidity => HUMIDITY_RANGE,
        Signal::Co2 => CO2_RANGE,
        Signal::Voc => VOC_RANGE,
    };
    (lo..=hi).contains(&value)
}
