use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Scheduler quanta per simulated second on the reference host.
pub const DEFAULT_TICKS_PER_SECOND: u32 = 20;

/// Convert a duration in seconds to a whole number of ticks, rounding up.
///
/// `ceil(seconds * ticks_per_second)`, never less than one tick. Durations too
/// large to represent saturate at `Ticks::MAX`.
///
/// Tier durations are entered as decimal seconds, so the product is taken in
/// f64: a fixed-point round trip of values like 0.1 lands just above the
/// decimal and would cost an extra tick.
pub fn seconds_to_ticks(seconds: f64, ticks_per_second: u32) -> Ticks {
    let ticks = (seconds * f64::from(ticks_per_second)).ceil();
    // `as` saturates on overflow and maps NaN to zero.
    (ticks as Ticks).max(1)
}
