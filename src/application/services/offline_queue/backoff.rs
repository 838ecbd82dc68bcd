use std::time::Duration;

/// `min(base * 2^retry_count, max)`; depends on nothing but its inputs.
pub fn retry_delay(retry_count: u32, base: Duration, max: Duration) -> Duration {
    let factor = 2u32.checked_pow(retry_count).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(max).min(max)
}
