//! Timing and perf logging that works both in the browser and natively.

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds on a monotonic clock, counted from its first use
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Emit a perf line; also mirrored to the browser console under wasm
pub fn log_perf(line: &str) {
    tracing::debug!(target: "engine::perf", "{}", line);
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&line.into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_monotonic() {
        let a = now_ms();
        let b = now_ms();
        assert!(a >= 0.0);
        assert!(b >= a);
    }
}
