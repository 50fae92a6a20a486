//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `paytracker_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("paytracker_core ping={}", paytracker_core::ping());
    println!("paytracker_core version={}", paytracker_core::core_version());
}
