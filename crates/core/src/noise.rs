//! Random noise helpers shared by the simulator and the synthetic generator.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Draw one sample from `N(mean, std_dev)`.
///
/// A non-finite or negative `std_dev` degenerates to `mean`.
pub fn gauss<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    match Normal::new(mean, std_dev) {
        Ok(normal) => normal.sample(rng),
        Err(_) => mean,
    }
}

/// Round to two decimal places, matching the precision of the ESP32 firmware output.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
