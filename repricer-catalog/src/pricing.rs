use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::product::{JitterRange, PriceBounds};

/// Smallest representable price step at `precision` decimals
pub fn smallest_unit(precision: i32) -> f64 {
    10f64.powi(-precision)
}

/// Round half away from zero at `precision` decimals.
///
/// Rounding happens on the scaled binary value, so `9.125` at two decimals
/// becomes `9.13` while `2.675` (stored as `2.67499…`) becomes `2.67`.
pub fn round_price(value: f64, precision: i32) -> f64 {
    let scale = 10f64.powi(precision);
    (value * scale).round() / scale
}

/// Round `value` onto the price grid without leaving `bounds`.
///
/// The value is first raised to the smallest unit, clamped, then rounded. A
/// rounded value that crosses the upper bound is floored to the grid, one that
/// crosses the lower bound is ceiled; if no grid point fits, the bound wins.
pub fn fit_to_bounds(value: f64, bounds: &PriceBounds, precision: i32) -> f64 {
    let scale = 10f64.powi(precision);
    let clamped = bounds.clamp(value.max(smallest_unit(precision)));

    let mut rounded = round_price(clamped, precision);
    if let Some(max) = bounds.max {
        if rounded > max {
            rounded = (max * scale).floor() / scale;
        }
    }
    if let Some(min) = bounds.min {
        if rounded < min {
            rounded = (min * scale).ceil() / scale;
        }
    }
    bounds.clamp(rounded)
}

/// Source of the random margin applied to each decision
pub trait JitterSource {
    fn draw(&mut self, range: &JitterRange) -> f64;
}

impl<J: JitterSource + ?Sized> JitterSource for Box<J> {
    fn draw(&mut self, range: &JitterRange) -> f64 {
        (**self).draw(range)
    }
}

/// Uniform jitter backed by a `rand` generator
pub struct RandomJitter<R = StdRng> {
    rng: R,
}

impl RandomJitter<StdRng> {
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl<R: Rng> RandomJitter<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> JitterSource for RandomJitter<R> {
    fn draw(&mut self, range: &JitterRange) -> f64 {
        if range.max <= range.min {
            return range.min;
        }
        self.rng.gen_range(range.min..=range.max)
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct SequenceJitter {
    values: Vec<f64>,
    next: usize,
}

impl SequenceJitter {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl JitterSource for SequenceJitter {
    fn draw(&mut self, range: &JitterRange) -> f64 {
        if self.values.is_empty() {
            return range.min;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}
