//! Stateful FIR filter, applied one sample at a time so it composes with the
//! rest of the per-sample signal chain (Goertzel sweep, FM demod) without an
//! intermediate buffer copy.

use std::{
    collections::VecDeque,
    ops::{
        Add,
        Mul,
    },
};

use num_traits::Zero;

#[derive(Clone, Debug)]
pub struct FirFilter<S> {
    coefficients: Vec<f32>,
    delayed: VecDeque<S>,
}

impl<S> FirFilter<S>
where
    S: Copy + Zero,
{
    pub fn new(coefficients: Vec<f32>) -> Self {
        assert!(coefficients.len() > 1);
        let mut delayed = VecDeque::with_capacity(coefficients.len() - 1);
        delayed.resize(coefficients.len() - 1, S::zero());
        Self {
            coefficients,
            delayed,
        }
    }
}

impl<S> FirFilter<S>
where
    S: Copy + Mul<f32, Output = S> + Add<S, Output = S> + Zero,
{
    /// Feeds one sample through the filter and returns the filtered output.
    pub fn scan(&mut self, sample: S) -> S {
        let mut output = sample * self.coefficients[0];
        for (delayed, coeff) in self.delayed.iter().zip(&self.coefficients[1..]) {
            output = output + *delayed * *coeff;
        }

        self.delayed.pop_back();
        self.delayed.push_front(sample);

        output
    }

    /// Filters an entire buffer, in order, reusing this filter's delay line.
    pub fn scan_block(&mut self, samples: &[S]) -> Vec<S> {
        samples.iter().map(|&s| self.scan(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::kaiser::hann_window;

    fn reference_convolution(x: &[f32], h: &[f32]) -> Vec<f32> {
        let mut y = vec![0.0; x.len()];
        for i in 0..x.len() {
            for j in 0..h.len() {
                if i >= j {
                    y[i] += x[i - j] * h[j];
                }
            }
        }
        y
    }

    #[test]
    fn matches_reference_convolution() {
        let x: Vec<f32> = (0..64).map(|i| (i as f32 * 0.37).sin()).collect();
        let h = hann_window(8);

        let expected = reference_convolution(&x, &h);

        let mut filter = FirFilter::new(h);
        let actual = filter.scan_block(&x);

        for (a, b) in actual.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-4, "{a} != {b}");
        }
    }
}
