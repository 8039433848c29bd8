//! Tools to reduce raw spike records to a bounded population synchrony index
//! per time window using the Golomb measure (Golomb and Rinzel, 1993/1994).
//!
//! Each window's spike trains are binarized at a fixed sampling rate, smoothed
//! with a centered Gaussian kernel, and compared: the variance of the
//! population-averaged signal over the mean per neuron variance. The raw
//! measure has a `1/sqrt(N)` floor for asynchronous populations, which is
//! rescaled away so the index spans [0, 1] regardless of population size.

use ndarray::{Array1, Array2, Axis};
use crate::error::ConfigurationError;
use crate::neuron::SpikeRecord;


/// Synchrony of one population over one time window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynchronyBin {
    /// Window start (ms)
    pub window_start: f32,
    /// Window end (ms), exclusive
    pub window_end: f32,
    /// Rescaled Golomb synchrony in [0, 1]
    pub synchrony: f64,
    /// Mean slow potassium conductance over the window (mS/cm^2)
    pub mean_g_ks: f32,
}

/// Converts spike records and a conductance trajectory into an ordered
/// sequence of per window synchrony measurements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynchronyEngine {
    /// Sampling rate of the binarized spike signals (Hz)
    pub sample_rate_hz: usize,
    /// Standard deviation of the smoothing kernel (ms)
    pub kernel_sd_ms: f64,
    /// Initial interval excluded from analysis so transients decay (ms)
    pub settle_ms: usize,
}

impl Default for SynchronyEngine {
    fn default() -> Self {
        SynchronyEngine {
            sample_rate_hz: 1000,
            kernel_sd_ms: 2.,
            settle_ms: 1000,
        }
    }
}

impl SynchronyEngine {
    /// Bin size used when none is supplied, chosen so the bin count scales
    /// with run length while keeping resolution comparable across durations
    pub fn default_bin_size(&self, duration_ms: usize) -> usize {
        (400. / (8000. / (duration_ms as f64 - self.settle_ms as f64))) as usize
    }

    /// Measures synchrony and mean conductance over successive windows of
    /// `bin_size_ms` (or the default bin size) starting at the settle interval,
    /// emitting only complete windows.
    ///
    /// `spikes` holds one record per neuron of the population, `g_ks_trace`
    /// one conductance sample per simulation step of `step_ms`.
    pub fn synchrony_series(
        &self,
        spikes: &[SpikeRecord],
        g_ks_trace: &[f32],
        population_size: usize,
        duration_ms: usize,
        step_ms: f32,
        bin_size_ms: Option<usize>,
    ) -> Result<Vec<SynchronyBin>, ConfigurationError> {
        if population_size == 0 || spikes.len() != population_size {
            return Err(ConfigurationError::PopulationSizeMismatch);
        }
        if !(step_ms > 0.) {
            return Err(ConfigurationError::NonPositiveTimestep);
        }

        let bin_size = match bin_size_ms {
            Some(value) => value,
            None => self.default_bin_size(duration_ms),
        };

        if bin_size == 0 {
            return Err(ConfigurationError::ZeroBinSize);
        }
        if duration_ms <= self.settle_ms || self.settle_ms + bin_size > duration_ms {
            return Err(ConfigurationError::EmptyBinSequence);
        }

        let window_count = (duration_ms - self.settle_ms) / bin_size;
        let last_end = self.settle_ms + window_count * bin_size;
        if g_ks_trace.len() < (last_end as f32 / step_ms) as usize {
            return Err(ConfigurationError::ConductanceTraceTooShort);
        }

        let kernel = self.gaussian_kernel();

        let mut bins = Vec::with_capacity(window_count);

        for window in 0..window_count {
            let start = self.settle_ms + window * bin_size;
            let end = start + bin_size;

            let smoothed = self.smoothed_window_signals(spikes, start, end, &kernel);
            let synchrony = golomb_rescaled(&smoothed);

            let start_step = (start as f32 / step_ms) as usize;
            let end_step = ((end as f32 / step_ms) as usize).min(g_ks_trace.len());
            let slice = &g_ks_trace[start_step..end_step];
            let mean_g_ks = slice.iter().sum::<f32>() / slice.len() as f32;

            bins.push(SynchronyBin {
                window_start: start as f32,
                window_end: end as f32,
                synchrony,
                mean_g_ks,
            });
        }

        Ok(bins)
    }

    /// Binarizes and smooths every neuron's spikes within `[start, end)`,
    /// one column per neuron
    fn smoothed_window_signals(
        &self,
        spikes: &[SpikeRecord],
        start: usize,
        end: usize,
        kernel: &Array1<f64>,
    ) -> Array2<f64> {
        let window_ms = end - start;
        let samples = window_ms * self.sample_rate_hz / 1000;

        let mut signals: Array2<f64> = Array2::zeros((samples, spikes.len()));

        for (neuron, record) in spikes.iter().enumerate() {
            for time in record.clipped(start as f32, end as f32) {
                let mut index = (time as f64 / window_ms as f64 * samples as f64) as usize;
                // a spike at the very end of the window maps one slot out of
                // range, fold it into the last slot
                if index >= samples {
                    index = samples - 1;
                }

                signals[[index, neuron]] = 1.;
            }
        }

        for mut column in signals.axis_iter_mut(Axis(1)) {
            let smoothed = convolve_same(&column.to_owned(), kernel);
            column.assign(&smoothed);
        }

        signals
    }

    /// Gaussian kernel with unit peak, six standard deviations of support and
    /// an odd number of taps so it is centrally peaked
    fn gaussian_kernel(&self) -> Array1<f64> {
        let sd_ms = if self.kernel_sd_ms > 0. { self.kernel_sd_ms } else { 2. };

        let mut taps = (6. * (sd_ms / 1000.) * self.sample_rate_hz as f64).round() as usize;
        if taps % 2 == 0 {
            taps -= 1;
        }
        let taps = taps.max(1);

        Array1::linspace(-3., 3., taps).mapv(|x: f64| (-x * x).exp())
    }
}

/// Same-length convolution of a signal with a centered kernel, matching the
/// middle samples of the full convolution
fn convolve_same(signal: &Array1<f64>, kernel: &Array1<f64>) -> Array1<f64> {
    let length = signal.len();
    let half = (kernel.len() - 1) / 2;

    Array1::from_iter((0..length).map(|i| {
        kernel.iter()
            .enumerate()
            .filter_map(|(j, &k)| {
                let shifted = i + half;
                if shifted >= j && shifted - j < length {
                    Some(k * signal[shifted - j])
                } else {
                    None
                }
            })
            .sum()
    }))
}

/// Rescaled Golomb synchrony of the smoothed signals, one column per neuron.
/// A flat population signal or a population of one is degenerate and defined
/// as maximal synchrony.
fn golomb_rescaled(signals: &Array2<f64>) -> f64 {
    let neurons = signals.ncols();

    let variances = signals.var_axis(Axis(0), 0.);
    let mean_variance = variances.mean().unwrap_or(0.);

    if mean_variance == 0. || neurons == 1 {
        return 1.;
    }

    let mean_signal = match signals.mean_axis(Axis(1)) {
        Some(mean_signal) => mean_signal,
        None => return 1.,
    };

    let raw = (mean_signal.var(0.) / mean_variance).sqrt();

    let floor = 1. / (neurons as f64).sqrt();

    ((raw - floor) / (1. - floor)).clamp(0., 1.)
}
