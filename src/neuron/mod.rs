//! The conductance-based single cell model: ionic parameters per population,
//! a fourth order Runge-Kutta integrator over the membrane equation, the
//! two state spike edge detector and the bounded rolling state history.
//!
//! The model carries a fast sodium current with instantaneous activation, a
//! delayed rectifier potassium current, a leak current and a slowly gated
//! potassium current `g_ks * z * (v - e_k)` responsible for spike frequency
//! adaptation. Cholinergic modulation acts by scaling `g_ks` down; the gating
//! variable `z` and the conductance value itself are supplied by the caller at
//! every step so that a network can impose a time dependent schedule.

/// Number of recent states retained per neuron, enough for the stages of the
/// integration scheme to reconstruct the previous state
pub const HISTORY_DEPTH: usize = 5;

/// State variables of a single neuron
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuronState {
    /// Membrane potential (mV)
    pub v: f32,
    /// Fast sodium inactivation gate
    pub h: f32,
    /// Delayed rectifier activation gate
    pub n: f32,
    /// Slow potassium adaptation gate
    pub z: f32,
}

impl Default for NeuronState {
    fn default() -> Self {
        NeuronState {
            v: -42.,
            h: 0.5,
            n: 0.5,
            z: 0.2,
        }
    }
}

impl NeuronState {
    /// Returns the state advanced by the given increments
    pub fn advanced_by(&self, increments: &NeuronState) -> NeuronState {
        NeuronState {
            v: self.v + increments.v,
            h: self.h + increments.h,
            n: self.n + increments.n,
            z: self.z + increments.z,
        }
    }

    fn offset_by(&self, derivatives: &NeuronState, scale: f32) -> NeuronState {
        NeuronState {
            v: self.v + derivatives.v * scale,
            h: self.h + derivatives.h * scale,
            n: self.n + derivatives.n * scale,
            z: self.z + derivatives.z * scale,
        }
    }
}

/// Ionic parameters for one homogeneous population, immutable for a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellParameters {
    /// Membrane capacitance (uF/cm^2)
    pub c_m: f32,
    /// Maximal sodium conductance (mS/cm^2)
    pub g_na: f32,
    /// Sodium reversal potential (mV)
    pub e_na: f32,
    /// Maximal delayed rectifier conductance (mS/cm^2)
    pub g_k: f32,
    /// Potassium reversal potential (mV), shared by the slow potassium current
    pub e_k: f32,
    /// Leak conductance (mS/cm^2)
    pub g_l: f32,
    /// Leak reversal potential (mV)
    pub e_l: f32,
    /// Slow potassium gate time constant (ms)
    pub tau_z: f32,
}

impl CellParameters {
    /// Pyramidal-like parameter set for the excitatory population
    pub fn excitatory() -> Self {
        CellParameters {
            c_m: 1.,
            g_na: 24.,
            e_na: 55.,
            g_k: 3.,
            e_k: -90.,
            g_l: 0.02,
            e_l: -60.,
            tau_z: 75.,
        }
    }

    /// Interneuron-like parameter set for the inhibitory population
    pub fn inhibitory() -> Self {
        CellParameters {
            c_m: 1.,
            g_na: 35.,
            e_na: 55.,
            g_k: 9.,
            e_k: -90.,
            g_l: 0.1,
            e_l: -65.,
            tau_z: 75.,
        }
    }

    /// Time derivatives of the state under the ionic current balance,
    /// `i_app` and `i_syn` in uA/cm^2, `g_ks` in mS/cm^2
    fn derivatives(&self, state: &NeuronState, i_app: f32, i_syn: f32, g_ks: f32) -> NeuronState {
        let NeuronState { v, h, n, z } = *state;

        let m = m_inf(v);
        let i_na = self.g_na * m * m * m * h * (v - self.e_na);
        let i_k = self.g_k * n * n * n * n * (v - self.e_k);
        let i_ks = g_ks * z * (v - self.e_k);
        let i_l = self.g_l * (v - self.e_l);

        NeuronState {
            v: (i_app + i_syn - i_na - i_k - i_ks - i_l) / self.c_m,
            h: (h_inf(v) - h) / tau_h(v),
            n: (n_inf(v) - n) / tau_n(v),
            z: (z_inf(v) - z) / self.tau_z,
        }
    }

    /// Classic fourth order Runge-Kutta increments for one fixed step of size
    /// `dt` (ms), returned per state variable so that adding them to the input
    /// state yields the next state, bit for bit reproducible for identical inputs
    pub fn rk4_increments(
        &self,
        state: &NeuronState,
        i_app: f32,
        i_syn: f32,
        g_ks: f32,
        dt: f32,
    ) -> NeuronState {
        let k1 = self.derivatives(state, i_app, i_syn, g_ks);
        let k2 = self.derivatives(&state.offset_by(&k1, dt / 2.), i_app, i_syn, g_ks);
        let k3 = self.derivatives(&state.offset_by(&k2, dt / 2.), i_app, i_syn, g_ks);
        let k4 = self.derivatives(&state.offset_by(&k3, dt), i_app, i_syn, g_ks);

        NeuronState {
            v: dt / 6. * (k1.v + 2. * k2.v + 2. * k3.v + k4.v),
            h: dt / 6. * (k1.h + 2. * k2.h + 2. * k3.h + k4.h),
            n: dt / 6. * (k1.n + 2. * k2.n + 2. * k3.n + k4.n),
            z: dt / 6. * (k1.z + 2. * k2.z + 2. * k3.z + k4.z),
        }
    }
}

fn m_inf(v: f32) -> f32 {
    1. / (1. + ((-30. - v) / 9.5).exp())
}

fn h_inf(v: f32) -> f32 {
    1. / (1. + ((v + 53.) / 7.).exp())
}

fn tau_h(v: f32) -> f32 {
    0.37 + 2.78 / (1. + ((v + 40.5) / 6.).exp())
}

fn n_inf(v: f32) -> f32 {
    1. / (1. + ((-30. - v) / 10.).exp())
}

fn tau_n(v: f32) -> f32 {
    0.37 + 1.85 / (1. + ((v + 27.) / 15.).exp())
}

fn z_inf(v: f32) -> f32 {
    1. / (1. + ((-39. - v) / 5.).exp())
}

/// Append-only record of one neuron's spike times (ms), immutable once a run ends
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpikeRecord {
    /// Spike times in chronological order (ms)
    pub times: Vec<f32>,
}

impl SpikeRecord {
    /// Records a spike at the given time
    pub fn push(&mut self, time_ms: f32) {
        self.times.push(time_ms);
    }

    /// Returns the spikes strictly inside `(start_ms, end_ms)` offset to be
    /// relative to the window start
    pub fn clipped(&self, start_ms: f32, end_ms: f32) -> Vec<f32> {
        self.times.iter()
            .filter(|&&t| t > start_ms && t < end_ms)
            .map(|&t| t - start_ms)
            .collect()
    }
}

/// Whether the detector is waiting for a threshold crossing or for the
/// voltage to fall back below threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorState {
    Armed,
    Refractory,
}

/// Two state edge detector consuming a voltage trace sample by sample, it
/// reports a spike exactly once per depolarization: a crossing above threshold
/// fires and disarms the detector, which only re-arms once the voltage has
/// fallen back below threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeDetector {
    /// Spike threshold (mV)
    pub threshold: f32,
    state: DetectorState,
}

impl Default for SpikeDetector {
    fn default() -> Self {
        SpikeDetector {
            threshold: 0.,
            state: DetectorState::Armed,
        }
    }
}

impl SpikeDetector {
    /// Creates an armed detector with the given threshold (mV)
    pub fn new(threshold: f32) -> Self {
        SpikeDetector {
            threshold,
            state: DetectorState::Armed,
        }
    }

    /// Consumes one voltage sample, returns `true` on the rising edge of a spike
    pub fn observe(&mut self, voltage: f32) -> bool {
        match self.state {
            DetectorState::Armed => {
                if voltage > self.threshold {
                    self.state = DetectorState::Refractory;
                    true
                } else {
                    false
                }
            },
            DetectorState::Refractory => {
                if voltage < self.threshold {
                    self.state = DetectorState::Armed;
                }

                false
            },
        }
    }
}

/// Fixed depth circular buffer of recent neuron states, indexed by
/// `step % HISTORY_DEPTH` so that memory stays O(1) regardless of run length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingHistory {
    states: [NeuronState; HISTORY_DEPTH],
}

impl RollingHistory {
    /// Creates a history filled with the given initial state
    pub fn new(initial: NeuronState) -> Self {
        RollingHistory {
            states: [initial; HISTORY_DEPTH],
        }
    }

    /// State recorded at the step before `step`
    pub fn previous(&self, step: usize) -> &NeuronState {
        &self.states[(step + HISTORY_DEPTH - 1) % HISTORY_DEPTH]
    }

    /// Overwrites the slot for `step` with the given state
    pub fn record(&mut self, step: usize, state: NeuronState) {
        self.states[step % HISTORY_DEPTH] = state;
    }
}

/// Integrates an isolated neuron (`i_syn = 0`) under a static applied current
/// and a fixed slow potassium conductance, returning the voltage trace and the
/// detected spike times, the shared entry point for frequency-current sweeps
/// and phase response measurements
pub fn run_static_input(
    params: &CellParameters,
    i_app: f32,
    g_ks: f32,
    dt: f32,
    duration_ms: f32,
) -> (Vec<f32>, SpikeRecord) {
    let steps = (duration_ms / dt) as usize;

    let mut history = RollingHistory::new(NeuronState::default());
    let mut detector = SpikeDetector::default();
    let mut spikes = SpikeRecord::default();
    let mut voltages = Vec::with_capacity(steps);

    for step in 1..=steps {
        let state = *history.previous(step);
        let increments = params.rk4_increments(&state, i_app, 0., g_ks, dt);
        let next = state.advanced_by(&increments);

        history.record(step, next);
        voltages.push(next.v);

        if detector.observe(next.v) {
            spikes.push(step as f32 * dt);
        }
    }

    (voltages, spikes)
}

/// Firing frequency (Hz) of an isolated neuron under a static drive, counting
/// only spikes after the settle interval so initial transients decay.
/// Depolarization block shows up as a drop to zero at high drive, an expected
/// outcome that sweep drivers filter rather than an error.
pub fn static_firing_frequency(
    params: &CellParameters,
    i_app: f32,
    g_ks: f32,
    dt: f32,
    duration_ms: f32,
    settle_ms: f32,
) -> f32 {
    let (_, spikes) = run_static_input(params, i_app, g_ks, dt, duration_ms);

    let counted = spikes.times.iter().filter(|&&t| t > settle_ms).count();
    let window_s = (duration_ms - settle_ms) / 1000.;

    counted as f32 / window_s
}
