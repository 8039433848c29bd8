//! The two population network simulator: 800 excitatory and 200 inhibitory
//! conductance-based neurons coupled all to all through population-scaled
//! synaptic currents, with the slow potassium conductance driven by a
//! time dependent [`ModulationSchedule`].
//!
//! One `simulate` call owns all of its state and returns everything it
//! produced; independent calls share nothing and can run concurrently.

use rayon::prelude::*;
use crate::error::ConfigurationError;
use crate::neuron::{
    CellParameters, NeuronState, RollingHistory, SpikeDetector, SpikeRecord,
};

/// Homogeneous synaptic weights between and within the two populations
/// (mS/cm^2), scaled internally by source population size so that total
/// synaptic drive is independent of how many neurons are simulated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectivityParameters {
    /// Excitatory to excitatory weight
    pub ee: f32,
    /// Excitatory to inhibitory weight
    pub ei: f32,
    /// Inhibitory to excitatory weight
    pub ie: f32,
    /// Inhibitory to inhibitory weight
    pub ii: f32,
}

/// Single exponential synaptic gating: each presynaptic spike increments the
/// source neuron's gate by one, the gate decays with the time constant of its
/// population, and the postsynaptic current is `-w * (gate sum / N) * (v - e_rev)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynapseParameters {
    /// Excitatory reversal potential (mV)
    pub e_exc: f32,
    /// Inhibitory reversal potential (mV)
    pub e_inh: f32,
    /// Decay time constant of excitatory gates (ms)
    pub tau_exc: f32,
    /// Decay time constant of inhibitory gates (ms)
    pub tau_inh: f32,
}

impl Default for SynapseParameters {
    fn default() -> Self {
        SynapseParameters {
            e_exc: 0.,
            e_inh: -75.,
            tau_exc: 3.,
            tau_inh: 8.,
        }
    }
}

/// Externally applied current for one population
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppliedCurrent {
    /// Fixed current for the whole run (uA/cm^2)
    Constant(f32),
    /// Current that tracks the instantaneous `g_ks` so the firing rate stays
    /// near 60 Hz while adaptation is withdrawn, interpolated from the
    /// frequency-current calibration table
    RateCompensated,
}

impl AppliedCurrent {
    fn at(&self, g_ks: f32) -> f32 {
        match self {
            AppliedCurrent::Constant(value) => *value,
            AppliedCurrent::RateCompensated => rate_holding_current(g_ks),
        }
    }
}

/// Applied currents (uA/cm^2) holding an isolated excitatory cell near 60 Hz
/// for `g_ks` from 0.0 to 1.5 in steps of 0.1
const RATE_HOLDING_TABLE: [f32; 16] = [
    1.0, 1.4, 1.95, 2.45, 2.95, 3.5, 4.075, 4.675,
    5.3, 5.95, 6.65, 7.45, 8.3, 9.2, 10.3, 11.55,
];

/// Linearly interpolates the 60 Hz holding current for the given `g_ks`,
/// clamped to the calibrated range
pub fn rate_holding_current(g_ks: f32) -> f32 {
    let steps = (RATE_HOLDING_TABLE.len() - 1) as f32;
    let position = (g_ks / 1.5 * steps).clamp(0., steps);

    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f32;

    RATE_HOLDING_TABLE[lower] + fraction * (RATE_HOLDING_TABLE[upper] - RATE_HOLDING_TABLE[lower])
}

/// One-time discrete change to the inhibitory-to-excitatory weight, used to
/// probe hysteresis of the synchronized state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightShift {
    /// Simulation time at which the shift is applied (ms)
    pub at_ms: f32,
    /// Increment added to the IE weight (mS/cm^2)
    pub delta: f32,
}

/// Time course of the slow potassium conductance over a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GksCourse {
    /// Holds `baseline` until the settle interval ends, then declines linearly
    /// to zero at the end of the run, modelling cholinergic withdrawal of
    /// adaptation
    Declining {
        /// Conductance before the decline begins (mS/cm^2)
        baseline: f32,
    },
    /// Fixed conductance for the whole run, applied uniformly to both
    /// populations, used as a control against the declining course
    Tonic(f32),
}

/// Which of the two homogeneous populations a neuron belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Population {
    Excitatory,
    Inhibitory,
}

/// Governs `g_ks(t)` for both populations, evaluated once per step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationSchedule {
    /// Conductance time course
    pub course: GksCourse,
    /// Whether the declining course also applies to the inhibitory population,
    /// when `false` inhibitory cells hold the baseline conductance
    pub modulate_inhibitory: bool,
    /// Settling interval before any decline begins (ms)
    pub settle_ms: f32,
    /// Clamps `g_ks` to zero for all times at or after this cutoff,
    /// overriding the course for both populations
    pub zero_after_ms: Option<f32>,
    /// One-time shift of the IE weight during the run
    pub ie_shift: Option<WeightShift>,
}

impl Default for ModulationSchedule {
    fn default() -> Self {
        ModulationSchedule {
            course: GksCourse::Declining { baseline: 1.5 },
            modulate_inhibitory: true,
            settle_ms: 1000.,
            zero_after_ms: None,
            ie_shift: None,
        }
    }
}

impl ModulationSchedule {
    /// Evaluates `g_ks` for the given population at `time_ms` into a run of
    /// `duration_ms`
    pub fn value_at(&self, time_ms: f32, duration_ms: f32, population: Population) -> f32 {
        if let Some(cutoff) = self.zero_after_ms {
            if time_ms >= cutoff {
                return 0.;
            }
        }

        match self.course {
            GksCourse::Tonic(value) => value,
            GksCourse::Declining { baseline } => {
                let declining = population == Population::Excitatory || self.modulate_inhibitory;

                if !declining || time_ms <= self.settle_ms {
                    baseline
                } else {
                    let ramp = 1. - (time_ms - self.settle_ms) / (duration_ms - self.settle_ms);

                    baseline * ramp.max(0.)
                }
            },
        }
    }
}

/// Per neuron run state, owned exclusively by one `simulate` call
struct Cell {
    history: RollingHistory,
    detector: SpikeDetector,
    spikes: SpikeRecord,
    gate: f32,
}

impl Cell {
    fn new() -> Self {
        Cell {
            history: RollingHistory::new(NeuronState::default()),
            detector: SpikeDetector::default(),
            spikes: SpikeRecord::default(),
            gate: 0.,
        }
    }
}

/// Everything a simulation run produced, read-only once returned
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Spike record per excitatory neuron, indexed by neuron
    pub exc_spikes: Vec<SpikeRecord>,
    /// Spike record per inhibitory neuron, indexed by neuron
    pub inh_spikes: Vec<SpikeRecord>,
    /// Applied current of a representative excitatory neuron, one value per step
    pub sample_current: Vec<f32>,
    /// Excitatory `g_ks` value, one value per step
    pub g_ks_trace: Vec<f32>,
}

/// Orchestrates the two population simulation, fields configure the (immutable
/// per run) population layout, cell models, synapse kinetics and external drive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkSimulator {
    /// Number of excitatory neurons
    pub exc_count: usize,
    /// Number of inhibitory neurons
    pub inh_count: usize,
    /// Ionic parameters shared by every excitatory neuron
    pub exc_cell: CellParameters,
    /// Ionic parameters shared by every inhibitory neuron
    pub inh_cell: CellParameters,
    /// Synaptic gating parameters
    pub synapse: SynapseParameters,
    /// External drive to excitatory neurons
    pub exc_drive: AppliedCurrent,
    /// External drive to inhibitory neurons
    pub inh_drive: AppliedCurrent,
}

impl Default for NetworkSimulator {
    fn default() -> Self {
        NetworkSimulator {
            exc_count: 800,
            inh_count: 200,
            exc_cell: CellParameters::excitatory(),
            inh_cell: CellParameters::inhibitory(),
            synapse: SynapseParameters::default(),
            exc_drive: AppliedCurrent::Constant(5.),
            inh_drive: AppliedCurrent::Constant(2.),
        }
    }
}

impl NetworkSimulator {
    /// Runs the full time loop and returns the per neuron spike records along
    /// with the conductance and representative current traces.
    ///
    /// Every neuron of a population observes the same step's synaptic and
    /// modulatory inputs: gate sums are aggregated from the previous step's
    /// state before any neuron is advanced, so the per neuron updates within a
    /// step are independent and run in parallel.
    pub fn simulate(
        &self,
        connectivity: &ConnectivityParameters,
        schedule: &ModulationSchedule,
        duration_ms: f32,
        step_ms: f32,
    ) -> Result<SimulationResult, ConfigurationError> {
        if !(duration_ms > 0.) {
            return Err(ConfigurationError::NonPositiveDuration);
        }
        if !(step_ms > 0.) {
            return Err(ConfigurationError::NonPositiveTimestep);
        }

        let steps = (duration_ms / step_ms) as usize;

        let mut exc_cells: Vec<Cell> = (0..self.exc_count).map(|_| Cell::new()).collect();
        let mut inh_cells: Vec<Cell> = (0..self.inh_count).map(|_| Cell::new()).collect();

        let mut sample_current = Vec::with_capacity(steps);
        let mut g_ks_trace = Vec::with_capacity(steps);

        let mut ie_weight = connectivity.ie;
        let mut shift_pending = schedule.ie_shift;

        for step in 1..=steps {
            let time_ms = step as f32 * step_ms;

            if let Some(shift) = shift_pending {
                if time_ms >= shift.at_ms {
                    ie_weight += shift.delta;
                    shift_pending = None;
                }
            }

            let g_ks_exc = schedule.value_at(time_ms, duration_ms, Population::Excitatory);
            let g_ks_inh = schedule.value_at(time_ms, duration_ms, Population::Inhibitory);

            // previous-step gate sums, aggregated before any neuron advances
            let exc_gate_sum: f32 = exc_cells.iter().map(|cell| cell.gate).sum();
            let inh_gate_sum: f32 = inh_cells.iter().map(|cell| cell.gate).sum();

            let exc_gate_mean = exc_gate_sum / self.exc_count.max(1) as f32;
            let inh_gate_mean = inh_gate_sum / self.inh_count.max(1) as f32;

            let exc_drive = self.exc_drive.at(g_ks_exc);
            let inh_drive = self.inh_drive.at(g_ks_inh);

            let synapse = self.synapse;

            let exc_cell = self.exc_cell;
            let exc_weights = (connectivity.ee, ie_weight);
            exc_cells.par_iter_mut().for_each(|cell| {
                step_cell(
                    cell,
                    &exc_cell,
                    &synapse,
                    exc_weights,
                    (exc_gate_mean, inh_gate_mean),
                    exc_drive,
                    g_ks_exc,
                    synapse.tau_exc,
                    step,
                    step_ms,
                    time_ms,
                );
            });

            let inh_cell = self.inh_cell;
            let inh_weights = (connectivity.ei, connectivity.ii);
            inh_cells.par_iter_mut().for_each(|cell| {
                step_cell(
                    cell,
                    &inh_cell,
                    &synapse,
                    inh_weights,
                    (exc_gate_mean, inh_gate_mean),
                    inh_drive,
                    g_ks_inh,
                    synapse.tau_inh,
                    step,
                    step_ms,
                    time_ms,
                );
            });

            sample_current.push(exc_drive);
            g_ks_trace.push(g_ks_exc);
        }

        Ok(SimulationResult {
            exc_spikes: exc_cells.into_iter().map(|cell| cell.spikes).collect(),
            inh_spikes: inh_cells.into_iter().map(|cell| cell.spikes).collect(),
            sample_current,
            g_ks_trace,
        })
    }
}

/// Advances one neuron by one step: synaptic current from the previous step's
/// population gate means, one Runge-Kutta update, spike detection and the
/// neuron's own gate decay/increment
#[allow(clippy::too_many_arguments)]
fn step_cell(
    cell: &mut Cell,
    params: &CellParameters,
    synapse: &SynapseParameters,
    (exc_weight, inh_weight): (f32, f32),
    (exc_gate_mean, inh_gate_mean): (f32, f32),
    i_app: f32,
    g_ks: f32,
    gate_tau: f32,
    step: usize,
    step_ms: f32,
    time_ms: f32,
) {
    let state = *cell.history.previous(step);

    let i_syn = -(exc_weight * exc_gate_mean * (state.v - synapse.e_exc)
        + inh_weight * inh_gate_mean * (state.v - synapse.e_inh));

    let increments = params.rk4_increments(&state, i_app, i_syn, g_ks, step_ms);
    let next = state.advanced_by(&increments);
    cell.history.record(step, next);

    cell.gate -= step_ms * cell.gate / gate_tau;

    if cell.detector.observe(next.v) {
        cell.spikes.push(time_ms);
        cell.gate += 1.;
    }
}
