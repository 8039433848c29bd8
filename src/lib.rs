//! # Cholinergic Networks
//!
//! `cholinergic_networks` is a package for simulating how cholinergic withdrawal of
//! spike frequency adaptation reshapes collective oscillations in a two population
//! (excitatory/inhibitory) network of conductance-based neurons. The slow potassium
//! conductance `g_ks` that produces adaptation can be held tonic or declined over
//! the course of a run, and the resulting spike trains are reduced to a bounded
//! population synchrony index per time window using the Golomb measure.
//!
//! The single cell model, its Runge-Kutta integrator and the spike edge detector
//! live in [`neuron`] and are usable on their own (frequency-current sweeps, phase
//! response measurements); [`network`] couples them through population-scaled
//! synaptic currents under a time dependent [`network::ModulationSchedule`];
//! [`synchrony`] turns the resulting spike records into synchrony time series.
//!
//! ## Simulating a network and measuring synchrony
//!
//! ```rust
//! use cholinergic_networks::{
//!     network::{
//!         ConnectivityParameters, GksCourse, ModulationSchedule, NetworkSimulator,
//!     },
//!     synchrony::SynchronyEngine,
//!     error::ConfigurationError,
//! };
//!
//! fn main() -> Result<(), ConfigurationError> {
//!     let simulator = NetworkSimulator {
//!         // scaled down from the default 800/200 so the example runs quickly
//!         exc_count: 40,
//!         inh_count: 10,
//!         ..NetworkSimulator::default()
//!     };
//!
//!     let connectivity = ConnectivityParameters {
//!         ee: 0.00025,
//!         ei: 0.00025,
//!         ie: 0.0005,
//!         ii: 0.000125,
//!     };
//!
//!     // g_ks declines linearly from 1.5 to 0 after the first second,
//!     // for both populations
//!     let schedule = ModulationSchedule {
//!         course: GksCourse::Declining { baseline: 1.5 },
//!         modulate_inhibitory: true,
//!         ..ModulationSchedule::default()
//!     };
//!
//!     let result = simulator.simulate(&connectivity, &schedule, 2000.0, 0.1)?;
//!
//!     let engine = SynchronyEngine::default();
//!     let bins = engine.synchrony_series(
//!         &result.exc_spikes,
//!         &result.g_ks_trace,
//!         simulator.exc_count,
//!         2000,
//!         0.1,
//!         Some(500),
//!     )?;
//!
//!     for bin in bins {
//!         assert!((0.0..=1.0).contains(&bin.synchrony));
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Running a single neuron
//!
//! ```rust
//! use cholinergic_networks::neuron::{run_static_input, CellParameters};
//!
//! let params = CellParameters::excitatory();
//!
//! // 2 uA/cm^2 of drive with adaptation fully withdrawn
//! let (voltages, spikes) = run_static_input(&params, 2.0, 0.0, 0.01, 2000.0);
//!
//! assert_eq!(voltages.len(), (2000.0_f32 / 0.01) as usize);
//! assert!(!spikes.times.is_empty());
//! ```

pub mod error;
pub mod neuron;
pub mod network;
pub mod synchrony;
