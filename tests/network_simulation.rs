#[cfg(test)]
mod tests {
    use cholinergic_networks::network::{
        rate_holding_current, AppliedCurrent, ConnectivityParameters, GksCourse,
        ModulationSchedule, NetworkSimulator, Population, WeightShift,
    };

    fn small_simulator() -> NetworkSimulator {
        NetworkSimulator {
            exc_count: 20,
            inh_count: 5,
            ..NetworkSimulator::default()
        }
    }

    fn intra_dominated() -> ConnectivityParameters {
        ConnectivityParameters {
            ee: 0.00025,
            ei: 0.00025,
            ie: 0.0005,
            ii: 0.000125,
        }
    }

    #[test]
    pub fn test_simulation_is_deterministic() {
        let simulator = small_simulator();
        let schedule = ModulationSchedule::default();

        let first = simulator
            .simulate(&intra_dominated(), &schedule, 1500., 0.1)
            .unwrap();
        let second = simulator
            .simulate(&intra_dominated(), &schedule, 1500., 0.1)
            .unwrap();

        assert_eq!(first.exc_spikes, second.exc_spikes);
        assert_eq!(first.inh_spikes, second.inh_spikes);
        assert_eq!(first.g_ks_trace, second.g_ks_trace);
        assert_eq!(first.sample_current, second.sample_current);
    }

    #[test]
    pub fn test_result_shape() {
        let simulator = small_simulator();
        let schedule = ModulationSchedule::default();

        let result = simulator
            .simulate(&intra_dominated(), &schedule, 500., 0.1)
            .unwrap();

        assert_eq!(result.exc_spikes.len(), simulator.exc_count);
        assert_eq!(result.inh_spikes.len(), simulator.inh_count);
        assert_eq!(result.g_ks_trace.len(), 5000);
        assert_eq!(result.sample_current.len(), 5000);
    }

    #[test]
    pub fn test_tonic_conductance_trace_is_constant() {
        let simulator = small_simulator();
        let schedule = ModulationSchedule {
            course: GksCourse::Tonic(0.7),
            ..ModulationSchedule::default()
        };

        let result = simulator
            .simulate(&intra_dominated(), &schedule, 800., 0.1)
            .unwrap();

        assert!(result.g_ks_trace.iter().all(|&g| g == 0.7));
    }

    #[test]
    pub fn test_zero_clamp_at_time_zero_silences_ramp() {
        let simulator = small_simulator();
        let schedule = ModulationSchedule {
            zero_after_ms: Some(0.),
            ..ModulationSchedule::default()
        };

        let result = simulator
            .simulate(&intra_dominated(), &schedule, 800., 0.1)
            .unwrap();

        assert!(result.g_ks_trace.iter().all(|&g| g == 0.));
    }

    #[test]
    pub fn test_declining_trace_ramps_to_zero() {
        let simulator = small_simulator();
        let schedule = ModulationSchedule::default();

        let result = simulator
            .simulate(&intra_dominated(), &schedule, 2000., 0.1)
            .unwrap();

        for pair in result.g_ks_trace.windows(2) {
            assert!(pair[1] <= pair[0]);
        }

        assert_eq!(result.g_ks_trace[0], 1.5);
        assert!(*result.g_ks_trace.last().unwrap() < 0.01);
    }

    #[test]
    pub fn test_network_fires() {
        let simulator = small_simulator();
        let schedule = ModulationSchedule::default();

        let result = simulator
            .simulate(&intra_dominated(), &schedule, 1500., 0.1)
            .unwrap();

        let exc_spike_count: usize = result.exc_spikes.iter().map(|record| record.times.len()).sum();
        let inh_spike_count: usize = result.inh_spikes.iter().map(|record| record.times.len()).sum();

        assert!(exc_spike_count > 0);
        assert!(inh_spike_count > 0);
    }

    #[test]
    pub fn test_invalid_inputs_fail_fast() {
        let simulator = small_simulator();
        let schedule = ModulationSchedule::default();

        assert!(simulator.simulate(&intra_dominated(), &schedule, -100., 0.1).is_err());
        assert!(simulator.simulate(&intra_dominated(), &schedule, 0., 0.1).is_err());
        assert!(simulator.simulate(&intra_dominated(), &schedule, 100., 0.).is_err());
        assert!(simulator.simulate(&intra_dominated(), &schedule, 100., -0.1).is_err());
    }

    #[test]
    pub fn test_weight_shift_changes_dynamics_only_after_shift_time() {
        let simulator = small_simulator();

        let unshifted_schedule = ModulationSchedule {
            course: GksCourse::Tonic(0.5),
            ..ModulationSchedule::default()
        };
        let shifted_schedule = ModulationSchedule {
            ie_shift: Some(WeightShift {
                at_ms: 600.,
                delta: 0.01,
            }),
            ..unshifted_schedule
        };

        let unshifted = simulator
            .simulate(&intra_dominated(), &unshifted_schedule, 1200., 0.1)
            .unwrap();
        let shifted = simulator
            .simulate(&intra_dominated(), &shifted_schedule, 1200., 0.1)
            .unwrap();

        // identical before the shift arrives
        for (a, b) in unshifted.exc_spikes.iter().zip(shifted.exc_spikes.iter()) {
            let before = |times: &Vec<f32>| times.iter()
                .filter(|&&t| t < 600.)
                .cloned()
                .collect::<Vec<f32>>();

            assert_eq!(before(&a.times), before(&b.times));
        }

        assert_ne!(unshifted.exc_spikes, shifted.exc_spikes);
    }

    #[test]
    pub fn test_rate_compensated_drive_tracks_conductance() {
        let simulator = NetworkSimulator {
            exc_drive: AppliedCurrent::RateCompensated,
            ..small_simulator()
        };
        let schedule = ModulationSchedule::default();

        let result = simulator
            .simulate(&intra_dominated(), &schedule, 2000., 0.1)
            .unwrap();

        for (current, g_ks) in result.sample_current.iter().zip(result.g_ks_trace.iter()) {
            assert_eq!(*current, rate_holding_current(*g_ks));
        }

        // compensation shrinks the drive as adaptation is withdrawn
        assert!(result.sample_current.last().unwrap() < result.sample_current.first().unwrap());
    }

    #[test]
    pub fn test_rate_holding_current_interpolation() {
        assert_eq!(rate_holding_current(0.), 1.0);
        assert_eq!(rate_holding_current(1.5), 11.55);

        // clamped outside the calibrated range
        assert_eq!(rate_holding_current(-1.), 1.0);
        assert_eq!(rate_holding_current(2.), 11.55);

        let midpoint = rate_holding_current(0.05);
        assert!(midpoint > 1.0 && midpoint < 1.4);
    }

    #[test]
    pub fn test_schedule_spares_unmodulated_inhibitory_population() {
        let schedule = ModulationSchedule {
            modulate_inhibitory: false,
            ..ModulationSchedule::default()
        };

        let duration = 3000.;

        for time in [1200., 2000., 2900.] {
            assert_eq!(schedule.value_at(time, duration, Population::Inhibitory), 1.5);
            assert!(schedule.value_at(time, duration, Population::Excitatory) < 1.5);
        }
    }

    #[test]
    pub fn test_schedule_holds_baseline_through_settle_interval() {
        let schedule = ModulationSchedule::default();

        assert_eq!(schedule.value_at(1., 3000., Population::Excitatory), 1.5);
        assert_eq!(schedule.value_at(1000., 3000., Population::Excitatory), 1.5);
        assert!(schedule.value_at(1001., 3000., Population::Excitatory) < 1.5);
        assert!(schedule.value_at(3000., 3000., Population::Excitatory).abs() < 1e-5);
    }
}
