#[cfg(test)]
mod tests {
    use cholinergic_networks::neuron::{run_static_input, CellParameters, SpikeDetector};

    #[test]
    pub fn test_detector_counts_one_spike_per_depolarization() {
        let mut detector = SpikeDetector::default();

        // rises above threshold, stays above, falls back, rises again
        let trace = [-60., -20., 10., 25., 30., 5., -10., -40., 15., 20., -50.];

        let edges: Vec<bool> = trace.iter().map(|&v| detector.observe(v)).collect();

        assert_eq!(
            edges,
            vec![false, false, true, false, false, false, false, false, true, false, false]
        );
    }

    #[test]
    pub fn test_detector_does_not_rearm_above_threshold() {
        let mut detector = SpikeDetector::default();

        assert!(detector.observe(10.));
        for _ in 0..100 {
            assert!(!detector.observe(10.));
        }

        // still refractory until a sample below threshold arrives
        assert!(!detector.observe(40.));
        assert!(!detector.observe(-30.));
        assert!(detector.observe(5.));
    }

    #[test]
    pub fn test_custom_threshold() {
        let mut detector = SpikeDetector::new(-20.);

        assert!(!detector.observe(-30.));
        assert!(detector.observe(-10.));
        assert!(!detector.observe(-10.));
    }

    #[test]
    pub fn test_voltage_falls_below_threshold_between_recorded_spikes() {
        let params = CellParameters::excitatory();
        let dt = 0.01;

        let (voltages, spikes) = run_static_input(&params, 3., 0., dt, 2000.);

        assert!(spikes.times.len() >= 2);

        for pair in spikes.times.windows(2) {
            let first = (pair[0] / dt) as usize;
            let second = (pair[1] / dt) as usize;

            let dips_below = voltages[first..second].iter().any(|&v| v < 0.);

            assert!(dips_below);
        }
    }

    #[test]
    pub fn test_spike_times_are_ordered() {
        let params = CellParameters::excitatory();

        let (_, spikes) = run_static_input(&params, 3., 0., 0.01, 2000.);

        for pair in spikes.times.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
