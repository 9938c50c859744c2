#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use hodgkin_huxley_dashboard::{
        current::{CurrentWaveform, WaveformKind},
        error::{HodgkinHuxleyError, ParameterError},
    };


    #[test]
    pub fn test_step_is_amplitude_inside_interval_only() -> Result<(), HodgkinHuxleyError> {
        let step = CurrentWaveform::step(10., 50., 7.)?;

        for t in [10., 10.01, 25., 49.99, 50.] {
            assert_eq!(step.current(t), 7., "t = {}", t);
        }
        for t in [0., 9.99, 50.01, 100.] {
            assert_eq!(step.current(t), 0., "t = {}", t);
        }

        Ok(())
    }

    #[test]
    pub fn test_ramp_is_linear_and_hits_endpoints() -> Result<(), HodgkinHuxleyError> {
        let ramp = CurrentWaveform::ramp(10., 150., 2., 7.)?;

        assert!((ramp.current(10.) - 2.).abs() < 1e-12);
        assert!((ramp.current(150.) - 7.).abs() < 1e-12);
        assert!((ramp.current(80.) - 4.5).abs() < 1e-12);
        assert_eq!(ramp.current(9.9), 0.);
        assert_eq!(ramp.current(150.1), 0.);

        let (t0, t1, t2) = (40., 60., 80.);
        let slope_left = (ramp.current(t1) - ramp.current(t0)) / (t1 - t0);
        let slope_right = (ramp.current(t2) - ramp.current(t1)) / (t2 - t1);
        assert!((slope_left - slope_right).abs() < 1e-12);

        Ok(())
    }

    #[test]
    pub fn test_sinusoid_starts_at_phase_offset() -> Result<(), HodgkinHuxleyError> {
        let sinusoid = CurrentWaveform::sinusoid(10., 150., 3., 10., 2., 0.)?;
        assert!((sinusoid.current(10.) - 2.).abs() < 1e-12);

        let shifted = CurrentWaveform::sinusoid(10., 150., 3., 10., 2., PI / 2.)?;
        assert!((shifted.current(10.) - 5.).abs() < 1e-12);

        Ok(())
    }

    #[test]
    pub fn test_sinusoid_frequency_is_in_hertz() -> Result<(), HodgkinHuxleyError> {
        // a quarter period of 10 Hz is 25 ms
        let sinusoid = CurrentWaveform::sinusoid(0., 200., 3., 10., 2., 0.)?;

        assert!((sinusoid.current(25.) - 5.).abs() < 1e-9);
        assert!((sinusoid.current(75.) + 1.).abs() < 1e-9);
        assert!((sinusoid.current(100.) - 2.).abs() < 1e-9);

        Ok(())
    }

    #[test]
    pub fn test_sinusoid_is_zero_outside_interval() -> Result<(), HodgkinHuxleyError> {
        let sinusoid = CurrentWaveform::sinusoid(10., 150., 3., 10., 2., 1.)?;

        assert_eq!(sinusoid.current(5.), 0.);
        assert_eq!(sinusoid.current(151.), 0.);

        Ok(())
    }

    #[test]
    pub fn test_zero_waveform() {
        let zero = CurrentWaveform::zero();

        assert_eq!(zero.kind(), WaveformKind::Zero);
        assert!((0..100).all(|i| zero.current(i as f64) == 0.));
    }

    #[test]
    pub fn test_inverted_interval_rejected() {
        assert!(matches!(
            CurrentWaveform::step(50., 10., 7.),
            Err(ParameterError::InvalidRange { .. })
        ));
        assert!(matches!(
            CurrentWaveform::ramp(-1., 10., 0., 1.),
            Err(ParameterError::InvalidRange { .. })
        ));
        assert!(matches!(
            CurrentWaveform::sinusoid(0., 10., f64::NAN, 10., 0., 0.),
            Err(ParameterError::InvalidRange { .. })
        ));
    }

    #[test]
    pub fn test_end_time_past_duration_is_allowed() -> Result<(), HodgkinHuxleyError> {
        let step = CurrentWaveform::step(10., 1000., 7.)?;

        assert_eq!(step.current(500.), 7.);

        Ok(())
    }

    #[test]
    pub fn test_waveform_deserializes_from_tagged_json() {
        let waveform: CurrentWaveform = serde_json::from_str(
            r#"{"kind": "step", "t_start": 1.0, "t_end": 2.0, "amplitude": 3.0}"#
        ).unwrap();

        assert_eq!(waveform, CurrentWaveform::Step { t_start: 1., t_end: 2., amplitude: 3. });
    }
}
