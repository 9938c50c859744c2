#[cfg(test)]
mod tests {
    use hodgkin_huxley_dashboard::{
        current::WaveformKind,
        dashboard::{Dashboard, Update},
        error::{HodgkinHuxleyError, ParameterError},
    };


    #[test]
    pub fn test_first_update_draws_three_panels() -> Result<(), HodgkinHuxleyError> {
        let mut dashboard = Dashboard::from_default_tables()?;
        assert!(dashboard.figure().is_none());

        assert_eq!(dashboard.update(), Update::Redrawn);

        let figure = dashboard.figure().unwrap();
        let names: Vec<&str> = figure.traces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["V", "spikes", "h", "n", "m", "I"]);
        assert!(figure.traces.iter().all(|i| (1..=3).contains(&i.panel)));
        assert!(figure.traces.iter().all(|i| i.x.len() == i.y.len()));
        assert!(figure.summary.num_spikes > 0);

        Ok(())
    }

    #[test]
    pub fn test_missing_capacitance_keeps_previous_figure() -> Result<(), HodgkinHuxleyError> {
        let mut dashboard = Dashboard::from_default_tables()?;
        dashboard.update();
        let before = dashboard.figure().cloned();

        let update = dashboard.edit_parameter("C", None);

        assert_eq!(update, Update::Blocked(ParameterError::MissingParameter(String::from("C"))));
        assert_eq!(dashboard.figure().cloned(), before);

        assert_eq!(dashboard.edit_parameter("C", Some(0.01)), Update::Redrawn);

        Ok(())
    }

    #[test]
    pub fn test_blocked_before_first_draw_leaves_no_figure() -> Result<(), HodgkinHuxleyError> {
        let mut dashboard = Dashboard::from_default_tables()?;

        let update = dashboard.edit_current("end time", None);

        assert_eq!(update, Update::Blocked(ParameterError::MissingParameter(String::from("end time"))));
        assert!(dashboard.figure().is_none());

        Ok(())
    }

    #[test]
    pub fn test_selecting_kind_changes_visible_rows_and_current() -> Result<(), HodgkinHuxleyError> {
        let mut dashboard = Dashboard::from_default_tables()?;
        dashboard.update();

        assert_eq!(dashboard.select_kind(WaveformKind::Ramp), Update::Redrawn);
        assert_eq!(dashboard.visible_currents().rows.len(), 4);

        let figure = dashboard.figure().unwrap();
        let current = figure.traces.iter().find(|i| i.name == "I").unwrap();
        let peak = current.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!((peak - 7.).abs() < 0.01);

        Ok(())
    }

    #[test]
    pub fn test_editing_one_kind_leaves_other_kinds_alone() -> Result<(), HodgkinHuxleyError> {
        let mut dashboard = Dashboard::from_default_tables()?;

        dashboard.select_kind(WaveformKind::Sinusoid);
        dashboard.edit_current("amplitude", Some(1.));

        assert_eq!(dashboard.currents.values(WaveformKind::Sinusoid).get("amplitude"), Some(1.));
        assert_eq!(dashboard.currents.values(WaveformKind::Step).get("amplitude"), Some(7.));

        Ok(())
    }

    #[test]
    pub fn test_identical_inputs_draw_identical_figures() -> Result<(), HodgkinHuxleyError> {
        let mut dashboard = Dashboard::from_default_tables()?;

        dashboard.update();
        let first = dashboard.figure().cloned();
        dashboard.update();

        assert_eq!(dashboard.figure().cloned(), first);

        Ok(())
    }
}
