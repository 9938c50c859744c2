#[cfg(test)]
mod tests {
    use hodgkin_huxley_dashboard::{
        current::{CurrentWaveform, WaveformKind},
        error::{HodgkinHuxleyError, ParameterError, TableError},
        parameters::{
            build_waveform, default_tables, read_tables, ParameterMap, ParameterSet, PARAMETER_NAMES,
        },
    };


    fn names(kind: WaveformKind) -> Result<Vec<String>, TableError> {
        let (_, currents) = default_tables()?;

        Ok(currents.filter(kind).rows.into_iter().map(|i| i.parameter).collect())
    }

    #[test]
    pub fn test_default_tables_hold_reference_values() -> Result<(), HodgkinHuxleyError> {
        let (parameters, _) = default_tables()?;

        let found: Vec<&str> = parameters.rows.iter().map(|i| i.parameter.as_str()).collect();
        assert_eq!(found, PARAMETER_NAMES.to_vec());
        assert_eq!(ParameterSet::from_table(&parameters)?, ParameterSet::default());

        Ok(())
    }

    #[test]
    pub fn test_kind_filtering_selects_rows() -> Result<(), HodgkinHuxleyError> {
        assert_eq!(names(WaveformKind::Step)?, vec!["start time", "end time", "amplitude"]);
        assert_eq!(
            names(WaveformKind::Ramp)?,
            vec!["start time", "end time", "amplitude start", "amplitude end"]
        );
        assert_eq!(
            names(WaveformKind::Sinusoid)?,
            vec!["start time", "end time", "frequency", "direct current", "phase offset", "amplitude"]
        );

        Ok(())
    }

    #[test]
    pub fn test_shared_names_resolve_per_kind() -> Result<(), HodgkinHuxleyError> {
        let (_, currents) = default_tables()?;

        assert_eq!(currents.values(WaveformKind::Step).get("amplitude"), Some(7.));
        assert_eq!(currents.values(WaveformKind::Sinusoid).get("amplitude"), Some(3.));
        assert_eq!(currents.values(WaveformKind::Ramp).get("amplitude"), None);

        Ok(())
    }

    #[test]
    pub fn test_blank_and_non_numeric_values_are_absent() -> Result<(), HodgkinHuxleyError> {
        let table = "category,parameter,unit,value,step,ramp,sin\n\
            par,El,mV,,,,\n\
            par,Ek,mV,abc,,,\n\
            par,Ena,mV, 45 ,,,\n\
            cur,amplitude,uA,,true,0,0\n";
        let (parameters, currents) = read_tables(table.as_bytes())?;

        let values = parameters.values();
        assert_eq!(values.get("El"), None);
        assert_eq!(values.get("Ek"), None);
        assert_eq!(values.get("Ena"), Some(45.));
        assert_eq!(values.get("not a parameter"), None);

        assert_eq!(currents.filter(WaveformKind::Step).rows.len(), 1);
        assert_eq!(currents.values(WaveformKind::Step).get("amplitude"), None);

        Ok(())
    }

    #[test]
    pub fn test_unknown_category_rejected() {
        let table = "category,parameter,unit,value,step,ramp,sin\nxyz,El,mV,-59,,,\n";

        assert!(matches!(read_tables(table.as_bytes()), Err(TableError::UnknownCategory(_))));
    }

    #[test]
    pub fn test_missing_capacitance_reported_by_name() -> Result<(), HodgkinHuxleyError> {
        let (mut parameters, _) = default_tables()?;
        parameters.set("C", None);

        assert_eq!(
            ParameterSet::from_table(&parameters),
            Err(ParameterError::MissingParameter(String::from("C")))
        );

        Ok(())
    }

    #[test]
    pub fn test_waveform_built_from_table_values() -> Result<(), HodgkinHuxleyError> {
        let (_, currents) = default_tables()?;

        assert_eq!(
            build_waveform(WaveformKind::Step, &currents.values(WaveformKind::Step))?,
            CurrentWaveform::step(10., 150., 7.)?
        );
        assert_eq!(
            build_waveform(WaveformKind::Ramp, &currents.values(WaveformKind::Ramp))?,
            CurrentWaveform::ramp(10., 150., 2., 7.)?
        );
        assert_eq!(
            build_waveform(WaveformKind::Sinusoid, &currents.values(WaveformKind::Sinusoid))?,
            CurrentWaveform::sinusoid(10., 150., 3., 10., 2., 0.)?
        );

        Ok(())
    }

    #[test]
    pub fn test_missing_current_value_blocks_waveform() {
        let mut values = ParameterMap::default();
        values.insert("start time", 10.);
        values.insert("amplitude", 7.);

        assert_eq!(
            build_waveform(WaveformKind::Step, &values),
            Err(ParameterError::MissingParameter(String::from("end time")))
        );
    }

    #[test]
    pub fn test_inverted_times_block_waveform() {
        let mut values = ParameterMap::default();
        values.insert("start time", 60.);
        values.insert("end time", 10.);
        values.insert("amplitude", 7.);

        assert!(matches!(
            build_waveform(WaveformKind::Step, &values),
            Err(ParameterError::InvalidRange { .. })
        ));
    }
}
