use crate::Mode;
use crate::config::{ConfigError, MappingConfig, PlausibilityConfig, ToleranceRange};
use crate::graph::Edge;
use crate::mapping::CostModel;

use approx::assert_relative_eq;
use ptmap_fixtures::{
    MAPPING_JSON, MAPPING_TOML, PLAUSIBILITY_INCOMPLETE_TOML, PLAUSIBILITY_TOML, UNSUPPORTED_YAML,
    fixture_path,
};

#[test]
fn loads_mapping_toml() {
    let path = fixture_path(MAPPING_TOML);
    let config = MappingConfig::try_from(path.as_path()).expect("config");

    assert_relative_eq!(config.search_radius, 30.0);
    assert_eq!(config.max_candidates, 4);
    assert_eq!(config.max_travel_cost_factor, Some(6.0));
    assert_eq!(config.cost_model, CostModel::Length);

    let filter = config.mode_filter(&"bus".into());
    assert!(filter.admits(&Edge::new("e", "a", "b").with_modes(["car"])));
    assert!(!filter.admits(&Edge::new("e", "a", "b").with_modes(["tram"])));
}

#[test]
fn loads_mapping_json_over_defaults() {
    let path = fixture_path(MAPPING_JSON);
    let config = MappingConfig::try_from(path.as_path()).expect("config");

    assert_relative_eq!(config.search_radius, 50.0);
    assert_relative_eq!(config.search_radius_increment, 25.0);
    assert_eq!(config.cost_model, CostModel::TravelTime);
    assert_eq!(config.max_travel_cost_factor, None);

    // Modes without an assignment travel on their own edges only
    let tram = config.mode_filter(&"tram".into());
    assert_eq!(tram.modes().collect::<Vec<_>>(), vec![&Mode::from("tram")]);
}

#[test]
fn rejects_unknown_formats() {
    let path = fixture_path(UNSUPPORTED_YAML);
    assert!(matches!(
        MappingConfig::try_from(path.as_path()),
        Err(ConfigError::UnsupportedFormat(_))
    ));

    let missing = fixture_path("missing.toml");
    assert!(matches!(
        MappingConfig::try_from(missing.as_path()),
        Err(ConfigError::Read(_, _))
    ));
}

#[test]
fn validates_mapping_values() {
    let config = MappingConfig {
        max_search_radius: 10.0,
        ..MappingConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { field: "max_search_radius", .. })
    ));

    let config = MappingConfig {
        max_travel_cost_factor: Some(0.5),
        ..MappingConfig::default()
    };
    assert!(config.validate().is_err());

    assert!(MappingConfig::default().validate().is_ok());
}

#[test]
fn loads_plausibility_thresholds() {
    let path = fixture_path(PLAUSIBILITY_TOML);
    let config = PlausibilityConfig::try_from(path.as_path()).expect("config");

    assert_eq!(config.loop_window, 6);
    assert_relative_eq!(config.threshold(&"tram".into()).expect("tram"), 60.0);
    assert_eq!(config.travel_time_tolerance, ToleranceRange::new(30.0, 90.0));

    let incomplete = fixture_path(PLAUSIBILITY_INCOMPLETE_TOML);
    let config = PlausibilityConfig::try_from(incomplete.as_path()).expect("config");
    assert_eq!(
        config.threshold(&"bus".into()),
        Err(ConfigError::MissingThreshold("bus".into()))
    );
}

#[test]
fn rejects_thresholds_out_of_range() {
    let config = PlausibilityConfig::default().with_threshold("bus", 190.0);
    assert!(config.validate().is_err());

    let config = PlausibilityConfig::default().with_threshold("bus", 0.0);
    assert!(config.validate().is_err());

    let config = PlausibilityConfig::default()
        .with_threshold("bus", 180.0)
        .with_tolerance(-1.0, 0.0);
    assert!(config.validate().is_err());
}

#[test]
fn tolerance_bounds_are_inclusive() {
    let range = ToleranceRange::new(30.0, 90.0);

    assert!(range.admits(100.0, 70.0));
    assert!(range.admits(100.0, 190.0));
    assert!(!range.admits(100.0, 69.0));
    assert!(!range.admits(100.0, 191.0));

    let strict = ToleranceRange::default();
    assert!(strict.admits(100.0, 100.0));
    assert!(!strict.admits(100.0, 100.5));
}
