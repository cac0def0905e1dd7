use figspec::{
    Color, GlobalPlotSettings, GridAxis, LegendLocation, LineStyle, PlotError, Scale, preset, preset_names,
};
use proptest::prelude::*;

fn settings_strategy() -> impl Strategy<Value = GlobalPlotSettings> {
    (
        (
            "[A-Za-z0-9 ()]{0,24}",
            "[A-Za-z ]{0,12}",
            1.0f64..20.0,
            prop::option::of(0.5f64..3.0),
            50u32..600,
        ),
        (
            4.0f64..30.0,
            prop::option::of(4.0f64..30.0),
            0.0f64..=1.0,
            any::<bool>(),
            prop::sample::select(LegendLocation::ALL),
        ),
        (
            prop::sample::select(LineStyle::ALL),
            prop::sample::select(GridAxis::ALL),
            prop::option::of((-100.0f64..0.0, 1.0f64..100.0)),
            any::<(u8, u8, u8)>(),
            prop::option::of(prop::sample::select(vec!["en", "de", "fr"])),
        ),
    )
        .prop_map(
            |(
                (title, x_label, width, aspect, dpi),
                (tick, x_tick, grid_alpha, show_grid, loc),
                (grid_style, grid_axis, ylim, (r, g, b), locale),
            )| {
                let mut b = GlobalPlotSettings::builder()
                    .title(title)
                    .x_label(x_label)
                    .figure_width(width)
                    .dpi(dpi)
                    .tick_label_size(tick)
                    .grid_alpha(grid_alpha)
                    .show_grid(show_grid)
                    .legend_location(loc)
                    .grid_style(grid_style)
                    .grid_axis(grid_axis)
                    .title_color(Color::rgb(r, g, b));
                if let Some(a) = aspect {
                    b = b.aspect_ratio(a);
                }
                if let Some(s) = x_tick {
                    b = b.x_tick_label_size(s);
                }
                if let Some(lim) = ylim {
                    b = b.y_limits(lim);
                }
                if let Some(l) = locale {
                    b = b.number_locale(l);
                }
                b.build().unwrap()
            },
        )
}

proptest! {
    #[test]
    fn yaml_round_trip_preserves_every_field(s in settings_strategy()) {
        let text = s.to_yaml_string().unwrap();
        let back = GlobalPlotSettings::from_yaml_str(&text).unwrap();
        prop_assert_eq!(back, s);
    }

    #[test]
    fn json_round_trip_preserves_every_field(s in settings_strategy()) {
        let text = s.to_json_string().unwrap();
        let back = GlobalPlotSettings::from_json_str(&text).unwrap();
        prop_assert_eq!(back, s);
    }

    #[test]
    fn aspect_ratio_wins_over_height(width in 1.0f64..20.0, ratio in 0.25f64..4.0, height in 1.0f64..20.0) {
        let s = GlobalPlotSettings::builder()
            .figure_width(width)
            .figure_height(height)
            .aspect_ratio(ratio)
            .build()
            .unwrap();
        prop_assert!((s.figure_height - width / ratio).abs() < 1e-12);
    }
}

#[test]
fn files_round_trip_through_nested_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let s = GlobalPlotSettings::builder()
        .title("Load")
        .y_scale(Scale::Log)
        .build()
        .unwrap();

    let yaml = dir.path().join("cfg/a/settings.yaml");
    s.save_yaml(&yaml).unwrap();
    assert_eq!(GlobalPlotSettings::load_yaml(&yaml).unwrap(), s);

    let json = dir.path().join("cfg/b/settings.json");
    s.save_json(&json).unwrap();
    assert_eq!(GlobalPlotSettings::load_json(&json).unwrap(), s);
}

#[test]
fn partial_yaml_takes_defaults() {
    let s = GlobalPlotSettings::from_yaml_str("figure_width: 4.0\ntick_label_size: 7\nno_such_key: 1\n").unwrap();
    assert_eq!(s.figure_width, 4.0);
    assert_eq!(s.figure_height, 6.0);
    assert_eq!(s.x_tick_label_size, 7.0);
    assert_eq!(s.y_tick_label_size, 7.0);
    assert!(!s.created.is_empty());
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let err = GlobalPlotSettings::from_yaml_str("grid_alpha: 1.5\n").unwrap_err();
    assert!(matches!(err, PlotError::InvalidSetting { ref field, .. } if field == "grid_alpha"));
}

#[test]
fn presets_hand_out_independent_copies() {
    let mut a = preset("publication").unwrap();
    let b = preset("publication").unwrap();
    a.title = "changed".into();
    a.figure_width = 99.0;
    assert_eq!(b, preset("publication").unwrap());
    assert_ne!(a, b);
}

#[test]
fn every_listed_preset_loads() {
    let names = preset_names();
    assert!(names.contains(&"nature_style"));
    for name in names {
        preset(name).unwrap().validate().unwrap();
    }
}

#[test]
fn unknown_preset_lists_the_choices() {
    let err = preset("poster").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("poster"));
    assert!(msg.contains("presentation"));
}
