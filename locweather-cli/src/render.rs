use locweather_core::{
    Config, DisplayFields, SnapshotStore, UnitSystem,
    display::{region_from_locale, unit_label_matches},
    to_display_fields,
};

/// Region for the unit label: config first, then the process locale.
pub fn region(config: &Config) -> String {
    if let Some(region) = config.region.as_deref().filter(|r| !r.trim().is_empty()) {
        return region.trim().to_string();
    }

    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|locale| region_from_locale(&locale))
        .unwrap_or_default()
}

pub fn print_stored(store: &SnapshotStore, region: &str, requested: Option<UnitSystem>) {
    let Some(snapshot) = store.load() else {
        println!("No weather stored yet. Run `locweather refresh`.");
        return;
    };

    let fields = to_display_fields(&snapshot, region);

    if let Some(units) = requested.filter(|u| !unit_label_matches(*u, fields.unit_label)) {
        tracing::warn!(
            "requested {units} units but region '{region}' labels temperatures as {}",
            fields.unit_label
        );
    }

    println!("{}", format_fields(&fields));
}

pub fn format_fields(fields: &DisplayFields) -> String {
    let icon = fields
        .icon
        .map(|i| format!("{} ", i.glyph()))
        .unwrap_or_default();

    [
        format!("{}, {}", fields.location_name, fields.country),
        format!("{icon}{} ({})", fields.main, fields.description),
        format!("Temperature  {}", fields.temperature),
        format!("Range        {} / {}", fields.min, fields.max),
        format!("Humidity     {}", fields.humidity),
        format!("Wind         {}", fields.wind_speed),
        format!("Sunrise      {}", fields.sunrise),
        format!("Sunset       {}", fields.sunset),
    ]
    .join("\n")
}
