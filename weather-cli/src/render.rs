use chrono::{DateTime, FixedOffset, Utc};
use weather_core::{DisplayRow, WeatherError, WeatherModel, WeatherPresenter};

/// Print the observation header, the nine rows and the local times.
/// Prints nothing until the presenter holds a model.
pub fn print_observation(presenter: &WeatherPresenter) {
    let Some(model) = presenter.current_model() else {
        return;
    };

    println!(
        "{}, {} ({})",
        model.city_name,
        model.sys.country_code,
        presenter.selected_unit()
    );

    for (index, row) in presenter.display_rows().iter().enumerate() {
        println!("{}", format_row(index, row));
    }

    println!("{}", format_times(&model));
}

pub fn print_error(err: &WeatherError) {
    eprintln!("Failed to fetch weather data: {err}");
}

fn format_row(index: usize, row: &DisplayRow) -> String {
    match row {
        DisplayRow::Text(text) => format!("{index:>2}  {text}"),
        DisplayRow::Icon(code) => format!("{index:>2}  [icon {code}]"),
        DisplayRow::Blank => format!("{index:>2}"),
    }
}

fn format_times(model: &WeatherModel) -> String {
    let offset = model.local_offset();
    format!(
        "Observed {} | Sunrise {} | Sunset {}",
        local_time(model.observed_at(), offset),
        local_time(model.sunrise(), offset),
        local_time(model.sunset(), offset),
    )
}

fn local_time(time: Option<DateTime<Utc>>, offset: Option<FixedOffset>) -> String {
    match (time, offset) {
        (Some(time), Some(offset)) => time.with_timezone(&offset).format("%H:%M").to_string(),
        (Some(time), None) => time.format("%H:%M UTC").to_string(),
        (None, _) => "-".to_string(),
    }
}
