use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{
    InquireError, Password, PasswordDisplayMode, Select, Text, error::CustomUserError,
    validator::Validation,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};
use weather_core::{
    Config, DisplayRow, ICON_ROW, IconClient, IconTasks, PresenterEvent, TemperatureUnit,
    WeatherPresenter, fetcher_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for a city")]
pub struct Cli {
    /// OpenWeather API key; overrides the configured one.
    #[arg(long, global = true, env = "WEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,

        /// Temperature unit: c, celsius, f, fahrenheit.
        #[arg(long, short, default_value_t = TemperatureUnit::default())]
        unit: TemperatureUnit,

        /// Print the decoded observation as JSON instead of the list.
        #[arg(long)]
        json: bool,

        /// Save the condition icon to this file.
        #[arg(long, value_name = "PATH")]
        icon: Option<PathBuf>,
    },

    /// Browse the weather list: refresh, toggle units, change city.
    Interactive {
        /// City to start with; prompted for if absent.
        city: Option<String>,

        /// Temperature unit to start with.
        #[arg(long, short, default_value_t = TemperatureUnit::default())]
        unit: TemperatureUnit,

        /// Download the condition icon of each observation into this directory.
        #[arg(long, value_name = "DIR")]
        icon_dir: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, unit, json, icon } => {
                let config = load_config(self.api_key)?;
                show(&config, &city, unit, json, icon.as_deref()).await
            }
            Command::Interactive { city, unit, icon_dir } => {
                let config = load_config(self.api_key)?;
                interactive(&config, city, unit, icon_dir).await
            }
        }
    }
}

fn load_config(api_key: Option<String>) -> anyhow::Result<Config> {
    let config = Config::load()?.with_api_key_override(api_key);
    // Fatal before any request is made.
    config.api_key()?;
    Ok(config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(|input: &str| {
            Ok::<_, CustomUserError>(if input.trim().is_empty() {
                Validation::Invalid("API key is required".into())
            } else {
                Validation::Valid
            })
        })
        .prompt()?;

    config.set_api_key(api_key);
    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn show(
    config: &Config,
    city: &str,
    unit: TemperatureUnit,
    json: bool,
    icon: Option<&Path>,
) -> anyhow::Result<()> {
    let city = city.trim();
    if city.is_empty() {
        bail!("Please enter a city name.");
    }

    let presenter = WeatherPresenter::new(fetcher_from_config(config)?);
    presenter.set_unit(unit);

    presenter
        .refresh(city)
        .await
        .context("Failed to fetch weather data")?;

    let Some(model) = presenter.current_model() else {
        bail!("No weather data for {city}");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&model)?);
    } else {
        render::print_observation(&presenter);
    }

    if let Some(path) = icon {
        let Some(condition) = model.primary_condition() else {
            bail!("{} reported no condition icon", model.city_name);
        };

        let bytes = IconClient::from_config(config)
            .fetch_icon(&condition.icon_code)
            .await
            .context("Failed to fetch condition icon")?;

        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write icon to {}", path.display()))?;
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Refresh,
    ToggleUnit,
    ChangeCity,
    Quit,
}

impl Action {
    fn all() -> Vec<Action> {
        vec![Action::Refresh, Action::ToggleUnit, Action::ChangeCity, Action::Quit]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Refresh => "Refresh",
            Action::ToggleUnit => "Toggle unit",
            Action::ChangeCity => "Change city",
            Action::Quit => "Quit",
        })
    }
}

/// The list screen. Rendering is driven by presenter events.
struct Screen<'a> {
    presenter: WeatherPresenter,
    events: UnboundedReceiver<PresenterEvent>,
    icons: IconClient,
    icon_tasks: IconTasks<usize>,
    icon_dir: Option<&'a Path>,
}

impl Screen<'_> {
    async fn refresh(&mut self, city: &str) {
        println!("Loading weather for {city}...");
        // Outcome arrives through the event channel.
        let _ = self.presenter.refresh(city).await;
        self.drain_events();
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                PresenterEvent::DataUpdated => {
                    render::print_observation(&self.presenter);
                    self.load_icon();
                }
                PresenterEvent::Error(err) => render::print_error(&err),
            }
        }
    }

    fn toggle_unit(&self) {
        let unit = self.presenter.toggle_unit();
        println!("Showing temperatures in {unit}");
        render::print_observation(&self.presenter);
    }

    fn load_icon(&mut self) {
        let Some(dir) = self.icon_dir else {
            return;
        };

        let rows = self.presenter.display_rows();
        let Some(DisplayRow::Icon(code)) = rows.get(ICON_ROW) else {
            self.icon_tasks.cancel(&ICON_ROW);
            return;
        };

        let code = code.clone();
        let path = dir.join(format!("{code}.png"));
        let icons = self.icons.clone();

        let task = tokio::spawn(async move {
            match icons.fetch_icon(&code).await {
                Ok(bytes) => match tokio::fs::write(&path, bytes).await {
                    Ok(()) => debug!(path = %path.display(), "icon saved"),
                    Err(err) => warn!(path = %path.display(), error = %err, "failed to save icon"),
                },
                Err(err) => warn!(code = %code, error = %err, "icon download failed"),
            }
        });
        self.icon_tasks.track(ICON_ROW, &task);
    }
}

async fn interactive(
    config: &Config,
    city: Option<String>,
    unit: TemperatureUnit,
    icon_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(dir) = &icon_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create icon directory {}", dir.display()))?;
    }

    let presenter = WeatherPresenter::new(fetcher_from_config(config)?);
    presenter.set_unit(unit);
    let events = presenter.subscribe();

    let mut screen = Screen {
        presenter,
        events,
        icons: IconClient::from_config(config),
        icon_tasks: IconTasks::new(),
        icon_dir: icon_dir.as_deref(),
    };

    let mut city = match city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) {
        Some(city) => city,
        None => match prompt_city()? {
            Some(city) => city,
            None => return Ok(()),
        },
    };
    screen.refresh(&city).await;

    loop {
        let action = match Select::new("What next?", Action::all()).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match action {
            Action::Refresh => screen.refresh(&city).await,
            Action::ToggleUnit => screen.toggle_unit(),
            Action::ChangeCity => {
                if let Some(next) = prompt_city()? {
                    city = next;
                    screen.refresh(&city).await;
                }
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

/// Ask until a non-empty city is entered. `None` when the user backs out.
fn prompt_city() -> anyhow::Result<Option<String>> {
    loop {
        match Text::new("City name:").prompt() {
            Ok(input) if !input.trim().is_empty() => return Ok(Some(input.trim().to_string())),
            Ok(_) => eprintln!("Please enter a city name."),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }
    }
}
