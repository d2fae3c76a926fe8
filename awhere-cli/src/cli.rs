use anyhow::{Context, Result};
use awhere_core::{
    Attribute, Credentials, CredentialsFile, Dataset, QueryOptions, WeatherClient, WeatherStation,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use inquire::{Password, Text};
use serde_json::Value;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "awhere", version, about = "aWhere weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API credentials in the credentials file.
    Configure,

    /// Show daily weather for a location.
    Show {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show daily weather for a named station.
    Station {
        /// Station name, used for display only.
        name: String,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[command(flatten)]
        query: QueryArgs,
    },
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// First day (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    start_date: Option<NaiveDate>,

    #[arg(long)]
    end_date: Option<NaiveDate>,

    #[arg(long)]
    plant_date: Option<NaiveDate>,

    /// Weather attribute to include; repeat for several.
    #[arg(long = "attribute", value_name = "NAME")]
    attributes: Vec<String>,

    /// Temperature units, e.g. "celsius" or "fahrenheit".
    #[arg(long)]
    units: Option<String>,

    #[arg(long)]
    gdd_method: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    base_temp: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    max_temp_cap: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    min_temp_cap: Option<f64>,

    /// Consumer key; the credentials file is used unless both key and secret are given.
    #[arg(long, requires = "secret")]
    key: Option<String>,

    /// Consumer secret. Ends up in shell history; prefer `awhere configure`.
    #[arg(long, requires = "key")]
    secret: Option<String>,
}

impl QueryArgs {
    fn options(&self) -> Result<QueryOptions> {
        let attribute = if self.attributes.is_empty() {
            None
        } else {
            let parsed = self
                .attributes
                .iter()
                .map(|a| Attribute::try_from(a.as_str()))
                .collect::<Result<Vec<_>, _>>()?;
            Some(parsed)
        };

        let day = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string());

        Ok(QueryOptions {
            attribute,
            end_date: day(self.end_date),
            plant_date: day(self.plant_date),
            temperature_units: self.units.clone(),
            gdd_method: self.gdd_method.clone(),
            base_temp: self.base_temp,
            max_temp_cap: self.max_temp_cap,
            min_temp_cap: self.min_temp_cap,
        })
    }

    fn connect(&self) -> Result<WeatherClient> {
        WeatherClient::connect(self.key.as_deref(), self.secret.as_deref()).context(
            "Failed to authorize with the aWhere API.\nHint: run `awhere configure` first.",
        )
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, query } => {
                let options = query.options()?;
                let mut client = query.connect()?;

                client
                    .request(lat, lon, query.start_date, &options)
                    .context("Weather request failed")?;

                print!("{}", format_dataset(client.data()));
                Ok(())
            }
            Command::Station {
                name,
                lat,
                lon,
                query,
            } => {
                let options = query.options()?;
                let mut station = WeatherStation::new(name, lat, lon, query.connect()?);

                station
                    .request(query.start_date, &options)
                    .context("Weather request failed")?;

                println!("{} ({}, {})", station.name(), station.latitude(), station.longitude());
                print!("{}", format_dataset(station.data()));
                Ok(())
            }
        }
    }
}

fn configure() -> Result<()> {
    let key = Text::new("Consumer key:")
        .prompt()
        .context("Failed to read consumer key")?;
    let secret = Password::new("Consumer secret:")
        .without_confirmation()
        .prompt()
        .context("Failed to read consumer secret")?;

    let credentials = Credentials::new(key.trim(), secret.trim());
    let path = CredentialsFile::from(&credentials)
        .save()
        .context("Failed to save credentials")?;

    println!("Credentials saved to {}", path.display());
    Ok(())
}

/// One line per day: the date, then `name=value` for each attribute.
fn format_dataset(data: Option<&Dataset>) -> String {
    let Some(data) = data.filter(|d| !d.is_empty()) else {
        return "No data returned.\n".to_string();
    };

    let mut out = String::new();
    for (date, attributes) in data {
        let values = match attributes {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" "),
            other => other.to_string(),
        };
        out.push_str(&format!("{}  {values}\n", date.format("%Y-%m-%d")));
    }
    out
}
