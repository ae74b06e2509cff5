use crate::domain::model::{Compass, ForecastRow, Spot, SpotForecast};
use crate::utils::error::Result;
use askama::Template;

pub const INDEX_FILE_NAME: &str = "index.html";

const ARROW_STYLE: &str = "color: #33cccc; font-weight: bold";

const TABLE_HEADERS: [&str; 9] = [
    "Time",
    "Wind Speed (m/s)",
    "Wind Arrow",
    "Air Temp (°C)",
    "Wave Height (m)",
    "Wave Arrow",
    "Wave Period (s)",
    "Wave Power Index",
    "Wave Energy (kJ/m²)",
];

/// Table row with every cell already formatted for display.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub time: String,
    pub wind_speed: String,
    pub wind_arrow: &'static str,
    pub air_temp: String,
    pub wave_height: String,
    pub wave_height_style: String,
    pub wave_arrow: &'static str,
    pub wave_period: String,
    pub wave_power_index: String,
    pub wave_energy: String,
    pub wave_energy_style: String,
}

impl From<&ForecastRow> for TableRow {
    fn from(row: &ForecastRow) -> Self {
        Self {
            time: row.time.format("%Y-%m-%d %H:%M").to_string(),
            wind_speed: format_value(row.wind_speed, 1),
            wind_arrow: row.wind_compass.map(Compass::arrow).unwrap_or(""),
            air_temp: format_value(row.air_temp, 1),
            wave_height: format_value(row.wave_height, 1),
            wave_height_style: row.wave_height.map(wave_height_style).unwrap_or_default(),
            wave_arrow: row.wave_compass.map(Compass::arrow).unwrap_or(""),
            wave_period: format_value(row.wave_period, 1),
            wave_power_index: format_value(row.wave_power_index, 2),
            wave_energy: format_value(row.wave_energy, 0),
            wave_energy_style: row.wave_energy.map(wave_energy_style).unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "spot.html")]
pub struct SpotPage {
    pub name: String,
    pub webcam: Option<String>,
    pub headers: &'static [&'static str],
    pub arrow_style: &'static str,
    pub rows: Vec<TableRow>,
}

impl SpotPage {
    pub fn new(forecast: &SpotForecast) -> Self {
        Self {
            name: forecast.spot.name.clone(),
            webcam: forecast.spot.webcam.clone(),
            headers: &TABLE_HEADERS,
            arrow_style: ARROW_STYLE,
            rows: forecast.rows.iter().map(TableRow::from).collect(),
        }
    }
}

pub struct IndexEntry {
    pub name: String,
    pub file_name: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub pages: Vec<IndexEntry>,
}

impl IndexPage {
    pub fn new(spots: &[Spot]) -> Self {
        Self {
            pages: spots
                .iter()
                .map(|spot| IndexEntry {
                    name: spot.name.clone(),
                    file_name: spot.page_file_name(),
                })
                .collect(),
        }
    }
}

pub fn render_spot_page(forecast: &SpotForecast) -> Result<String> {
    Ok(SpotPage::new(forecast).render()?)
}

pub fn render_index(spots: &[Spot]) -> Result<String> {
    Ok(IndexPage::new(spots).render()?)
}

fn format_value(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_default()
}

/// Bluer as the waves get bigger, saturating at 4 m.
pub fn wave_height_style(height: f64) -> String {
    let c = (220.0 - (height * 50.0).min(200.0)).trunc() as i64;
    format!("background-color: rgb({},{},255);", c, c)
}

/// Redder with more energy, saturating at 800 kJ/m².
pub fn wave_energy_style(energy: f64) -> String {
    let c = (220.0 - (energy / 4.0).min(200.0)).trunc() as i64;
    format!("background-color: rgb(255,{},150);", c)
}
