use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A surf spot to forecast, with an optional webcam embed shown above the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub webcam: Option<String>,
}

impl Spot {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            webcam: None,
        }
    }

    pub fn with_webcam(mut self, embed: impl Into<String>) -> Self {
        self.webcam = Some(embed.into());
        self
    }

    /// File stem of the spot's page: lower-cased, spaces become underscores.
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "_")
    }

    pub fn page_file_name(&self) -> String {
        format!("{}.html", self.slug())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSample {
    pub time: NaiveDateTime,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub air_temp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarineSample {
    pub time: NaiveDateTime,
    pub wave_height: Option<f64>,
    pub wave_direction: Option<f64>,
    pub wave_period: Option<f64>,
}

/// Raw hourly series for one spot. Times are the spot's local wall-clock time.
#[derive(Debug, Clone)]
pub struct SpotObservations {
    pub spot: Spot,
    pub utc_offset_seconds: i32,
    pub weather: Vec<WeatherSample>,
    pub marine: Vec<MarineSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compass {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Compass {
    const POINTS: [Compass; 8] = [
        Compass::N,
        Compass::NE,
        Compass::E,
        Compass::SE,
        Compass::S,
        Compass::SW,
        Compass::W,
        Compass::NW,
    ];

    /// Nearest of the eight principal points, each covering a 45° sector centred on it.
    pub fn from_degrees(degrees: f64) -> Option<Self> {
        if !degrees.is_finite() {
            return None;
        }
        let sector = ((degrees + 22.5) / 45.0).floor() as i64;
        Some(Self::POINTS[sector.rem_euclid(8) as usize])
    }

    /// Arrow pointing the way the wind or swell travels, i.e. away from `self`.
    pub fn arrow(self) -> &'static str {
        match self {
            Compass::N => "↓",
            Compass::NE => "↙",
            Compass::E => "←",
            Compass::SE => "↖",
            Compass::S => "↑",
            Compass::SW => "↗",
            Compass::W => "→",
            Compass::NW => "↘",
        }
    }
}

/// One hour of merged weather and marine data plus derived metrics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastRow {
    pub time: NaiveDateTime,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_compass: Option<Compass>,
    pub air_temp: Option<f64>,
    pub wave_height: Option<f64>,
    pub wave_direction: Option<f64>,
    pub wave_compass: Option<Compass>,
    pub wave_period: Option<f64>,
    pub wave_power_index: Option<f64>,
    pub wave_energy: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SpotForecast {
    pub spot: Spot,
    pub rows: Vec<ForecastRow>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub forecasts: Vec<SpotForecast>,
}

/// Outcome of writing pages: files whose content changed and files left as they were.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub output_path: String,
    pub written: Vec<String>,
    pub unchanged: Vec<String>,
}

impl LoadSummary {
    pub fn has_changes(&self) -> bool {
        !self.written.is_empty()
    }
}
