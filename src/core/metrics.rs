use crate::domain::model::{Compass, ForecastRow};

const ENERGY_FACTOR: f64 = 125.0;

/// Rounds to `decimals` places, sending exact ties to the even neighbour (1.25 -> 1.2).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

pub fn wave_energy(height: f64, period: f64) -> f64 {
    round_to(ENERGY_FACTOR * height.powi(2) * period, 0)
}

pub fn wave_power_index(height: f64, period: f64) -> f64 {
    round_to(height * period, 2)
}

/// Fills compass points and wave metrics, then rounds the displayed measurements.
///
/// Energy and power index use the unrounded height and period.
pub fn derive(row: &mut ForecastRow) {
    row.wind_compass = row.wind_direction.and_then(Compass::from_degrees);
    row.wave_compass = row.wave_direction.and_then(Compass::from_degrees);

    if let (Some(h), Some(t)) = (row.wave_height, row.wave_period) {
        row.wave_energy = Some(wave_energy(h, t));
        row.wave_power_index = Some(wave_power_index(h, t));
    }

    for value in [
        &mut row.wind_speed,
        &mut row.air_temp,
        &mut row.wave_height,
        &mut row.wave_period,
    ] {
        *value = value.map(|v| round_to(v, 1));
    }
}
