use crate::adapters::open_meteo::OpenMeteoClient;
use crate::core::ConfigProvider;
use crate::utils::error::Result;

/// Lists the resolved settings and every request a run would make, without sending any.
pub fn report<C: ConfigProvider>(config: &C, client: &OpenMeteoClient) -> Result<String> {
    let mut lines = vec![
        format!("Output directory: {}", config.output_path()),
        format!(
            "Window: {}h, concurrency: {}, timeout: {:?}, retries: {}",
            config.window_hours(),
            config.concurrent_requests(),
            config.request_timeout(),
            config.retry_attempts()
        ),
    ];

    for spot in config.spots() {
        lines.push(String::new());
        lines.push(format!("{} -> {}", spot.name, spot.page_file_name()));
        lines.push(format!("  GET {}", client.weather_url(spot)?));
        lines.push(format!("  GET {}", client.marine_url(spot)?));
    }
    if config.write_index() {
        lines.push(String::new());
        lines.push(format!("Index -> {}", crate::core::render::INDEX_FILE_NAME));
    }

    Ok(lines.join("\n"))
}
