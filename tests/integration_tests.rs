use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use serde_json::json;
use surf_forecast::core::dry_run;
use surf_forecast::{
    EtlEngine, ForecastError, ForecastPipeline, ForecastSettings, LocalStorage, OpenMeteoClient,
    Spot,
};
use tempfile::TempDir;

fn settings_for(server: &MockServer, output_path: &str, spots: Vec<Spot>) -> ForecastSettings {
    ForecastSettings {
        weather_endpoint: server.url("/v1/forecast"),
        marine_endpoint: server.url("/v1/marine"),
        output_path: output_path.to_string(),
        spots,
        retry_attempts: 0,
        timeout_seconds: 5,
        ..Default::default()
    }
}

async fn mock_spot(server: &MockServer, latitude: &str, wave_height: f64) {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/forecast")
                .query_param("latitude", latitude);
            then.status(200).json_body(json!({
                "latitude": 28.125,
                "longitude": -15.4375,
                "utc_offset_seconds": 3600,
                "timezone": "Atlantic/Canary",
                "hourly": {
                    "time": ["2025-06-01T09:00", "2025-06-01T10:00", "2025-06-01T11:00"],
                    "windspeed_10m": [12.0, 14.4, 15.1],
                    "winddirection_10m": [20.0, 30.0, 35.0],
                    "temperature_2m": [21.5, 22.1, 22.8]
                }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/marine")
                .query_param("latitude", latitude);
            then.status(200).json_body(json!({
                "utc_offset_seconds": 3600,
                "hourly": {
                    "time": ["2025-06-01T10:00", "2025-06-01T11:00", "2025-06-01T12:00"],
                    "wave_height": [wave_height, wave_height, null],
                    "wave_direction": [330.0, 335.0, 340.0],
                    "wave_period": [11.0, 11.5, 12.0]
                }
            }));
        })
        .await;
}

#[tokio::test]
async fn test_end_to_end_forecast_pages() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().join("docs");
    let output_str = output_path.to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    mock_spot(&server, "28.1272", 1.8).await;
    mock_spot(&server, "27.9924", 0.6).await;

    let settings = settings_for(
        &server,
        &output_str,
        vec![
            Spot::new("Las Palmas", 28.1272, -15.4314)
                .with_webcam(r#"<iframe src="https://cams.example/57" scrolling="no"></iframe>"#),
            Spot::new("Telde", 27.9924, -15.4192),
        ],
    );
    let client = OpenMeteoClient::from_config(&settings);
    let storage = LocalStorage::new(&output_path);
    let pipeline = ForecastPipeline::new(storage, settings, client)
        .at(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
    let engine = EtlEngine::new(pipeline);

    let summary = engine.run().await?;
    assert_eq!(
        summary.written,
        vec!["las_palmas.html", "telde.html", "index.html"]
    );

    let page = std::fs::read_to_string(output_path.join("las_palmas.html"))?;
    assert!(page.contains("<title>Surf Forecast Las Palmas</title>"));
    assert!(page.contains(r#"<iframe src="https://cams.example/57" scrolling="no"></iframe>"#));
    // 09:00 local is before the window, 12:00 only has marine data
    assert!(!page.contains("2025-06-01 09:00"));
    assert!(page.contains("<td>2025-06-01 10:00</td>"));
    assert!(page.contains("<td>2025-06-01 12:00</td>\n<td></td>"));
    assert!(page.contains("<td>14.4</td>"));
    // 125 * 1.8² * 11 = 4455
    assert!(page.contains(">4455</td>"));
    assert!(page.contains("<td>19.80</td>"));

    let telde = std::fs::read_to_string(output_path.join("telde.html"))?;
    assert!(!telde.contains("<iframe"));
    assert!(telde.contains(r#"style="background-color: rgb(190,190,255);">0.6</td>"#));

    let index = std::fs::read_to_string(output_path.join("index.html"))?;
    assert!(index.contains(r#"href="telde.html""#));

    let second = engine.run().await?;
    assert!(!second.has_changes());
    assert_eq!(second.unchanged.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_failed_spot_writes_no_pages() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().join("docs");

    let server = MockServer::start_async().await;
    mock_spot(&server, "28.1272", 1.0).await;
    server
        .mock_async(|when, then| {
            when.method(GET).query_param("latitude", "95");
            then.status(400).json_body(json!({
                "error": true,
                "reason": "Latitude must be in range of -90 to 90°. Given: 95.0."
            }));
        })
        .await;

    let settings = settings_for(
        &server,
        output_path.to_str().unwrap(),
        vec![
            Spot::new("Las Palmas", 28.1272, -15.4314),
            Spot::new("Nowhere", 95.0, 0.0),
        ],
    );
    let client = OpenMeteoClient::from_config(&settings);
    let pipeline = ForecastPipeline::new(LocalStorage::new(&output_path), settings, client);
    let engine = EtlEngine::new(pipeline);

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, ForecastError::ForecastApiError { status: 400, .. }));
    assert!(!output_path.exists());

    Ok(())
}

#[tokio::test]
async fn test_dry_run_lists_requests_without_fetching() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().join("docs");

    let server = MockServer::start_async().await;
    let weather_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(200);
        })
        .await;
    let marine_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/marine");
            then.status(200);
        })
        .await;

    let settings = settings_for(
        &server,
        output_path.to_str().unwrap(),
        vec![
            Spot::new("Las Palmas", 28.1272, -15.4314),
            Spot::new("Telde", 27.9924, -15.4192),
        ],
    );
    let client = OpenMeteoClient::from_config(&settings);
    let report = dry_run::report(&settings, &client)?;

    for latitude in ["28.1272", "27.9924"] {
        assert!(report.contains(&format!(
            "GET {}?latitude={}",
            server.url("/v1/forecast"),
            latitude
        )));
        assert!(report.contains(&format!(
            "GET {}?latitude={}",
            server.url("/v1/marine"),
            latitude
        )));
    }
    assert!(report.contains("Las Palmas -> las_palmas.html"));

    weather_mock.assert_hits_async(0).await;
    marine_mock.assert_hits_async(0).await;
    assert!(!output_path.exists());

    Ok(())
}
