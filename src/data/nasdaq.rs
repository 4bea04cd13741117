//! Nasdaq Data Link (formerly Quandl) time-series API.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::data::{SeriesProvider, SeriesRequest};
use crate::domain::{WideRow, WideSeries};
use crate::error::ProviderError;

const PROVIDER: &str = "Nasdaq Data Link";
const BASE_URL: &str = "https://data.nasdaq.com/api/v3";

pub struct NasdaqClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NasdaqClient {
    /// Build a client, reading an optional API key from the environment (`.env`).
    ///
    /// A missing key is not an error: anonymous calls are rate-limited harder.
    pub fn from_env(timeout: Duration) -> Result<Self, ProviderError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("NASDAQ_DATA_LINK_API_KEY")
            .or_else(|_| std::env::var("QUANDL_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(api_key, timeout)
    }

    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable {
                provider: PROVIDER,
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn dataset_url(&self, dataset_code: &str) -> String {
        format!(
            "{}/datasets/{}/data.json",
            self.base_url.trim_end_matches('/'),
            dataset_code.trim_matches('/')
        )
    }
}

impl SeriesProvider for NasdaqClient {
    fn fetch_series(&self, request: &SeriesRequest) -> Result<WideSeries, ProviderError> {
        let url = self.dataset_url(&request.dataset_code);
        let mut req = self.client.get(&url).query(&[("order", request.order.as_str())]);
        if let Some(key) = &self.api_key {
            req = req.query(&[("api_key", key.as_str())]);
        }

        info!(dataset = %request.dataset_code, authenticated = self.api_key.is_some(), "fetching series");

        let resp = req.send().map_err(|e| ProviderError::Unavailable {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: resp.status().as_u16(),
            });
        }

        let body: DatasetDataResponse = resp
            .json()
            .map_err(|e| ProviderError::malformed(PROVIDER, format!("failed to parse response: {e}")))?;

        parse_dataset(body.dataset_data)
    }
}

#[derive(Debug, Deserialize)]
struct DatasetDataResponse {
    dataset_data: DatasetData,
}

#[derive(Debug, Deserialize)]
struct DatasetData {
    column_names: Vec<String>,
    data: Vec<Vec<Value>>,
}

fn parse_dataset(dataset: DatasetData) -> Result<WideSeries, ProviderError> {
    let mut columns = dataset.column_names.into_iter();
    let date_column = columns
        .next()
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "dataset has no columns"))?;
    let regions: Vec<String> = columns.collect();

    let mut rows = Vec::with_capacity(dataset.data.len());
    for (idx, cells) in dataset.data.into_iter().enumerate() {
        let mut cells = cells.into_iter();
        let date = cells
            .next()
            .as_ref()
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::malformed(PROVIDER, format!("row {idx} has no date")))?
            .to_string();
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| ProviderError::malformed(PROVIDER, format!("invalid date '{date}': {e}")))?;

        let values: Vec<Option<f64>> = cells.map(|v| parse_value(&v)).collect();
        if values.len() != regions.len() {
            return Err(ProviderError::malformed(
                PROVIDER,
                format!("row {date} has {} values for {} columns", values.len(), regions.len()),
            ));
        }
        rows.push(WideRow { date, values });
    }

    WideSeries::new(date_column, regions, rows).map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))
}

/// Numbers pass through; `null`, empty and non-numeric cells become `None`.
fn parse_value(raw: &Value) -> Option<f64> {
    let v = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<WideSeries, ProviderError> {
        let body: DatasetDataResponse = serde_json::from_str(json).unwrap();
        parse_dataset(body.dataset_data)
    }

    #[test]
    fn parses_dataset_with_nulls() {
        let series = parse(
            r#"{"dataset_data": {
                "column_names": ["Date", "CA", "TX", "United States seasonally adjusted"],
                "data": [
                    ["2016-03-31", 200.0, 150.5, 180.0],
                    ["2017-03-31", 220.0, null, "n/a"]
                ]
            }}"#,
        )
        .unwrap();

        assert_eq!(series.date_column(), "Date");
        assert_eq!(series.regions().len(), 3);
        assert_eq!(series.rows()[0].values, vec![Some(200.0), Some(150.5), Some(180.0)]);
        assert_eq!(series.rows()[1].values, vec![Some(220.0), None, None]);
    }

    #[test]
    fn rejects_bad_dates_and_ragged_rows() {
        let err = parse(r#"{"dataset_data": {"column_names": ["Date", "CA"], "data": [["31/03/2017", 1.0]]}}"#)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));

        let err = parse(r#"{"dataset_data": {"column_names": ["Date", "CA"], "data": [["2017-03-31"]]}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("0 values for 1 columns"));
    }

    #[test]
    fn dataset_url_keeps_code_path() {
        let client = NasdaqClient::new(None, Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://localhost:9/api/v3/");
        assert_eq!(
            client.dataset_url("FMAC/HPI"),
            "http://localhost:9/api/v3/datasets/FMAC/HPI/data.json"
        );
    }
}
