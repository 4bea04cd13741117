//! Region boundary providers (GeoJSON over HTTP or from disk).

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::info;

use crate::data::{GeometryProvider, GeometryRequest};
use crate::domain::RegionGeometry;
use crate::error::ProviderError;
use crate::io::geojson::parse_feature_collection;

const PROVIDER: &str = "geometry provider";

/// Property names used to pull the join key and display name out of features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFields {
    pub join_key: String,
    pub name: String,
}

impl Default for FeatureFields {
    fn default() -> Self {
        Self {
            join_key: "STUSPS".to_string(),
            name: "NAME".to_string(),
        }
    }
}

/// Fetches a GeoJSON `FeatureCollection` from a URL template.
///
/// `{resolution}` and `{kind}` in the template are replaced from the request,
/// e.g. `https://host/boundaries/{kind}_state_{resolution}.json`.
pub struct GeoJsonUrlProvider {
    client: Client,
    url_template: String,
    fields: FeatureFields,
}

impl GeoJsonUrlProvider {
    pub fn new(url_template: impl Into<String>, fields: FeatureFields, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable {
                provider: PROVIDER,
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            url_template: url_template.into(),
            fields,
        })
    }

    fn resolve_url(&self, request: &GeometryRequest) -> String {
        self.url_template
            .replace("{resolution}", request.resolution.as_str())
            .replace("{kind}", request.kind())
    }
}

impl GeometryProvider for GeoJsonUrlProvider {
    fn fetch_geometries(&self, request: &GeometryRequest) -> Result<Vec<RegionGeometry>, ProviderError> {
        let url = self.resolve_url(request);
        info!(%url, "fetching region geometries");

        let resp = self.client.get(&url).send().map_err(|e| ProviderError::Unavailable {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: resp.status().as_u16(),
            });
        }

        let body: Value = resp
            .json()
            .map_err(|e| ProviderError::malformed(PROVIDER, format!("failed to parse GeoJSON: {e}")))?;

        parse_feature_collection(&body, &self.fields.join_key, &self.fields.name)
    }
}

/// Reads a GeoJSON `FeatureCollection` from disk; request flags are ignored.
#[derive(Debug, Clone)]
pub struct GeoJsonFileProvider {
    path: PathBuf,
    fields: FeatureFields,
}

impl GeoJsonFileProvider {
    pub fn new(path: impl Into<PathBuf>, fields: FeatureFields) -> Self {
        Self {
            path: path.into(),
            fields,
        }
    }
}

impl GeometryProvider for GeoJsonFileProvider {
    fn fetch_geometries(&self, _request: &GeometryRequest) -> Result<Vec<RegionGeometry>, ProviderError> {
        let file = File::open(&self.path).map_err(|source| ProviderError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let body: Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ProviderError::malformed(PROVIDER, format!("invalid GeoJSON '{}': {e}", self.path.display())))?;

        parse_feature_collection(&body, &self.fields.join_key, &self.fields.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::domain::Resolution;

    #[test]
    fn url_template_substitutes_request_flags() {
        let provider = GeoJsonUrlProvider::new(
            "https://example.org/{kind}_2016_us_state_{resolution}.json",
            FeatureFields::default(),
            Duration::from_secs(1),
        )
        .unwrap();

        let url = provider.resolve_url(&GeometryRequest {
            resolution: Resolution::R20m,
            cartographic: true,
        });
        assert_eq!(url, "https://example.org/cb_2016_us_state_20m.json");

        let url = provider.resolve_url(&GeometryRequest {
            resolution: Resolution::R500k,
            cartographic: false,
        });
        assert_eq!(url, "https://example.org/tiger_2016_us_state_500k.json");
    }

    #[test]
    fn file_provider_reads_features() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature", "properties": {{"STUSPS": "CA", "NAME": "California"}},
                  "geometry": {{"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}}}}
            ]}}"#
        )
        .unwrap();

        let provider = GeoJsonFileProvider::new(file.path(), FeatureFields::default());
        let geometries = provider
            .fetch_geometries(&GeometryRequest {
                resolution: Resolution::R20m,
                cartographic: true,
            })
            .unwrap();
        assert_eq!(geometries.len(), 1);
        assert_eq!(geometries[0].code, "CA");
        assert_eq!(geometries[0].name, "California");
    }

    #[test]
    fn file_provider_reports_missing_file() {
        let provider = GeoJsonFileProvider::new("/definitely/not/here.geojson", FeatureFields::default());
        let err = provider
            .fetch_geometries(&GeometryRequest {
                resolution: Resolution::R20m,
                cartographic: true,
            })
            .unwrap_err();
        assert!(matches!(err, ProviderError::Io { .. }));
    }
}
