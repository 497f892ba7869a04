//! Pure URL builders for provider-hosted images

use crate::models::Coordinate;

use super::GatewayError;

pub const DEFAULT_PHOTO_MAX_WIDTH: u32 = 400;
pub const DEFAULT_STATIC_MAP_WIDTH: u32 = 600;
pub const DEFAULT_STATIC_MAP_HEIGHT: u32 = 300;

/// Builds photo and static map URLs; no network access
#[derive(Debug, Clone)]
pub struct MapUrls {
    base_url: String,
    api_key: Option<String>,
}

impl MapUrls {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    fn key(&self) -> Result<&str, GatewayError> {
        self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)
    }

    /// URL of a place photo scaled to `max_width`
    pub fn photo_url(&self, photo_reference: &str, max_width: u32) -> Result<String, GatewayError> {
        let key = self.key()?;
        Ok(format!(
            "{}/place/photo?maxwidth={}&photoreference={}&key={}",
            self.base_url,
            max_width,
            urlencoding::encode(photo_reference),
            urlencoding::encode(key)
        ))
    }

    /// Overview map with markers A (red), M (green) and B (blue)
    pub fn static_map_url(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        midpoint: Coordinate,
        width: u32,
        height: u32,
    ) -> Result<String, GatewayError> {
        let key = self.key()?;
        let markers = [
            ("red", 'A', origin),
            ("green", 'M', midpoint),
            ("blue", 'B', destination),
        ]
        .iter()
        .map(|(color, label, at)| {
            format!(
                "markers={}",
                urlencoding::encode(&format!("color:{color}|label:{label}|{}", at.to_query_value()))
            )
        })
        .collect::<Vec<_>>()
        .join("&");

        Ok(format!(
            "{}/staticmap?size={}x{}&{}&key={}",
            self.base_url,
            width,
            height,
            markers,
            urlencoding::encode(key)
        ))
    }
}
