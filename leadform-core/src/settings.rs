use crate::messaging::{is_valid_destination, DEFAULT_DESTINATION};
use crate::storage::{keys, load_json, save_json, KeyValueStore, StorageError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared_types::ColorScheme;
use std::sync::Arc;
use tracing::info;

pub const MAX_LOGO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Logo must be an image data URL")]
    InvalidLogo,

    #[error("Logo exceeds the 5 MiB limit ({0} bytes)")]
    LogoTooLarge(usize),

    #[error("Destination must have 10 to 15 digits")]
    InvalidDestination,

    #[error("Invalid color for {field}: {value}")]
    InvalidColor { field: String, value: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Branding and messaging settings kept in the local store.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
    default_destination: String,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_default_destination(store, DEFAULT_DESTINATION)
    }

    /// Destination used until the admin saves one.
    pub fn with_default_destination(
        store: Arc<dyn KeyValueStore>,
        default_destination: impl Into<String>,
    ) -> Self {
        Self {
            store,
            default_destination: default_destination.into(),
        }
    }

    pub fn default_destination(&self) -> &str {
        &self.default_destination
    }

    pub async fn logo(&self) -> Result<Option<String>, SettingsError> {
        Ok(self.store.load(keys::LOGO).await?)
    }

    pub async fn set_logo(&self, data_url: &str) -> Result<(), SettingsError> {
        let size = validate_logo(data_url)?;
        self.store.save(keys::LOGO, data_url).await?;
        info!(bytes = size, "Updated logo");
        Ok(())
    }

    pub async fn clear_logo(&self) -> Result<(), SettingsError> {
        self.store.remove(keys::LOGO).await?;
        info!("Removed logo");
        Ok(())
    }

    pub async fn destination(&self) -> Result<String, SettingsError> {
        Ok(self
            .store
            .load(keys::MESSAGING_DESTINATION)
            .await?
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.default_destination.clone()))
    }

    pub async fn set_destination(&self, destination: &str) -> Result<(), SettingsError> {
        let destination = destination.trim();
        if !is_valid_destination(destination) {
            return Err(SettingsError::InvalidDestination);
        }
        self.store
            .save(keys::MESSAGING_DESTINATION, destination)
            .await?;
        info!(destination = %destination, "Updated messaging destination");
        Ok(())
    }

    pub async fn colors(&self) -> Result<ColorScheme, SettingsError> {
        Ok(load_json(self.store.as_ref(), keys::COLORS)
            .await?
            .unwrap_or_default())
    }

    pub async fn set_colors(&self, colors: &ColorScheme) -> Result<(), SettingsError> {
        for (field, value) in colors.fields() {
            if !is_hex_color(value) {
                return Err(SettingsError::InvalidColor {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }
        save_json(self.store.as_ref(), keys::COLORS, colors).await?;
        info!("Updated color scheme");
        Ok(())
    }

    pub async fn reset_colors(&self) -> Result<ColorScheme, SettingsError> {
        self.store.remove(keys::COLORS).await?;
        info!("Reset color scheme");
        Ok(ColorScheme::default())
    }
}

/// Returns the decoded payload size of a `data:image/...;base64,` URL.
pub fn validate_logo(data_url: &str) -> Result<usize, SettingsError> {
    if !data_url.starts_with("data:image/") {
        return Err(SettingsError::InvalidLogo);
    }
    let (header, payload) = data_url
        .split_once(',')
        .ok_or(SettingsError::InvalidLogo)?;
    if !header.ends_with(";base64") {
        return Err(SettingsError::InvalidLogo);
    }

    // Upper bound first so oversized uploads are rejected before decoding.
    let estimated = payload.len() / 4 * 3;
    if estimated > MAX_LOGO_BYTES + 2 {
        return Err(SettingsError::LogoTooLarge(estimated));
    }

    let decoded = STANDARD
        .decode(payload)
        .map_err(|_| SettingsError::InvalidLogo)?;
    if decoded.len() > MAX_LOGO_BYTES {
        return Err(SettingsError::LogoTooLarge(decoded.len()));
    }
    Ok(decoded.len())
}

pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryKeyValueStore;

    fn settings() -> SettingsStore {
        SettingsStore::new(Arc::new(InMemoryKeyValueStore::new()))
    }

    fn data_url(bytes: &[u8]) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn test_logo_validation() {
        assert_eq!(validate_logo(&data_url(b"png-bytes")).unwrap(), 9);
        assert!(matches!(
            validate_logo("https://example.com/logo.png"),
            Err(SettingsError::InvalidLogo)
        ));
        assert!(matches!(
            validate_logo("data:text/plain;base64,aGVsbG8="),
            Err(SettingsError::InvalidLogo)
        ));
        assert!(matches!(
            validate_logo("data:image/png;base64,***"),
            Err(SettingsError::InvalidLogo)
        ));
    }

    #[test]
    fn test_logo_size_limit() {
        let exact = vec![0u8; MAX_LOGO_BYTES];
        assert!(validate_logo(&data_url(&exact)).is_ok());

        let over = vec![0u8; MAX_LOGO_BYTES + 1];
        assert!(matches!(
            validate_logo(&data_url(&over)),
            Err(SettingsError::LogoTooLarge(_))
        ));
    }

    #[test]
    fn test_hex_colors() {
        assert!(is_hex_color("#1e40af"));
        assert!(is_hex_color("#FFFFFF"));
        assert!(!is_hex_color("1e40af"));
        assert!(!is_hex_color("#fff"));
        assert!(!is_hex_color("#gggggg"));
    }

    #[tokio::test]
    async fn test_logo_set_and_clear() {
        let settings = settings();
        assert!(settings.logo().await.unwrap().is_none());

        let logo = data_url(b"image");
        settings.set_logo(&logo).await.unwrap();
        assert_eq!(settings.logo().await.unwrap(), Some(logo));

        settings.clear_logo().await.unwrap();
        assert!(settings.logo().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_destination_defaults_and_validates() {
        let settings = settings();
        assert_eq!(settings.destination().await.unwrap(), DEFAULT_DESTINATION);

        assert!(matches!(
            settings.set_destination("55 11 9999").await,
            Err(SettingsError::InvalidDestination)
        ));

        settings.set_destination("5521988887777").await.unwrap();
        assert_eq!(settings.destination().await.unwrap(), "5521988887777");
    }

    #[tokio::test]
    async fn test_configured_default_destination() {
        let settings = SettingsStore::with_default_destination(
            Arc::new(InMemoryKeyValueStore::new()),
            "5531900001111",
        );
        assert_eq!(settings.destination().await.unwrap(), "5531900001111");
    }

    #[tokio::test]
    async fn test_colors_override_and_reset() {
        let settings = settings();
        assert_eq!(settings.colors().await.unwrap(), ColorScheme::default());

        let mut colors = ColorScheme::default();
        colors.title = "#000000".to_string();
        settings.set_colors(&colors).await.unwrap();
        assert_eq!(settings.colors().await.unwrap().title, "#000000");

        colors.no_button = "red".to_string();
        match settings.set_colors(&colors).await {
            Err(SettingsError::InvalidColor { field, .. }) => assert_eq!(field, "no_button"),
            other => panic!("expected invalid color, got {:?}", other),
        }

        assert_eq!(settings.reset_colors().await.unwrap(), ColorScheme::default());
        assert_eq!(settings.colors().await.unwrap(), ColorScheme::default());
    }
}
