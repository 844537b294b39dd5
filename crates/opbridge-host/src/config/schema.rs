use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use opbridge_core::error::{BridgeError, Result};
use opbridge_core::protocol::ProtocolVersion;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    pub session: SessionConfig,

    #[serde(default)]
    pub bridge: BridgeSection,
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BridgeError::UnsupportedVersion);
        }
        self.session.validate()?;
        self.bridge.validate()?;
        Ok(())
    }
}

/// Per-session settings, fixed at load time.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub operator_id: String,

    #[serde(default)]
    pub game_id: Option<String>,

    /// Exact origin of the embedded surface. No wildcard, no path.
    pub target_origin: String,

    /// Locator of the surface (iframe id / browser view id).
    pub surface_locator: String,

    /// Our own identity, stamped on every outbound envelope.
    #[serde(default = "default_source")]
    pub source: String,

    #[serde(default)]
    pub protocol: ProtocolVersion,

    #[serde(default = "default_sdk_version")]
    pub sdk_version: String,

    /// Per-message debug narration.
    #[serde(default)]
    pub logging: bool,

    #[serde(default = "default_surface_wait_ms")]
    pub surface_wait_ms: u64,

    #[serde(default)]
    pub demo: Option<DemoConfig>,
}

impl SessionConfig {
    /// Config with defaults for everything but the required fields.
    pub fn new(
        operator_id: impl Into<String>,
        target_origin: impl Into<String>,
        surface_locator: impl Into<String>,
    ) -> Self {
        Self {
            operator_id: operator_id.into(),
            game_id: None,
            target_origin: target_origin.into(),
            surface_locator: surface_locator.into(),
            source: default_source(),
            protocol: ProtocolVersion::default(),
            sdk_version: default_sdk_version(),
            logging: false,
            surface_wait_ms: default_surface_wait_ms(),
            demo: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.operator_id.trim().is_empty() {
            return Err(BridgeError::Config("session.operator_id must not be empty".into()));
        }
        if self.surface_locator.trim().is_empty() {
            return Err(BridgeError::Config(
                "session.surface_locator must not be empty".into(),
            ));
        }
        if self.source.trim().is_empty() {
            return Err(BridgeError::Config("session.source must not be empty".into()));
        }
        if self.surface_wait_ms > 60000 {
            return Err(BridgeError::Config(
                "session.surface_wait_ms must be between 0 and 60000".into(),
            ));
        }
        validate_origin(&self.target_origin)
    }

    /// Embed URL for the surface.
    pub fn surface_url(&self, language: &str, platform: &str) -> Result<Url> {
        let mut url = Url::parse(&self.target_origin)
            .map_err(|e| BridgeError::Config(format!("session.target_origin: {e}")))?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("operatorId", &self.operator_id);
            if let Some(game) = &self.game_id {
                q.append_pair("gameId", game);
            }
            q.append_pair("language", language);
            q.append_pair("platform", platform);
        }
        Ok(url)
    }

    /// Payload pushed to legacy surfaces as `SET_CONFIG`.
    pub fn config_payload(&self) -> Value {
        json!({
            "operatorId": self.operator_id,
            "gameId": self.game_id,
            "targetOrigin": self.target_origin,
            "surfaceLocator": self.surface_locator,
            "sdkVersion": self.sdk_version,
            "protocol": self.protocol.as_str(),
            "logging": self.logging,
        })
    }
}

/// Origins are compared byte for byte, so the configured value must already
/// be in serialized origin form.
fn validate_origin(origin: &str) -> Result<()> {
    let url = Url::parse(origin).map_err(|e| {
        BridgeError::Config(format!("session.target_origin is not a url ({origin}): {e}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BridgeError::Config(format!(
            "session.target_origin must be http or https: {origin}"
        )));
    }
    let serialized = url.origin().ascii_serialization();
    if serialized != origin {
        return Err(BridgeError::Config(format!(
            "session.target_origin must be a bare origin (expected {serialized}, got {origin})"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemoConfig {
    #[serde(default = "default_initial_balance")]
    pub initial_balance: i64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl BridgeSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<std::net::SocketAddr>().map_err(|_| {
            BridgeError::Config(format!(
                "bridge.listen must be a socket address: {}",
                self.listen
            ))
        })?;
        Ok(())
    }
}

fn default_source() -> String {
    "opbridge-host".into()
}
fn default_sdk_version() -> String {
    "2.0.0".into()
}
fn default_surface_wait_ms() -> u64 {
    10000
}
fn default_initial_balance() -> i64 {
    20000
}
fn default_listen() -> String {
    "127.0.0.1:8080".into()
}
