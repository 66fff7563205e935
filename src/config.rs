use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::client::resolve_base_url;
use crate::render::{BandConfig, RenderConfig, RingGeometry};
use crate::telemetry::UmamiConfig;

pub const DEFAULT_PRODUCTION_API: &str = "https://api.aichecking.me";
pub const DEFAULT_SAME_ORIGIN_API: &str = "http://127.0.0.1:8000";

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Host name the front-end is served under; picks the upstream.
    pub public_host: String,
    /// Origin of the analysis service, without the `/api/analyze` path.
    pub api_base_url: String,
    pub render: RenderConfig,
    pub cors_origins: Option<String>,
    pub telemetry: Option<UmamiConfig>,
    pub session_idle: Duration,
}

/// Optional TOML display profile (`DISPLAY_CONFIG`). Missing keys keep the
/// value chosen by `BAND_PROFILE`.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct DisplayProfileToml {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub high_threshold: Option<f64>,
    #[serde(default)]
    pub low_threshold: Option<f64>,
    #[serde(default)]
    pub mixed_alpha_span: Option<f64>,
    #[serde(default)]
    pub ring_radius: Option<f64>,
}

impl DisplayProfileToml {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port: u16 = match std::env::var("PORT") {
            Ok(p) => p.parse().unwrap_or_else(|_| {
                warn!("[aichecking] Invalid PORT value, defaulting to 3000");
                3000
            }),
            Err(_) => 3000,
        };

        let public_host =
            std::env::var("PUBLIC_HOST").unwrap_or_else(|_| "localhost".to_string());

        let api_base_url = match std::env::var("API_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => {
                let production = std::env::var("PRODUCTION_API_ORIGIN")
                    .unwrap_or_else(|_| DEFAULT_PRODUCTION_API.to_string());
                let same_origin = std::env::var("SAME_ORIGIN_API")
                    .unwrap_or_else(|_| DEFAULT_SAME_ORIGIN_API.to_string());
                upstream_origin(&public_host, &same_origin, &production)
            }
        };

        let file = match std::env::var("DISPLAY_CONFIG") {
            Ok(p) => {
                let path = PathBuf::from(p);
                info!("[aichecking] Loading display profile from {:?}", path);
                Some(DisplayProfileToml::load(&path)?)
            }
            Err(_) => None,
        };

        let env_profile = DisplayProfileToml {
            profile: std::env::var("BAND_PROFILE").ok(),
            high_threshold: env_f64("HIGH_THRESHOLD"),
            low_threshold: env_f64("LOW_THRESHOLD"),
            mixed_alpha_span: env_f64("MIXED_ALPHA_SPAN"),
            ring_radius: env_f64("RING_RADIUS"),
        };
        let render = build_render_config(file.as_ref(), &env_profile)?;

        let cors_origins = std::env::var("CORS_ORIGINS").ok();

        let telemetry = match (
            std::env::var("UMAMI_URL"),
            std::env::var("UMAMI_WEBSITE_ID"),
        ) {
            (Ok(endpoint), Ok(website_id)) => Some(UmamiConfig {
                endpoint,
                website_id,
                hostname: public_host.clone(),
            }),
            _ => None,
        };

        let session_idle = Duration::from_secs(match std::env::var("SESSION_IDLE_SECS") {
            Ok(s) => s.parse().unwrap_or_else(|_| {
                warn!("[aichecking] Invalid SESSION_IDLE_SECS value, defaulting to 3600");
                3600
            }),
            Err(_) => 3600,
        });

        Ok(Self {
            port,
            public_host,
            api_base_url,
            render,
            cors_origins,
            telemetry,
            session_idle,
        })
    }
}

/// Loopback hosts talk to the analysis service on the same machine; anything
/// else talks to production.
pub fn upstream_origin(public_host: &str, same_origin: &str, production: &str) -> String {
    match resolve_base_url(public_host, production) {
        "" => same_origin.trim_end_matches('/').to_string(),
        origin => origin.trim_end_matches('/').to_string(),
    }
}

/// Environment values override the file, which overrides the named profile.
pub fn build_render_config(
    file: Option<&DisplayProfileToml>,
    env: &DisplayProfileToml,
) -> anyhow::Result<RenderConfig> {
    let profile_name = env
        .profile
        .as_deref()
        .or(file.and_then(|f| f.profile.as_deref()))
        .unwrap_or("compliance");
    let base = BandConfig::profile(profile_name)
        .ok_or_else(|| anyhow::anyhow!("unknown band profile '{}'", profile_name))?;

    let pick = |get: fn(&DisplayProfileToml) -> Option<f64>, default: f64| {
        get(env).or(file.and_then(get)).unwrap_or(default)
    };

    let bands = BandConfig::new(
        pick(|p| p.high_threshold, base.high_threshold),
        pick(|p| p.low_threshold, base.low_threshold),
        pick(|p| p.mixed_alpha_span, base.mixed_alpha_span),
    )?;
    let ring = RingGeometry::new(pick(|p| p.ring_radius, RingGeometry::default().radius))?;

    Ok(RenderConfig { bands, ring })
}

fn env_f64(key: &str) -> Option<f64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("[aichecking] Ignoring invalid {} value '{}'", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_profile_is_compliance() {
        let config = build_render_config(None, &DisplayProfileToml::default()).unwrap();
        assert_eq!(config.bands, BandConfig::compliance());
        assert_eq!(config.ring.radius, 70.0);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = DisplayProfileToml {
            profile: Some("standard".into()),
            high_threshold: Some(75.0),
            ring_radius: Some(54.0),
            ..Default::default()
        };
        let env = DisplayProfileToml {
            high_threshold: Some(80.0),
            ..Default::default()
        };
        let config = build_render_config(Some(&file), &env).unwrap();
        assert_eq!(config.bands.high_threshold, 80.0);
        assert_eq!(config.bands.low_threshold, 30.0);
        assert_eq!(config.bands.mixed_alpha_span, 80.0);
        assert_eq!(config.ring.radius, 54.0);
    }

    #[test]
    fn test_inconsistent_thresholds_are_rejected() {
        let env = DisplayProfileToml {
            high_threshold: Some(20.0),
            ..Default::default()
        };
        assert!(build_render_config(None, &env).is_err());

        let env = DisplayProfileToml {
            profile: Some("strict".into()),
            ..Default::default()
        };
        assert!(build_render_config(None, &env).is_err());
    }

    #[test]
    fn test_load_toml_profile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "profile = \"standard\"\nlow_threshold = 25.0\nring_radius = 60.0"
        )
        .unwrap();
        let parsed = DisplayProfileToml::load(file.path()).unwrap();
        assert_eq!(
            parsed,
            DisplayProfileToml {
                profile: Some("standard".into()),
                low_threshold: Some(25.0),
                ring_radius: Some(60.0),
                ..Default::default()
            }
        );
        let config = build_render_config(Some(&parsed), &DisplayProfileToml::default()).unwrap();
        assert_eq!(config.bands.high_threshold, 70.0);
        assert_eq!(config.bands.low_threshold, 25.0);
    }

    #[test]
    fn test_upstream_origin() {
        assert_eq!(
            upstream_origin("localhost:3000", "http://127.0.0.1:8000/", DEFAULT_PRODUCTION_API),
            "http://127.0.0.1:8000"
        );
        assert_eq!(
            upstream_origin("www.aichecking.me", DEFAULT_SAME_ORIGIN_API, DEFAULT_PRODUCTION_API),
            DEFAULT_PRODUCTION_API
        );
    }
}
