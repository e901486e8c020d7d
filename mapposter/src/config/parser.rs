//! INI parsing: the single place where INI keys map to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::PosterConfig;

/// Parses an `Ini` into a [`PosterConfig`], starting from the defaults.
pub(super) fn parse_ini(ini: &Ini) -> Result<PosterConfig, ConfigFileError> {
    let mut config = PosterConfig::default();

    if let Some(section) = ini.section(Some("paths")) {
        let paths = &mut config.paths;
        for (key, target) in [
            ("cache_dir", &mut paths.cache_dir),
            ("themes_dir", &mut paths.themes_dir),
            ("fonts_dir", &mut paths.fonts_dir),
            ("output_dir", &mut paths.output_dir),
            ("log_dir", &mut paths.log_dir),
        ] {
            if let Some(v) = non_empty(section, key) {
                *target = expand_tilde(v);
            }
        }
    }

    if let Some(section) = ini.section(Some("geocoding")) {
        let g = &mut config.geocoding;
        if let Some(v) = non_empty(section, "user_agent") {
            g.user_agent = v.to_string();
        }
        parse_into(section, "geocoding", "timeout", &mut g.timeout_secs)?;
        parse_into(section, "geocoding", "rate_limit", &mut g.rate_limit_secs)?;
        parse_into(section, "geocoding", "retries", &mut g.retries)?;
    }

    if let Some(section) = ini.section(Some("fetch")) {
        let f = &mut config.fetch;
        parse_into(section, "fetch", "timeout", &mut f.timeout_secs)?;
        parse_into(section, "fetch", "graph_rate_limit", &mut f.graph_rate_limit_secs)?;
        parse_into(section, "fetch", "features_rate_limit", &mut f.features_rate_limit_secs)?;
        parse_into(section, "fetch", "retries", &mut f.retries)?;
        if let Some(v) = non_empty(section, "overpass_urls") {
            f.overpass_urls = v
                .split(',')
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    if let Some(section) = ini.section(Some("render")) {
        let r = &mut config.render;
        parse_into(section, "render", "width", &mut r.width_in)?;
        parse_into(section, "render", "height", &mut r.height_in)?;
        parse_into(section, "render", "dpi", &mut r.dpi)?;
        parse_into(section, "render", "distance", &mut r.distance_m)?;
        parse_into(section, "render", "parallel_themes", &mut r.parallel_themes)?;
        if let Some(v) = non_empty(section, "format") {
            r.format = v.parse().map_err(|_| {
                ConfigFileError::invalid("render", "format", v, "must be one of: png, jpeg")
            })?;
        }
        if let Some(v) = non_empty(section, "theme") {
            r.theme = v.to_string();
        }
    }

    if let Some(section) = ini.section(Some("cache")) {
        let c = &mut config.cache;
        if let Some(v) = non_empty(section, "enabled") {
            c.enabled = parse_bool(v);
        }
        parse_into(section, "cache", "geocode_ttl_days", &mut c.geocode_ttl_days)?;
        parse_into(section, "cache", "data_ttl_days", &mut c.data_ttl_days)?;
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

/// Parses `key` into `target` when present.
fn parse_into<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
    target: &mut T,
) -> Result<(), ConfigFileError> {
    if let Some(v) = non_empty(section, key) {
        *target = v
            .parse()
            .map_err(|_| ConfigFileError::invalid(section_name, key, v, "expected a number"))?;
    }
    Ok(())
}

/// Parse a boolean value from config string.
pub(super) fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "yes" | "1" | "on"
    )
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
