//! mapposter CLI - Command-line interface
//!
//! Generates map posters for any city using the mapposter library.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use console::style;
use mapposter::app::PosterApp;
use mapposter::config::PosterConfig;
use mapposter::logging::{init_logging, DEFAULT_LOG_FILE};
use mapposter::poster::PosterRequest;

use commands::cache::CacheAction;
use commands::common::{resolve_coordinates, FormatArg};
use error::CliError;

const EXAMPLES: &str = "\
Examples:
  # Iconic grid patterns
  mapposter -c \"New York\" -C \"USA\" -t noir -d 12000
  mapposter -c \"Barcelona\" -C \"Spain\" -t warm_beige -d 8000

  # Waterfront & canals
  mapposter -c \"Venice\" -C \"Italy\" -t blueprint -d 4000
  mapposter -c \"Amsterdam\" -C \"Netherlands\" -t ocean -d 6000

  # Organic old cities
  mapposter -c \"Tokyo\" -C \"Japan\" -t japanese_ink -d 15000
  mapposter -c \"Marrakech\" -C \"Morocco\" -t terracotta -d 5000

  # Every theme at once, or a fixed point
  mapposter -c \"Paris\" -C \"France\" --all-themes -d 10000
  mapposter -c \"Paris\" -C \"France\" --latitude 48.8566 --longitude 2.3522

Distance guide:
  4000-6000m   Small/dense cities (Venice, Amsterdam old center)
  8000-12000m  Medium cities, focused downtown (Paris, Barcelona)
  15000-20000m Large metros, full city view (Tokyo, Mumbai)";

#[derive(Debug, Parser)]
#[command(name = "mapposter")]
#[command(version, about = "Generate beautiful map posters for any city")]
#[command(arg_required_else_help = true, after_help = EXAMPLES)]
struct Cli {
    /// City name
    #[arg(short = 'c', long)]
    city: Option<String>,

    /// Country name
    #[arg(short = 'C', long)]
    country: Option<String>,

    /// Latitude of the map center; skips geocoding
    #[arg(long, requires = "longitude", allow_negative_numbers = true)]
    latitude: Option<f64>,

    /// Longitude of the map center; skips geocoding
    #[arg(long, requires = "latitude", allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Override country text displayed on poster
    #[arg(long)]
    country_label: Option<String>,

    /// Theme name [default: feature_based, or the config file's theme]
    #[arg(short = 't', long)]
    theme: Option<String>,

    /// Generate posters for all themes
    #[arg(long, conflicts_with = "theme")]
    all_themes: bool,

    /// Map radius in meters [default: 29000, or the config file's distance]
    #[arg(short = 'd', long)]
    distance: Option<u32>,

    /// Output format
    #[arg(short = 'f', long, value_enum)]
    format: Option<FormatArg>,

    /// List all available themes
    #[arg(long)]
    list_themes: bool,

    /// Path to config.ini [default: ~/.mapposter/config.ini]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Remove all cached geocoding results and map data
    #[arg(long, conflicts_with = "purge_cache")]
    clear_cache: bool,

    /// Remove expired cache entries
    #[arg(long)]
    purge_cache: bool,
}

impl Cli {
    fn poster_request(&self, app: &PosterApp) -> Result<PosterRequest, CliError> {
        let (Some(city), Some(country)) = (&self.city, &self.country) else {
            return Err(CliError::Usage(
                "--city and --country are required".to_string(),
            ));
        };

        let mut request = app.request(city, country);
        if let Some(theme) = &self.theme {
            request = request.with_theme(theme.clone());
        }
        if let Some(distance) = self.distance {
            request = request.with_radius(distance);
        }
        if let Some(format) = self.format {
            request = request.with_format(format.into());
        }
        if let Some(coordinates) = resolve_coordinates(self.latitude, self.longitude)? {
            request = request.with_coordinates(coordinates);
        }
        if let Some(label) = &self.country_label {
            request = request.with_country_label(label.clone());
        }
        Ok(request)
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = PosterConfig::load(cli.config.as_deref())?;
    let _logging_guard =
        init_logging(&config.paths.log_dir, DEFAULT_LOG_FILE).map_err(CliError::Logging)?;
    tracing::info!(version = mapposter::VERSION, "mapposter starting");
    let app = PosterApp::from_config(config)?;

    if cli.list_themes {
        return commands::themes::run(app.themes());
    }
    if cli.clear_cache {
        return commands::cache::run(&app, CacheAction::Clear);
    }
    if cli.purge_cache {
        return commands::cache::run(&app, CacheAction::Purge);
    }

    let request = cli.poster_request(&app)?;
    if cli.all_themes {
        commands::generate::all_themes(&app, &request)
    } else {
        commands::generate::single(&app, &request)
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("✗ Error:").red().bold(), e);
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "mapposter", "-c", "New York", "-C", "USA", "-t", "noir", "-d", "12000", "-f", "jpeg",
            "--country-label", "United States",
        ])
        .unwrap();
        assert_eq!(cli.city.as_deref(), Some("New York"));
        assert_eq!(cli.country.as_deref(), Some("USA"));
        assert_eq!(cli.theme.as_deref(), Some("noir"));
        assert_eq!(cli.distance, Some(12000));
        assert_eq!(cli.format, Some(FormatArg::Jpeg));
        assert_eq!(cli.country_label.as_deref(), Some("United States"));
    }

    #[test]
    fn test_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "mapposter", "-c", "Rio", "-C", "Brazil", "--latitude", "-22.9068", "--longitude",
            "-43.1729",
        ])
        .unwrap();
        assert_eq!(cli.latitude, Some(-22.9068));
        assert_eq!(cli.longitude, Some(-43.1729));
    }

    #[test]
    fn test_latitude_requires_longitude() {
        assert!(Cli::try_parse_from(["mapposter", "-c", "x", "-C", "y", "--latitude", "1.0"]).is_err());
    }

    #[test]
    fn test_all_themes_conflicts_with_theme() {
        assert!(Cli::try_parse_from(["mapposter", "-c", "x", "-C", "y", "-t", "noir", "--all-themes"]).is_err());
    }

    #[test]
    fn test_unsupported_format_rejected() {
        assert!(Cli::try_parse_from(["mapposter", "-c", "x", "-C", "y", "-f", "svg"]).is_err());
    }
}
