//! CLI error type and exit codes.

use std::fmt;
use std::io;

use mapposter::app::AppError;
use mapposter::cache::CacheError;
use mapposter::config::ConfigFileError;
use mapposter::coord::CoordError;
use mapposter::poster::PosterError;
use mapposter::theme::ThemeError;

/// Errors surfaced to the user.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing arguments.
    Usage(String),
    Config(ConfigFileError),
    App(AppError),
    Logging(io::Error),
    Coordinates(CoordError),
    Theme(ThemeError),
    Poster(PosterError),
    /// Some themes of an all-themes run failed.
    Batch { succeeded: usize, total: usize },
    Cache(CacheError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Config(e) => write!(f, "{}", e),
            CliError::App(e) => write!(f, "Error initializing application: {}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Coordinates(e) => write!(f, "Invalid coordinates: {}", e),
            CliError::Theme(e) => write!(f, "{}", e),
            CliError::Poster(e) => match e.stage {
                mapposter::poster::Stage::Geocode => write!(f, "Could not locate place: {}", e.source),
                mapposter::poster::Stage::Fetch => write!(f, "Could not download map data: {}", e.source),
                mapposter::poster::Stage::Theme => write!(f, "Theme problem: {}", e.source),
                mapposter::poster::Stage::Render => write!(f, "Rendering failed: {}", e.source),
                mapposter::poster::Stage::Output => write!(f, "Could not write poster: {}", e.source),
            },
            CliError::Batch { succeeded, total } => {
                write!(f, "Only {} of {} themes rendered", succeeded, total)
            }
            CliError::Cache(e) => write!(f, "Cache maintenance failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coordinates(e)
    }
}

impl From<ThemeError> for CliError {
    fn from(e: ThemeError) -> Self {
        CliError::Theme(e)
    }
}

impl From<PosterError> for CliError {
    fn from(e: PosterError) -> Self {
        CliError::Poster(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapposter::fetch::FetchError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Usage("x".into()).exit_code(), 2);
        assert_eq!(CliError::Batch { succeeded: 1, total: 3 }.exit_code(), 1);
    }

    #[test]
    fn test_poster_error_names_stage() {
        let err = CliError::from(PosterError::from(FetchError::InvalidRadius(0)));
        assert!(err.to_string().starts_with("Could not download map data"));
    }
}
