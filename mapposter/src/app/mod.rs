//! Application bootstrap.
//!
//! [`PosterApp`] turns a [`PosterConfig`](crate::config::PosterConfig) into
//! a ready [`PosterGenerator`](crate::poster::PosterGenerator) backed by the
//! production services.
//!
//! # Example
//!
//! ```ignore
//! use mapposter::app::PosterApp;
//! use mapposter::config::PosterConfig;
//!
//! let app = PosterApp::from_config(PosterConfig::load(None)?)?;
//! let path = app.generator().generate_poster(&app.request("Paris", "France"))?;
//! ```

mod bootstrap;
mod error;

pub use bootstrap::PosterApp;
pub use error::AppError;
