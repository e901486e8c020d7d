//! Cache maintenance commands.

use console::style;
use mapposter::app::PosterApp;

use crate::error::CliError;

/// What to do with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Remove every entry.
    Clear,
    /// Remove expired entries only.
    Purge,
}

pub fn run(app: &PosterApp, action: CacheAction) -> Result<(), CliError> {
    let cache_dir = &app.config().paths.cache_dir;
    match action {
        CacheAction::Clear => {
            println!("Clearing cache at: {}", cache_dir.display());
            app.clear_cache()?;
            println!("{} Cache cleared", style("✓").green());
        }
        CacheAction::Purge => {
            println!("Purging expired entries in: {}", cache_dir.display());
            let result = app.purge_expired()?;
            println!("{} {}", style("✓").green(), result);
        }
    }
    Ok(())
}
