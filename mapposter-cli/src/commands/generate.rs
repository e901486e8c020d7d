//! Poster generation.

use console::style;
use mapposter::app::PosterApp;
use mapposter::poster::PosterRequest;

use crate::error::CliError;

use super::common::{banner, spinner, theme_progress};

/// Checks that the requested theme exists before any network access.
fn check_theme(app: &PosterApp, theme: &str) -> Result<(), CliError> {
    let available = app.themes().list_themes()?;
    if available.is_empty() {
        return Err(CliError::Usage(format!(
            "No themes found in {}",
            app.themes().dir().display()
        )));
    }
    if !available.iter().any(|t| t == theme) {
        return Err(CliError::Usage(format!(
            "Theme '{}' not found. Available themes: {}",
            theme,
            available.join(", ")
        )));
    }
    Ok(())
}

/// Generates a single poster.
pub fn single(app: &PosterApp, request: &PosterRequest) -> Result<(), CliError> {
    check_theme(app, &request.theme)?;
    banner("City Map Poster Generator");

    let pb = spinner(&format!(
        "Generating {} poster for {}, {}",
        request.theme, request.city, request.country
    ));
    let result = app.generator().generate_poster(request);
    pb.finish_and_clear();

    let path = result?;
    println!("{} Poster saved as {}", style("✓").green(), path.display());
    Ok(())
}

/// Generates one poster per theme and prints a per-theme report.
pub fn all_themes(app: &PosterApp, request: &PosterRequest) -> Result<(), CliError> {
    let total = app.themes().list_themes()?.len();
    banner("City Map Poster Generator");

    let pb = theme_progress(total);
    pb.set_message("fetching map data");
    let report = app.generator().generate_all_themes_with(request, |outcome| {
        match &outcome.result {
            Ok(path) => pb.println(format!(
                "{} {:<16} {}",
                style("✓").green(),
                outcome.theme,
                path.display()
            )),
            Err(e) => pb.println(format!("{} {:<16} {}", style("✗").red(), outcome.theme, e)),
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    let report = report?;
    println!("\n{}", report);
    if report.all_succeeded() {
        Ok(())
    } else {
        Err(CliError::Batch {
            succeeded: report.succeeded(),
            total: report.total(),
        })
    }
}
