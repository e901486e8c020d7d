//! `--list-themes`

use console::style;
use mapposter::theme::ThemeCatalog;

use crate::error::CliError;

pub fn run(catalog: &ThemeCatalog) -> Result<(), CliError> {
    let themes = catalog.list_themes()?;
    if themes.is_empty() {
        println!("No themes found in {}", catalog.dir().display());
        return Ok(());
    }

    println!("\nAvailable Themes:");
    println!("{}", "-".repeat(60));
    for identifier in themes {
        let info = catalog.theme_info(&identifier);
        println!("  {}", style(&info.identifier).bold());
        println!("    {}", info.name);
        if !info.description.is_empty() {
            println!("    {}", style(&info.description).dim());
        }
        println!();
    }
    Ok(())
}
