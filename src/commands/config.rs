use anyhow::Result;
use foodie_core::FoodieConfig;
use owo_colors::OwoColorize;

use crate::app::App;

pub fn run(app: &App) -> Result<()> {
    let config_path = FoodieConfig::config_path()?;
    let data_path = app.config.data_path();

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!(
        "  Meet-ups:   {}",
        data_path
            .join(format!("{}.json", app.config.collection))
            .display()
    );
    println!("  Reminders:  {}", app.reminders.path().display());

    println!();
    println!("{}", "Settings".bold());
    for line in app.config.to_toml()?.lines() {
        println!("  {line}");
    }

    Ok(())
}
