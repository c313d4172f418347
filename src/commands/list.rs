use anyhow::Result;
use foodie_core::classify::classify;

use crate::app::App;
use crate::render::Render;
use crate::utils::tui::while_loading;

pub async fn run(app: &App) -> Result<()> {
    let records = while_loading("meet-ups", app.records()).await;

    let classification = classify(&records, app.clock.now());
    println!("{}", classification.render());

    Ok(())
}
