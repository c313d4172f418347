use anyhow::Result;
use foodie_core::LifecycleClassifier;
use foodie_core::classify::classify;
use owo_colors::OwoColorize;
use tokio::time::MissedTickBehavior;

use crate::app::App;
use crate::reminders;
use crate::render::Render;
use crate::utils::tui::while_loading;

/// Keep the meet-up list on screen and fire reminders as they come due,
/// until Ctrl-C.
pub async fn run(app: &App) -> Result<()> {
    let tick = app.config.tick()?;
    let mut mounted = LifecycleClassifier::new(app.clock.clone())
        .with_tick(tick)
        .mount(&app.store);

    let mut reminder_check = tokio::time::interval(tick);
    reminder_check.set_missed_tick_behavior(MissedTickBehavior::Skip);

    println!("{}", "Watching meet-ups. Press Ctrl-C to stop.".dimmed());
    let records = while_loading("meet-ups", app.records()).await;
    let mut shown = classify(&records, app.clock.now());
    println!("{}", shown.render());

    loop {
        tokio::select! {
            classification = mounted.changed() => {
                if classification == shown {
                    continue;
                }
                println!();
                println!(
                    "{}",
                    app.clock.now().format("%Y-%m-%d %I:%M %p").to_string().dimmed()
                );
                println!("{}", classification.render());
                shown = classification;
            }
            _ = reminder_check.tick() => {
                deliver_due(app);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    mounted.unmount();
    Ok(())
}

fn deliver_due(app: &App) {
    let due = match app.reminders.take_due(app.clock.now()) {
        Ok(due) => due,
        Err(e) => {
            tracing::warn!(error = %e, "could not read reminders");
            return;
        }
    };

    let mut failed = Vec::new();
    for reminder in due {
        if reminder.failed_attempts == 0 {
            println!("{}", format!("  🔔 {}", reminder.content.body).yellow());
        }
        if let Err(e) = reminders::deliver(&reminder) {
            tracing::warn!(error = %e, handle = %reminder.handle, "could not show reminder");
            failed.push(reminder);
        }
    }

    match app.reminders.requeue(failed) {
        Ok(given_up) => {
            for reminder in given_up {
                tracing::warn!(handle = %reminder.handle, "giving up on reminder");
            }
        }
        Err(e) => tracing::warn!(error = %e, "could not keep undelivered reminders"),
    }
}
