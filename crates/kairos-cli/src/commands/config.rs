use clap::Subcommand;

use crate::common;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a setting
    Get {
        /// One of: alarms-enabled, vibrate-only, autostart-hint-dismissed
        key: String,
    },
    /// Set a setting
    Set {
        /// One of: alarms-enabled, vibrate-only, autostart-hint-dismissed
        key: String,
        /// true | false
        value: bool,
    },
    /// Show all preferences
    Show,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = common::open_prefs()?;
    match action {
        ConfigAction::Get { key } => {
            let current = prefs.current();
            let value = match key.as_str() {
                "alarms-enabled" => current.alarms_enabled,
                "vibrate-only" => current.vibrate_only,
                "autostart-hint-dismissed" => current.autostart_hint_dismissed,
                _ => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            };
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            match key.as_str() {
                "alarms-enabled" => prefs.set_alarms_enabled(value)?,
                "vibrate-only" => prefs.set_vibrate_only(value)?,
                "autostart-hint-dismissed" => prefs.set_autostart_hint_dismissed(value)?,
                _ => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
            println!("ok");
        }
        ConfigAction::Show => {
            let json = serde_json::to_string_pretty(&prefs.current())?;
            println!("{json}");
        }
    }
    Ok(())
}
