//! Config command handler

use crate::args::ConfigSubcommand;
use degree_forecast::config::Config;
use std::io::{self, BufRead, Write};

/// Dispatch config subcommands
pub fn run(subcommand: Option<ConfigSubcommand>, config: &mut Config, defaults: &Config) {
    match subcommand {
        None | Some(ConfigSubcommand::Get { key: None }) => show_all(config),
        Some(ConfigSubcommand::Get { key: Some(key) }) => show_key(config, &key),
        Some(ConfigSubcommand::Set { key, value }) => {
            update(config, &key, |c| c.set(&key, &value));
            println!("✓ Set {key} = {value}");
        }
        Some(ConfigSubcommand::Unset { key }) => {
            update(config, &key, |c| c.unset(&key, defaults));
            println!("✓ Reset {key} to default");
        }
        Some(ConfigSubcommand::Reset) => reset(&mut io::stdin().lock()),
    }
}

fn show_all(config: &Config) {
    println!("\n=== Configuration ({}) ===\n", Config::get_config_file_path().display());
    print!("{config}");
}

fn show_key(config: &Config, key: &str) {
    match config.get(key) {
        Some(value) => println!("{value}"),
        None => {
            eprintln!("Unknown config key: '{key}'");
            std::process::exit(1);
        }
    }
}

/// Apply `change` and persist the result, exiting on either failure
fn update<F>(config: &mut Config, key: &str, change: F)
where
    F: FnOnce(&mut Config) -> Result<(), String>,
{
    if let Err(e) = change(config) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = config.save() {
        eprintln!("Failed to save config after changing '{key}': {e}");
        std::process::exit(1);
    }
}

fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn reset(input: &mut impl BufRead) {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return;
    }

    print!("Are you sure you want to reset config to defaults? (y/n): ");
    io::stdout().flush().ok();

    let mut response = String::new();
    input.read_line(&mut response).ok();

    if !confirmed(&response) {
        println!("✗ Reset cancelled");
        return;
    }

    if let Err(e) = Config::reset() {
        eprintln!("Failed to remove config file: {e}");
        std::process::exit(1);
    }
    println!("✓ Config reset to defaults");
}
