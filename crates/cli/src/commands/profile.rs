// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! `devflow profile`: create and switch between named data directories.

use crate::config::default_data_dir;
use crate::output::{print_json, OutputFormat};
use crate::profile::Profile;
use clap::Subcommand;
use devflow_core::clock::{Clock, SystemClock};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Create a new profile
    Create {
        name: String,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// List every known profile
    List {
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Make a profile the one used when `--profile` isn't passed
    Use { name: String },
    /// Print the currently active profile, if any
    Current,
}

/// Profiles are rooted at the platform data directory, one level above
/// any individual profile's own `data_dir`, so `profiles/` and `.active`
/// live alongside (not inside) the profile data itself.
fn profiles_root() -> PathBuf {
    default_data_dir()
}

pub fn handle(command: ProfileCommand) -> anyhow::Result<()> {
    let root = profiles_root();
    match command {
        ProfileCommand::Create { name, data_dir } => {
            let data_dir = data_dir.unwrap_or_else(|| root.join("profiles-data").join(&name));
            let profile = Profile::create(&root, &name, data_dir, SystemClock.epoch_ms())?;
            println!("created profile '{}' at {}", profile.name, profile.data_dir.display());
        }
        ProfileCommand::List { format } => {
            let profiles = Profile::list(&root)?;
            let active = Profile::active(&root)?;
            match format {
                OutputFormat::Json => print_json(&profiles),
                OutputFormat::Text => {
                    for profile in &profiles {
                        let marker = if active.as_deref() == Some(profile.name.as_str()) { "*" } else { " " };
                        println!("{marker} {:<16} {}", profile.name, profile.data_dir.display());
                    }
                }
            }
        }
        ProfileCommand::Use { name } => {
            Profile::load(&root, &name)?;
            Profile::set_active(&root, &name)?;
            println!("active profile is now '{name}'");
        }
        ProfileCommand::Current => match Profile::active(&root)? {
            Some(name) => println!("{name}"),
            None => println!("(none)"),
        },
    }
    Ok(())
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
