//! Profile CLI commands
//!
//! Runs lifecycle operations directly against the configured store, without
//! going through the HTTP server.

use crate::config::ServerConfig;
use crate::models::{NewProfile, Profile, ProfileChanges, ProfileHistoryEntry, ProfileId};
use crate::services::{resolve_status, ProfileService};
use crate::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Create a new active profile
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        specialty: String,

        /// LinkedIn profile URL
        #[arg(long)]
        linkedin: Option<String>,
    },

    /// Show a profile
    Get {
        id: ProfileId,
    },

    /// List profiles in insertion order
    List {
        /// Number of profiles to skip
        #[arg(long, default_value = "0")]
        skip: u32,

        /// Maximum number of profiles to return (default: configured page size)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Update fields and/or status of a profile
    Update {
        id: ProfileId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        specialty: Option<String>,

        #[arg(long)]
        linkedin: Option<String>,

        /// New status (active, inactive, suspended, deleted)
        #[arg(long)]
        status: Option<String>,
    },

    /// Delete a profile and its history
    Delete {
        id: ProfileId,
    },

    /// Show the status history of a profile
    History {
        id: ProfileId,
    },
}

pub fn run(args: ProfileArgs, config: &ServerConfig) -> Result<()> {
    let store = config.database.open_store(config.max_page_size)?;
    let service = ProfileService::new(Arc::new(store));
    execute(&service, args, config)
}

fn execute(service: &ProfileService, args: ProfileArgs, config: &ServerConfig) -> Result<()> {
    let json = args.json;

    match args.command {
        ProfileCommands::Create {
            name,
            email,
            specialty,
            linkedin,
        } => {
            let profile = service.create(NewProfile {
                name,
                email,
                specialty,
                linkedin,
            })?;
            print_profile(&profile, json, &format!("✓ Profile {} created", profile.id))?;
        }

        ProfileCommands::Get { id } => {
            let profile = service.get(id)?;
            print_profile(&profile, json, &format!("Profile {}", profile.id))?;
        }

        ProfileCommands::List { skip, limit } => {
            let limit = limit.unwrap_or(config.default_page_size);
            let profiles = service.list(skip, limit)?;
            print_profile_list(&profiles, json)?;
        }

        ProfileCommands::Update {
            id,
            name,
            email,
            specialty,
            linkedin,
            status,
        } => {
            let status = resolve_status(status.as_deref(), config.status_policy)?;
            let profile = service.update(
                id,
                ProfileChanges {
                    name,
                    email,
                    specialty,
                    linkedin,
                    status,
                },
            )?;
            print_profile(&profile, json, &format!("✓ Profile {} updated", profile.id))?;
        }

        ProfileCommands::Delete { id } => {
            let snapshot = service.delete(id)?;
            print_profile(&snapshot, json, &format!("✓ Profile {} deleted", snapshot.id))?;
        }

        ProfileCommands::History { id } => {
            let history = service.history(id)?;
            print_history(id, &history, json)?;
        }
    }

    Ok(())
}

fn print_profile(profile: &Profile, json: bool, heading: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }

    println!("{}", heading.green().bold());
    println!("  Name:       {}", profile.name);
    println!("  Email:      {}", profile.email);
    println!("  Specialty:  {}", profile.specialty);
    if let Some(linkedin) = &profile.linkedin {
        println!("  LinkedIn:   {}", linkedin);
    }
    println!("  Status:     {}", profile.status.to_string().cyan());
    println!("  Started:    {}", profile.start_date.to_rfc3339());
    if let Some(end_date) = profile.end_date {
        println!("  Ended:      {}", end_date.to_rfc3339());
    }
    println!("  History:    {} entr{}", profile.history.len(), plural_y(profile.history.len()));
    Ok(())
}

fn print_profile_list(profiles: &[Profile], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(profiles)?);
        return Ok(());
    }

    if profiles.is_empty() {
        println!("{}", "No profiles found.".yellow());
        return Ok(());
    }

    println!("{}", "Profiles:".green().bold());
    for profile in profiles {
        println!(
            "   • [{}] {} <{}> - {} ({})",
            profile.id,
            profile.name,
            profile.email,
            profile.specialty,
            profile.status.to_string().cyan()
        );
    }
    println!("\nTotal: {} profile(s)", profiles.len());
    Ok(())
}

fn print_history(id: ProfileId, history: &[ProfileHistoryEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(history)?);
        return Ok(());
    }

    println!("{}", format!("History of profile {}:", id).green().bold());
    for entry in history {
        println!(
            "   • {}  {}",
            entry.changed_at.to_rfc3339(),
            entry.status.to_string().cyan()
        );
    }
    Ok(())
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}
