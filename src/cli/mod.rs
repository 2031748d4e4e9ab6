//! Command-line interface for biblioteca.
//!
//! Provides commands for registering users and resources, lending and
//! returning, listing the catalog and history, and an interactive shell.
//! Every mutating command writes the data files back before exiting.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;

use crate::config;
use crate::core::CatalogEngine;
use crate::domain::{Resource, ResourceType, User};
use crate::store::{DataFiles, LoadReport};

pub mod render;
pub mod shell;

/// biblioteca - Library catalog and loan manager
#[derive(Parser, Debug)]
#[command(name = "biblioteca")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Users file (overrides configuration)
    #[arg(long, global = true)]
    pub users_file: Option<PathBuf>,

    /// Resources file (overrides configuration)
    #[arg(long, global = true)]
    pub resources_file: Option<PathBuf>,

    /// Loan history file (overrides configuration)
    #[arg(long, global = true)]
    pub loans_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage registered users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage catalog resources
    Resource {
        #[command(subcommand)]
        command: ResourceCommands,
    },

    /// Lend a resource to a user
    Loan {
        /// Resource ID
        resource_id: String,

        /// User ID
        user_id: String,
    },

    /// Return a loaned resource
    Return {
        /// Resource ID
        resource_id: String,
    },

    /// Show the loan history
    History {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the interactive menu
    Shell,

    /// Show resolved configuration (debug)
    Config,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a new user
    Add {
        /// User ID
        id: String,

        /// Display name
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// List registered users
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResourceCommands {
    /// Add a resource to the catalog
    Add {
        #[command(subcommand)]
        resource: NewResource,
    },

    /// List catalog resources
    List {
        /// Only show one resource type
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one resource
    Show {
        /// Resource ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NewResource {
    /// A book with its author
    Book {
        id: String,
        title: String,
        author: String,
    },

    /// A magazine issue
    Magazine {
        id: String,
        title: String,
        issue_number: i32,
    },

    /// A DVD with its running time
    Dvd {
        id: String,
        title: String,
        duration_minutes: i32,
    },
}

impl From<NewResource> for Resource {
    fn from(r: NewResource) -> Self {
        match r {
            NewResource::Book { id, title, author } => Resource::book(id, title, author),
            NewResource::Magazine {
                id,
                title,
                issue_number,
            } => Resource::magazine(id, title, issue_number),
            NewResource::Dvd {
                id,
                title,
                duration_minutes,
            } => Resource::dvd(id, title, duration_minutes),
        }
    }
}

/// Resource type for CLI (maps to ResourceType)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Book,
    Magazine,
    Dvd,
}

impl From<KindArg> for ResourceType {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Book => ResourceType::Book,
            KindArg::Magazine => ResourceType::Magazine,
            KindArg::Dvd => ResourceType::Dvd,
        }
    }
}

/// A loaded catalog bound to the files it came from
pub struct Session {
    pub engine: CatalogEngine,
    pub files: DataFiles,
}

impl Session {
    /// Load all data files into a fresh engine
    pub async fn open(files: DataFiles) -> Result<Self> {
        let mut engine = CatalogEngine::new();
        let reports = engine
            .load_all(&files)
            .await
            .context("Failed to load library data")?;

        for report in &reports {
            warn_skipped(report);
        }

        Ok(Self { engine, files })
    }

    /// Write everything back. Failures are reported, never propagated.
    pub async fn persist(&self) -> bool {
        match self.engine.save_all(&self.files).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save library data: {}", e);
                eprintln!("[Save failed: {}]", e);
                false
            }
        }
    }
}

fn warn_skipped(report: &LoadReport) {
    if report.is_clean() {
        return;
    }
    let invalid_numbers = report.invalid_numbers().count();
    eprintln!(
        "[{}: skipped {} line(s), {} with invalid numbers]",
        report.path.display(),
        report.skipped.len(),
        invalid_numbers
    );
    for skipped in &report.skipped {
        eprintln!("  {}", skipped.to_error());
    }
}

impl Cli {
    /// Data files after applying command-line overrides
    fn data_files(&self) -> Result<DataFiles> {
        let mut files = config::data_files()?;
        if let Some(ref path) = self.users_file {
            files.users = path.clone();
        }
        if let Some(ref path) = self.resources_file {
            files.resources = path.clone();
        }
        if let Some(ref path) = self.loans_file {
            files.loans = path.clone();
        }
        Ok(files)
    }

    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let files = self.data_files()?;
        let mut session = Session::open(files).await?;
        run_command(&mut session, self.command).await
    }
}

/// Run a one-shot command against a loaded session
async fn run_command(session: &mut Session, command: Commands) -> Result<()> {
    let engine = &mut session.engine;

    match command {
        Commands::User {
            command: UserCommands::Add { id, name },
        } => {
            engine.try_add_user(User::new(id, name.join(" ")))?;
            println!("User added.");
            session.persist().await;
        }
        Commands::User {
            command: UserCommands::List { json },
        } => {
            if json {
                println!("{}", serde_json::to_string_pretty(engine.users())?);
            } else {
                print!("{}", render::users(engine.users()));
            }
        }
        Commands::Resource {
            command: ResourceCommands::Add { resource },
        } => {
            engine.try_add_resource(resource.into())?;
            println!("Resource added.");
            session.persist().await;
        }
        Commands::Resource {
            command: ResourceCommands::List { kind, json },
        } => {
            let resources: Vec<&Resource> = match kind {
                Some(k) => engine.resources_of_type(k.into()),
                None => engine.resources().iter().collect(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&resources)?);
            } else {
                print!("{}", render::resources(&resources));
            }
        }
        Commands::Resource {
            command: ResourceCommands::Show { id },
        } => match engine.get_resource(&id) {
            Some(resource) => println!("{}", resource.describe()),
            None => anyhow::bail!("No resource found with id '{}'", id),
        },
        Commands::Loan {
            resource_id,
            user_id,
        } => {
            let receipt = engine.loan(&resource_id, &user_id)?;
            println!("Resource loaned to {}.", receipt.user_name);
            session.persist().await;
        }
        Commands::Return { resource_id } => {
            engine.return_resource(&resource_id)?;
            println!("Resource returned.");
            session.persist().await;
        }
        Commands::History { json } => {
            let entries = engine.history_entries();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print!("{}", render::history(&entries));
            }
        }
        Commands::Shell => shell::run_stdio(session).await?,
        Commands::Config => show_config(&session.files)?,
    }

    Ok(())
}

/// Show resolved configuration
fn show_config(files: &DataFiles) -> Result<()> {
    let cfg = config::config()?;

    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Data dir:   {}", cfg.data_dir.display());
    println!("  Users:      {}", files.users.display());
    println!("  Resources:  {}", files.resources.display());
    println!("  Loans:      {}", files.loans.display());

    Ok(())
}
