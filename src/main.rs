use chrono::Local;
use clap::{Parser, Subcommand};
use congregation_sync::network::Network;
use congregation_sync::sync::{self, SyncOptions};
use congregation_sync::{config, logging, output, rename};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "congregation-sync")]
#[command(about = "Keep the congregation checklist in step with the photo albums")]
#[command(long_about = "\
Keep the congregation checklist in step with the photo albums

Every folder under the albums path that holds at least one image is a
member. `sync` adds new members to the checklist YAML, refreshes each
member's image list, recounts the summary and appends an update-log entry.
Members are never removed.

Layout:

  public/photos/albums/
  ├── Alice Mendoza/
  │   ├── 01.jpg
  │   └── 02.png
  └── Bob Reyes/
      └── portrait.webp

Settings are read from ./congregation.toml when present; run
'congregation-sync gen-config' for a documented template.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./congregation.toml if it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Albums root directory (overrides config)
    #[arg(long, global = true)]
    albums: Option<PathBuf>,

    /// Checklist YAML file (overrides config)
    #[arg(long, global = true)]
    record: Option<PathBuf>,

    /// Log per-folder detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the albums and update the checklist
    Sync {
        /// Print the resulting document instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the checklist members and summary without changing anything
    Status {
        /// Print the whole document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the house network file
    #[command(subcommand)]
    House(HouseCommand),
    /// Rename the images in a folder to <BASE_NAME><N>.<ext>
    Rename {
        /// Folder holding the images
        dir: PathBuf,
        /// Prefix for the new names, e.g. grandFellowship_part3_2025_
        base_name: String,
        /// First sequence number
        #[arg(long, default_value_t = 1)]
        start: u32,
        /// Extension to include (repeatable; default from config)
        #[arg(long = "ext")]
        extensions: Vec<String>,
        /// Show the renames without performing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a stock congregation.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum HouseCommand {
    /// Add a new house and its leader
    Add { name: String, leader: String },
    /// Add a member to an existing house
    Member { house: String, member: String },
    /// List houses with their leaders and member counts
    List,
}

/// Config-related flags, applied on top of the loaded config file.
struct Overrides {
    config: Option<PathBuf>,
    albums: Option<PathBuf>,
    record: Option<PathBuf>,
}

impl Overrides {
    fn load(self) -> Result<config::SyncConfig, config::ConfigError> {
        let mut cfg = config::load_config(self.config.as_deref())?;
        if let Some(albums) = self.albums {
            cfg.albums_path = albums;
        }
        if let Some(record) = self.record {
            cfg.record_file = record;
        }
        Ok(cfg)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let overrides = Overrides {
        config: cli.config,
        albums: cli.albums,
        record: cli.record,
    };

    match cli.command {
        Command::Sync { dry_run } => {
            let cfg = overrides.load()?;
            let report = sync::run(&cfg, SyncOptions { dry_run }, Local::now())?;
            output::print_sync_report(&report);
        }
        Command::Status { json } => {
            let cfg = overrides.load()?;
            let store = sync::inspect(&cfg, Local::now())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&store)?);
            } else {
                output::print_status(&store);
            }
        }
        Command::House(house) => {
            let cfg = overrides.load()?;
            let path = &cfg.network_file;
            let mut network = Network::load(path)?;
            match house {
                HouseCommand::Add { name, leader } => {
                    network.add_house(&name, &leader, &Local::now())?;
                    network.save(path)?;
                    println!("Added house '{}' with leader '{}'", name, leader);
                }
                HouseCommand::Member { house, member } => {
                    let stored = network.add_member(&house, &member, &Local::now())?;
                    network.save(path)?;
                    println!("Added '{}' to {}", member, stored);
                }
                HouseCommand::List => output::print_houses(&network),
            }
        }
        Command::Rename {
            dir,
            base_name,
            start,
            extensions,
            dry_run,
        } => {
            let cfg = overrides.load()?;
            let extensions = if extensions.is_empty() {
                cfg.rename.extensions.clone()
            } else {
                extensions
                    .iter()
                    .map(|e| e.trim_start_matches('.').to_string())
                    .collect()
            };
            let plan = rename::plan_renames(&dir, &base_name, &extensions, start)?;
            output::print_rename_plan(&plan);
            if !dry_run {
                let moved = rename::apply(&plan)?;
                println!("Renamed {} files", moved);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
