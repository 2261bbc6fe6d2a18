//! # Course Ingest CLI (`course-ingest`)
//!
//! Initializes the course database, ingests local documents, browses stored
//! courses, and starts the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! course-ingest --config ./config/course-ingest.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `init` | Create the SQLite database and run schema migrations |
//! | `ingest <file>` | Turn a PDF, TXT or EPUB file into a course |
//! | `courses --user <id>` | List one uploader's courses |
//! | `course <id>` | Show a course and its chapters |
//! | `chapter <course> <chapter>` | Print one chapter |
//! | `serve` | Start the HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use course_ingest::{config, get, ingest, logging, migrate, server};

/// Course Ingest: turn documents into chaptered courses.
#[derive(Parser)]
#[command(
    name = "course-ingest",
    about = "Turn PDF, text and EPUB documents into chaptered courses",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/course-ingest.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `courses` and `chapters`
    /// tables. Safe to run repeatedly.
    Init,

    /// Ingest a local document as a new course.
    Ingest {
        /// Path to a `.pdf`, `.txt`/`.text` or `.epub` file.
        file: PathBuf,

        /// Uploader id recorded on the course.
        #[arg(long, default_value = "anonymous")]
        user: String,

        /// Run extraction and chaptering but do not save anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// List the courses created by one uploader, newest first.
    Courses {
        #[arg(long)]
        user: String,
    },

    /// Show a course and its chapter listing.
    Course {
        /// Course UUID.
        id: String,
    },

    /// Print a single chapter with its navigation ids.
    Chapter { course_id: String, chapter_id: String },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;
    logging::init_logging(&cfg.logging);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest {
            file,
            user,
            dry_run,
        } => {
            ingest::run_ingest_file(&cfg, &file, &user, dry_run).await?;
        }
        Commands::Courses { user } => {
            get::run_list_courses(&cfg, &user).await?;
        }
        Commands::Course { id } => {
            get::run_get_course(&cfg, &id).await?;
        }
        Commands::Chapter {
            course_id,
            chapter_id,
        } => {
            get::run_get_chapter(&cfg, &course_id, &chapter_id).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
