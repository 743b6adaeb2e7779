use clap::{Parser, Subcommand};

const VERSION: &str = match option_env!("APP_VERSION") {
    Some(version) => version,
    _ => "0.1.0-dev",
};

#[derive(Parser)]
#[command(name = "campdir", version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Starts the campdir server on the configured port
    Start {
        /// Path for the configuration file or http(s) link to config file.
        #[arg(required = true)]
        config_path: String,
    },
    /// Checks the configuration file for errors
    Check {
        /// Path for the configuration file or http(s) link to config file.
        #[arg(required = true)]
        config_path: String,
    },
    /// Creates an account directly in the database.
    /// Useful for bootstrapping the first admin.
    Init {
        /// Path for the configuration file or http(s) link to config file.
        #[arg(required = true)]
        config_path: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// user, publisher or admin. Defaults to admin.
        #[arg(short, long)]
        role: Option<String>,
    },
    /// Imports bootcamps, courses, reviews and users from JSON files
    Seed {
        /// Path for the configuration file or http(s) link to config file.
        #[arg(required = true)]
        config_path: String,
        /// Directory holding bootcamps.json, courses.json, reviews.json
        /// and users.json. Missing files are skipped.
        #[arg(short, long, default_value = "_data")]
        data_dir: String,
        /// Clears every collection instead of importing
        #[arg(long)]
        drop: bool,
    },
}
