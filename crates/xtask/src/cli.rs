use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile the console firmware
    Build {
        #[arg(long)]
        features: Option<String>,

        #[arg(long)]
        release: bool,
    },
    /// Compile and download the firmware to the board
    Flash {
        #[arg(long)]
        features: Option<String>,

        #[arg(long)]
        release: bool,

        /// Erase the whole chip first
        #[arg(long)]
        force: bool,
    },
    /// Flash, then stream the defmt log over RTT
    Run {
        #[arg(long)]
        features: Option<String>,

        #[arg(long)]
        release: bool,
    },
    /// Stream the defmt log of an already flashed board
    Attach {
        #[arg(long)]
        release: bool,
    },
    /// Run the driver and game tests on the host
    Test {
        /// Only test this crate
        #[arg(long, short)]
        package: Option<String>,
    },
}
