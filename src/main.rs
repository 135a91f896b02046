use clap::{Parser, Subcommand};
use std::io;
use termfx::config::{SaverConfig, SaverType};
use termfx::viz;

#[derive(Parser)]
#[command(name = "termfx")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.2.0")]
#[command(about = "Terminal screensaver effects: fireworks, lightning, plasma and friends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an animated screensaver (fireworks, lightning, plasma, tunnel)
    Saver {
        /// Type of screensaver: fireworks, lightning, plasma, tunnel
        #[arg(short = 'T', long, default_value = "fireworks")]
        saver_type: String,

        /// Animation speed (seconds per frame)
        #[arg(short, long, default_value = "0.03")]
        time: f32,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Named effect preset (fireworks: classic, finale, sparklers;
        /// lightning: storm, distant, strobe)
        #[arg(short, long)]
        preset: Option<String>,
    },
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Saver {
            saver_type,
            time,
            seed,
            preset,
        } => {
            let stype = match saver_type.to_lowercase().as_str() {
                "fireworks" | "fw" => SaverType::Fireworks,
                "lightning" | "bolt" | "storm" => SaverType::Lightning,
                "plasma" => SaverType::Plasma,
                "tunnel" | "rings" => SaverType::Tunnel,
                _ => {
                    eprintln!("Unknown saver type: {}. Using fireworks.", saver_type);
                    eprintln!("Available: fireworks, lightning, plasma, tunnel");
                    SaverType::Fireworks
                }
            };
            let config = SaverConfig {
                saver_type: stype,
                time_step: time,
                seed,
                preset,
            };
            viz::run(config)?;
        }
    }

    Ok(())
}
