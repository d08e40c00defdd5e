pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "wardrobe",
    about = "Wardrobe operator CLI",
    long_about = "Inspect configuration, check stylist and weather readiness, and run outfit recommendations against a closet file.",
    after_help = "Examples:\n  wardrobe doctor --json\n  wardrobe config\n  wardrobe recommend --closet closet.json --occasion office --temperature 9"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and stylist/weather client readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Rank outfits from a closet JSON file and print the validated advice")]
    Recommend {
        #[arg(long, help = "Path to a JSON array of closet items")]
        closet: PathBuf,
        #[arg(long, help = "Occasion label; defaults to recommend.default_occasion")]
        occasion: Option<String>,
        #[arg(long, help = "Temperature in degrees Celsius; skips the weather lookup")]
        temperature: Option<f64>,
        #[arg(long, help = "Weather description, e.g. \"light rain\"")]
        conditions: Option<String>,
        #[arg(long, help = "City for the weather lookup; defaults to weather.default_city")]
        city: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Recommend { closet, occasion, temperature, conditions, city } => {
            commands::recommend::run(commands::recommend::RecommendArgs {
                closet,
                occasion,
                temperature,
                conditions,
                city,
            })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
