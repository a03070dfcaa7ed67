mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sdkutil")]
#[command(about = "Escape XML content and format REST URI paths", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Escape text for XML content, reading stdin when no text is given
    Escape {
        texts: Vec<String>,

        #[arg(long)]
        patterns: bool,
    },
    /// Format a URI path template
    Format {
        template: String,

        /// JSON array of positional values, `null` marks an absent value
        #[arg(long, conflicts_with = "named")]
        values: Option<String>,

        /// JSON object mapping placeholder or query names to values
        #[arg(long)]
        named: Option<String>,
    },
    /// Render every entry of a TOML request file
    Batch { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Escape { texts, patterns } => commands::escape_texts(&texts, patterns),
        Commands::Format {
            template,
            values,
            named,
        } => commands::format_template(&template, values.as_deref(), named.as_deref()),
        Commands::Batch { file } => commands::render_batch(&file),
    };

    if let Err(error) = result {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
