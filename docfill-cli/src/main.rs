use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docfill::SlotChoice;
use docfill_cli::{
    CliError, FillConfig, FillRequest, fill::write_output, read_payload_source, run_fill,
    run_groups, run_parse,
};
use env_logger::Env;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect the format of a scanner payload and print the parsed record.
    Parse {
        /// File holding the payload
        #[arg(short, long, conflicts_with = "text")]
        input: Option<PathBuf>,
        /// The payload itself
        #[arg(short, long)]
        text: Option<String>,
        /// Expand every known field alias (hoTen, ho_ten, ho_va_ten, ...)
        #[arg(long)]
        normalize: bool,
    },

    /// List the placeholder groups and numbered slots of a template.
    Groups {
        /// Template file (plain text or word/document.xml)
        #[arg(short, long)]
        template: PathBuf,
    },

    /// Fill a template from one or more payload files.
    Fill {
        /// Template file (plain text)
        #[arg(short, long)]
        template: PathBuf,
        /// Payload files, applied in order
        #[arg(short, long, required = true, num_args = 1..)]
        data: Vec<PathBuf>,
        /// Slot to fill: `default` or a number
        #[arg(short, long)]
        slot: Option<String>,
        /// Write the resulting fill state as JSON
        #[arg(long)]
        state: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// TOML fill configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Show `{key}` for slot placeholders that received no value
        #[arg(long)]
        restrict: bool,
    },
}

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));
    let args = Args::parse();

    if let Err(e) = run(args.commands) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Parse {
            input,
            text,
            normalize,
        } => {
            let payload = read_payload_source(input.as_deref(), text.as_deref())?;
            let output = run_parse(&payload, normalize);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Groups { template } => {
            let output = run_groups(&template)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Fill {
            template,
            data,
            slot,
            state,
            output,
            config,
            restrict,
        } => {
            let mut config = FillConfig::load_or_default(config.as_deref())?;
            if restrict {
                config.merge.restrict_to_selection = true;
            }
            let slot = slot
                .map(|s| s.parse::<SlotChoice>())
                .transpose()?;
            let result = run_fill(&FillRequest {
                template,
                data,
                slot,
                config,
            })?;

            for path in &result.skipped {
                eprintln!("Warning: could not understand data in {}", path.display());
            }
            if let Some(state) = state {
                let json = serde_json::to_string_pretty(result.session.fill_state())?;
                write_output(&state, json.as_bytes())?;
            }
            match output {
                Some(path) => write_output(&path, &result.output)?,
                None => print!("{}", String::from_utf8_lossy(&result.output)),
            }
        }
    }
    Ok(())
}
