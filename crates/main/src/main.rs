use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use character_sheet::config::DEFAULT_ENDPOINT;
use character_sheet::{
    CharacterSheet, GenerateOutcome, GeneratorClient, GeneratorConfig, SheetController,
    SheetExporter,
};
use clap::{Parser, Subcommand};
use log::info;

/// Generates tabletop-RPG character sheets and exports them to PDF.
///
/// PDF exports need the Roboto fonts under `assets/fonts` (or a directory given
/// through `FICHA_FONTS_DIR`); a system font family is used when they are missing.
#[derive(Parser)]
#[command(author, version, about = "Character sheet generator client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a new sheet from the generator and print it.
    #[command(name = "generate", aliases = ["gerar", "new"])]
    Generate {
        /// Base URL of the generator (falls back to `FICHA_ENDPOINT`).
        #[arg(long)]
        endpoint: Option<String>,

        /// Also export the sheet to PDF.
        #[arg(long)]
        export: bool,

        /// Directory the PDF is written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Print the raw sheet JSON instead of the formatted view.
        #[arg(long)]
        json: bool,
    },

    /// Print a saved sheet JSON file.
    #[command(name = "show")]
    Show {
        /// Sheet JSON file as returned by the generator.
        file: PathBuf,
    },

    /// Export a saved sheet JSON file to PDF.
    #[command(name = "export", aliases = ["exportar", "pdf"])]
    Export {
        /// Sheet JSON file as returned by the generator.
        file: PathBuf,

        /// Directory the PDF is written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "character_sheet=info,ficha=info");
    }
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            endpoint,
            export,
            out_dir,
            json,
        } => generate(endpoint, export, &out_dir, json).await,
        Commands::Show { file } => show(&file),
        Commands::Export { file, out_dir } => export_file(&file, &out_dir),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

async fn generate(
    endpoint: Option<String>,
    export: bool,
    out_dir: &Path,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let endpoint = endpoint
        .or_else(|| env::var("FICHA_ENDPOINT").ok())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let controller =
        SheetController::new(GeneratorClient::new(GeneratorConfig::new().with_endpoint(endpoint)));

    eprintln!("Gerando...");
    match controller.generate().await {
        GenerateOutcome::Applied => {}
        GenerateOutcome::Failed(err) => return Err(err.into()),
        GenerateOutcome::Superseded => return Ok(()),
    }

    if let Some(sheet) = controller.sheet() {
        if json {
            println!("{}", serde_json::to_string_pretty(sheet.as_ref())?);
        } else if let Some(layout) = controller.layout() {
            print!("{layout}");
        }
    }

    if export {
        if let Some(path) = controller.export_to(&SheetExporter::default(), out_dir)? {
            println!("Generated {}", path.display());
        }
    }
    Ok(())
}

fn load_sheet(file: &Path) -> Result<CharacterSheet, Box<dyn Error>> {
    let body = fs::read_to_string(file)?;
    let sheet = CharacterSheet::from_json(&body)?;
    info!("Loaded {} {} from {}", sheet.race(), sheet.class(), file.display());
    Ok(sheet)
}

fn show(file: &Path) -> Result<(), Box<dyn Error>> {
    let sheet = load_sheet(file)?;
    print!("{}", character_sheet::layout::render_sheet(&sheet));
    Ok(())
}

fn export_file(file: &Path, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let sheet = load_sheet(file)?;
    if let Some(path) = SheetExporter::default().export(Some(&sheet), out_dir)? {
        println!("Generated {}", path.display());
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
