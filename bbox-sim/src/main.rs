//! Point d'entrée CLI pour bbox-sim

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use bbox_sim::cli::{self, Commands, ConfigArgs};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Simuler le trafic d'une emprise OSM avec SUMO
#[derive(Parser)]
#[command(name = "bbox-sim")]
#[command(author, version)]
#[command(about = "Simuler le trafic d'une emprise OpenStreetMap avec SUMO, avec injection de route optionnelle")]
#[command(long_about = "Télécharge l'emprise depuis Overpass, construit le réseau avec netconvert, injecte éventuellement une route proposée, génère des trajets aléatoires puis simule avec SUMO.\n\nPar défaut, démarre le service HTTP (POST /simulate).")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: serve)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Serve { bind, config }) => {
            cli::cmd_serve(&config, bind).await?;
        }
        Some(Commands::Run {
            bbox,
            from,
            to,
            infra_type,
            output,
            config,
        }) => {
            let road = cli::road_from_args(from, to, infra_type);
            info!(bbox = %bbox, road = road.is_some(), output = %output.display(), "Running single simulation");
            cli::cmd_run(&config, bbox, road, &output).await?;
        }
        Some(Commands::ConvertTrace { input, output }) => {
            cli::cmd_convert_trace(&input, &output)?;
        }
        None => {
            // Commande par défaut: service HTTP
            cli::cmd_serve(&ConfigArgs::default(), None).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
