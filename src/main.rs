//! Neurostate Agent CLI
//!
//! Real-time mental-state classification from a live EEG stream.

use clap::{Parser, Subcommand};
use neurostate_agent::{
    config::Config,
    core::{feature_names, rank_features, validate_schema, Windower},
    model::ForestModel,
    runner::run_loop,
    source::{ConnectionManager, RecoveryChoice, StreamSource, SyntheticSource, TROUBLESHOOTING},
    VERSION,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "neurostate")]
#[command(version = VERSION)]
#[command(about = "Real-time mental-state classification from EEG", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live classification loop
    Run {
        /// Path to the trained classifier model
        #[arg(long)]
        model: Option<PathBuf>,

        /// Path to the training matrix CSV used for feature selection
        #[arg(long)]
        training: Option<PathBuf>,

        /// Bluetooth address of the headset (prompted if absent)
        #[arg(long)]
        address: Option<String>,

        /// Skip the headset and use synthetic data directly
        #[arg(long)]
        synthetic: bool,
    },

    /// Show the ranked features selected from a training matrix
    Features {
        /// Path to the training matrix CSV
        #[arg(long)]
        training: Option<PathBuf>,

        /// Number of features to select
        #[arg(long)]
        count: Option<usize>,
    },

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            model,
            training,
            address,
            synthetic,
        } => {
            cmd_run(model, training, address, synthetic);
        }
        Commands::Features { training, count } => {
            cmd_features(training, count);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_run(
    model_path: Option<PathBuf>,
    training_path: Option<PathBuf>,
    address: Option<String>,
    synthetic: bool,
) {
    println!("Neurostate Agent v{VERSION}");
    println!();

    let mut config = Config::load().unwrap_or_default();
    if let Some(path) = model_path {
        config.model_path = path;
    }
    if let Some(path) = training_path {
        config.training_matrix_path = path;
    }
    if address.is_some() {
        config.device_address = address;
    }

    // Feature selection: one-time startup step, fixed for the whole run
    let trained_features = match rank_features(
        &config.training_matrix_path,
        config.selected_feature_count,
    ) {
        Ok(features) => features,
        Err(e) => {
            eprintln!("Error selecting features from training matrix: {e}");
            eprintln!("Check the --training path ({:?})", config.training_matrix_path);
            std::process::exit(1);
        }
    };
    println!("Selected {} features from training matrix", trained_features.len());

    // Load classifier
    let model = match ForestModel::load(&config.model_path) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Error loading classifier: {e}");
            eprintln!("Check the --model path ({:?})", config.model_path);
            std::process::exit(1);
        }
    };

    // The model's schema must match what selection derives from the matrix
    if model.feature_names() != trained_features.as_slice() {
        eprintln!("Error: classifier schema does not match the training matrix selection.");
        eprintln!("  Classifier expects: {:?}", model.feature_names());
        eprintln!("  Selection produced: {:?}", trained_features);
        eprintln!("Retrain the classifier or point --training at the matrix it was built from.");
        std::process::exit(1);
    }

    // Acquire a source (interactive retry/fallback on connection failure)
    let source = acquire_source(&config, synthetic);
    let mut windower = Windower::new(source, config.window_secs, config.drop_trailing_channels);

    // Fail on channel-count mismatch before any window is pulled
    let available = feature_names(&windower.channel_labels());
    if let Err(e) = validate_schema(&trained_features, &available) {
        eprintln!("Error: live source cannot produce the trained features: {e}");
        eprintln!(
            "The classifier was trained on a different channel configuration \
             than this source provides ({:?}).",
            windower.channel_labels()
        );
        std::process::exit(1);
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc_handler(r);

    println!();
    println!("=== Starting EEG Classification ===");
    println!("Press Ctrl+C to stop the program");
    println!();

    let exit_code = match run_loop(
        &mut windower,
        &trained_features,
        &model,
        &running,
        &mut io::stdout(),
    ) {
        Ok(_) => {
            println!();
            println!();
            println!("Program stopped by user");
            0
        }
        Err(e) => {
            eprintln!();
            eprintln!();
            eprintln!("Error during execution: {e}");
            1
        }
    };

    println!();
    println!("Cleaning up...");
    std::process::exit(exit_code);
}

/// Choose a stream source: hardware with operator-driven retry/fallback,
/// or synthetic directly when requested.
fn acquire_source(config: &Config, synthetic: bool) -> Box<dyn StreamSource> {
    if synthetic {
        println!("Using synthetic data (no headset).");
        return Box::new(SyntheticSource::new(
            config.sample_rate_hz,
            config.channel_labels.clone(),
        ));
    }

    let mut manager = ConnectionManager::new(config.bridge_addr.clone());
    let mut address = config.device_address.clone();

    loop {
        println!();
        println!("=== Headset Connection Setup ===");
        println!("1. Make sure your headset is:");
        println!("   - Turned on");
        println!("   - In pairing mode (blinking light)");
        println!("   - Fully charged");
        println!("2. Ensure Bluetooth is enabled on your computer");
        println!("3. Attempting to connect...");
        println!();

        let prompted = address.is_none();
        let addr = match address.clone() {
            Some(a) => a,
            None => prompt_line(
                "Please enter your headset's Bluetooth address (e.g. 00:55:da:b3:9a:2c): ",
            ),
        };

        println!("Attempting to connect to headset at {addr}...");
        match manager.connect(&addr) {
            Ok(source) => {
                println!("Connection successful!");
                return Box::new(source);
            }
            Err(e) => {
                eprintln!();
                eprintln!("Error connecting to headset: {e}");
                println!();
                println!("{TROUBLESHOOTING}");
                println!();
                println!("Would you like to:");
                println!("1. Try connecting again");
                println!("2. Use synthetic data for testing");

                let choice = match prompt_line("Enter your choice (1 or 2): ").as_str() {
                    "1" => RecoveryChoice::Retry,
                    _ => RecoveryChoice::Fallback,
                };
                match choice {
                    RecoveryChoice::Retry => {
                        // Re-prompt for the address only if it was typed in
                        if prompted {
                            address = None;
                        }
                        continue;
                    }
                    RecoveryChoice::Fallback => {
                        println!();
                        println!("Using synthetic data for testing...");
                        return Box::new(
                            manager
                                .fall_back(config.sample_rate_hz, config.channel_labels.clone()),
                        );
                    }
                }
            }
        }
    }
}

fn cmd_features(training_path: Option<PathBuf>, count: Option<usize>) {
    let config = Config::load().unwrap_or_default();
    let path = training_path.unwrap_or(config.training_matrix_path);
    let count = count.unwrap_or(config.selected_feature_count);

    match rank_features(&path, count) {
        Ok(features) => {
            println!("Top {} features from {:?}:", features.len(), path);
            for (rank, name) in features.iter().enumerate() {
                println!("{:3}. {name}", rank + 1);
            }
        }
        Err(e) => {
            eprintln!("Error selecting features: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}

/// Print a prompt and read one trimmed line from stdin.
fn prompt_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
    line.trim().to_string()
}
