use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use deeppcb2yolo::overlay::render_overlay;
use deeppcb2yolo::{collect_dataset, prepare_dataset, split_dataset, verify_dataset, Cli, Command};

fn run(cli: Cli) -> deeppcb2yolo::Result<bool> {
    match cli.command {
        Command::Collect(args) => {
            if !args.raw_dir.exists() {
                error!("The specified raw_dir does not exist: {}", args.raw_dir.display());
                return Ok(false);
            }
            info!("Starting the collection process...");
            collect_dataset(&args.raw_dir, &args.output_dir, &args.annotation_suffix)?;
            info!("Collection completed successfully.");
            Ok(true)
        }
        Command::Split(args) => {
            info!("Starting the split process...");
            split_dataset(&args)?;
            info!("Split completed successfully.");
            Ok(true)
        }
        Command::Prepare(args) => {
            if !args.raw_dir.exists() {
                error!("The specified raw_dir does not exist: {}", args.raw_dir.display());
                return Ok(false);
            }
            info!("Starting the conversion process...");
            let report = prepare_dataset(&args)?;
            Ok(report.is_ready())
        }
        Command::Verify(args) => {
            let report = verify_dataset(&args.output_dir);
            report.log_summary();
            Ok(report.is_ready())
        }
        Command::Overlay(args) => {
            render_overlay(&args)?;
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
