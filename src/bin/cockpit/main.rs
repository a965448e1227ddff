use clap::Parser;
use context_hmi::{
    args::{
        CockpitArgs,
        CommandTask::{Run, Trace},
    },
    config::SimConfig,
    gui::run_cockpit,
    trace::record,
};

use log::{error, info};
use std::{error::Error, process::ExitCode};

// Example:
// cargo run --bin cockpit -- run --attention 85 --complexity 20
// cargo run --bin cockpit -- --config sim.ron trace -n 600 --out trace.ron

fn main() -> ExitCode {
    env_logger::init();
    let args = CockpitArgs::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("cockpit: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CockpitArgs) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            SimConfig::from_path(path)?
        }
        None => SimConfig::default(),
    };

    match args.command {
        Run(cmd) => {
            let config = cmd.session.apply(config);
            run_cockpit(config)?;
        }
        Trace(cmd) => {
            let config = cmd.session.apply(config);
            let trace = record(&config, config.defaults, cmd.frames);
            trace.to_path(&cmd.outfile)?;
            info!("trace written to {}", cmd.outfile.display());
        }
    }

    Ok(())
}
