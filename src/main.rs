use std::time::Instant;

use log::{error, info};
use popsynth::{Problem, Result, SynthesisError};

const TOP_ROWS: usize = 20;

fn main() {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Some(path) = std::env::args().nth(1) else {
        return Err(SynthesisError::InvalidParameter(
            "usage: popsynth <problem.json>".to_string(),
        ));
    };
    let start = Instant::now();
    let problem = Problem::from_json_file(&path)?;
    info!("{}", problem.config);

    let (dict, synthesis) = problem.run()?;
    info!("{}", synthesis.report);

    println!("{:>8}  coordinate", "count");
    for (coordinate, count) in synthesis.tally().into_iter().take(TOP_ROWS) {
        println!("{count:>8}  {}", coordinate.describe(&dict));
    }
    info!(
        "Drew {} individuals in {:?}",
        synthesis.draws.len(),
        start.elapsed()
    );
    Ok(())
}
