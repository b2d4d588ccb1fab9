//! A headless runner: load a prepared road network, simulate a fixed-size vehicle fleet over a
//! time span, and write the packed calendar binary to disk.
//!
//!     headless --network montlake.json --vehicle-count 100 --time-span 100 --seed 0 --output out.bin

use anyhow::{Context, Result};
use structopt::StructOpt;

use abstutil::Timer;

#[derive(StructOpt)]
#[structopt(name = "headless", about = "Runs the traffic simulation without a UI")]
struct Opt {
    /// Path to a prepared road network JSON file (a `RawNetwork`)
    #[structopt(long)]
    network: String,

    /// How many vehicles to keep in the fleet for the whole run
    #[structopt(long, default_value = "100")]
    vehicle_count: usize,

    /// How many simulated seconds to run
    #[structopt(long, default_value = "100")]
    time_span: f64,

    /// Seed for the run's single RNG stream
    #[structopt(long, default_value = "0")]
    seed: u32,

    /// Where to write the packed calendar binary
    #[structopt(long)]
    output: String,
}

fn main() -> Result<()> {
    abstutil::setup_logger();
    let opt = Opt::from_args();

    let raw: map_model::RawNetwork =
        abstutil::read_json(&opt.network, &mut Timer::new("load network"))
            .with_context(|| format!("loading network from {}", opt.network))?;
    let network = map_model::load(raw).unwrap();

    log::info!(
        "simulating {} vehicles for {}s over {} ways, seed {}",
        opt.vehicle_count,
        opt.time_span,
        network.ways.len(),
        opt.seed,
    );

    let sim = sim::Sim::new(network, opt.vehicle_count, opt.seed);
    let (calendar, network) = sim.run(geom::Duration::seconds(opt.time_span));

    let packed = calendar.pack(&network);
    std::fs::write(&opt.output, &packed).with_context(|| format!("writing {}", opt.output))?;
    log::info!(
        "wrote {} car events and {} crossroad events to {}",
        calendar.car_events.len(),
        calendar.crossroad_events.len(),
        opt.output
    );
    Ok(())
}
