use std::sync::Arc;

use hnsd_core::panic::configure_panic;
use hnsd_core::signals::Signals;
use hnsd_core::{info, trace};

mod args;
mod daemon;

use args::Args;

fn main() {
    let args = Args::parse();

    hnsd_core::log::init_logger(args.log_dir.as_deref(), &args.log_level);
    configure_panic();

    trace!("hnsd starting...");
    info!("network: {}", args.network);

    let core = daemon::create_core(&args);

    let signals = Arc::new(Signals::new(core.clone()));
    signals.init();

    core.run();

    trace!("hnsd is finished...");
}
