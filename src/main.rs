mod cli;

use clap::Parser;
use cli::Cli;
use env_logger::Env;
use log::debug;
use portstat::{PortMonitor, ProcFs};

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    debug!("{cli:?}");

    let monitor = PortMonitor::new(cli.config(), ProcFs::new(&cli.proc_root))
        .interval(cli.interval())
        .format(cli.format());

    let stdout = std::io::stdout();
    if let Err(e) = monitor.run(&mut stdout.lock()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
