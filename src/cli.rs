use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use portstat::source::DEFAULT_PROC_ROOT;
use portstat::{AddressFamily, Config, OutputFormat};

#[derive(Parser, Debug, Clone)]
#[command(name = "portstat")]
#[command(
    author,
    version,
    about = "Monitor TCP available ports",
    long_about = "portstat reports the outbound TCP connection tuples with the fewest \
                  local ephemeral ports left, read from /proc/net/tcp and /proc/net/tcp6",
    after_help = "Examples:
  portstat
    Connect                                 UsedPorts  AvailablePorts
    192.168.170.132->192.168.170.132:22     2          28229
    127.0.0.1->127.0.0.1:22                 1          28230
  portstat --prom
    tcp_used_ports_total{connect=\"192.168.170.132->192.168.170.132:22\"} 2
    tcp_available_ports_total{connect=\"192.168.170.132->192.168.170.132:22\"} 28229"
)]
pub struct Cli {
    /// Monitor interval, in seconds
    #[arg(short = 'i', long = "interval", default_value_t = 3)]
    pub interval: u64,

    /// Number of tuples with the fewest available ports to print
    #[arg(short = 'n', long = "number", default_value_t = 10)]
    pub number: usize,

    /// Print once in Prometheus exposition format; the interval is ignored
    #[arg(short = 'p', long = "prom")]
    pub prom: bool,

    /// IP version, 4 or 6; anything else means both
    #[arg(
        short = 'e',
        long = "ip-version",
        alias = "ipVersion",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub ip_version: i64,

    /// procfs mount to read from
    #[arg(long = "proc-root", value_name = "PATH", default_value = DEFAULT_PROC_ROOT)]
    pub proc_root: PathBuf,
}

impl Cli {
    /// Snapshot configuration for the selected families and count
    pub fn config(&self) -> Config {
        Config::new()
            .top_n(self.number)
            .families(AddressFamily::select(self.ip_version))
    }

    pub fn format(&self) -> OutputFormat {
        if self.prom {
            OutputFormat::Prometheus
        } else {
            OutputFormat::Table
        }
    }

    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}
