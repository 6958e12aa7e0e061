// Command-line surface

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fleetmon",
    version,
    about = "Polls server metrics, caches a fleet snapshot, and reports per-service health"
)]
pub struct Args {
    /// Print details of all servers
    #[arg(long)]
    pub printservers: bool,

    /// Print average cpu and memory usage of each service
    #[arg(long)]
    pub avg: bool,

    /// Print services with fewer healthy servers than the configured minimum
    #[arg(long)]
    pub unhealthyservices: bool,

    /// Watch one service's servers in a loop (repeatable)
    #[arg(long, num_args = 2, value_names = ["SERVICE", "REFRESH_SECS"], action = clap::ArgAction::Append)]
    pub service: Vec<String>,

    /// Upstream service port
    #[arg(long)]
    pub port: u16,
}

impl Args {
    /// Pairs up the flattened `--service NAME SECS` values.
    pub fn service_watches(&self) -> anyhow::Result<Vec<(String, u64)>> {
        self.service
            .chunks(2)
            .map(|pair| match pair {
                [service, secs] => {
                    let secs: u64 = secs.parse().map_err(|_| {
                        anyhow::anyhow!("--service refresh rate must be an integer, got {secs:?}")
                    })?;
                    Ok((service.clone(), secs))
                }
                _ => Err(anyhow::anyhow!(
                    "--service requires a name and a refresh rate"
                )),
            })
            .collect()
    }
}
