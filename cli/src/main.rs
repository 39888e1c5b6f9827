mod commands;
mod terminal;

use commands::{CommandLine, Commands, discover, identify, screenshot, send};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    let cfg = match commands.to_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    let quiet = commands.quiet;

    let result = match commands.command {
        Commands::Discover { resources, sweep } => {
            print::header("scanning for instruments", quiet);
            discover::discover(resources, sweep, &cfg, quiet).await
        }
        Commands::Identify { address } => {
            print::header("identify", quiet);
            identify::identify(&address, &cfg).await
        }
        Commands::Send { address, command } => {
            print::header("send command", quiet);
            send::send(&address, &command, &cfg).await
        }
        Commands::Screenshot { address, output } => {
            print::header("screenshot", quiet);
            screenshot::screenshot(&address, &output, &cfg).await
        }
    };

    if let Err(e) = result {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
    Ok(())
}
