use clap::Parser;
use taograb::{cli::Cli, config::Config, logging, run};
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!(target = "taograb", error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let opts = run::RunOptions {
        output: cli.output,
        state_file: cli.state,
    };

    if let Err(err) = run::execute(&config, &opts).await {
        error!(target = "taograb", error = %err, "run failed");
        std::process::exit(1);
    }
}
