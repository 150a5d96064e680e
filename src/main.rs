//! HR attrition pipeline entry point

use clap::Parser;
use hr_attrition::cli::{
    cmd_eda, cmd_engineer, cmd_info, cmd_predict, cmd_preprocess, cmd_run, cmd_serve, cmd_train,
    Cli, Commands,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hr_attrition=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let paths = cli.paths.resolve();

    match cli.command {
        Commands::Preprocess => cmd_preprocess(&paths)?,
        Commands::Engineer => cmd_engineer(&paths)?,
        Commands::Train { seed, n_estimators } => cmd_train(&paths, seed, n_estimators)?,
        Commands::Predict { data, output } => cmd_predict(&paths, &data, output.as_deref())?,
        Commands::Eda => cmd_eda(&paths)?,
        Commands::Info { data } => cmd_info(data.as_deref().unwrap_or(&paths.raw_data))?,
        Commands::Serve { port, host } => cmd_serve(&host, port, paths).await?,
        Commands::Run { seed } => cmd_run(&paths, seed)?,
    }

    Ok(())
}
