use clap::Parser;
use greeter_api::cli::Cli;
use greeter_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    greeter_api::init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    if let Err(e) = greeter_api::cli::run(cli, config).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
