use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::Bootstrap;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Connect, register the User schema and ensure its table")]
    Connect,

    #[command(about = "Print the DDL generated for the User schema")]
    Schema,
}

pub async fn handle(cmd: DbCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let bootstrap = Bootstrap::new(config.database.clone());

    match cmd {
        DbCommands::Connect => {
            let connection = bootstrap.connect().await?;
            connection.health_check().await?;

            output_success(
                output_format,
                &format!("Connected to {}", connection.endpoint()),
                Some(json!({
                    "endpoint": connection.endpoint(),
                    "schemas": bootstrap.registry().names(),
                })),
            )?;

            connection.close().await;
            Ok(())
        }
        DbCommands::Schema => {
            let schema = crate::database::register_user_schema(bootstrap.registry());
            let ddl = schema.create_table_sql();

            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    &format!("Schema {}", schema.name()),
                    Some(json!({ "table": schema.table(), "ddl": ddl })),
                ),
                OutputFormat::Text => {
                    println!("{};", ddl);
                    Ok(())
                }
            }
        }
    }
}
