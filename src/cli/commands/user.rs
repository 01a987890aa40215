use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use crate::cli::utils::output_records;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::Bootstrap;
use crate::schema::NewUser;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Insert a user record")]
    Add(AddArgs),

    #[command(about = "Show a user by username")]
    Get {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "List recently created users")]
    List {
        #[arg(long, default_value_t = 20, help = "Maximum number of users")]
        limit: i64,
    },
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long, help = "RFC 3339 timestamp; defaults to now")]
    pub created: Option<DateTime<Utc>>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long, help = "Reject malformed email, username or website")]
    pub validate: bool,
}

impl From<AddArgs> for NewUser {
    fn from(args: AddArgs) -> Self {
        NewUser {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            username: args.username,
            password: args.password,
            created: args.created,
            website: args.website,
        }
    }
}

pub async fn handle(cmd: UserCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let bootstrap = Bootstrap::new(config.database.clone());
    let connection = bootstrap.connect().await?;

    let result = match cmd {
        UserCommands::Add(args) => {
            let validate = args.validate;
            let input = NewUser::from(args);
            if validate {
                input.validate()?;
            }
            let user = connection.users().insert(input).await?;
            output_records(output_format, &[user.readable()])
        }
        UserCommands::Get { username } => {
            let user = connection.users().find_by_username(&username).await?;
            output_records(output_format, &[user.readable()])
        }
        UserCommands::List { limit } => {
            let found = connection.users().list(limit).await?;
            let readable: Vec<_> = found.iter().map(|u| u.readable()).collect();
            output_records(output_format, &readable)
        }
    };

    connection.close().await;
    result
}
