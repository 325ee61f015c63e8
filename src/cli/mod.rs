pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "useradmin")]
#[command(about = "useradmin - provision and remove users through the User Admin API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "USERADMIN_URL",
        default_value = "http://localhost:3000/admin-users",
        help = "Admin endpoint URL"
    )]
    pub url: String,

    #[arg(
        long,
        global = true,
        env = "USERADMIN_TOKEN",
        hide_env_values = true,
        help = "Bearer token of the calling admin"
    )]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create a user in the identity provider and both tables")]
    Create {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, env = "USERADMIN_PASSWORD", hide_env_values = true, help = "Initial password")]
        password: String,
        #[arg(long, help = "Full name")]
        full_name: Option<String>,
        #[arg(long, help = "Role (server default: student)")]
        role: Option<String>,
    },

    #[command(about = "Delete a user by id")]
    Delete {
        #[arg(help = "User id (UUID)")]
        user_id: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let token = cli
        .token
        .clone()
        .ok_or_else(|| anyhow::anyhow!("missing bearer token (use --token or USERADMIN_TOKEN)"))?;
    let client = commands::AdminClient::new(cli.url.clone(), token);

    match cli.command {
        Commands::Create { email, password, full_name, role } => {
            commands::create(&client, email, password, full_name, role, output_format).await
        }
        Commands::Delete { user_id } => commands::delete(&client, user_id, output_format).await,
    }
}
