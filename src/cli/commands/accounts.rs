use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{Context, OutputFormat};
use crate::dto::{SignUpRequest, Validate};
use crate::types::Role;

#[derive(Subcommand)]
pub enum AccountCommands {
    #[command(about = "List every account with its role and content")]
    List,

    #[command(about = "Create an ADMIN account")]
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "PLATFORM_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    #[command(about = "Promote a USER to EDITOR")]
    Upgrade {
        #[arg(help = "Account id")]
        id: i64,
    },

    #[command(about = "Demote an EDITOR to USER")]
    Downgrade {
        #[arg(help = "Account id")]
        id: i64,
    },
}

pub async fn handle(ctx: &Context, cmd: AccountCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let auth = &ctx.state.auth;

    match cmd {
        AccountCommands::List => {
            let accounts = auth.list_accounts().await?;
            if accounts.is_empty() {
                return output_empty_collection(output_format, "accounts", "No accounts registered");
            }

            match output_format {
                OutputFormat::Json => output_collection("accounts", &accounts)?,
                OutputFormat::Text => {
                    println!("{:<6} {:<20} {:<30} {:<7} {:<8} {}", "ID", "NAME", "EMAIL", "ROLE", "STATE", "CONTENT");
                    println!("{}", "-".repeat(90));
                    for entry in &accounts {
                        let account = &entry.account;
                        let state = if account.is_active() { "active" } else { "deleted" };
                        let content = entry.posts.len()
                            + entry.magazines.len()
                            + entry.job_postings.len()
                            + entry.tea_ratings.len();
                        println!(
                            "{:<6} {:<20} {:<30} {:<7} {:<8} {}",
                            account.id, account.name, account.email, account.role, state, content
                        );
                    }
                }
            }
            Ok(())
        }
        AccountCommands::CreateAdmin { name, email, password } => {
            let request = SignUpRequest { name, email, password };
            if let Err(errors) = request.validate() {
                let mut fields: Vec<_> = errors.into_iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                fields.sort();
                return Err(anyhow::anyhow!("Invalid admin account: {}", fields.join(", ")));
            }

            let account = auth.sign_up(request, Role::Admin).await?;
            output_success(
                output_format,
                &format!("Created ADMIN account {} ({})", account.id, account.email),
                Some(json!({ "account": account })),
            )
        }
        AccountCommands::Upgrade { id } => change_role(ctx, id, Role::Editor, output_format).await,
        AccountCommands::Downgrade { id } => change_role(ctx, id, Role::User, output_format).await,
    }
}

async fn change_role(ctx: &Context, id: i64, target: Role, output_format: OutputFormat) -> anyhow::Result<()> {
    let account = ctx.state.auth.update_role(id, target).await?;
    output_success(
        output_format,
        &format!("Account {} is now {}", account.id, account.role),
        Some(json!({ "account": account })),
    )
}
