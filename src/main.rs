use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use essay_judge_client::api::{ImageUpload, StudentFilter, SubmissionFilter};
use essay_judge_client::utils::logging;
use essay_judge_client::{ApiClient, ClientConfig};

#[derive(Parser)]
#[command(name = "essay-judge", version, about = "Essay judge admin console client")]
struct AppCli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Where the session token is persisted
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or change the stored session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Backend health and build information
    Status,
    Students {
        #[command(subcommand)]
        action: StudentAction,
    },
    Classes {
        #[command(subcommand)]
        action: ListOnly,
    },
    Assignments {
        #[command(subcommand)]
        action: AssignmentAction,
    },
    Submissions {
        #[command(subcommand)]
        action: SubmissionAction,
    },
    ApiKeys {
        #[command(subcommand)]
        action: ListOnly,
    },
    Models {
        #[command(subcommand)]
        action: ListOnly,
    },
    UsageSettings {
        #[command(subcommand)]
        action: ListOnly,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    Show,
    Set {
        #[arg(long)]
        token: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        user_name: Option<String>,
    },
    Clear,
}

#[derive(Subcommand)]
enum ListOnly {
    List,
}

#[derive(Subcommand)]
enum StudentAction {
    List {
        #[arg(long)]
        class_id: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum AssignmentAction {
    /// List assignments; `--search` takes an id or part of a title
    List {
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
enum SubmissionAction {
    Search {
        #[arg(long)]
        assignment_id: Option<String>,
        #[arg(long)]
        student_id: Option<String>,
        #[arg(long)]
        top: Option<u32>,
    },
    Upload {
        assignment_id: String,
        image: PathBuf,
        #[arg(long, default_value_t = 1)]
        columns: u32,
    },
    Evaluate {
        id: String,
    },
    Score {
        id: String,
        score: f64,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AppCli::parse();
    logging::init(&args.log_level);

    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(path) = args.session_file {
        config.session_file = Some(path);
    }
    let client = ApiClient::from_config(config).context("building api client")?;

    match args.command {
        Commands::Session { action } => match action {
            SessionAction::Show => {
                let mut cred = client.session().get().await;
                if !cred.token.is_empty() {
                    cred.token = "[REDACTED]".to_string();
                }
                print_json(&cred)?;
            }
            SessionAction::Set { token, name, phone, user_name } => {
                client.session().set_session(token, name, phone).await?;
                if let Some(user_name) = user_name {
                    client.session().set_user_name(user_name).await?;
                }
                info!("session stored");
            }
            SessionAction::Clear => {
                client.session().clear().await?;
                info!("session cleared");
            }
        },
        Commands::Status => print_json(&client.get_server_status().await?)?,
        Commands::Students { action } => match action {
            StudentAction::List { class_id, search } => {
                let filter = StudentFilter {
                    class_id,
                    search_term: search,
                };
                print_json(&client.get_students(&filter).await?)?;
            }
            StudentAction::Delete { id } => {
                client.delete_student(&id).await?;
                info!(id = %id, "student deleted");
            }
        },
        Commands::Classes { action: ListOnly::List } => print_json(&client.get_classes().await?)?,
        Commands::Assignments {
            action: AssignmentAction::List { search },
        } => {
            let found = client.search_assignments(search.as_deref().unwrap_or("")).await?;
            print_json(&found)?;
        }
        Commands::Submissions { action } => match action {
            SubmissionAction::Search {
                assignment_id,
                student_id,
                top,
            } => {
                let filter = SubmissionFilter {
                    assignment_id,
                    student_id,
                    top,
                };
                print_json(&client.search_submissions(&filter).await?)?;
            }
            SubmissionAction::Upload {
                assignment_id,
                image,
                columns,
            } => {
                let upload = ImageUpload::from_path(&image).await?;
                let receipt = client.upload_submission(&assignment_id, upload, columns).await?;
                print_json(&receipt)?;
            }
            SubmissionAction::Evaluate { id } => {
                client.evaluate_submission(&id).await?;
                info!(id = %id, "evaluation requested");
            }
            SubmissionAction::Score { id, score } => {
                match client.update_submission_score(&id, score).await? {
                    Some(submission) => print_json(&submission)?,
                    None => info!(id = %id, score, "score updated"),
                }
            }
        },
        Commands::ApiKeys { action: ListOnly::List } => print_json(&client.get_api_keys().await?)?,
        Commands::Models { action: ListOnly::List } => print_json(&client.get_all_ai_models().await?)?,
        Commands::UsageSettings { action: ListOnly::List } => {
            print_json(&client.get_usage_settings().await?)?
        }
    }

    Ok(())
}
