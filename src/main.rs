mod api;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use api::client::ApiClient;
use api::types::TaskState;
use commands::CommandError;

#[derive(Parser, Debug)]
#[command(name = "taskdeck", version, about = "Task tracker CLI for a taskdeck backend")]
struct Cli {
    /// Backend base URL (overrides TASKDECK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new account
    Register {
        /// Username for the new account
        #[arg(long)]
        username: String,

        /// Email address for the new account
        #[arg(long)]
        email: String,

        /// Password (falls back to TASKDECK_PASSWORD, then a prompt)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and store the session in the OS keychain
    Login {
        /// Username to log in as
        #[arg(long)]
        username: String,

        /// Password (falls back to TASKDECK_PASSWORD, then a prompt)
        #[arg(long)]
        password: Option<String>,
    },

    /// Invalidate the current session, server-side and locally
    Logout,

    /// Show the logged-in user and session expiry
    Whoami,

    /// Upload a profile image for the logged-in user
    UploadImage {
        /// Path to the image file
        path: PathBuf,
    },

    /// Work with tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Work with categories
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Check that the backend is reachable
    Health,
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Create a task
    Add {
        /// What needs doing
        description: String,

        /// Category id the task belongs to
        #[arg(long)]
        category: i64,
    },

    /// List your tasks
    List {
        /// Only show tasks in this category
        #[arg(long)]
        category: Option<i64>,
    },

    /// Update a task (unspecified fields keep their current values)
    Update {
        /// Task id
        id: i64,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New state: backlog, started or finished
        #[arg(long)]
        state: Option<TaskState>,

        /// Move the task to this category
        #[arg(long)]
        category: Option<i64>,

        /// New deadline, e.g. 2024-06-15 or "2024-06-15 09:00"
        #[arg(long)]
        due: Option<String>,

        /// Remove the deadline
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// List all categories
    List,

    /// Create a category
    Add {
        /// Category name
        name: String,

        /// Category description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Update a category (unspecified fields keep their current values)
    Update {
        /// Category id
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a category
    Rm {
        /// Category id
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let cli = Cli::parse();

    // API base URL: --api-url > TASKDECK_API_URL > localhost default
    let base_url = cli.api_url.clone().unwrap_or_else(|| {
        std::env::var("TASKDECK_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
    });
    log::info!("taskdeck starting (backend {})", base_url);

    let client = ApiClient::new(&base_url);

    if let Err(e) = run(&client, cli.command).await {
        log::error!("Command failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(client: &ApiClient, command: Command) -> Result<(), CommandError> {
    match command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let password = resolve_password(password, &username)?;
            commands::register(client, &username, &email, password).await
        }
        Command::Login { username, password } => {
            let password = resolve_password(password, &username)?;
            commands::login(client, &username, password).await
        }
        Command::Logout => commands::logout(client).await,
        Command::Whoami => commands::whoami().await,
        Command::UploadImage { path } => commands::upload_image(client, &path).await,
        Command::Task(task) => match task {
            TaskCommand::Add {
                description,
                category,
            } => commands::add_task(client, &description, category).await,
            TaskCommand::List { category } => commands::list_tasks(client, category).await,
            TaskCommand::Update {
                id,
                description,
                state,
                category,
                due,
                clear_due,
            } => commands::update_task(client, id, description, state, category, due, clear_due).await,
            TaskCommand::Rm { id } => commands::delete_task(client, id).await,
        },
        Command::Category(category) => match category {
            CategoryCommand::List => commands::list_categories(client).await,
            CategoryCommand::Add { name, description } => {
                commands::add_category(client, &name, &description).await
            }
            CategoryCommand::Update {
                id,
                name,
                description,
            } => commands::update_category(client, id, name, description).await,
            CategoryCommand::Rm { id } => commands::delete_category(client, id).await,
        },
        Command::Health => commands::health(client).await,
    }
}

/// Take the password from the flag, then TASKDECK_PASSWORD, then a prompt.
/// Empty passwords are rejected wherever they come from.
fn resolve_password(flag: Option<String>, username: &str) -> Result<String, CommandError> {
    let password = if let Some(password) = flag {
        password
    } else if let Ok(password) = std::env::var("TASKDECK_PASSWORD") {
        password
    } else {
        eprint!("Password for {}: ", username);
        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .map_err(|e| CommandError::Invalid(format!("could not read password: {}", e)))?;
        line.trim_end_matches(|c| c == '\r' || c == '\n').to_string()
    };

    if password.is_empty() {
        return Err(CommandError::Invalid("password must not be empty".to_string()));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_password_from_flag() {
        let password = resolve_password(Some("s3cret".to_string()), "alice").unwrap();
        assert_eq!(password, "s3cret");
    }

    #[test]
    fn test_resolve_password_rejects_empty_flag() {
        let result = resolve_password(Some(String::new()), "alice");
        assert!(result.is_err());
    }
}
