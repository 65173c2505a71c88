use std::{io::Write, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use console_core::{FolderPicker, NamespaceForm, Notifier, WorkflowCoordinator};
use shared::domain::Surface;

mod config;

#[derive(Parser, Debug)]
#[command(about = "Admin console for a Blazegraph-backed graph database")]
struct Args {
    /// Backend base URL; overrides console.toml and the environment.
    #[arg(long)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the active database and repository views.
    Status,
    /// Provision a new namespace on the backend.
    Create {
        #[arg(long)]
        namespace: String,
        /// Prompted for interactively when omitted.
        #[arg(long)]
        installation_path: Option<String>,
        #[arg(long, default_value = "9999")]
        port: String,
        #[arg(long, default_value = "")]
        min_memory: String,
        #[arg(long, default_value = "")]
        max_memory: String,
    },
}

/// Console stand-in for the toast surface.
struct ToastNotifier;

#[async_trait]
impl Notifier for ToastNotifier {
    async fn success(&self, message: &str) {
        println!("{message}");
    }

    async fn error(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Prompts on stdin instead of opening a native dialog. An empty line
/// counts as cancellation.
struct PromptFolderPicker;

#[async_trait]
impl FolderPicker for PromptFolderPicker {
    async fn pick_folder(&self) -> Option<String> {
        print!("Installation path: ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return None;
        }
        let path = line.trim();
        if path.is_empty() {
            None
        } else {
            Some(path.to_string())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(backend_url) = args.backend_url {
        settings.backend_url = backend_url;
    }

    let coordinator = WorkflowCoordinator::with_submit_timeout(
        settings.backend_url.clone(),
        Arc::new(ToastNotifier),
        settings.submit_timeout(),
    );

    match args.command {
        Command::Status => {
            coordinator.startup().await;
            let snapshot = coordinator.store().snapshot().await;

            match snapshot.active_database {
                Some(database) => println!("Active database: {database}"),
                None => println!("No active database found."),
            }
            match snapshot.active_repositories {
                Some(repositories) if !repositories.is_empty() => {
                    println!("Active repositories:");
                    for repository in repositories {
                        println!("  {repository}");
                    }
                }
                _ => println!("No active repositories found."),
            }
        }
        Command::Create {
            namespace,
            installation_path,
            port,
            min_memory,
            max_memory,
        } => {
            let mut form = NamespaceForm {
                namespace,
                port,
                min_memory,
                max_memory,
                ..NamespaceForm::default()
            };
            match installation_path {
                Some(path) => form.installation_path = path,
                None => {
                    console_core::request::choose_installation_path(&PromptFolderPicker, &mut form)
                        .await;
                }
            }

            coordinator.open(Surface::Creation).await;
            let namespace = coordinator.submit_creation(&form).await?;

            let snapshot = coordinator.store().snapshot().await;
            println!(
                "Namespace '{namespace}' provisioned; active database is now {}.",
                snapshot.active_database.as_deref().unwrap_or("<none>")
            );
        }
    }

    Ok(())
}
