//! Command-line front end for Taskdesk
//!
//! Drives the task controller against the remote API and prints cards,
//! details and notifications to the terminal.

mod render;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdesk_core::{
    ClientConfig, HttpTaskApi, Notification, Notifier, SortOrder, TaskController, TaskInput,
    TaskPriority, TaskStatus,
};

#[derive(Debug, Parser)]
#[command(name = "taskdesk", version, about = "Manage tasks on a remote task server")]
struct Cli {
    /// Base URL of the task API (overrides TASKDESK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides TASKDESK_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all tasks
    List(ListArgs),
    /// List completed tasks
    Completed(ListArgs),
    /// Show one task with its responsible user
    Show { id: i64 },
    /// Create a task
    Create(TaskArgs),
    /// Edit a task; omitted fields keep their current value
    Edit {
        id: i64,
        #[command(flatten)]
        fields: TaskArgs,
    },
    /// Delete a task
    Delete { id: i64 },
}

#[derive(Debug, Args)]
struct ListArgs {
    /// priority, status, title or date
    #[arg(long, default_value = "priority")]
    sort: SortOrder,

    #[arg(long, default_value_t = 1)]
    page: usize,

    /// 5, 10, 15 or 50
    #[arg(long)]
    page_size: Option<usize>,
}

#[derive(Debug, Args)]
struct TaskArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Pendente, "Em andamento" or Concluído
    #[arg(long)]
    status: Option<TaskStatus>,

    /// Alta, Média or Baixa
    #[arg(long)]
    priority: Option<TaskPriority>,

    /// Id of the responsible user
    #[arg(long = "user")]
    user_id: Option<i64>,
}

impl TaskArgs {
    /// Overlay the given flags on `input`
    fn apply(self, mut input: TaskInput) -> TaskInput {
        if let Some(title) = self.title {
            input.title = title;
        }
        if let Some(description) = self.description {
            input.description = description;
        }
        if self.status.is_some() {
            input.status = self.status;
        }
        if self.priority.is_some() {
            input.priority = self.priority;
        }
        if self.user_id.is_some() {
            input.user_id = self.user_id;
        }
        input
    }
}

/// Prints notifications to stderr
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", notification);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdesk=info,taskdesk_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config.base_url = api_url;
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Some(Duration::from_secs(secs));
    }
    tracing::debug!("Using task API at {}", config.base_url);

    let api = Arc::new(HttpTaskApi::new(&config).context("Failed to create API client")?);
    let notifier = Arc::new(ConsoleNotifier);

    let controller = match &cli.command {
        Command::Completed(_) => TaskController::completed(api, notifier),
        _ => TaskController::new(api, notifier),
    }
    .with_page_size(config.page_size);

    let result = run(&controller, cli.command, &config).await;
    controller.dispose();
    result
}

async fn run(controller: &TaskController, command: Command, config: &ClientConfig) -> anyhow::Result<()> {
    match command {
        Command::List(args) | Command::Completed(args) => {
            if let Err(e) = controller.load().await {
                println!("No tasks found.");
                return Err(e.into());
            }
            controller.set_sort(args.sort).await;
            let page_size = args.page_size.unwrap_or(config.page_size.get());
            controller.set_page(args.page, page_size).await?;

            let page = controller.view().await;
            let cache = controller.snapshot().await;
            println!("{}", render::render_page(&page, &cache, cache.page, args.sort));
        }
        Command::Show { id } => {
            let detail = controller.open_details(id).await?;
            println!("{}", render::render_detail(&detail));
        }
        Command::Create(fields) => {
            let input = fields.apply(TaskInput::default());
            let outcome = controller.create(&input).await?;
            println!("Created task #{}", outcome.value.id);
        }
        Command::Edit { id, fields } => {
            let form = controller.prepare_edit(id).await?;
            let input = fields.apply(form.input);
            let outcome = controller.update(id, &input).await?;
            println!("Updated task #{}", outcome.value.id);
        }
        Command::Delete { id } => {
            controller.delete(id).await?;
            println!("Deleted task #{}", id);
        }
    }
    Ok(())
}
