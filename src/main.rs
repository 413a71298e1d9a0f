use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use rpel::company_tui::App;
use rpel::config::Config;
use rpel::form::{CompanyFormView, FormEvent, ListKind};
use rpel::remote::WsClient;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "rpel=info");
    }

    let config = Config::from_env()?;
    config.validate()?;
    init_logging(&config, cli.command.is_interactive());

    let client = Arc::new(WsClient::from_config(&config));

    match cli.command {
        Commands::Edit { id } => run_tui(config, client, id).await,
        Commands::Show { id } => show_company(client, Commands::stored_id(id)?).await,
        Commands::Delete { id, yes } => delete_company(client, Commands::stored_id(id)?, yes).await,
    }
}

/// File logging always; stderr only when the terminal is not taken over by the TUI
fn init_logging(config: &Config, interactive: bool) {
    let file_appender = tracing_appender::rolling::never(config.log_dir(), config.log_file_name());

    let stderr_layer = (!interactive).then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}

async fn run_tui(config: Config, client: Arc<WsClient>, id: i64) -> Result<()> {
    info!("Starting company editor for record {}", id);
    let view = CompanyFormView::open(client.clone(), client, id)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, view);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(()) => {
            info!("Company editor exited");
            Ok(())
        }
        Err(e) => {
            error!("Company editor encountered an error: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Open record `id` and wait for it to arrive
async fn load_view(client: Arc<WsClient>, id: i64) -> Result<CompanyFormView> {
    let mut view = CompanyFormView::open(client.clone(), client, id)?;
    match view.settle().await {
        Some(FormEvent::Loaded) => Ok(view),
        Some(FormEvent::Failed(message)) => bail!("Cannot load company {}: {}", id, message),
        other => bail!("Unexpected result while loading company {}: {:?}", id, other),
    }
}

async fn show_company(client: Arc<WsClient>, id: i64) -> Result<()> {
    let view = load_view(client, id).await?;
    let draft = view.draft();

    let list = |kind: ListKind| {
        draft
            .list(kind)
            .iter()
            .filter(|v| !v.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("{:<26} {}", "Id", draft.id);
    println!("{:<26} {}", "Наименование организации", draft.name);
    println!(
        "{:<26} {}",
        "Сфера деятельности",
        draft.scope().map(|s| s.label()).unwrap_or("-")
    );
    println!("{:<26} {}", "Адрес", draft.address);
    println!("{:<26} {}", "Электронный адрес", list(ListKind::Emails));
    println!("{:<26} {}", "Телефон", list(ListKind::Phones));
    println!("{:<26} {}", "Факс", list(ListKind::Faxes));
    println!("{:<26} {}", "Заметка", draft.note);

    if !draft.practices.is_empty() {
        println!();
        println!("Тренировки:");
        for practice in &draft.practices {
            println!("  {:<50} {}", practice.summary(), practice.link());
        }
    }

    if !draft.contacts.is_empty() {
        println!();
        println!("Сотрудники:");
        for contact in &draft.contacts {
            println!("  {:<50} {}", contact.summary(), contact.link());
        }
    }

    Ok(())
}

async fn delete_company(client: Arc<WsClient>, id: i64, yes: bool) -> Result<()> {
    let mut view = load_view(client, id).await?;

    let started = view.delete(|prompt| yes || confirm_on_stdin(prompt))?;
    if !started {
        println!("Удаление отменено");
        return Ok(());
    }

    match view.settle().await {
        Some(FormEvent::Deleted) => {
            println!("Запись {} удалена", id);
            Ok(())
        }
        Some(FormEvent::Failed(message)) => bail!("Cannot delete company {}: {}", id, message),
        other => bail!("Unexpected result while deleting company {}: {:?}", id, other),
    }
}

/// Ask `prompt` on the terminal; anything but an explicit yes declines
fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да")
}
