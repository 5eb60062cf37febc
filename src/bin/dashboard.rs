use std::time::Duration;

use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};
use tracing_subscriber::EnvFilter;

use salesdash::{
    Command, DEFAULT_API_BASE_URL, DashboardConfig, DashboardHandle, PaginationConfig,
    SalesApiClient, ViewCoordinator, ViewState, help_text, parse_command, render_filter_options,
    render_view,
};

/// A terminal dashboard for browsing retail sales transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the sales API.
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// The number of transactions to show per page.
    #[arg(long, default_value_t = 10)]
    page_size: u64,

    /// The search quiet window in milliseconds.
    #[arg(long, default_value_t = 300)]
    quiet_window_ms: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();
    let config = DashboardConfig {
        api_base_url: args.api_url,
        page_size: args.page_size,
        search_quiet_window: Duration::from_millis(args.quiet_window_ms),
        pagination: PaginationConfig::default(),
    };

    println!(
        "Browsing transactions at {}. Type \"help\" for commands.",
        config.api_base_url
    );

    let client = SalesApiClient::new(&config.api_base_url);
    let (handle, states) = ViewCoordinator::spawn(client, config.clone());

    let render_states = states.clone();
    tokio::spawn(render_loop(render_states, config));

    run_console(handle, states).await;
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Repaint the dashboard whenever the coordinator publishes a new
/// snapshot.
async fn render_loop(mut states: watch::Receiver<ViewState>, config: DashboardConfig) {
    loop {
        {
            let state = states.borrow_and_update().clone();
            print!("{}", render_view(&state, &config));
        }
        if states.changed().await.is_err() {
            break;
        }
    }
}

async fn run_console(handle: DashboardHandle, states: watch::Receiver<ViewState>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", help_text()),
            Ok(Command::ShowOptions) => show_options(&states),
            Ok(command) => apply_command(command, &handle, &states),
            Err(message) => println!("{message}"),
        }
    }
}

fn show_options(states: &watch::Receiver<ViewState>) {
    match &states.borrow().filter_options {
        Some(options) => print!("{}", render_filter_options(options)),
        None => println!("Filter options are not available."),
    }
}

fn apply_command(command: Command, handle: &DashboardHandle, states: &watch::Receiver<ViewState>) {
    match command {
        Command::Search(term) => handle.set_search(term),
        Command::Toggle(field, value) => handle.toggle_filter_value(field, value),
        Command::AgeRange(min, max) => handle.set_age_range(min, max),
        Command::DateRange(from, to) => handle.set_date_range(from, to),
        Command::Sort(order) => handle.set_sort(order),
        Command::Page(page) => handle.set_page(page),
        Command::NextPage => {
            let page = states.borrow().page.clone();
            match page {
                Some(page) if page.has_next => handle.set_page(page.page + 1),
                _ => println!("Already on the last page."),
            }
        }
        Command::PreviousPage => {
            let page = states.borrow().page.clone();
            match page {
                Some(page) if page.has_previous => handle.set_page(page.page - 1),
                _ => println!("Already on the first page."),
            }
        }
        Command::ClearFilters => handle.clear_all(),
        // Handled by the caller before dispatch reaches here.
        Command::ShowOptions | Command::Help | Command::Quit => {}
    }
}
