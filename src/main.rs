use std::fmt::Display;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, Cell, Color, ContentArrangement, Table};
use futures_util::future::join_all;
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use yansi::Paint;

use ak_helper::api::{
    build_http_client, create_invite, list_cohort, set_silent, transition, ApiClient, ApiError, InviteForm,
    PendingNavigation,
};
use ak_helper::config::{self, DEFAULT_MOCK_PORT};
use ak_helper::handlers::shell::DEFAULT_STYLESHEET;
use ak_helper::mock::{self, MockBackend};
use ak_helper::models::{Action, AppState, Cohort};
use ak_helper::panel::{random_session_id, Panel, SessionStore};
use ak_helper::prefs::PreferenceStore;
use ak_helper::routes::build_app;
use ak_helper::ui::{filter_users, paginate};

const DEMO_SEED: u64 = 42;

fn fail(context: &str, err: impl Display) -> ! {
    tracing::error!(%err, "{}", context);
    eprintln!("{}: {}", Paint::new(context).red(), err);
    process::exit(1);
}

fn http_client() -> reqwest::Client {
    match build_http_client() {
        Ok(c) => c,
        Err(e) => fail("Failed to create HTTP client", e),
    }
}

fn api_token() -> String {
    config::require_api_token().unwrap_or_else(|e| fail("Invalid configuration", e))
}

fn build_api(base_url: &str, navigation: PendingNavigation) -> ApiClient {
    ApiClient::new(http_client(), base_url, api_token(), Arc::new(navigation))
}

/// Every browser session gets its own panel; the HTTP client, token and
/// preference file are shared.
fn build_state(base_url: &str, api_token: String) -> AppState {
    let client = http_client();
    let prefs = match config::get_prefs_path() {
        Some(path) => PreferenceStore::new(path),
        None => PreferenceStore::unavailable(),
    };
    let base = base_url.to_string();
    let sessions = SessionStore::new(move |navigation| {
        let api = ApiClient::new(client.clone(), base.as_str(), api_token.as_str(), Arc::new(navigation));
        Panel::new(api, prefs.clone())
    });
    AppState {
        sessions: Arc::new(sessions),
        login_url: config::login_url(base_url),
        custom_css: None,
    }
}

/// Report an API failure the way the panel would and exit.
fn fail_api(context: &str, err: ApiError, base_url: &str) -> ! {
    if matches!(err, ApiError::AuthRedirect) {
        eprintln!(
            "{} {}",
            Paint::new("Backend session expired; sign in at").yellow(),
            Paint::new(config::login_url(base_url)).cyan()
        );
        process::exit(1);
    }
    fail(context, err)
}

async fn start_server(mut state: AppState, host: &str, port: u16, stylesheet: Option<String>) {
    if let Some(path) = stylesheet {
        match std::fs::read_to_string(&path) {
            Ok(css) => {
                state.custom_css = Some(css);
                tracing::info!("Loaded custom stylesheet from {}", path);
            }
            Err(e) => fail(&format!("Failed to read custom stylesheet at {}", path), e),
        }
    } else {
        tracing::debug!(bytes = DEFAULT_STYLESHEET.len(), "using embedded stylesheet");
    }

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => fail("Invalid host/port format", e),
    };

    let (app, worker) = build_app(state);
    if let Err(e) = worker.start().await {
        tracing::warn!(%e, "offline shell not installed; serving without it");
    }

    tracing::info!(%addr, "Starting ak-helper server");
    println!(
        "{} {}",
        Paint::new("Web server running on").green(),
        Paint::new(format!("http://{}", addr)).cyan()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                fail("Server error", e);
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!(
                "{}: {}\n{}",
                Paint::new(format!("Failed to bind to {}", addr)).red(),
                e,
                Paint::new("Please stop any process using this port, or start the server with a different --port value.")
                    .yellow()
            );
            process::exit(1);
        }
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table
}

async fn list_users(base_url: &str, cohort: Cohort, filter: &str, page: usize, per_page: usize) {
    let api = build_api(base_url, PendingNavigation::default());
    let listing = match list_cohort(&api, cohort).await {
        Ok(l) => l,
        Err(e) => fail_api(&format!("Failed to list {}", cohort.default_title().to_lowercase()), e, base_url),
    };

    let filtered = filter_users(&listing.users, filter);
    if filtered.is_empty() {
        println!("(no users found)");
        return;
    }
    // page 0 shows everything
    let (page, per_page) = if page == 0 { (1, filtered.len()) } else { (page, per_page.max(1)) };
    let view = paginate(&filtered, page, per_page);

    let mut table = new_table();
    table.set_header(vec!["pk", "username", "email"]);
    for user in view.slice {
        table.add_row(vec![Cell::new(&user.pk).fg(Color::Cyan), Cell::new(&user.username), Cell::new(&user.email)]);
    }
    println!("\n{}", Paint::new(listing.title(cohort)).bold());
    println!("{table}");
    println!(
        "{}",
        Paint::new(format!(
            "{}–{} of {} (page {}/{})",
            view.start + 1,
            view.end,
            view.total,
            view.page,
            view.pages
        ))
        .dim()
    );
}

async fn transition_users(base_url: &str, action: Action, pks: Vec<String>, send_mail: bool) {
    let api = build_api(base_url, PendingNavigation::default());
    let results = join_all(pks.iter().map(|pk| transition(&api, action, pk, send_mail))).await;

    let mut failed = 0;
    for (pk, result) in pks.iter().zip(results) {
        match result {
            Ok(_) => println!("{} {} {}", Paint::new("✓").green(), action.past_verb(), pk),
            Err(ApiError::AuthRedirect) => fail_api("Request failed", ApiError::AuthRedirect, base_url),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", Paint::new("✗").red(), pk, e);
            }
        }
    }
    if failed > 0 {
        eprintln!("{}", Paint::new(format!("{} of {} requests failed", failed, pks.len())).red());
        process::exit(1);
    }
}

async fn run_demo(host: &str, port: u16, mock_port: u16, users: usize, stylesheet: Option<String>) {
    let token = random_session_id();
    let backend = Arc::new(MockBackend::seeded(users, DEMO_SEED).with_api_token(token.clone()));
    let mock_addr: SocketAddr = match format!("127.0.0.1:{}", mock_port).parse() {
        Ok(a) => a,
        Err(e) => fail("Invalid mock port", e),
    };
    let listener = match tokio::net::TcpListener::bind(mock_addr).await {
        Ok(l) => l,
        Err(e) => fail(&format!("Failed to bind mock backend to {}", mock_addr), e),
    };
    tokio::spawn(async move {
        if let Err(e) = mock::serve(backend, listener).await {
            tracing::error!(%e, "mock backend stopped");
        }
    });
    let base_url = format!("http://{}", mock_addr);
    println!(
        "{} {} ({} users)",
        Paint::new("Mock backend running on").green(),
        Paint::new(&base_url).cyan(),
        users
    );
    start_server(build_state(&base_url, token), host, port, stylesheet).await;
}

#[derive(Parser)]
#[command(
    name = "ak-helper",
    author,
    version,
    about = "Guest and member administration panel",
    long_about = r#"ak-helper: manage guest and member users and issue invitations.

Runs a small web panel in front of the user-management backend configured with
API_BASE_URL, and exposes the same actions on the command line.

Examples:
  1) Run the panel:
      ak-helper serve --port 8000
  2) Try it against an in-memory backend:
      ak-helper demo
  3) Promote two guests without notification mail:
      ak-helper promote 17 42
"#,
    after_help = "Use `ak-helper <subcommand> --help` to get subcommand specific options and usage examples."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Disable request/response logging
    #[arg(long, global = true)]
    silent: bool,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web panel
    Serve {
        /// Host to bind to (default: HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: PORT or 8000)
        #[arg(long)]
        port: Option<u16>,
        /// Path to a custom stylesheet to serve instead of the default
        #[arg(long)]
        stylesheet: Option<String>,
    },
    /// Validate configuration and backend connectivity
    #[command(
        about = "Validate configuration and ensure API connectivity.",
        long_about = "Validate the environment variables used by the panel, then fetch the guest listing to confirm the backend answers with JSON."
    )]
    CheckConfig,
    /// Guest users
    Guests {
        #[command(subcommand)]
        sub: CohortCommands,
    },
    /// Member users
    Members {
        #[command(subcommand)]
        sub: CohortCommands,
    },
    /// Move guests to the members group
    #[command(about = "Promote guests to members", long_about = "Promote one or more guests by pk. Requests are sent concurrently and each result is reported.")]
    Promote {
        #[arg(required = true)]
        pks: Vec<String>,
        /// Ask the backend to send a notification mail
        #[arg(long, default_value_t = false)]
        send_mail: bool,
    },
    /// Move members back to the guests group
    Demote {
        #[arg(required = true)]
        pks: Vec<String>,
    },
    /// Create an invitation link
    #[command(about = "Create an invitation", long_about = "Create an invitation through the backend and print the link. A blank username defaults to the name.")]
    Invite {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Days until the invitation expires (backend default if omitted)
        #[arg(long)]
        expires_days: Option<String>,
        /// Enrollment flow slug
        #[arg(long, default_value = "")]
        flow: String,
        /// Allow the link to be used more than once
        #[arg(long, default_value_t = false)]
        multi_use: bool,
    },
    /// Run the panel against an in-memory demo backend
    Demo {
        #[arg(long, default_value_t = String::from(config::DEFAULT_HOST))]
        host: String,
        #[arg(long, default_value_t = config::DEFAULT_PORT)]
        port: u16,
        #[arg(long, default_value_t = DEFAULT_MOCK_PORT)]
        mock_port: u16,
        /// Number of seeded users
        #[arg(long, default_value_t = 1200)]
        users: usize,
        #[arg(long)]
        stylesheet: Option<String>,
    },
}

#[derive(Subcommand)]
enum CohortCommands {
    #[command(about = "List users", long_about = "List users of the group. `--filter` matches pk, username or email case-insensitively. Use `--page 0` to show everything.")]
    List {
        #[arg(long, short = 'f', default_value = "")]
        filter: String,
        /// Page number to display (1-indexed). Use 0 to show all users without pagination.
        #[arg(long, short = 'p', default_value = "1")]
        page: usize,
        #[arg(long, default_value = "50")]
        per_page: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    config::load_env_file(cli.env_file.as_deref());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config::get_log_level()));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }
    if cli.silent {
        set_silent(true);
    }

    let base_url = config::get_api_base_url();
    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        stylesheet: None,
    });

    match command {
        Commands::Serve { host, port, stylesheet } => {
            let host = host.unwrap_or_else(config::get_host);
            let port = match port {
                Some(p) => p,
                None => config::get_port().unwrap_or_else(|e| fail("Invalid configuration", e)),
            };
            start_server(build_state(&base_url, api_token()), &host, port, stylesheet).await;
        }
        Commands::CheckConfig => {
            let mut ok = true;
            if let Err(e) = config::validate_base_url(&base_url) {
                eprintln!("{}", Paint::new(e.to_string()).red());
                ok = false;
            }
            if let Err(e) = config::get_port() {
                eprintln!("{}", Paint::new(e.to_string()).red());
                ok = false;
            }
            if let Err(e) = config::require_api_token() {
                eprintln!("{}", Paint::new(e.to_string()).red());
                ok = false;
            }
            match config::get_prefs_path() {
                Some(p) => println!("preferences: {}", p.display()),
                None => println!("preferences: disabled"),
            }
            if !ok {
                process::exit(1);
            }
            let api = build_api(&base_url, PendingNavigation::default());
            match list_cohort(&api, Cohort::Guest).await {
                Ok(listing) => {
                    println!(
                        "{}",
                        Paint::new(format!("Configuration looks valid ({} guests returned)", listing.users.len())).green()
                    );
                }
                Err(e) => fail_api("Configuration appears invalid", e, &base_url),
            }
        }
        Commands::Guests { sub: CohortCommands::List { filter, page, per_page } } => {
            list_users(&base_url, Cohort::Guest, &filter, page, per_page).await;
        }
        Commands::Members { sub: CohortCommands::List { filter, page, per_page } } => {
            list_users(&base_url, Cohort::Member, &filter, page, per_page).await;
        }
        Commands::Promote { pks, send_mail } => {
            transition_users(&base_url, Action::Promote, pks, send_mail).await;
        }
        Commands::Demote { pks } => {
            transition_users(&base_url, Action::Demote, pks, false).await;
        }
        Commands::Invite { name, username, email, expires_days, flow, multi_use } => {
            let form = InviteForm {
                name,
                username,
                email,
                single_use: !multi_use,
                expires_days: expires_days.unwrap_or_default(),
                flow,
            };
            let request = match form.into_request() {
                Ok(r) => r,
                Err(e) => fail("Invalid invitation", e),
            };
            let api = build_api(&base_url, PendingNavigation::default());
            match create_invite(&api, &request).await {
                Ok(resp) => match (resp.invite_url, resp.pk) {
                    (Some(url), _) => {
                        println!("{} {}", Paint::new("Invitation created:").green(), Paint::new(url).cyan());
                        if let Some(expires) = resp.expires_friendly {
                            println!("expires {}", expires);
                        }
                    }
                    (None, Some(pk)) => println!("invite uuid: {}", pk),
                    (None, None) => println!("no invite url returned"),
                },
                Err(e) => fail_api("Failed to create invitation", e, &base_url),
            }
        }
        Commands::Demo { host, port, mock_port, users, stylesheet } => {
            run_demo(&host, port, mock_port, users, stylesheet).await;
        }
    }
}
