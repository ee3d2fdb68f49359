use std::sync::Arc;

use clap::{Parser, Subcommand};
use dialoguer::Input;
use paradise_adapters::configuration;
use paradise_adapters::telemetry;
use paradise_adapters::{build_token_store, HistoryNavigator, ReqwestTransport};
use paradise_core::auth_errors::MarkerAuthErrors;
use paradise_core::cache::QueryCache;
use paradise_core::catalog::{CatalogKind, DEFAULT_PAGE_SIZE, FEATURED_PAGE_SIZE};
use paradise_core::config::Settings;
use paradise_core::entities::{GraphqlRequest, LoginCredentials};
use paradise_core::itineraries::ITINERARIES_PAGE_SIZE;
use paradise_core::ports::TokenStore;
use paradise_core::routes::{RouteDecision, RouteGuard};
use paradise_core::use_cases::{
    AuthenticatedPipeline, CatalogUseCase, GraphqlClient, ItinerariesUseCase, SessionUseCase,
};
use serde_json::Value;
use tracing::error;

type Client = GraphqlClient<ReqwestTransport, dyn TokenStore, HistoryNavigator>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// GraphQL endpoint, overrides the configured one
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    // --- Session commands ---
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Log out and forget the stored tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your itineraries
    Itineraries {
        /// Number of pages to load and merge
        #[arg(short, long, default_value = "1")]
        pages: u32,

        /// Itineraries per page
        #[arg(short, long, default_value_t = ITINERARIES_PAGE_SIZE)]
        limit: u32,
    },

    // --- Catalog commands ---
    /// List a catalog section, newest first
    List {
        /// experiences, activities, tours, accommodations, services, restaurants or destinations
        kind: CatalogKind,

        /// Number of pages to load and merge
        #[arg(short, long, default_value = "1")]
        pages: u32,

        /// Items per page
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        first: u32,

        /// Preferred language for names
        #[arg(short, long, default_value = "en")]
        locale: String,
    },
    /// Show a single catalog item
    Show { kind: CatalogKind, uuid: String },
    /// Featured upcoming experiences
    Featured {
        #[arg(short, long, default_value_t = FEATURED_PAGE_SIZE)]
        first: u32,

        #[arg(short, long, default_value = "en")]
        locale: String,
    },

    // --- Tools ---
    /// Check whether a page is reachable with the current session
    Guard { path: String },
    /// Run an arbitrary GraphQL document (prefix with @ to read a file)
    Query {
        document: String,

        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,
    },
}

struct App {
    client: Client,
    navigator: Arc<HistoryNavigator>,
    routes: RouteGuard,
    login_route: String,
}

impl App {
    fn new(settings: &Settings) -> anyhow::Result<Self> {
        let transport = Arc::new(ReqwestTransport::from_settings(&settings.graphql)?);
        let token_store = build_token_store(&settings.storage);
        let navigator = Arc::new(HistoryNavigator::new());
        let auth_errors = Arc::new(MarkerAuthErrors::from_settings(&settings.auth));

        let pipeline = AuthenticatedPipeline::new(
            transport,
            token_store,
            navigator.clone(),
            auth_errors,
        )
        .with_routes(&settings.auth.login_route, &settings.auth.home_route);

        Ok(Self {
            client: GraphqlClient::new(pipeline, QueryCache::new(settings.cache.max_entries)),
            navigator,
            routes: RouteGuard::new(&settings.routes)
                .with_targets(&settings.auth.login_route, &settings.auth.home_route),
            login_route: settings.auth.login_route.clone(),
        })
    }

    /// Tell the user when the pipeline sent them to the login page.
    fn report_redirect(&self) {
        if let Some(route) = self.navigator.last() {
            if route == self.login_route {
                println!("Your session has expired. Please log in again.");
            }
        }
    }
}

fn read_document(document: &str) -> anyhow::Result<String> {
    match document.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(document.to_string()),
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut settings = match configuration::get_configuration() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to load configuration: {}", e);
            return Err(anyhow::anyhow!("configuration loading failed"));
        }
    };
    if let Some(endpoint) = &cli.endpoint {
        settings.graphql.endpoint = endpoint.clone();
    }

    let _guard = telemetry::init_subscriber("paradise_cli", &settings.log_level);

    let app = App::new(&settings)?;

    match &cli.command {
        // --- Session commands ---
        Commands::Login { email } => {
            let email = match email {
                Some(email) => email.clone(),
                None => Input::new().with_prompt("Email").interact_text()?,
            };
            let password = rpassword::prompt_password("Password: ")?;
            let credentials = LoginCredentials::new(email, password);

            println!("Authenticating...");
            let session = SessionUseCase::new(app.client.clone());
            match session.login(&credentials).await {
                Ok(current) => {
                    if let Some(user) = &current.user {
                        println!("Login successful!");
                        println!("- Name: {}", user.full_name());
                        println!("- Email: {}", user.email);
                    }
                }
                Err(e) => {
                    error!(error = %e, "login failed");
                    println!("Login failed: {}", e);
                }
            }
        }
        Commands::Logout => {
            SessionUseCase::new(app.client.clone()).logout().await;
            println!("Logged out");
        }
        Commands::Whoami => {
            let session = SessionUseCase::new(app.client.clone());
            let current = session.restore().await?;
            match &current.user {
                Some(user) => {
                    println!("{} <{}>", user.full_name(), user.email);
                    println!("- UUID: {}", user.uuid);
                    if let Some(currency) = &user.currency {
                        println!("- Currency: {}", currency);
                    }
                    let roles: Vec<&str> = current.roles().iter().map(|r| r.name.as_str()).collect();
                    if !roles.is_empty() {
                        println!("- Roles: {}", roles.join(", "));
                    }
                }
                None => println!("Not logged in."),
            }
            app.report_redirect();
        }

        Commands::Itineraries { pages, limit } => {
            let itineraries = ItinerariesUseCase::new(app.client.clone());
            match itineraries.list_pages(*pages, *limit).await {
                Ok(listing) => {
                    if listing.data.is_empty() {
                        println!("No itineraries yet.");
                    }
                    for itinerary in &listing.data {
                        println!(
                            "{}  {} [{}]",
                            itinerary.uuid,
                            itinerary.name.as_deref().unwrap_or("-"),
                            itinerary.status.as_deref().unwrap_or("unknown")
                        );
                        if let Some(place) = itinerary.place() {
                            println!("    {}", place);
                        }
                        if let Some(dates) = itinerary.date_range() {
                            println!("    {}", dates);
                        }
                    }
                    let info = listing.paginator_info;
                    println!(
                        "\npage {} of {} ({} in total)",
                        info.current_page, info.last_page, info.total
                    );
                }
                Err(e) => {
                    error!(error = %e, "failed to list itineraries");
                    println!("Failed to list itineraries: {}", e);
                }
            }
            app.report_redirect();
        }

        // --- Catalog commands ---
        Commands::List {
            kind,
            pages,
            first,
            locale,
        } => {
            let catalog = CatalogUseCase::new(app.client.clone());
            match catalog.list_pages(*kind, *pages, *first).await {
                Ok(listing) => {
                    if listing.data.is_empty() {
                        println!("No {} found.", kind);
                    }
                    for item in &listing.data {
                        println!("{}  {}", item.uuid, item.localized_name(locale).unwrap_or("-"));
                    }
                    let info = listing.paginator_info;
                    println!(
                        "\npage {} of {} ({} {} in total)",
                        info.current_page, info.last_page, info.total, kind
                    );
                }
                Err(e) => {
                    error!(error = %e, "failed to list {}", kind);
                    println!("Failed to list {}: {}", kind, e);
                }
            }
            app.report_redirect();
        }
        Commands::Show { kind, uuid } => {
            let catalog = CatalogUseCase::new(app.client.clone());
            match catalog.detail(*kind, uuid).await {
                Ok(Some(item)) => print_json(&serde_json::to_value(&item)?)?,
                Ok(None) => println!("No {} with uuid {}", kind.detail_field(), uuid),
                Err(e) => {
                    error!(error = %e, "failed to load item");
                    println!("Failed to load {}: {}", uuid, e);
                }
            }
            app.report_redirect();
        }

        Commands::Featured { first, locale } => {
            let catalog = CatalogUseCase::new(app.client.clone());
            match catalog.featured(*first).await {
                Ok(listing) => {
                    for item in &listing.data {
                        println!("{}  {}", item.uuid, item.localized_name(locale).unwrap_or("-"));
                    }
                }
                Err(e) => {
                    error!(error = %e, "failed to load featured experiences");
                    println!("Failed to load featured experiences: {}", e);
                }
            }
            app.report_redirect();
        }

        // --- Tools ---
        Commands::Guard { path } => {
            let has_token = app
                .client
                .pipeline()
                .token_store()
                .access_token()
                .await?
                .is_some();
            match app.routes.check(path, has_token) {
                RouteDecision::Proceed => println!("{} -> allowed", path),
                RouteDecision::Redirect(target) => println!("{} -> redirect to {}", path, target),
            }
        }
        Commands::Query {
            document,
            variables,
        } => {
            let mut request = GraphqlRequest::new(read_document(document)?);
            if let Some(variables) = variables {
                request = request.with_variables(serde_json::from_str(variables)?);
            }

            let result = if request.is_mutation() {
                app.client.mutate(request).await
            } else {
                app.client.query(request).await
            };

            match result {
                Ok(data) => print_json(&data)?,
                Err(e) => {
                    error!(error = %e, "operation failed");
                    println!("Operation failed: {}", e);
                }
            }
            app.report_redirect();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_list() {
        let cli = Cli::try_parse_from(["paradise", "list", "tours", "--pages", "2"]).unwrap();
        match cli.command {
            Commands::List {
                kind, pages, first, ..
            } => {
                assert_eq!(kind, CatalogKind::Tours);
                assert_eq!(pages, 2);
                assert_eq!(first, DEFAULT_PAGE_SIZE);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_cli_parses_itineraries() {
        let cli = Cli::try_parse_from(["paradise", "itineraries", "--pages", "3"]).unwrap();
        match cli.command {
            Commands::Itineraries { pages, limit } => {
                assert_eq!(pages, 3);
                assert_eq!(limit, ITINERARIES_PAGE_SIZE);
            }
            _ => panic!("expected itineraries"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_section() {
        assert!(Cli::try_parse_from(["paradise", "list", "yachts"]).is_err());
    }

    #[test]
    fn test_read_inline_document() {
        assert_eq!(read_document("query Me { me { uuid } }").unwrap(), "query Me { me { uuid } }");
    }
}
