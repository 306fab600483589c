use std::sync::Arc;

use serde::Serialize;
use shelfclient::api::{accounts, books};
use shelfclient::client::ApiError;
use shelfclient::config::{load_config, print_schema};
use shelfclient::models::{LoginCredentials, PageParams, SearchParams};
use shelfclient::router::NavigationDecision;
use shelfclient::startup::build_state;
use shelfclient::state::AppState;
use shelfclient::utils::logger::init_logging;
use tracing::error;

const USAGE: &str = "usage: shelfclient [--schema] <command>

commands:
  status                        show the stored session
  login <username> <password>   sign in and store the session
  logout                        end the session
  profile                       fetch and cache the profile
  navigate <path>               run the navigation guard for a path
  bestsellers [page]            list best sellers
  search <text>                 search the catalogue

The config file is read from $SHELFCLIENT_CONFIG (default ./config.yaml).";

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to render output: {}", e),
    }
}

async fn run_command(state: &AppState, args: &[String]) -> Result<(), ApiError> {
    let client = state.client.as_ref();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["status"] => print_json(&serde_json::json!({
            "authenticated": state.tokens.is_authenticated(),
            "has_refresh_token": state.tokens.refresh_token().is_some(),
            "user": state.tokens.user(),
        })),
        ["login", username, password] => {
            let pair = accounts::login(client, &LoginCredentials::new(*username, *password)).await?;
            print_json(&serde_json::json!({ "user": pair.user }));
        }
        ["logout"] => accounts::logout(client).await?,
        ["profile"] => print_json(&accounts::profile(client).await?),
        ["navigate", path] => {
            let decision = state.navigator.navigate(path);
            let location = match &decision {
                NavigationDecision::Redirect(redirect) => Some(state.navigator.location(redirect)),
                _ => None,
            };
            print_json(&serde_json::json!({ "decision": decision, "location": location }));
        }
        ["bestsellers"] => print_json(&books::best_sellers(client, PageParams::default()).await?),
        ["bestsellers", page] => {
            let page = page
                .parse::<u32>()
                .map_err(|e| ApiError::InvalidRequest(format!("page '{}': {}", page, e)))?;
            print_json(&books::best_sellers(client, PageParams::new(Some(page), None)).await?)
        }
        ["search", text] => print_json(&books::search_books(client, &SearchParams::text(*text)).await?),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--schema") {
        print_schema();
        return;
    }
    if args.is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let config_path =
        std::env::var("SHELFCLIENT_CONFIG").unwrap_or_else(|_| "./config.yaml".to_string());
    let config = load_config(&config_path);

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let state = match build_state(Arc::new(config)) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(&state, &args).await {
        let message = state
            .toasts
            .current()
            .map(|toast| toast.message)
            .unwrap_or_else(|| e.user_message().to_string());
        error!(error_kind = e.kind().as_str(), "{}", e);
        eprintln!("{}", message);
        std::process::exit(1);
    }
}
