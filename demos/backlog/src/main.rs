//! A small command-line front end for a Game Up backend.
//!
//! ```text
//! backlog register <username> <email> <password>
//! backlog login <username-or-email> <password>
//! backlog logout
//! backlog whoami
//! backlog search <text...>
//! backlog find                      (search as you type, one line per keystroke batch)
//! backlog game <catalog-id>
//! backlog library [status]
//! backlog add <catalog-id> [status]
//! backlog status <entry-id> <status>
//! backlog remove <entry-id>
//! backlog recommend
//! ```
//!
//! `GAMEUP_API_URL` and `GAMEUP_STORAGE_PATH` override the backend address
//! and the token file. Set `RUST_LOG=debug` to see what the client does.

use gameup::prelude::*;
use gameup::session::FileStore;
use gameup::transport::HttpBackend;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt};

type App = GameUpClient<HttpBackend, FileStore>;

const USAGE: &str = "usage: backlog <command> [args...]
commands: register login logout whoami search find game library add status remove recommend";

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let client = match GameUpClient::connect(ClientConfig::from_env()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = dispatch(&client, command, rest).await {
        eprintln!("{}", e.user_message());
        if e.requires_login() {
            eprintln!("(run `backlog login <username> <password>`)");
        }
        std::process::exit(1);
    }
}

async fn dispatch(client: &App, command: &str, args: &[String]) -> Result<(), ClientError> {
    match (command, args) {
        ("register", [username, email, password]) => {
            let reply = client
                .register(&RegistrationForm::new(username, email, password))
                .await?;
            println!("{}", reply.message);
            if reply.signed_in {
                println!("signed in, continue at {AFTER_AUTH}");
            }
        }
        ("login", [identifier, password]) => {
            client.login(identifier, password).await?;
            println!("signed in, continue at {AFTER_AUTH}");
        }
        ("logout", []) => {
            client.logout().await?;
            println!("signed out");
        }
        ("whoami", []) => {
            guard(client, "/profile").await?;
            let profile = client.profile().await?;
            println!(
                "{} <{}>, {} completed",
                profile.username, profile.email, profile.completed_games_count
            );
        }
        ("search", words) if !words.is_empty() => {
            for item in client.search(&words.join(" ")).await? {
                print_item(&item);
            }
        }
        ("find", []) => find(client).await?,
        ("game", [id]) => {
            let id = parse_id(id).map(CatalogItemId)?;
            let view = client.game(id).await?;
            print_item(&view.details.item);
            let genres: Vec<_> = view.details.genres.iter().map(|g| g.name.as_str()).collect();
            if !genres.is_empty() {
                println!("  genres: {}", genres.join(", "));
            }
            match view.library {
                Some(status) if status.in_library => {
                    let status = status.status.map(|s| s.to_string()).unwrap_or_default();
                    println!("  in your library: {status}");
                }
                Some(_) => println!("  not in your library"),
                None => {}
            }
        }
        ("library", filter) if filter.len() <= 1 => {
            guard(client, "/my-games").await?;
            let library = client.library();
            library.fetch().await?;
            let tabs = match filter.first() {
                Some(status) => vec![parse_status(status)?],
                None => GameStatus::TAB_ORDER.to_vec(),
            };
            for status in tabs {
                let entries = library.by_status(status);
                println!("{status} ({})", entries.len());
                for entry in entries {
                    println!("  [{}] {}", entry.id.0, entry.details.name);
                }
            }
        }
        ("add", [id, status @ ..]) if status.len() <= 1 => {
            let id = parse_id(id).map(CatalogItemId)?;
            let status = match status.first() {
                Some(status) => parse_status(status)?,
                None => GameStatus::Wishlist,
            };
            match client.library().add(id, status).await? {
                AddOutcome::Added(entry) => println!("added as entry {}", entry.id.0),
                AddOutcome::AlreadyInLibrary => println!("already in your library"),
            }
        }
        ("status", [entry, status]) => {
            let entry = parse_id(entry).map(EntryId)?;
            let status = parse_status(status)?;
            client.library().update_status(entry, status).await?;
            println!("marked {status}");
        }
        ("remove", [entry]) => {
            let entry = parse_id(entry).map(EntryId)?;
            match client.library().remove(entry).await? {
                RemoveOutcome::Removed => println!("removed"),
                RemoveOutcome::AlreadyGone => println!("was not in your library"),
            }
        }
        ("recommend", []) => {
            let profile = client.profile().await?;
            let items = match client.recommendations(&profile).await {
                Ok(items) => items,
                Err(e @ ClientError::NoCompletedGames) => return Err(e),
                Err(e) => {
                    let cached = client.cached_recommendations().await;
                    if cached.is_empty() {
                        return Err(e);
                    }
                    eprintln!("{} Showing earlier suggestions.", e.user_message());
                    cached
                }
            };
            for rec in items {
                print_item(&rec.details);
                println!("  {}", rec.reason);
            }
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
    Ok(())
}

/// Refuses protected commands the same way the app refuses protected views.
async fn guard(client: &App, path: &str) -> Result<(), ClientError> {
    match client.navigate(path).await {
        Resolution::Render(_) => Ok(()),
        Resolution::Redirect(_) => Err(ClientError::Auth),
    }
}

/// Reads search text from stdin, one line at a time, and prints results as
/// they settle.
async fn find(client: &App) -> Result<(), ClientError> {
    let session = client.search_session();
    let mut updates = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("type to search, empty input to clear, ctrl-d to quit");

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(text)) => session.set_query(text),
                Ok(None) => return Ok(()),
                Err(e) => {
                    tracing::warn!(error = %e, "stdin closed");
                    return Ok(());
                }
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = updates.borrow_and_update().clone();
                if state.loading {
                    continue;
                }
                if let Some(error) = &state.error {
                    eprintln!("{error}");
                }
                for item in &state.results {
                    print_item(item);
                }
            }
        }
    }
}

fn print_item(item: &CatalogItemSummary) {
    match item.release_year() {
        Some(year) => println!("{} {} ({year})", item.id.0, item.name),
        None => println!("{} {}", item.id.0, item.name),
    }
}

fn parse_id(text: &str) -> Result<u64, ClientError> {
    text.parse().map_err(|_| ClientError::Server {
        message: Some(format!("{text:?} is not an id")),
    })
}

fn parse_status(text: &str) -> Result<GameStatus, ClientError> {
    text.parse().map_err(|_| ClientError::Server {
        message: Some(format!(
            "{text:?} is not a status, use Wishlist, Playing, Completed or Dropped"
        )),
    })
}
