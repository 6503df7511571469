//! movie-collection command line entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use movie_collection::adapters::storage::{create_movie_storage, FileKeyValueStore};
use movie_collection::adapters::supabase::{
    SupabaseAuthProvider, SupabaseClient, SupabaseClientConfig,
};
use movie_collection::application::{CollectionController, SessionError, SessionManager};
use movie_collection::config::{AppConfig, ConfigError, LoggingConfig};
use movie_collection::domain::auth::AuthError;
use movie_collection::domain::foundation::{MovieId, ValidationError};
use movie_collection::domain::movie::{is_recommended, Movie, MovieDraft, MovieUpdate, GENRES};
use movie_collection::ports::{KeyValueStore, StorageError};

#[derive(Parser)]
#[command(name = "movie-collection", version, about = "Track the movies you own and have watched")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the collection, newest first
    List,
    /// Add a movie
    Add(AddArgs),
    /// Change fields of a movie
    Update(UpdateArgs),
    /// Delete a movie
    Delete {
        /// Movie id as shown by `list`
        id: String,
    },
    /// Sign in with email and password
    SignIn(CredentialArgs),
    /// Create an account
    SignUp(CredentialArgs),
    /// Sign out
    SignOut,
    /// Show the signed-in email
    Whoami,
}

#[derive(Args)]
struct AddArgs {
    /// Movie title
    title: String,
    /// Release year (defaults to the current year)
    #[arg(long)]
    year: Option<String>,
    /// Genre (defaults to Action)
    #[arg(long)]
    genre: Option<String>,
    /// Rating from 1 to 5 (defaults to 3)
    #[arg(long)]
    rating: Option<u8>,
    /// Mark as already watched
    #[arg(long)]
    watched: bool,
}

#[derive(Args)]
struct UpdateArgs {
    /// Movie id as shown by `list`
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    genre: Option<String>,
    #[arg(long)]
    rating: Option<u8>,
    /// true or false
    #[arg(long)]
    watched: Option<bool>,
}

#[derive(Args)]
struct CredentialArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Load(String),

    #[error("Sign in to access your collection")]
    SignInRequired,

    #[error("Nothing to update")]
    EmptyUpdate,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error: {}", error);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(command: Command, config: AppConfig) -> Result<(), CliError> {
    config.validate().map_err(ConfigError::from)?;

    let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(config.storage.data_path()));
    let client = match SupabaseClientConfig::from_config(&config.supabase) {
        Some(client_config) => Some(Arc::new(SupabaseClient::new(client_config, Arc::clone(&store))?)),
        None => None,
    };

    let sessions = match &client {
        Some(client) => SessionManager::new(Arc::new(SupabaseAuthProvider::new(Arc::clone(client)))),
        None => SessionManager::unconfigured(),
    };
    let controller = CollectionController::new(create_movie_storage(&config.storage, store, client));
    let mut events = sessions.initialize().await;

    match command {
        Command::SignIn(args) => {
            sessions.sign_in(&args.email, &args.password).await?;
            while events.try_next().is_some() {}
            match sessions.identity() {
                Some(identity) => println!("Signed in as {}", identity.email),
                None => println!("Signed in"),
            }
        }
        Command::SignUp(args) => {
            sessions.sign_up(&args.email, &args.password).await?;
            while events.try_next().is_some() {}
            match sessions.identity() {
                Some(identity) => println!("Account created, signed in as {}", identity.email),
                None => println!("Check your email to confirm your account"),
            }
        }
        Command::SignOut => {
            sessions.sign_out().await?;
            println!("Signed out");
        }
        Command::Whoami => match sessions.identity() {
            Some(identity) => println!("{}", identity.email),
            None => println!("Not signed in"),
        },
        collection_command => {
            controller.start(&mut events).await;
            if controller.mode().is_remote() && sessions.identity().is_none() {
                return Err(CliError::SignInRequired);
            }
            run_collection_command(&controller, collection_command).await?;
        }
    }

    Ok(())
}

async fn run_collection_command(
    controller: &CollectionController,
    command: Command,
) -> Result<(), CliError> {
    match command {
        Command::List => {
            if let Some(error) = controller.error() {
                return Err(CliError::Load(error));
            }
            let movies = controller.movies();
            if movies.is_empty() {
                println!("No movies yet. Add your first movie!");
            }
            for movie in &movies {
                print_card(movie);
            }
        }
        Command::Add(args) => {
            let mut draft = MovieDraft::titled(args.title);
            if let Some(year) = args.year {
                draft.year = year;
            }
            if let Some(genre) = args.genre {
                if !is_recommended(&genre) {
                    tracing::warn!(%genre, "Genre is not one of {}", GENRES.join(", "));
                }
                draft.genre = genre;
            }
            if let Some(rating) = args.rating {
                draft.rating = rating;
            }
            draft.watched = args.watched;

            let movie = controller.add_movie(draft.into_new_movie()?).await?;
            println!("Added:");
            print_card(&movie);
        }
        Command::Update(args) => {
            let mut update = MovieUpdate::new();
            if let Some(title) = args.title {
                update = update.title(title)?;
            }
            if let Some(year) = args.year {
                update = update.year(year);
            }
            if let Some(genre) = args.genre {
                update = update.genre(genre);
            }
            if let Some(rating) = args.rating {
                update = update.rating(rating)?;
            }
            if let Some(watched) = args.watched {
                update = update.watched(watched);
            }
            if update.is_empty() {
                return Err(CliError::EmptyUpdate);
            }

            let movie = controller.update_movie(&MovieId::new(args.id)?, update).await?;
            println!("Updated:");
            print_card(&movie);
        }
        Command::Delete { id } => {
            let id = MovieId::new(id)?;
            controller.delete_movie(&id).await?;
            println!("Deleted {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn print_card(movie: &Movie) {
    println!("{} [{}]", movie.title, movie.status_label());
    println!("  {}", movie.subtitle());
    println!("  {}", movie.rating.stars());
    println!("  id: {}", movie.id);
}
