//! Command-line front end for the recipe store.
//!
//! Wires settings, the snapshot directory, the session service and the
//! recipe cache together, runs one command and prints its result as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use recipe_store::config::StoreSettings;
use recipe_store::domain::ports::{FixtureLoginService, LoginService, SnapshotStore};
use recipe_store::domain::{
    DomainError, LoginCredentials, RecipeCache, RecipeDraft, RecipeId, Registration, SessionContext,
    SessionService,
};
use recipe_store::outbound::http::HttpRecipeSource;
use recipe_store::outbound::storage::DirectorySnapshotStore;
use serde::Serialize;
use serde_json::json;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `recipes` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "recipes",
    about = "Manage your recipes against a backend or a local snapshot",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in with e-mail and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign it in.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List recipes.
    List(ListArgs),
    /// Show one recipe.
    Show { id: String },
    /// Create a recipe.
    Add(DraftArgs),
    /// Edit one of your recipes; omitted fields keep their value.
    Edit {
        id: String,
        #[command(flatten)]
        changes: EditArgs,
    },
    /// Toggle the favourite flag of one of your recipes.
    Favorite { id: String },
    /// Delete one of your recipes.
    Delete { id: String },
}

#[derive(Debug, Args)]
#[group(multiple = false)]
struct ListArgs {
    /// Only recipes you own.
    #[arg(long)]
    owned: bool,
    /// Only your favourite recipes.
    #[arg(long)]
    favorites: bool,
}

#[derive(Debug, Args)]
struct DraftArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Repeat for each ingredient, in order.
    #[arg(long = "ingredient", value_name = "text")]
    ingredients: Vec<String>,
    /// Repeat for each method step, in order.
    #[arg(long = "step", value_name = "text")]
    instructions: Vec<String>,
    /// Preparation time in minutes.
    #[arg(long, default_value_t = 0)]
    prep_time: u32,
    /// Cooking time in minutes.
    #[arg(long, default_value_t = 0)]
    cook_time: u32,
    #[arg(long, default_value_t = 1)]
    servings: u32,
    #[arg(long, value_name = "url")]
    image_url: Option<String>,
}

impl From<DraftArgs> for RecipeDraft {
    fn from(value: DraftArgs) -> Self {
        Self {
            title: value.title,
            description: value.description,
            ingredients: value.ingredients,
            instructions: value.instructions,
            prep_time: value.prep_time,
            cook_time: value.cook_time,
            servings: value.servings,
            image_url: value.image_url,
        }
    }
}

#[derive(Debug, Args)]
struct EditArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Replaces all ingredients when given.
    #[arg(long = "ingredient", value_name = "text")]
    ingredients: Vec<String>,
    /// Replaces all method steps when given.
    #[arg(long = "step", value_name = "text")]
    instructions: Vec<String>,
    #[arg(long)]
    prep_time: Option<u32>,
    #[arg(long)]
    cook_time: Option<u32>,
    #[arg(long)]
    servings: Option<u32>,
    #[arg(long, value_name = "url")]
    image_url: Option<String>,
}

impl EditArgs {
    fn apply(self, mut draft: RecipeDraft) -> RecipeDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if !self.ingredients.is_empty() {
            draft.ingredients = self.ingredients;
        }
        if !self.instructions.is_empty() {
            draft.instructions = self.instructions;
        }
        draft.prep_time = self.prep_time.unwrap_or(draft.prep_time);
        draft.cook_time = self.cook_time.unwrap_or(draft.cook_time);
        draft.servings = self.servings.unwrap_or(draft.servings);
        if self.image_url.is_some() {
            draft.image_url = self.image_url;
        }
        draft
    }
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let settings = StoreSettings::load_from_iter([OsString::from("recipes")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let store: Arc<dyn SnapshotStore> = Arc::new(
        DirectorySnapshotStore::open(settings.storage_dir())
            .map_err(|error| io::Error::other(format!("open snapshot directory: {error}")))?,
    );
    let login: Arc<dyn LoginService> = Arc::new(
        FixtureLoginService::new().map_err(|error| failure("prepare login service", &error))?,
    );
    let session = SessionService::new(login, Arc::clone(&store));
    session
        .hydrate()
        .await
        .map_err(|error| failure("restore session", &error))?;

    match args.command {
        Command::Login { email, password } => {
            let credentials = LoginCredentials::try_from_parts(&email, &password)
                .map_err(|error| failure("login", &DomainError::from(error)))?;
            let user = session
                .login(&credentials)
                .await
                .map_err(|error| failure("login", &error))?;
            emit(&user)
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let registration = Registration::try_from_parts(&username, &email, &password)
                .map_err(|error| failure("register", &DomainError::from(error)))?;
            let user = session
                .register(&registration)
                .await
                .map_err(|error| failure("register", &error))?;
            emit(&user)
        }
        Command::Logout => {
            session
                .logout()
                .await
                .map_err(|error| failure("logout", &error))?;
            emit(&json!({ "signedOut": true }))
        }
        Command::Whoami => emit(&session.context().current_user()),
        command => {
            let cache = open_cache(&settings, store).await?;
            run_recipe_command(&cache, &session.context(), command).await
        }
    }
}

async fn open_cache(
    settings: &StoreSettings,
    store: Arc<dyn SnapshotStore>,
) -> io::Result<RecipeCache> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let base_url = settings.backend_base_url().map_err(io::Error::other)?;
    let cache = match base_url {
        Some(url) => {
            let source = HttpRecipeSource::new(url, settings.request_timeout())
                .map_err(|error| io::Error::other(format!("create HTTP client: {error}")))?;
            let remote = RecipeCache::remote(Arc::new(source), clock);
            remote
                .load()
                .await
                .map_err(|error| failure("load recipes", &error))?;
            remote
        }
        None => {
            let local = RecipeCache::local_only(store, clock).await;
            if let Some(error) = local.last_error() {
                return Err(failure("load recipes", &error));
            }
            local
        }
    };
    Ok(cache)
}

async fn run_recipe_command(
    cache: &RecipeCache,
    session: &SessionContext,
    command: Command,
) -> io::Result<()> {
    match command {
        Command::List(filter) => {
            let recipes = if filter.owned {
                cache.owned_recipes(session)
            } else if filter.favorites {
                cache.favorite_recipes(session)
            } else {
                cache.recipes()
            };
            emit(&recipes)
        }
        Command::Show { id: raw_id } => {
            let id = parse_id(&raw_id)?;
            let recipe = cache
                .get_by_id(&id)
                .ok_or_else(|| failure("show", &missing(&id)))?;
            emit(&recipe)
        }
        Command::Add(draft) => {
            let id = cache
                .create(session, draft.into())
                .await
                .map_err(|error| failure("add", &error))?;
            emit(&cache.get_by_id(&id))
        }
        Command::Edit {
            id: raw_id,
            changes,
        } => {
            let id = parse_id(&raw_id)?;
            let current = cache
                .get_by_id(&id)
                .ok_or_else(|| failure("edit", &missing(&id)))?;
            let updated = cache
                .update(session, &id, changes.apply(current.to_draft()))
                .await
                .map_err(|error| failure("edit", &error))?;
            emit(&updated)
        }
        Command::Favorite { id } => {
            let recipe = cache
                .toggle_favorite(session, &parse_id(&id)?)
                .await
                .map_err(|error| failure("favorite", &error))?;
            emit(&recipe)
        }
        Command::Delete { id: raw_id } => {
            let id = parse_id(&raw_id)?;
            cache
                .delete(session, &id)
                .await
                .map_err(|error| failure("delete", &error))?;
            emit(&json!({ "deleted": id }))
        }
        Command::Login { .. }
        | Command::Register { .. }
        | Command::Logout
        | Command::Whoami => Err(io::Error::other("session commands do not use the recipe cache")),
    }
}

fn parse_id(raw: &str) -> io::Result<RecipeId> {
    RecipeId::parse(raw).map_err(|error| failure("parse id", &DomainError::from(error)))
}

fn missing(id: &RecipeId) -> DomainError {
    DomainError::not_found(format!("recipe {id} not found"))
}

fn failure(action: &str, error: &DomainError) -> io::Error {
    io::Error::other(format!("{action} failed ({:?}): {error}", error.code()))
}

fn emit<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).map_err(io::Error::other)?;
    writeln!(out)
}
