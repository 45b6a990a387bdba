use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use edushare::{
    api::{
        collections::CollectionListOptions,
        resources::{NewResource, ResourceFilter},
        ListOptions,
    },
    common::comment::flatten,
    config::{ClientConfig, SessionStorage},
    forms::FormView,
    views::Route,
    EduShare, FileUpload, Id,
};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Session file used when the configuration keeps the session in memory.
const DEFAULT_SESSION_FILE: &str = ".edushare-session.json";

#[derive(Parser)]
#[command(version, about = "Command line client of an EduShare backend.")]
struct Cli {
    /// TOML configuration file, layered over the built-in defaults.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Maximum tracing verbosity: error|warn|info|debug|trace. Defaults to
    /// `logging.level` of the configuration.
    #[arg(long, value_parser = clap::value_parser!(LevelFilter))]
    level: Option<LevelFilter>,

    /// Backend base URL, e.g. `http://localhost:3000/api`.
    #[arg(long)]
    api_url: Option<String>,

    /// Where the session is kept between runs.
    #[arg(long)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with email and password.
    Login {
        email: String,
        password: String,
        /// Tick "remember me" on the login form. The session itself is
        /// always kept in the session file.
        #[arg(long)]
        remember: bool,
    },
    /// Sign out and forget the session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Check a registration key.
    ValidateKey { key: String },
    /// Resolve a page path through the route guard.
    Open { path: String },
    /// List collections.
    Collections {
        #[arg(value_enum, default_value_t = CollectionScope::Public)]
        scope: CollectionScope,
        #[arg(long)]
        page: Option<u32>,
    },
    /// List resources.
    Resources {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        matiere: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Publish a file as a new resource.
    Upload {
        file: PathBuf,
        #[arg(long)]
        titre: String,
        #[arg(long)]
        matiere: Option<String>,
        #[arg(long)]
        niveau: Option<String>,
        #[arg(long)]
        public: bool,
    },
    /// Show the comment thread of a resource.
    Comments { ressource: Id },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CollectionScope {
    Public,
    Mine,
    Popular,
    Recent,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let level = cli.level.unwrap_or(config.logging.level.0);
    init_tracing(level);
    debug!(%level, base_url = %config.api.base_url, "Tracing initialized");

    let app = EduShare::from_config(&config)?;
    run(&app, cli.command).await
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ClientConfig::default(),
    }
    .with_env_overrides();

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(path) = &cli.session {
        config.session.path = Some(path.clone());
        config.session.storage = SessionStorage::File;
    } else if config.session.storage == SessionStorage::Memory {
        config.session.path = Some(PathBuf::from(DEFAULT_SESSION_FILE));
        config.session.storage = SessionStorage::File;
    }
    Ok(config)
}

/// Runs one command. Every authenticated call goes through the dispatcher,
/// except the login, key and logout flows which handle their own 401.
async fn run(app: &EduShare, command: Command) -> Result<()> {
    let dispatcher = app.dispatcher();
    match command {
        Command::Login {
            email,
            password,
            remember,
        } => {
            let mut form = app.login_form();
            form.set_field("email", &email)?;
            form.set_field("password", &password)?;
            form.set_field("remember_me", if remember { "on" } else { "" })?;
            let outcome = form.login(&app.auth()).await;
            println!("{}", FormView::of(&form));
            match outcome {
                Some(Ok(_)) => {
                    let landing = app.views().enter(Route::LANDING);
                    info!(%landing, "Signed in");
                }
                Some(Err(e)) => bail!(e.user_message()),
                None => bail!("the form is not valid"),
            }
        }
        Command::Logout => {
            app.auth().logout().await?;
            println!("Déconnecté");
        }
        Command::Whoami => {
            let user = dispatcher.run(app.auth().me()).await?;
            let affiliation = user.affiliation().unwrap_or("-");
            println!("{} <{}> {} ({affiliation})", user.display_name(), user.email, user.role);
        }
        Command::ValidateKey { key } => {
            let check = app.auth().validate_key(&key).await?;
            match (check.valid, check.role) {
                (true, Some(role)) => println!("Clé valide : compte {role}"),
                (true, None) => println!("Clé valide"),
                (false, _) => bail!(check.message.unwrap_or_else(|| "Clé invalide".into())),
            }
        }
        Command::Open { path } => {
            let route: Route = path.parse()?;
            let landed = app.views().enter(route);
            println!("{landed}");
        }
        Command::Collections { scope, page } => {
            let options = ListOptions {
                page,
                ..ListOptions::default()
            };
            let collections = app.collections();
            let listing = match scope {
                CollectionScope::Public => {
                    let filter = CollectionListOptions {
                        page,
                        ..CollectionListOptions::default()
                    };
                    dispatcher.run(collections.all(&filter)).await?
                }
                CollectionScope::Mine => dispatcher.run(collections.my(&options)).await?,
                CollectionScope::Popular => dispatcher.run(collections.popular(&options)).await?,
                CollectionScope::Recent => dispatcher.run(collections.recent(&options)).await?,
            };
            for collection in &listing.items {
                let visibility = if collection.is_public { "publique" } else { "privée" };
                println!(
                    "#{} {} ({} ressources, {visibility})",
                    collection.id,
                    collection.nom,
                    collection.ressources.len()
                );
            }
            if listing.has_more() {
                println!("...");
            }
        }
        Command::Resources {
            search,
            matiere,
            page,
        } => {
            let filter = ResourceFilter {
                page,
                search,
                matiere,
                ..ResourceFilter::default()
            };
            let listing = dispatcher.run(app.resources().list(&filter)).await?;
            for resource in &listing.items {
                let matiere = resource.matiere.as_deref().unwrap_or("-");
                println!("#{} {} [{matiere}]", resource.id, resource.titre);
            }
        }
        Command::Upload {
            file,
            titre,
            matiere,
            niveau,
            public,
        } => {
            let upload = FileUpload::from_path(&file).await?;
            let resource = NewResource {
                titre,
                matiere,
                niveau,
                is_public: public,
                ..NewResource::default()
            };
            let created = dispatcher
                .run(app.resources().create(resource, upload))
                .await?;
            println!("Ressource #{} publiée", created.id);
        }
        Command::Comments { ressource } => {
            let forest = dispatcher.run(app.comments().tree(ressource)).await?;
            if forest.is_empty() {
                println!("Aucun commentaire");
            }
            for (level, comment) in flatten(&forest) {
                println!("{}- {}", "  ".repeat(level), comment.contenu);
            }
        }
    }
    Ok(())
}

fn init_tracing(level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .init();
}
