mod cli;

use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_client::collection::{Collection, Record};
use resume_client::models::{Credentials, RecordId, Registration};
use resume_client::{AppContext, ClientError, Config};

use crate::cli::{
    AchievementCommand, Cli, Command, DocumentCommand, EducationCommand, EmployerCommand,
    ExperienceCommand,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging (stderr, so stdout stays machine-readable)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resume_client={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("resume-client v{}", env!("CARGO_PKG_VERSION"));

    let ctx = AppContext::from_config(config).await?;

    let needs_session = cli.command.needs_session();
    match run(&ctx, cli.command).await {
        Ok(()) => Ok(()),
        Err(e) if needs_session && e.requires_login() => {
            bail!("Not logged in (or the session expired). Run `resume-client login` first.")
        }
        Err(e) => {
            let message = e.user_message("Request failed");
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

async fn run(ctx: &AppContext, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Health => print_json(&ctx.health().await?),
        Command::Login { username, password } => {
            ctx.login(&Credentials { username, password }).await?;
            println!("Logged in.");
            Ok(())
        }
        Command::Register {
            email,
            password,
            username,
            full_name,
        } => {
            let registration = Registration {
                email,
                password,
                username,
                full_name,
            };
            let user = ctx.register(&registration).await?;
            print_json(&user)?;
            if !ctx.is_authenticated() {
                println!("Account created. Log in to continue.");
            }
            Ok(())
        }
        Command::Logout => {
            ctx.logout().await;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => print_json(&ctx.verify().await?),
        Command::Experiences(cmd) => experiences(ctx, cmd).await,
        Command::Educations(cmd) => educations(ctx, cmd).await,
        Command::Achievements(cmd) => achievements(ctx, cmd).await,
        Command::Documents(cmd) => documents(ctx, cmd).await,
        Command::Employer(cmd) => employer(ctx, cmd).await,
    }
}

async fn experiences(ctx: &AppContext, cmd: ExperienceCommand) -> Result<(), ClientError> {
    let collection = &ctx.profile.experiences;
    match cmd {
        ExperienceCommand::List => list(collection).await,
        ExperienceCommand::Add(args) => print_json(&collection.create(&args.into()).await?),
        ExperienceCommand::Update { id, fields } => update(collection, id, fields.into()).await,
        ExperienceCommand::Remove { id } => remove(collection, id).await,
    }
}

async fn educations(ctx: &AppContext, cmd: EducationCommand) -> Result<(), ClientError> {
    let collection = &ctx.profile.educations;
    match cmd {
        EducationCommand::List => list(collection).await,
        EducationCommand::Add(args) => print_json(&collection.create(&args.into()).await?),
        EducationCommand::Update { id, fields } => update(collection, id, fields.into()).await,
        EducationCommand::Remove { id } => remove(collection, id).await,
    }
}

async fn achievements(ctx: &AppContext, cmd: AchievementCommand) -> Result<(), ClientError> {
    let collection = &ctx.profile.achievements;
    match cmd {
        AchievementCommand::List => list(collection).await,
        AchievementCommand::Add(args) => print_json(&collection.create(&args.into()).await?),
        AchievementCommand::Update { id, fields } => update(collection, id, fields.into()).await,
        AchievementCommand::Remove { id } => remove(collection, id).await,
    }
}

async fn documents(ctx: &AppContext, cmd: DocumentCommand) -> Result<(), ClientError> {
    let collection = &ctx.documents;
    match cmd {
        DocumentCommand::List => list(collection).await,
        DocumentCommand::Show { id } => print_json(&collection.get(&RecordId::from(id)).await?),
        DocumentCommand::Create(args) => {
            let draft = args.into_draft()?;
            print_json(&collection.create(&draft).await?)
        }
        DocumentCommand::Generate(args) => {
            let request = args.into_request()?;
            print_json(&collection.generate(&request).await?)
        }
        DocumentCommand::Update { id, fields } => update(collection, id, fields.into()).await,
        DocumentCommand::Remove { id } => remove(collection, id).await,
    }
}

async fn employer(ctx: &AppContext, cmd: EmployerCommand) -> Result<(), ClientError> {
    match cmd {
        EmployerCommand::Scrape { url } => print_json(&ctx.scrape_employer(&url).await?),
        EmployerCommand::List => print_json(&ctx.list_employers().await?),
        EmployerCommand::Show { id } => print_json(&ctx.get_employer(&RecordId::from(id)).await?),
    }
}

async fn list<R: Record>(collection: &Collection<R>) -> Result<(), ClientError> {
    collection.load().await?;
    print_json(&collection.items())
}

async fn update<R: Record>(
    collection: &Collection<R>,
    id: String,
    patch: R::Patch,
) -> Result<(), ClientError> {
    // load first so the cache has the entry the update reconciles into
    collection.load().await?;
    print_json(&collection.update(&RecordId::from(id), &patch).await?)
}

async fn remove<R: Record>(collection: &Collection<R>, id: String) -> Result<(), ClientError> {
    collection.remove(&RecordId::from(id)).await?;
    println!("Deleted.");
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), ClientError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
