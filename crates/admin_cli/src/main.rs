use std::error::Error;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use engine::{Engine, MoneyCents, NewUser, PropertyDraft, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "shortlet_admin")]
#[command(about = "Admin utilities for Shortlet (bootstrap users/properties)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./shortlet.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Property(Property),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account and print its API token.
    Create(UserCreateArgs),
    /// Issue a fresh API token, revoking the previous one.
    Token(UserTokenArgs),
    /// Deactivate an account on behalf of an admin.
    Deactivate(UserDeactivateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// `user` (guest), `agent` or `admin`.
    #[arg(long, default_value = "user", value_parser = parse_role)]
    role: Role,
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Args, Debug)]
struct UserTokenArgs {
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct UserDeactivateArgs {
    #[arg(long)]
    email: String,
    /// Email of the admin performing the change.
    #[arg(long)]
    admin_email: String,
}

#[derive(Args, Debug)]
struct Property {
    #[command(subcommand)]
    command: PropertyCommand,
}

#[derive(Subcommand, Debug)]
enum PropertyCommand {
    Create(PropertyCreateArgs),
}

#[derive(Args, Debug)]
struct PropertyCreateArgs {
    #[arg(long)]
    owner_email: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    /// Nightly price, e.g. `120.00`.
    #[arg(long, value_parser = parse_price)]
    price: MoneyCents,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw).map_err(|err| err.to_string())
}

fn parse_price(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let (user, token) = engine
                .create_user(
                    NewUser {
                        name: args.name,
                        email: args.email,
                        phone: args.phone,
                        role: args.role,
                    },
                    Utc::now(),
                )
                .await?;
            println!("created {} {} ({})", user.role.as_str(), user.email, user.id);
            println!("token: {token}");
        }
        Command::User(User {
            command: UserCommand::Token(args),
        }) => {
            let user = engine.user_by_email(&args.email).await?;
            let token = engine.reissue_token(user.id).await?;
            println!("token: {token}");
        }
        Command::User(User {
            command: UserCommand::Deactivate(args),
        }) => {
            let admin = engine.user_by_email(&args.admin_email).await?;
            let user = engine.user_by_email(&args.email).await?;
            engine
                .set_user_active(&admin.identity(), user.id, false)
                .await?;
            println!("deactivated user: {}", user.email);
        }
        Command::Property(Property {
            command: PropertyCommand::Create(args),
        }) => {
            let owner = engine.user_by_email(&args.owner_email).await?;
            let property = engine
                .create_property(
                    &owner.identity(),
                    PropertyDraft {
                        title: args.title,
                        description: args.description,
                        price: args.price,
                    },
                    Utc::now(),
                )
                .await?;
            println!("created property: {} ({})", property.title, property.id);
        }
    }

    Ok(())
}
