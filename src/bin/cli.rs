use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use secretaria::cli::create_admin;

#[derive(Parser)]
#[command(name = "secretaria-cli")]
#[command(about = "Secretaria CLI - Administrative tools for Secretaria", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a bootstrap admin credential
    CreateAdmin {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize database connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdmin { email, password } => {
            handle_create_admin(&pool, email, password).await
        }
    }
}

async fn handle_create_admin(
    pool: &sqlx::postgres::PgPool,
    email: Option<String>,
    password: Option<String>,
) {
    // Use provided values or prompt interactively
    let email = email.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Email address")
            .interact_text()
            .expect("Failed to read email")
    });

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .expect("Failed to read password")
    });

    match create_admin(pool, &email, &password).await {
        Ok(_) => {
            println!("\n✅ Admin credential created successfully!");
            println!("   Email: {}", email);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin credential: {}", e);
            std::process::exit(1);
        }
    }
}
