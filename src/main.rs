use clap::Parser;
use roomfinder::config::cli::{AddArgs, EditArgs, SearchArgs};
use roomfinder::utils::error::ErrorSeverity;
use roomfinder::utils::{logger, validation::Validate};
use roomfinder::view::{self, Navigation, OutputFormat};
use roomfinder::{App, AppConfig, Cli, Command, ImageFile, Listing, Result, RoomError};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 2 = worth retrying, 3 = fix the setup first
        let exit_code = match e.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };
    config.validate()?;

    let app = App::from_config(&config)?;
    let _session_log = app.sessions.subscribe(|event, session| {
        tracing::debug!(
            "Auth state changed: {:?} ({})",
            event,
            session
                .map(|s| s.account_id().to_string())
                .unwrap_or_else(|| "signed out".to_string())
        );
    });
    app.auth.restore().await?;

    let route = cli.command.route();
    if let Navigation::Redirect(to) = view::guard(route, app.sessions.is_signed_in()) {
        tracing::info!("{} needs a session, redirecting to {}", route.path(), to.path());
        return Err(RoomError::Unauthenticated);
    }

    match cli.command {
        Command::Signup(args) => {
            let outcome = app.auth.sign_up(&args.email, &args.password).await?;
            if outcome.session.is_some() {
                println!("✅ Account created and signed in");
            } else {
                println!("✅ Account created. Please check your email to confirm it, then log in.");
            }
        }
        Command::Login(args) => {
            let session = app.auth.sign_in(&args.email, &args.password).await?;
            println!(
                "✅ Signed in as {}",
                session.account.email.as_deref().unwrap_or("your account")
            );
        }
        Command::Logout => {
            app.auth.sign_out().await?;
            println!("👋 Signed out");
        }
        Command::Whoami => {
            let account = app.auth.current_account().await?;
            println!(
                "{} ({})",
                account.email.as_deref().unwrap_or("<no email>"),
                account.id
            );
        }
        Command::Search(args) => search(&app, &args).await?,
        Command::Mine { format } => {
            let listings = app.listings.my_listings().await?;
            print_listings(&listings, format)?;
        }
        Command::Show { id } => {
            let listing = app.listings.listing(id).await?;
            let viewer = app.sessions.current().map(|s| s.account);
            println!("{}", view::render_detail(&listing, viewer.as_ref()));
        }
        Command::Add(args) => add(&app, &args).await?,
        Command::Edit(args) => edit(&app, &args).await?,
        Command::Delete { id } => {
            let mut mine = view::ListingsView::new(app.listings.my_listings().await?);
            mine.delete(&app.listings, id).await?;
            println!("🗑️ Deleted. You have {} listing(s) left.", mine.listings().len());
        }
    }

    Ok(())
}

async fn search(app: &App, args: &SearchArgs) -> Result<()> {
    let listings = app
        .listings
        .browse(&args.server_filter(), &args.query, &args.criteria())
        .await?;
    print_listings(&listings, args.format)
}

async fn add(app: &App, args: &AddArgs) -> Result<()> {
    let images = read_images(&args.images).await?;
    let listing = app.listings.create_listing(args.draft(), images).await?;
    println!("✅ Room added successfully!");
    println!("{}", view::render_card(&listing));
    Ok(())
}

async fn edit(app: &App, args: &EditArgs) -> Result<()> {
    let images = read_images(&args.images).await?;
    let listing = app
        .listings
        .edit_listing(args.id, args.patch(), &args.remove_images, images)
        .await?;
    println!("✅ Room updated successfully!");
    println!("{}", view::render_card(&listing));
    Ok(())
}

async fn read_images(paths: &[PathBuf]) -> Result<Vec<ImageFile>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();
        images.push(ImageFile::new(file_name, bytes));
    }
    Ok(images)
}

fn print_listings(listings: &[Listing], format: OutputFormat) -> Result<()> {
    println!("{}", view::render_listings(listings, format)?);
    Ok(())
}
