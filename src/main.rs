//! CLI entry point for sanity-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sanity-blog")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "A server-rendered blog front end for a Sanity content backend", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-render every page into the public folder
    #[command(alias = "g")]
    Generate,

    /// Serve pages rendered on request
    #[command(alias = "s")]
    Server {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Clean the public folder
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, author, route)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "sanity_blog=debug,info"
    } else {
        "sanity_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Generate => {
            let blog = sanity_blog::Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            blog.generate().await?;
            println!("Generated successfully!");
        }

        Commands::Server { port, ip, open } => {
            let blog = sanity_blog::Blog::new(&base_dir)?;
            let port = port.unwrap_or(blog.config.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            sanity_blog::server::start(&blog, &ip, port, open).await?;
        }

        Commands::Clean => {
            let blog = sanity_blog::Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let blog = sanity_blog::Blog::new(&base_dir)?;
            sanity_blog::commands::list::run(&blog, &r#type).await?;
        }

        Commands::Version => {
            println!("sanity-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
