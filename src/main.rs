use tracing::info;

use caspar::app::Site;
use caspar::bootstrap::Bootstrap;
use caspar::config::Config;
use caspar::server::Server;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    caspar::logging::init(&config.logging)?;

    info!("Starting caspar {}...", caspar::VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let bootstrap = Bootstrap::from_config(&config)?;
    bootstrap.initialize()?;

    let site = Site::new(bootstrap.session_name());
    let server = Server::bind(&config.server, bootstrap, site).await?;

    // Handle shutdown gracefully
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}
