use log::{error, info};

use rg11_poller::{Poller, PollerConfig, TcpTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match PollerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Starting RG11 poller for {}", config.address());

    let transport = TcpTransport::from_config(&config);
    let mut poller = Poller::from_config(&config, transport);
    let mut stdout = std::io::stdout();

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                // Keep the sender alive so the poll loop is not cut short
                std::future::pending::<()>().await;
                drop(tx);
            }
        }
    });

    // Run poll loop until Ctrl+C or stdout goes away
    tokio::select! {
        result = poller.run(&mut stdout) => {
            if let Err(e) = result {
                error!("Cannot write poll results: {}", e);
            }
        }
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    poller.summary().log();

    Ok(())
}
