use mock_server::ServerConfig;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let config = ServerConfig::from_env();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let location = config.describe();
    info!(%location, "listening");
    match &config.unix_socket {
        #[cfg(unix)]
        Some(path) => {
            let listener = mock_server::bind_unix(path)?;
            axum::serve(listener, mock_server::app())
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        #[cfg(not(unix))]
        Some(_) => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "UNIX_SOCKET is not supported on this platform",
            ));
        }
        None => {
            let listener = TcpListener::bind(config.addr()).await?;
            axum::serve(listener, mock_server::app())
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }
    info!(%location, "stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
