use std::path::Path;
use std::sync::Arc;

use flexserve::config::Config;
use flexserve::server::{Server, tls};
use flexserve::state::SharedState;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = match Config::from_args(std::env::args()) {
        Ok(cfg) => cfg,
        Err(usage) => {
            eprintln!("{usage}");
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.threads)
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let acceptor = match &cfg.cert_dir {
            Some(dir) => Some(tls::acceptor(Path::new(dir))?),
            None => {
                warn!("CERT_DIR not set; TLS disabled, serving plaintext only");
                None
            }
        };

        let state = Arc::new(SharedState::new(cfg.doc_root.clone()));
        let server = Server::bind(&cfg.listen_addr, acceptor, state).await?;

        tokio::select! {
            res = server.serve() => {
                res?;
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
            }
        }

        Ok(())
    })
}
