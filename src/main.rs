//! `seckav-status`: probe the configured backend once and report the
//! indicator label plus any session restored from the data directory.

use std::process::ExitCode;
use std::sync::Arc;

use seckav_web::config::Config;
use seckav_web::net::Gateway;
use seckav_web::state::{FileStorage, SessionStore};
use seckav_web::status::BackendStatus;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let gateway = match Gateway::new(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!(error = %e, "failed to build http client");
            return ExitCode::FAILURE;
        }
    };

    let session = SessionStore::new(Arc::new(FileStorage::new(&config.data_dir)));
    session.init();

    tracing::info!(backend = %gateway.base_url(), "probing backend");
    let status = BackendStatus::probe(&gateway).await;
    println!("{}: {}", gateway.base_url(), status.label());

    let current = session.current();
    match current.identity.as_ref() {
        Some(identity) if current.is_authenticated() => {
            let kind = if current.is_mock() { "mock" } else { "backend" };
            println!("session: {} <{}> ({kind})", identity.display_name, identity.email);
        }
        _ => println!("session: none"),
    }

    match status {
        BackendStatus::Connected => ExitCode::SUCCESS,
        BackendStatus::Checking | BackendStatus::MockMode => ExitCode::from(2),
    }
}
