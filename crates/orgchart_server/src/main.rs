//! orgchart-server: REST server for the organizational hierarchy engine.
//!
//! Reads config from env vars (see `orgchart_api::config`):
//!   ORGCHART_DB_PATH              SQLite file (default: orgchart.sqlite3)
//!   ORGCHART_BIND_ADDR            listen address (default: 0.0.0.0:8080)
//!   ORGCHART_LOG_LEVEL            trace|debug|info|warn|error
//!   ORGCHART_LOG_DIR              absolute log directory (default: stderr)
//!   ORGCHART_REQUEST_TIMEOUT_MS   per-request timeout (default: 10000)
//!   ORGCHART_BOOTSTRAP_DEPARTMENT root department created on an empty store

use anyhow::{anyhow, Context};
use log::info;
use orgchart_api::{build_router, AppState, ServerConfig};
use orgchart_core::db::open_db;
use orgchart_core::{
    init_console_logging, init_logging, DepartmentService, SqliteDepartmentRepository,
    SqliteEmployeeRepository,
};
use rusqlite::Connection;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    let logging = match &config.log_dir {
        Some(dir) => {
            let dir = dir
                .to_str()
                .ok_or_else(|| anyhow!("log directory is not valid UTF-8"))?;
            init_logging(&config.log_level, dir)
        }
        None => init_console_logging(&config.log_level),
    };
    logging
        .map_err(|err| anyhow!(err))
        .context("failed to initialize logging")?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    if let Some(name) = config.bootstrap_department.as_deref() {
        bootstrap_root_department(&conn, name)?;
    }

    let app = build_router(AppState::new(conn), config.request_timeout);
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    info!(
        "event=server_start module=server status=ok bind_addr={} request_timeout_ms={}",
        config.bind_addr,
        config.request_timeout.as_millis()
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn bootstrap_root_department(conn: &Connection, name: &str) -> anyhow::Result<()> {
    let service = DepartmentService::new(
        SqliteDepartmentRepository::try_new(conn)?,
        SqliteEmployeeRepository::try_new(conn)?,
    );
    match service.ensure_root_department(name)? {
        Some(root) => info!(
            "event=root_bootstrap module=server status=ok department_id={}",
            root.id
        ),
        None => info!("event=root_bootstrap module=server status=skipped reason=store_not_empty"),
    }
    Ok(())
}
