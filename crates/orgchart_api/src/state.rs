//! Shared handler state.

use crate::error::ApiError;
use orgchart_core::{
    DepartmentService, EmployeeService, RepoResult, ServiceError, SqliteDepartmentRepository,
    SqliteEmployeeRepository,
};
use log::warn;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// SQLite VM steps between deadline checks while an engine call runs.
const DEADLINE_CHECK_OPS: i32 = 1_000;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub type SqliteDepartmentService<'conn> =
    DepartmentService<SqliteDepartmentRepository<'conn>, SqliteEmployeeRepository<'conn>>;
pub type SqliteEmployeeService<'conn> =
    EmployeeService<SqliteDepartmentRepository<'conn>, SqliteEmployeeRepository<'conn>>;

/// One migrated connection shared by all requests.
///
/// Each engine call holds the connection exclusively until it returns.
/// Calls carry a deadline of `request_timeout` from the moment they are
/// issued; past it, queued calls never start and running SQL is interrupted,
/// which rolls back the open transaction.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Returns a handle on the same connection with a different deadline.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Runs `work` against the connection on the blocking thread pool.
    ///
    /// # Errors
    /// - `408` when the deadline passes before or during `work`. Nothing
    ///   `work` wrote is kept in that case.
    pub async fn run<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T, ServiceError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let deadline = Instant::now() + self.request_timeout;
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| ApiError::internal("database connection lock poisoned"))?;
            run_before_deadline(&conn, deadline, work)
        })
        .await
        .map_err(|err| ApiError::internal(format!("database task failed: {err}")))?
    }
}

fn run_before_deadline<T, F>(conn: &Connection, deadline: Instant, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&Connection) -> Result<T, ServiceError>,
{
    if Instant::now() >= deadline {
        warn!("event=engine_call module=api status=skipped reason=deadline_passed");
        return Err(ApiError::timeout("deadline passed before the engine call started"));
    }

    conn.progress_handler(DEADLINE_CHECK_OPS, Some(move || Instant::now() >= deadline));
    let result = work(conn);
    conn.progress_handler(DEADLINE_CHECK_OPS, None::<fn() -> bool>);

    match result {
        Ok(value) => Ok(value),
        Err(err) if Instant::now() >= deadline => {
            warn!("event=engine_call module=api status=interrupted error={err}");
            Err(ApiError::timeout(format!(
                "deadline passed during the engine call: {err}"
            )))
        }
        Err(err) => Err(ApiError::from(err)),
    }
}

pub(crate) fn department_service(conn: &Connection) -> RepoResult<SqliteDepartmentService<'_>> {
    Ok(DepartmentService::new(
        SqliteDepartmentRepository::try_new(conn)?,
        SqliteEmployeeRepository::try_new(conn)?,
    ))
}

pub(crate) fn employee_service(conn: &Connection) -> RepoResult<SqliteEmployeeService<'_>> {
    Ok(EmployeeService::new(
        SqliteDepartmentRepository::try_new(conn)?,
        SqliteEmployeeRepository::try_new(conn)?,
    ))
}
