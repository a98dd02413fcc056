//! Department store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist department records and answer hierarchy queries.
//! - Provide the descendant-enumeration primitive as a recursive query.
//!
//! # Invariants
//! - Only active (`is_deleted=0`) rows are returned unless asked otherwise.
//! - Listing order is deterministic: `name COLLATE NOCASE ASC, id ASC`.
//! - Descendant enumeration is inclusive of the root and terminates even on
//!   corrupted (cyclic) parent links.

use crate::model::department::{Department, DepartmentId, NewDepartment};
use crate::model::employee::EmployeeId;
use crate::repo::sqlite_support::{
    bool_to_int, ensure_connection_ready, parse_is_deleted, parse_optional_uuid, parse_uuid,
    to_count,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const DEPARTMENT_SELECT_SQL: &str = "SELECT
    d.id AS id,
    d.name AS name,
    d.manager_id AS manager_id,
    d.parent_id AS parent_id,
    d.is_deleted AS is_deleted,
    d.created_at AS created_at,
    d.updated_at AS updated_at
FROM departments d";

const DEPARTMENT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "manager_id",
    "parent_id",
    "is_deleted",
    "created_at",
    "updated_at",
];

/// Predicate and pagination options for department queries.
///
/// All filters combine with AND. `limit`/`offset` are ignored by counts.
#[derive(Debug, Clone, Default)]
pub struct DepartmentListQuery {
    /// Case-insensitive substring of the department name.
    pub name: Option<String>,
    /// Case-insensitive substring of the active manager's name.
    pub manager_name: Option<String>,
    /// Exact parent department.
    pub parent_id: Option<DepartmentId>,
    /// Exact manager.
    pub manager_id: Option<EmployeeId>,
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl DepartmentListQuery {
    /// Active departments directly under `parent_id`.
    pub fn children_of(parent_id: DepartmentId) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    /// Active departments managed by `manager_id`.
    pub fn managed_by(manager_id: EmployeeId) -> Self {
        Self {
            manager_id: Some(manager_id),
            ..Self::default()
        }
    }
}

/// Repository interface for department storage.
pub trait DepartmentRepository {
    /// Creates one department with a generated id.
    fn create_department(&self, department: &NewDepartment) -> RepoResult<Department>;
    /// Loads one department by id.
    fn get_department(
        &self,
        id: DepartmentId,
        include_deleted: bool,
    ) -> RepoResult<Option<Department>>;
    /// Replaces name, manager and parent of one active department.
    fn update_department(&self, department: &Department) -> RepoResult<()>;
    /// Tombstones one active department.
    fn soft_delete_department(&self, id: DepartmentId) -> RepoResult<()>;
    /// Counts departments matching the query predicate.
    fn count_departments(&self, query: &DepartmentListQuery) -> RepoResult<u64>;
    /// Lists departments matching the query predicate and window.
    fn list_departments(&self, query: &DepartmentListQuery) -> RepoResult<Vec<Department>>;
    /// Lists active direct children of one department.
    fn list_children(&self, parent_id: DepartmentId) -> RepoResult<Vec<Department>> {
        self.list_departments(&DepartmentListQuery::children_of(parent_id))
    }
    /// Returns active ids reachable from `root_id` through parent links,
    /// including `root_id` itself when active.
    fn find_descendant_ids(&self, root_id: DepartmentId) -> RepoResult<Vec<DepartmentId>>;
    /// Runs `work` as one atomic unit when the store supports it.
    fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        work()
    }
}

/// SQLite-backed department repository.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "departments", DEPARTMENT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create_department(&self, department: &NewDepartment) -> RepoResult<Department> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO departments (id, name, manager_id, parent_id, is_deleted)
             VALUES (?1, ?2, ?3, ?4, 0);",
            params![
                id.to_string(),
                department.name.as_str(),
                department.manager_id.map(|value| value.to_string()),
                department.parent_id.map(|value| value.to_string()),
            ],
        )?;
        self.get_department(id, false)?
            .ok_or(RepoError::DepartmentNotFound(id))
    }

    fn get_department(
        &self,
        id: DepartmentId,
        include_deleted: bool,
    ) -> RepoResult<Option<Department>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DEPARTMENT_SELECT_SQL}
             WHERE d.id = ?1
               AND (?2 = 1 OR d.is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_department_row(row)?));
        }
        Ok(None)
    }

    fn update_department(&self, department: &Department) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE departments
             SET name = ?2,
                 manager_id = ?3,
                 parent_id = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND is_deleted = 0;",
            params![
                department.id.to_string(),
                department.name.as_str(),
                department.manager_id.map(|value| value.to_string()),
                department.parent_id.map(|value| value.to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::DepartmentNotFound(department.id));
        }
        Ok(())
    }

    fn soft_delete_department(&self, id: DepartmentId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE departments
             SET is_deleted = 1
             WHERE id = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::DepartmentNotFound(id));
        }
        Ok(())
    }

    fn count_departments(&self, query: &DepartmentListQuery) -> RepoResult<u64> {
        let (where_sql, bind_values) = build_filter(query);
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM departments d {where_sql};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        to_count(count)
    }

    fn list_departments(&self, query: &DepartmentListQuery) -> RepoResult<Vec<Department>> {
        let (where_sql, mut bind_values) = build_filter(query);
        let mut sql = format!(
            "{DEPARTMENT_SELECT_SQL} {where_sql} ORDER BY d.name COLLATE NOCASE ASC, d.id ASC"
        );

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ? OFFSET ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            bind_values.push(Value::Integer(i64::from(query.offset)));
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut departments = Vec::new();
        while let Some(row) = rows.next()? {
            departments.push(parse_department_row(row)?);
        }
        Ok(departments)
    }

    fn find_descendant_ids(&self, root_id: DepartmentId) -> RepoResult<Vec<DepartmentId>> {
        // UNION (not UNION ALL) deduplicates, so a corrupted cycle cannot recurse forever.
        let mut stmt = self.conn.prepare(
            "WITH RECURSIVE subtree(id) AS (
                SELECT id
                FROM departments
                WHERE id = ?1
                  AND is_deleted = 0
                UNION
                SELECT child.id
                FROM departments child
                INNER JOIN subtree parent ON child.parent_id = parent.id
                WHERE child.is_deleted = 0
            )
            SELECT id FROM subtree;",
        )?;
        let mut rows = stmt.query([root_id.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "departments.id")?);
        }
        Ok(ids)
    }

    fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        // Statements issued through any repository sharing this connection
        // join the transaction; dropping it without commit rolls back.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let value = work()?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

fn build_filter(query: &DepartmentListQuery) -> (String, Vec<Value>) {
    let mut sql = String::from("WHERE 1 = 1");
    let mut bind_values = Vec::new();

    if !query.include_deleted {
        sql.push_str(" AND d.is_deleted = 0");
    }
    if let Some(name) = query.name.as_deref() {
        sql.push_str(" AND instr(fold_case(d.name), fold_case(?)) > 0");
        bind_values.push(Value::Text(name.to_string()));
    }
    if let Some(parent_id) = query.parent_id {
        sql.push_str(" AND d.parent_id = ?");
        bind_values.push(Value::Text(parent_id.to_string()));
    }
    if let Some(manager_id) = query.manager_id {
        sql.push_str(" AND d.manager_id = ?");
        bind_values.push(Value::Text(manager_id.to_string()));
    }
    if let Some(manager_name) = query.manager_name.as_deref() {
        sql.push_str(
            " AND EXISTS (
                SELECT 1
                FROM employees m
                WHERE m.id = d.manager_id
                  AND m.is_deleted = 0
                  AND instr(fold_case(m.name), fold_case(?)) > 0
            )",
        );
        bind_values.push(Value::Text(manager_name.to_string()));
    }

    (sql, bind_values)
}

fn parse_department_row(row: &Row<'_>) -> RepoResult<Department> {
    let id_text: String = row.get("id")?;
    Ok(Department {
        id: parse_uuid(&id_text, "departments.id")?,
        name: row.get("name")?,
        manager_id: parse_optional_uuid(row.get("manager_id")?, "departments.manager_id")?,
        parent_id: parse_optional_uuid(row.get("parent_id")?, "departments.parent_id")?,
        is_deleted: parse_is_deleted(row.get("is_deleted")?, "departments.is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
