//! Employee store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist employee records, each foreign-keyed to a department.
//! - Surface identity-document collisions as `RepoError::DuplicateDocument`.
//!
//! # Invariants
//! - Only active (`is_deleted=0`) rows are returned unless asked otherwise.
//! - Listing order is deterministic: `name COLLATE NOCASE ASC, id ASC`.

use crate::model::department::DepartmentId;
use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::repo::sqlite_support::{
    bool_to_int, ensure_connection_ready, parse_is_deleted, parse_uuid, to_count,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    name,
    cpf,
    rg,
    department_id,
    is_deleted,
    created_at,
    updated_at
FROM employees";

const EMPLOYEE_COLUMNS: &[&str] = &[
    "id",
    "name",
    "cpf",
    "rg",
    "department_id",
    "is_deleted",
    "created_at",
    "updated_at",
];

/// Predicate and pagination options for employee queries.
#[derive(Debug, Clone, Default)]
pub struct EmployeeListQuery {
    /// Case-insensitive substring of the employee name.
    pub name: Option<String>,
    /// Exact CPF match.
    pub cpf: Option<String>,
    /// Exact RG match.
    pub rg: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl EmployeeListQuery {
    /// Active employees of one department.
    pub fn in_department(department_id: DepartmentId) -> Self {
        Self {
            department_id: Some(department_id),
            ..Self::default()
        }
    }
}

/// Repository interface for employee storage.
pub trait EmployeeRepository {
    fn create_employee(&self, employee: &NewEmployee) -> RepoResult<Employee>;
    fn get_employee(&self, id: EmployeeId, include_deleted: bool) -> RepoResult<Option<Employee>>;
    /// Replaces all mutable fields of one active employee.
    fn update_employee(&self, employee: &Employee) -> RepoResult<()>;
    fn soft_delete_employee(&self, id: EmployeeId) -> RepoResult<()>;
    fn count_employees(&self, query: &EmployeeListQuery) -> RepoResult<u64>;
    fn list_employees(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>>;
    /// Lists active employees whose department is one of `department_ids`.
    fn list_in_departments(&self, department_ids: &[DepartmentId]) -> RepoResult<Vec<Employee>>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "employees", EMPLOYEE_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, employee: &NewEmployee) -> RepoResult<Employee> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO employees (id, name, cpf, rg, department_id, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, 0);",
            params![
                id.to_string(),
                employee.name.as_str(),
                employee.cpf.as_str(),
                employee.rg.as_deref(),
                employee.department_id.to_string(),
            ],
        )?;
        self.get_employee(id, false)?
            .ok_or(RepoError::EmployeeNotFound(id))
    }

    fn get_employee(
        &self,
        id: EmployeeId,
        include_deleted: bool,
    ) -> RepoResult<Option<Employee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }
        Ok(None)
    }

    fn update_employee(&self, employee: &Employee) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE employees
             SET name = ?2,
                 cpf = ?3,
                 rg = ?4,
                 department_id = ?5,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND is_deleted = 0;",
            params![
                employee.id.to_string(),
                employee.name.as_str(),
                employee.cpf.as_str(),
                employee.rg.as_deref(),
                employee.department_id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::EmployeeNotFound(employee.id));
        }
        Ok(())
    }

    fn soft_delete_employee(&self, id: EmployeeId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE employees
             SET is_deleted = 1
             WHERE id = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::EmployeeNotFound(id));
        }
        Ok(())
    }

    fn count_employees(&self, query: &EmployeeListQuery) -> RepoResult<u64> {
        let (where_sql, bind_values) = build_filter(query);
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM employees {where_sql};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        to_count(count)
    }

    fn list_employees(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>> {
        let (where_sql, mut bind_values) = build_filter(query);
        let mut sql =
            format!("{EMPLOYEE_SELECT_SQL} {where_sql} ORDER BY name COLLATE NOCASE ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ? OFFSET ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            bind_values.push(Value::Integer(i64::from(query.offset)));
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        query_employees(self.conn, &sql, bind_values)
    }

    fn list_in_departments(&self, department_ids: &[DepartmentId]) -> RepoResult<Vec<Employee>> {
        if department_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; department_ids.len()].join(", ");
        let sql = format!(
            "{EMPLOYEE_SELECT_SQL}
             WHERE is_deleted = 0
               AND department_id IN ({placeholders})
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        );
        let bind_values = department_ids
            .iter()
            .map(|id| Value::Text(id.to_string()))
            .collect();
        query_employees(self.conn, &sql, bind_values)
    }
}

fn query_employees(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<Employee>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut employees = Vec::new();
    while let Some(row) = rows.next()? {
        employees.push(parse_employee_row(row)?);
    }
    Ok(employees)
}

fn build_filter(query: &EmployeeListQuery) -> (String, Vec<Value>) {
    let mut sql = String::from("WHERE 1 = 1");
    let mut bind_values = Vec::new();

    if !query.include_deleted {
        sql.push_str(" AND is_deleted = 0");
    }
    if let Some(name) = query.name.as_deref() {
        sql.push_str(" AND instr(fold_case(name), fold_case(?)) > 0");
        bind_values.push(Value::Text(name.to_string()));
    }
    if let Some(cpf) = query.cpf.as_deref() {
        sql.push_str(" AND cpf = ?");
        bind_values.push(Value::Text(cpf.to_string()));
    }
    if let Some(rg) = query.rg.as_deref() {
        sql.push_str(" AND rg = ?");
        bind_values.push(Value::Text(rg.to_string()));
    }
    if let Some(department_id) = query.department_id {
        sql.push_str(" AND department_id = ?");
        bind_values.push(Value::Text(department_id.to_string()));
    }

    (sql, bind_values)
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let id_text: String = row.get("id")?;
    let department_text: String = row.get("department_id")?;
    Ok(Employee {
        id: parse_uuid(&id_text, "employees.id")?,
        name: row.get("name")?,
        cpf: row.get("cpf")?,
        rg: row.get("rg")?,
        department_id: parse_uuid(&department_text, "employees.department_id")?,
        is_deleted: parse_is_deleted(row.get("is_deleted")?, "employees.is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
