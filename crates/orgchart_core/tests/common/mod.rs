#![allow(dead_code)]

use orgchart_core::{
    Department, DepartmentService, DepartmentTree, Employee, EmployeeService, NewEmployee,
    SqliteDepartmentRepository, SqliteEmployeeRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

pub type SqliteDepartmentService<'conn> =
    DepartmentService<SqliteDepartmentRepository<'conn>, SqliteEmployeeRepository<'conn>>;
pub type SqliteEmployeeService<'conn> =
    EmployeeService<SqliteDepartmentRepository<'conn>, SqliteEmployeeRepository<'conn>>;

pub fn department_service(conn: &Connection) -> SqliteDepartmentService<'_> {
    DepartmentService::new(
        SqliteDepartmentRepository::try_new(conn).expect("build repository"),
        SqliteEmployeeRepository::try_new(conn).expect("build repository"),
    )
}

pub fn employee_service(conn: &Connection) -> SqliteEmployeeService<'_> {
    EmployeeService::new(
        SqliteDepartmentRepository::try_new(conn).expect("build repository"),
        SqliteEmployeeRepository::try_new(conn).expect("build repository"),
    )
}

/// Builds a valid 11-digit CPF whose first nine digits derive from `seed`.
pub fn cpf(seed: u32) -> String {
    let mut digits: Vec<u32> = format!("{:09}", 100_000_000 + seed % 800_000_000)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    let first = check_digit(&digits);
    digits.push(first);
    let second = check_digit(&digits);
    digits.push(second);
    digits
        .iter()
        .filter_map(|digit| char::from_digit(*digit, 10))
        .collect()
}

fn check_digit(prefix: &[u32]) -> u32 {
    let weight_start = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(index, value)| value * (weight_start - index as u32))
        .sum();
    match sum % 11 {
        0 | 1 => 0,
        remainder => 11 - remainder,
    }
}

pub fn root_department(conn: &Connection) -> Department {
    department_service(conn)
        .ensure_root_department("Headquarters")
        .expect("ensure root department")
        .expect("empty store gets a root")
}

pub fn hire(conn: &Connection, name: &str, department_id: Uuid, seed: u32) -> Employee {
    employee_service(conn)
        .create_employee(&NewEmployee {
            name: name.to_string(),
            cpf: cpf(seed),
            rg: None,
            department_id,
        })
        .expect("create employee")
}

/// Creates a department under `parent_id` managed by a freshly hired employee.
pub fn managed_department(
    conn: &Connection,
    name: &str,
    parent_id: Uuid,
    manager_name: &str,
    seed: u32,
) -> (Department, Employee) {
    let manager = hire(conn, manager_name, parent_id, seed);
    let department = department_service(conn)
        .create_department(name, manager.id, Some(parent_id))
        .expect("create department");
    let manager = employee_service(conn).get_employee(manager.id, false).expect("get employee");
    (department, manager)
}

/// Every department id in `tree`, depth-first, root first.
pub fn tree_ids(tree: &DepartmentTree) -> Vec<Uuid> {
    let mut ids = Vec::new();
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        ids.push(node.department.id);
        stack.extend(node.sub_departments.iter().rev());
    }
    ids
}
