mod common;

use common::root_department;
use orgchart_core::db::open_db_in_memory;
use orgchart_core::{
    DepartmentListQuery, DepartmentRepository, EmployeeListQuery, EmployeeRepository,
    NewDepartment, NewEmployee, RepoError, SqliteDepartmentRepository, SqliteEmployeeRepository,
};

fn new_department(name: &str) -> NewDepartment {
    NewDepartment {
        name: name.to_string(),
        manager_id: None,
        parent_id: None,
    }
}

#[test]
fn failed_work_rolls_back_earlier_writes() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let departments = SqliteDepartmentRepository::try_new(&conn).expect("build repository");

    let err = departments
        .in_transaction(|| {
            departments.create_department(&new_department("Finance"))?;
            Err::<(), _>(RepoError::InvalidData("manager bind failed".to_string()))
        })
        .expect_err("failing work must surface its error");
    assert!(err.to_string().contains("manager bind failed"));

    let remaining = departments
        .count_departments(&DepartmentListQuery::default())
        .expect("count departments");
    assert_eq!(remaining, 0);
}

#[test]
fn rollback_covers_every_repository_on_the_connection() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let departments = SqliteDepartmentRepository::try_new(&conn).expect("build repository");
    let employees = SqliteEmployeeRepository::try_new(&conn).expect("build repository");

    departments
        .in_transaction(|| {
            let child = departments.create_department(&NewDepartment {
                parent_id: Some(root.id),
                ..new_department("Finance")
            })?;
            employees.create_employee(&NewEmployee {
                name: "Ana Souza".to_string(),
                cpf: "52998224725".to_string(),
                rg: None,
                department_id: child.id,
            })?;
            Err::<(), _>(RepoError::InvalidData("late failure".to_string()))
        })
        .expect_err("failing work must surface its error");

    let departments_left = departments
        .count_departments(&DepartmentListQuery::default())
        .expect("count departments");
    let employees_left = employees
        .count_employees(&EmployeeListQuery::default())
        .expect("count employees");
    assert_eq!(departments_left, 1);
    assert_eq!(employees_left, 0);
}

#[test]
fn successful_work_commits() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let departments = SqliteDepartmentRepository::try_new(&conn).expect("build repository");

    let created = departments
        .in_transaction(|| departments.create_department(&new_department("Finance")))
        .expect("create inside transaction");

    let stored = departments
        .get_department(created.id, false)
        .expect("get department");
    assert_eq!(stored, Some(created));
}
