mod common;

use common::{cpf, employee_service, hire, managed_department, root_department};
use orgchart_core::db::open_db_in_memory;
use orgchart_core::{
    DocumentKind, EmployeeFilter, EmployeeUpdate, ErrorKind, NewEmployee, ServiceError,
    ValidationError,
};
use uuid::Uuid;

fn new_employee(name: &str, cpf: &str, rg: Option<&str>, department_id: Uuid) -> NewEmployee {
    NewEmployee {
        name: name.to_string(),
        cpf: cpf.to_string(),
        rg: rg.map(str::to_string),
        department_id,
    }
}

#[test]
fn create_normalizes_documents() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let service = employee_service(&conn);

    let created = service
        .create_employee(&new_employee(
            " Ana Souza ",
            "529.982.247-25",
            Some("  "),
            root.id,
        ))
        .expect("create employee");

    assert_eq!(created.name, "Ana Souza");
    assert_eq!(created.cpf, "52998224725");
    assert_eq!(created.rg, None);
    assert_eq!(created.department_id, root.id);
    assert_eq!(service.get_employee(created.id, false).expect("get employee"), created);
}

#[test]
fn create_rejects_invalid_cpf_and_missing_department() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let service = employee_service(&conn);

    let err = service
        .create_employee(&new_employee("Ana", "52998224724", None, root.id))
        .expect_err("create employee should fail");
    assert!(matches!(err, ServiceError::Invalid(ValidationError::InvalidCpf)));
    assert_eq!(err.kind(), ErrorKind::Invalid);

    let missing = Uuid::new_v4();
    let err = service
        .create_employee(&new_employee("Ana", &cpf(1), None, missing))
        .expect_err("create employee should fail");
    assert!(matches!(err, ServiceError::DepartmentNotFound(id) if id == missing));
}

#[test]
fn duplicate_documents_among_active_employees_conflict() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let service = employee_service(&conn);
    service
        .create_employee(&new_employee("Ana", &cpf(1), Some("MG-100"), root.id))
        .expect("create employee");

    let err = service
        .create_employee(&new_employee("Bruno", &cpf(1), None, root.id))
        .expect_err("create employee should fail");
    assert!(matches!(err, ServiceError::IdentifierDuplicated(DocumentKind::Cpf)));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = service
        .create_employee(&new_employee("Bruno", &cpf(2), Some("MG-100"), root.id))
        .expect_err("create employee should fail");
    assert!(matches!(err, ServiceError::IdentifierDuplicated(DocumentKind::Rg)));

    service
        .create_employee(&new_employee("Carla", &cpf(3), None, root.id))
        .expect("create employee");
    service
        .create_employee(&new_employee("Davi", &cpf(4), None, root.id))
        .expect("create employee");
}

#[test]
fn deleted_employee_releases_documents() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let service = employee_service(&conn);
    let first = service
        .create_employee(&new_employee("Ana", &cpf(1), Some("MG-100"), root.id))
        .expect("create employee");

    service.delete_employee(first.id).expect("delete employee");

    let err = service.get_employee(first.id, false).expect_err("get employee should fail");
    assert!(matches!(err, ServiceError::EmployeeNotFound(_)));
    assert!(service.get_employee(first.id, true).expect("get employee").is_deleted);

    service
        .create_employee(&new_employee("Ana Again", &cpf(1), Some("MG-100"), root.id))
        .expect("create employee");
}

#[test]
fn update_applies_optional_changes() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (finance, _) = managed_department(&conn, "Finance", root.id, "Manager", 1);
    let service = employee_service(&conn);
    let employee = service
        .create_employee(&new_employee("Ana", &cpf(2), Some("MG-100"), root.id))
        .expect("create employee");

    let updated = service
        .update_employee(
            employee.id,
            &EmployeeUpdate {
                name: Some("Ana Lima".to_string()),
                department_id: Some(finance.id),
                ..EmployeeUpdate::default()
            },
        )
        .expect("update employee");
    assert_eq!(updated.name, "Ana Lima");
    assert_eq!(updated.department_id, finance.id);
    assert_eq!(updated.rg.as_deref(), Some("MG-100"));

    let cleared = service
        .update_employee(
            employee.id,
            &EmployeeUpdate {
                rg: Some(String::new()),
                ..EmployeeUpdate::default()
            },
        )
        .expect("update employee");
    assert_eq!(cleared.rg, None);
    assert_eq!(cleared.name, "Ana Lima");
}

#[test]
fn update_rejects_taken_cpf_and_missing_department() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let first = hire(&conn, "Ana", root.id, 1);
    let second = hire(&conn, "Bruno", root.id, 2);
    let service = employee_service(&conn);

    let err = service
        .update_employee(
            second.id,
            &EmployeeUpdate {
                cpf: Some(first.cpf.clone()),
                ..EmployeeUpdate::default()
            },
        )
        .expect_err("update employee should fail");
    assert!(matches!(err, ServiceError::IdentifierDuplicated(DocumentKind::Cpf)));

    let missing = Uuid::new_v4();
    let err = service
        .update_employee(
            second.id,
            &EmployeeUpdate {
                department_id: Some(missing),
                ..EmployeeUpdate::default()
            },
        )
        .expect_err("update employee should fail");
    assert!(matches!(err, ServiceError::DepartmentNotFound(id) if id == missing));

    let err = service
        .update_employee(Uuid::new_v4(), &EmployeeUpdate::default())
        .expect_err("update employee should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn manager_of_active_department_cannot_be_deleted() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (_, manager) = managed_department(&conn, "Finance", root.id, "Manager", 1);
    let service = employee_service(&conn);

    let err = service.delete_employee(manager.id).expect_err("delete employee should fail");
    assert!(matches!(err, ServiceError::ManagerCannotBeDeleted(id) if id == manager.id));
    assert_eq!(err.kind(), ErrorKind::BusinessRule);
    assert!(!service.get_employee(manager.id, false).expect("get employee").is_deleted);
}

#[test]
fn get_with_manager_resolves_department_manager_name() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (finance, _) = managed_department(&conn, "Finance", root.id, "Zelda Ramos", 1);
    let staff = hire(&conn, "Staff", finance.id, 2);
    let outsider = hire(&conn, "Outsider", root.id, 3);
    let service = employee_service(&conn);

    let view = service.get_employee_with_manager(staff.id).expect("get employee with manager");
    assert_eq!(view.employee.id, staff.id);
    assert_eq!(view.manager_name.as_deref(), Some("Zelda Ramos"));

    let view = service.get_employee_with_manager(outsider.id).expect("get employee with manager");
    assert_eq!(view.manager_name, None);
    let json = serde_json::to_value(&view).expect("serialize to json");
    assert!(json.get("manager_name").is_none());
    assert_eq!(json["name"], "Outsider");
}

#[test]
fn list_employees_filters_and_paginates() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (finance, _) = managed_department(&conn, "Finance", root.id, "Carlos Dias", 1);
    let ana = hire(&conn, "Ana Souza", finance.id, 2);
    hire(&conn, "anabela Cruz", root.id, 3);
    hire(&conn, "Bruno Lima", root.id, 4);
    let service = employee_service(&conn);

    let by_name = service
        .list_employees(&EmployeeFilter {
            name: Some("ANA".to_string()),
            ..EmployeeFilter::default()
        })
        .expect("list employees");
    assert_eq!(by_name.total, 2);
    assert_eq!(by_name.items[0].name, "Ana Souza");
    assert_eq!(by_name.items[1].name, "anabela Cruz");

    let formatted_cpf = format!(
        "{}.{}.{}-{}",
        &ana.cpf[0..3],
        &ana.cpf[3..6],
        &ana.cpf[6..9],
        &ana.cpf[9..11]
    );
    let by_cpf = service
        .list_employees(&EmployeeFilter {
            cpf: Some(formatted_cpf),
            ..EmployeeFilter::default()
        })
        .expect("list employees");
    assert_eq!(by_cpf.total, 1);
    assert_eq!(by_cpf.items[0].id, ana.id);

    let by_department = service
        .list_employees(&EmployeeFilter {
            department_id: Some(finance.id),
            ..EmployeeFilter::default()
        })
        .expect("list employees");
    assert_eq!(by_department.total, 2);

    let second_page = service
        .list_employees(&EmployeeFilter {
            page: 2,
            page_size: 3,
            ..EmployeeFilter::default()
        })
        .expect("list employees");
    assert_eq!(second_page.total, 4);
    assert_eq!(second_page.items.len(), 1);
}

#[test]
fn name_filter_folds_accented_letters() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let joao = hire(&conn, "JOÃO ÁVILA", root.id, 1);
    hire(&conn, "Joana Alves", root.id, 2);
    let service = employee_service(&conn);

    let by_name = service
        .list_employees(&EmployeeFilter {
            name: Some("joão ávila".to_string()),
            ..EmployeeFilter::default()
        })
        .expect("list employees");
    assert_eq!(by_name.total, 1);
    assert_eq!(by_name.items[0].id, joao.id);

    let mixed_case = service
        .list_employees(&EmployeeFilter {
            name: Some("Ávila".to_string()),
            ..EmployeeFilter::default()
        })
        .expect("list employees");
    assert_eq!(mixed_case.total, 1);
}
