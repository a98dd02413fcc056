mod common;

use common::{
    department_service, employee_service, hire, managed_department, root_department, tree_ids,
};
use orgchart_core::db::open_db_in_memory;
use orgchart_core::{
    DepartmentFilter, DepartmentUpdate, EmployeeUpdate, ErrorKind, ServiceError, ValidationError,
};
use uuid::Uuid;

#[test]
fn ensure_root_department_creates_once() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let service = department_service(&conn);

    let root = service
        .ensure_root_department("  Headquarters ")
        .expect("ensure root department")
        .expect("empty store gets a root");
    assert_eq!(root.name, "Headquarters");
    assert_eq!(root.manager_id, None);
    assert_eq!(root.parent_id, None);

    assert!(service.ensure_root_department("Other").expect("ensure root department").is_none());
    let listed = service
        .list_departments(&DepartmentFilter::default())
        .expect("list departments");
    assert_eq!(listed.total, 1);
}

#[test]
fn create_and_get_roundtrip_moves_manager_into_department() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let manager = hire(&conn, "Ana Souza", root.id, 1);
    let service = department_service(&conn);

    let created = service
        .create_department(" Finance ", manager.id, Some(root.id))
        .expect("create department");
    let loaded = service.get_department(created.id, false).expect("get department");

    assert_eq!(loaded.name, "Finance");
    assert_eq!(loaded.manager_id, Some(manager.id));
    assert_eq!(loaded.parent_id, Some(root.id));
    assert!(!loaded.is_deleted);

    let manager = employee_service(&conn).get_employee(manager.id, false).expect("get employee");
    assert_eq!(manager.department_id, created.id);
}

#[test]
fn create_treats_nil_parent_as_root() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let manager = hire(&conn, "Ana Souza", root.id, 1);

    let created = department_service(&conn)
        .create_department("Branch", manager.id, Some(Uuid::nil()))
        .expect("create department");
    assert_eq!(created.parent_id, None);
}

#[test]
fn create_rejects_bad_references_without_writing() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let manager = hire(&conn, "Ana Souza", root.id, 1);
    let service = department_service(&conn);

    let missing_manager = Uuid::new_v4();
    let err = service
        .create_department("Finance", missing_manager, Some(root.id))
        .expect_err("create department should fail");
    assert!(matches!(err, ServiceError::ManagerNotFound(id) if id == missing_manager));

    let missing_parent = Uuid::new_v4();
    let err = service
        .create_department("Finance", manager.id, Some(missing_parent))
        .expect_err("create department should fail");
    assert!(matches!(err, ServiceError::ParentNotFound(id) if id == missing_parent));
    assert_eq!(err.kind(), ErrorKind::BusinessRule);

    let err = service
        .create_department("   ", manager.id, Some(root.id))
        .expect_err("create department should fail");
    assert!(matches!(err, ServiceError::Invalid(ValidationError::BlankName)));

    let listed = service
        .list_departments(&DepartmentFilter::default())
        .expect("list departments");
    assert_eq!(listed.total, 1);
    let manager = employee_service(&conn).get_employee(manager.id, false).expect("get employee");
    assert_eq!(manager.department_id, root.id);
}

#[test]
fn update_rejects_self_and_descendant_parents() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (a, _) = managed_department(&conn, "A", root.id, "Manager A", 1);
    let (b, _) = managed_department(&conn, "B", a.id, "Manager B", 2);
    let (c, _) = managed_department(&conn, "C", b.id, "Manager C", 3);
    let service = department_service(&conn);

    let err = service
        .update_department(
            a.id,
            &DepartmentUpdate {
                parent_id: Some(a.id),
                ..DepartmentUpdate::default()
            },
        )
        .expect_err("update department should fail");
    assert!(matches!(err, ServiceError::CycleDetected { department_id, parent_id }
        if department_id == a.id && parent_id == a.id));

    let err = service
        .update_department(
            a.id,
            &DepartmentUpdate {
                name: Some("Renamed".to_string()),
                parent_id: Some(c.id),
                ..DepartmentUpdate::default()
            },
        )
        .expect_err("update department should fail");
    assert!(matches!(err, ServiceError::CycleDetected { .. }));

    let unchanged = service.get_department(a.id, false).expect("get department");
    assert_eq!(unchanged.name, "A");
    assert_eq!(unchanged.parent_id, Some(root.id));
    assert_eq!(service.get_department(b.id, false).expect("get department").parent_id, Some(a.id));
}

#[test]
fn update_checks_cycle_before_parent_existence() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (a, _) = managed_department(&conn, "A", root.id, "Manager A", 1);
    let service = department_service(&conn);

    let missing = Uuid::new_v4();
    let err = service
        .update_department(
            a.id,
            &DepartmentUpdate {
                parent_id: Some(missing),
                ..DepartmentUpdate::default()
            },
        )
        .expect_err("update department should fail");
    assert!(matches!(err, ServiceError::ParentNotFound(id) if id == missing));
}

#[test]
fn update_ignores_nil_parent_like_create() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (a, _) = managed_department(&conn, "A", root.id, "Manager A", 1);

    let updated = department_service(&conn)
        .update_department(
            a.id,
            &DepartmentUpdate {
                name: Some("Accounting".to_string()),
                parent_id: Some(Uuid::nil()),
                ..DepartmentUpdate::default()
            },
        )
        .expect("nil parent is treated as absent");
    assert_eq!(updated.name, "Accounting");
    assert_eq!(updated.parent_id, Some(root.id));
}

#[test]
fn update_reparents_under_unrelated_department() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (a, _) = managed_department(&conn, "A", root.id, "Manager A", 1);
    let (b, _) = managed_department(&conn, "B", a.id, "Manager B", 2);
    let (x, _) = managed_department(&conn, "X", root.id, "Manager X", 3);
    let service = department_service(&conn);

    let updated = service
        .update_department(
            b.id,
            &DepartmentUpdate {
                parent_id: Some(x.id),
                ..DepartmentUpdate::default()
            },
        )
        .expect("update department");
    assert_eq!(updated.parent_id, Some(x.id));

    let tree = service.get_department_with_tree(x.id).expect("get department with tree");
    assert_eq!(tree_ids(&tree), vec![x.id, b.id]);
    assert!(service
        .get_department_with_tree(a.id)
        .expect("get department with tree")
        .sub_departments
        .is_empty());
}

#[test]
fn update_manager_moves_new_manager_into_department() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (a, old_manager) = managed_department(&conn, "A", root.id, "Old Manager", 1);
    let new_manager = hire(&conn, "New Manager", root.id, 2);
    let service = department_service(&conn);

    let updated = service
        .update_department(
            a.id,
            &DepartmentUpdate {
                manager_id: Some(new_manager.id),
                ..DepartmentUpdate::default()
            },
        )
        .expect("update department");
    assert_eq!(updated.manager_id, Some(new_manager.id));

    let employees = employee_service(&conn);
    for manager_id in [new_manager.id, old_manager.id] {
        let manager = employees
            .get_employee(manager_id, false)
            .expect("get employee");
        assert_eq!(manager.department_id, a.id);
    }

    let missing = Uuid::new_v4();
    let err = service
        .update_department(
            a.id,
            &DepartmentUpdate {
                manager_id: Some(missing),
                ..DepartmentUpdate::default()
            },
        )
        .expect_err("update department should fail");
    assert!(matches!(err, ServiceError::ManagerNotFound(id) if id == missing));
}

#[test]
fn delete_checks_employees_before_sub_departments() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (a, manager_a) = managed_department(&conn, "A", root.id, "Manager A", 1);
    let (b, manager_b) = managed_department(&conn, "B", a.id, "Manager B", 2);
    let departments = department_service(&conn);
    let employees = employee_service(&conn);
    let move_to_root = EmployeeUpdate {
        department_id: Some(root.id),
        ..EmployeeUpdate::default()
    };

    let err = departments.delete_department(a.id).expect_err("delete department should fail");
    assert!(matches!(err, ServiceError::HasEmployees(id) if id == a.id));

    employees.update_employee(manager_a.id, &move_to_root).expect("update employee");
    let err = departments.delete_department(a.id).expect_err("delete department should fail");
    assert!(matches!(err, ServiceError::HasSubDepartments(id) if id == a.id));

    employees.update_employee(manager_b.id, &move_to_root).expect("update employee");
    departments.delete_department(b.id).expect("delete department");
    departments.delete_department(a.id).expect("delete department");

    let err = departments.delete_department(a.id).expect_err("delete department should fail");
    assert!(matches!(err, ServiceError::DepartmentNotFound(_)));
}

#[test]
fn deleted_department_is_only_visible_with_include_deleted() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (a, manager) = managed_department(&conn, "A", root.id, "Manager A", 1);
    employee_service(&conn)
        .update_employee(
            manager.id,
            &EmployeeUpdate {
                department_id: Some(root.id),
                ..EmployeeUpdate::default()
            },
        )
        .expect("update employee");
    let service = department_service(&conn);

    service.delete_department(a.id).expect("delete department");

    let err = service.get_department(a.id, false).expect_err("get department should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let tombstone = service.get_department(a.id, true).expect("get department");
    assert!(tombstone.is_deleted);
    assert!(service
        .get_department_with_tree(root.id)
        .expect("get department with tree")
        .sub_departments
        .is_empty());
}

#[test]
fn list_departments_paginates_in_name_order() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    managed_department(&conn, "gamma", root.id, "Manager G", 1);
    managed_department(&conn, "Alpha", root.id, "Manager A", 2);
    managed_department(&conn, "beta", root.id, "Manager B", 3);
    let service = department_service(&conn);

    let page = service
        .list_departments(&DepartmentFilter {
            parent_id: Some(root.id),
            page: 2,
            page_size: 1,
            ..DepartmentFilter::default()
        })
        .expect("list departments");
    assert_eq!(page.total, 3);
    assert_eq!(page.page, 2);
    assert_eq!(page.page_size, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "beta");

    let past_end = service
        .list_departments(&DepartmentFilter {
            parent_id: Some(root.id),
            page: 5,
            page_size: 2,
            ..DepartmentFilter::default()
        })
        .expect("list departments");
    assert_eq!(past_end.total, 3);
    assert!(past_end.items.is_empty());

    let err = service
        .list_departments(&DepartmentFilter {
            page: 0,
            ..DepartmentFilter::default()
        })
        .expect_err("list departments should fail");
    assert_eq!(err.kind(), ErrorKind::Invalid);
}

#[test]
fn list_departments_filters_by_name_and_manager_name() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (finance, _) = managed_department(&conn, "Finance", root.id, "Zelda Ramos", 1);
    managed_department(&conn, "Financial Audit", root.id, "Bruno Lima", 2);
    managed_department(&conn, "Legal", root.id, "Carla Dias", 3);
    let service = department_service(&conn);

    let by_name = service
        .list_departments(&DepartmentFilter {
            name: Some("FINAN".to_string()),
            ..DepartmentFilter::default()
        })
        .expect("list departments");
    assert_eq!(by_name.total, 2);

    let by_manager = service
        .list_departments(&DepartmentFilter {
            manager_name: Some("zelda".to_string()),
            ..DepartmentFilter::default()
        })
        .expect("list departments");
    assert_eq!(by_manager.total, 1);
    assert_eq!(by_manager.items[0].id, finance.id);

    let blank_filter = service
        .list_departments(&DepartmentFilter {
            manager_name: Some("  ".to_string()),
            ..DepartmentFilter::default()
        })
        .expect("list departments");
    assert_eq!(blank_filter.total, 4);
}

#[test]
fn name_filters_fold_accented_letters() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let root = root_department(&conn);
    let (administration, _) =
        managed_department(&conn, "ADMINISTRAÇÃO", root.id, "JOÃO ÁVILA", 1);
    let service = department_service(&conn);

    let by_name = service
        .list_departments(&DepartmentFilter {
            name: Some("administração".to_string()),
            ..DepartmentFilter::default()
        })
        .expect("list departments");
    assert_eq!(by_name.total, 1);
    assert_eq!(by_name.items[0].id, administration.id);

    let by_manager = service
        .list_departments(&DepartmentFilter {
            manager_name: Some("joão".to_string()),
            ..DepartmentFilter::default()
        })
        .expect("list departments");
    assert_eq!(by_manager.total, 1);
    assert_eq!(by_manager.items[0].id, administration.id);
}
