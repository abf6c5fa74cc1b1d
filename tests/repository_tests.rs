//! 仓库层测试（需要 PostgreSQL，设置 TEST_DATABASE_URL 后以 --ignored 运行）

use ops_console_authz::{
    api::PermissionApi,
    error::AppError,
    models::{
        permission::PermissionFilter,
        role::AssignRolePermissionsRequest,
    },
    repository::RoleRepository,
};
use serial_test::serial;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

mod common;
use common::{create_test_config, permission, role, setup_test_db};

async fn repository() -> RoleRepository {
    let config = create_test_config();
    RoleRepository::new(setup_test_db(&config).await)
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_insert_and_find_role() {
    let repo = repository().await;

    let mut sales = role("SALES");
    sales.localized_names = HashMap::from([("zh-CN".to_string(), "销售".to_string())]);
    repo.insert_role(&sales).await.unwrap();

    let found = repo.find_by_id(sales.id).await.unwrap().expect("Role not found");
    assert_eq!(found.code, "SALES");
    assert_eq!(found.display_name("zh-CN"), "销售");
    assert!(found.permissions.is_none());

    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_list_permissions_with_active_filter() {
    let repo = repository().await;

    let read = permission("order", "read");
    let mut retired = permission("order", "export");
    retired.is_active = false;
    repo.insert_permission(&read).await.unwrap();
    repo.insert_permission(&retired).await.unwrap();

    let all = repo.list_permissions(PermissionFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let active = repo
        .list_permissions(PermissionFilter::active_only())
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, read.id);
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_assign_replaces_whole_set() {
    let repo = repository().await;

    let sales = role("SALES");
    repo.insert_role(&sales).await.unwrap();
    let p1 = permission("order", "read");
    let p2 = permission("order", "update");
    let p3 = permission("customer", "read");
    for p in [&p1, &p2, &p3] {
        repo.insert_permission(p).await.unwrap();
    }

    repo.assign_role_permissions(
        sales.id,
        AssignRolePermissionsRequest {
            permission_ids: vec![p1.id, p2.id, p1.id],
        },
    )
    .await
    .unwrap();

    let granted: BTreeSet<Uuid> = repo
        .list_role_permissions(sales.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(granted, BTreeSet::from([p1.id, p2.id]));

    repo.assign_role_permissions(
        sales.id,
        AssignRolePermissionsRequest {
            permission_ids: vec![p3.id],
        },
    )
    .await
    .unwrap();

    let granted: Vec<Uuid> = repo
        .list_role_permissions(sales.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(granted, vec![p3.id]);

    // 空集合即清空
    repo.assign_role_permissions(sales.id, AssignRolePermissionsRequest::default())
        .await
        .unwrap();
    assert!(repo.list_role_permissions(sales.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_assign_to_unknown_role_is_not_found() {
    let repo = repository().await;
    let p1 = permission("order", "read");
    repo.insert_permission(&p1).await.unwrap();

    let result = repo
        .assign_role_permissions(
            Uuid::new_v4(),
            AssignRolePermissionsRequest {
                permission_ids: vec![p1.id],
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_failed_assign_keeps_previous_grants() {
    let repo = repository().await;

    let sales = role("SALES");
    repo.insert_role(&sales).await.unwrap();
    let p1 = permission("order", "read");
    repo.insert_permission(&p1).await.unwrap();

    repo.assign_role_permissions(
        sales.id,
        AssignRolePermissionsRequest {
            permission_ids: vec![p1.id],
        },
    )
    .await
    .unwrap();

    // 引用不存在的权限触发外键错误，整个事务回滚
    let result = repo
        .assign_role_permissions(
            sales.id,
            AssignRolePermissionsRequest {
                permission_ids: vec![Uuid::new_v4()],
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Database(_))));

    let granted = repo.list_role_permissions(sales.id).await.unwrap();
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].id, p1.id);
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_list_roles_ordered_by_code() {
    let repo = repository().await;
    for code in ["SALES", "ADMIN", "AUDITOR"] {
        repo.insert_role(&role(code)).await.unwrap();
    }

    let codes: Vec<String> = repo
        .list_roles()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.code)
        .collect();
    assert_eq!(codes, vec!["ADMIN", "AUDITOR", "SALES"]);
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_console_opens_permission_store() {
    let config = create_test_config();
    setup_test_db(&config).await;

    let console = ops_console_authz::console::Console::bootstrap(config).unwrap();
    let store = console.open_permission_store().await.unwrap();

    let mut editor = console.permission_editor(store);
    editor.load_catalog().await.unwrap();
    editor.load_roles().await.unwrap();
    assert!(editor.catalog().is_empty());
    assert!(editor.roles().is_empty());
}
