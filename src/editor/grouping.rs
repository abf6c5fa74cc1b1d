//! 权限分组
//! 按 resource_type 划分目录，统计每组的勾选情况

use crate::models::permission::Permission;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// 组内勾选覆盖度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    None,
    Partial,
    All,
}

impl Coverage {
    fn of(checked: usize, total: usize) -> Self {
        if checked == 0 {
            Coverage::None
        } else if checked == total {
            Coverage::All
        } else {
            Coverage::Partial
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCell {
    pub permission: Permission,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGroup {
    pub resource_type: String,
    pub cells: Vec<PermissionCell>,
    pub checked: usize,
    pub total: usize,
    pub coverage: Coverage,
}

impl PermissionGroup {
    pub fn permission_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.cells.iter().map(|cell| cell.permission.id)
    }
}

/// 按 resource_type 分组（单层），组按名称排序，组内保持目录顺序
pub fn group_permissions(catalog: &[Permission], selected: &BTreeSet<Uuid>) -> Vec<PermissionGroup> {
    let mut buckets: BTreeMap<&str, Vec<PermissionCell>> = BTreeMap::new();

    for permission in catalog {
        buckets
            .entry(permission.resource_type.as_str())
            .or_default()
            .push(PermissionCell {
                checked: selected.contains(&permission.id),
                permission: permission.clone(),
            });
    }

    buckets
        .into_iter()
        .map(|(resource_type, cells)| {
            let checked = cells.iter().filter(|c| c.checked).count();
            let total = cells.len();
            PermissionGroup {
                resource_type: resource_type.to_string(),
                cells,
                checked,
                total,
                coverage: Coverage::of(checked, total),
            }
        })
        .collect()
}
