//! 待提交变更集
//!
//! 基线（最近一次持久化的集合）与工作集两份显式集合，是否有变更就是两者是否不等。
//! 撤销与变更标记因此天然正确，不需要逐项的脏标记。

use crate::models::role::AssignRolePermissionsRequest;
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChangeSet {
    role_id: Uuid,
    original: BTreeSet<Uuid>,
    current: BTreeSet<Uuid>,
}

/// 基线与工作集的差异
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionDiff {
    pub added: Vec<Uuid>,
    pub removed: Vec<Uuid>,
}

impl PermissionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl PendingChangeSet {
    pub fn new(role_id: Uuid, baseline: impl IntoIterator<Item = Uuid>) -> Self {
        let original: BTreeSet<Uuid> = baseline.into_iter().collect();
        Self {
            role_id,
            current: original.clone(),
            original,
        }
    }

    pub fn role_id(&self) -> Uuid {
        self.role_id
    }

    pub fn original(&self) -> &BTreeSet<Uuid> {
        &self.original
    }

    pub fn current(&self) -> &BTreeSet<Uuid> {
        &self.current
    }

    pub fn has_changes(&self) -> bool {
        self.original != self.current
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.current.contains(&id)
    }

    /// 翻转一项，返回翻转后的勾选状态
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.current.remove(&id) {
            false
        } else {
            self.current.insert(id);
            true
        }
    }

    pub fn set(&mut self, id: Uuid, checked: bool) {
        if checked {
            self.current.insert(id);
        } else {
            self.current.remove(&id);
        }
    }

    /// 撤销：工作集回到基线
    pub fn reset(&mut self) {
        self.current.clone_from(&self.original);
    }

    /// 持久化成功后推进基线到已提交的集合
    pub fn commit(&mut self, persisted: BTreeSet<Uuid>) {
        self.original = persisted;
    }

    pub fn diff(&self) -> PermissionDiff {
        PermissionDiff {
            added: self.current.difference(&self.original).copied().collect(),
            removed: self.original.difference(&self.current).copied().collect(),
        }
    }

    /// 整体替换请求：始终发送完整的目标集合
    pub fn to_request(&self) -> AssignRolePermissionsRequest {
        AssignRolePermissionsRequest::from_set(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_new_has_no_changes() {
        let set = PendingChangeSet::new(id(100), [id(1), id(2)]);
        assert!(!set.has_changes());
        assert_eq!(set.original(), set.current());
    }

    #[test]
    fn test_toggle_is_involution() {
        let mut set = PendingChangeSet::new(id(100), [id(1)]);
        let before = set.clone();

        assert!(set.toggle(id(2)));
        assert!(set.has_changes());
        assert!(!set.toggle(id(2)));
        assert_eq!(set, before);

        assert!(!set.toggle(id(1)));
        assert!(set.toggle(id(1)));
        assert_eq!(set, before);
    }

    #[test]
    fn test_has_changes_tracks_set_inequality() {
        let mut set = PendingChangeSet::new(id(100), [id(1), id(2)]);
        set.toggle(id(1));
        set.toggle(id(3));
        assert!(set.has_changes());

        // 同样的集合以不同路径到达也视为无变更
        set.toggle(id(3));
        set.set(id(1), true);
        assert!(!set.has_changes());
    }

    #[test]
    fn test_reset_restores_original() {
        let mut set = PendingChangeSet::new(id(100), [id(1)]);
        set.toggle(id(1));
        set.toggle(id(2));
        set.toggle(id(3));
        set.reset();

        assert!(!set.has_changes());
        assert_eq!(set.current(), &[id(1)].into_iter().collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_diff_and_request() {
        let mut set = PendingChangeSet::new(id(100), [id(1), id(2)]);
        set.toggle(id(2));
        set.toggle(id(3));

        let diff = set.diff();
        assert_eq!(diff.added, vec![id(3)]);
        assert_eq!(diff.removed, vec![id(2)]);
        assert_eq!(set.to_request().permission_ids, vec![id(1), id(3)]);
    }

    #[test]
    fn test_commit_advances_baseline() {
        let mut set = PendingChangeSet::new(id(100), []);
        set.toggle(id(1));
        let submitted = set.current().clone();
        set.commit(submitted);

        assert!(!set.has_changes());
        assert!(set.diff().is_empty());
    }
}
