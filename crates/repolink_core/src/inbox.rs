//! Notification inbox read-state and tab filtering.
//!
//! Tabs are pure views over an already-loaded notification list; ordering is
//! always the caller's input order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Unread,
    Read,
}

/// One inbox entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub status: NotificationStatus,
    /// Dotted action type, e.g. `bb.issue.create`.
    pub action_type: String,
    /// Unix epoch seconds.
    pub created_ts: i64,
}

/// Inbox view selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxTab {
    Unread,
    Read,
    All,
    /// Entries whose action type starts with the given prefix.
    Action(String),
}

impl InboxTab {
    pub fn matches(&self, item: &Notification) -> bool {
        match self {
            Self::Unread => item.status == NotificationStatus::Unread,
            Self::Read => item.status == NotificationStatus::Read,
            Self::All => true,
            Self::Action(prefix) => item.action_type.starts_with(prefix.as_str()),
        }
    }
}

/// Returns the entries visible under `tab`, preserving input order.
pub fn filter_tab<'a>(items: &'a [Notification], tab: &InboxTab) -> Vec<&'a Notification> {
    items.iter().filter(|item| tab.matches(item)).collect()
}

pub fn unread_count(items: &[Notification]) -> usize {
    items
        .iter()
        .filter(|item| item.status == NotificationStatus::Unread)
        .count()
}

/// Marks the listed entries as read and returns how many changed state.
pub fn mark_read(items: &mut [Notification], ids: &[i64]) -> usize {
    let ids: HashSet<i64> = ids.iter().copied().collect();
    let mut changed = 0;
    for item in items.iter_mut() {
        if item.status == NotificationStatus::Unread && ids.contains(&item.id) {
            item.status = NotificationStatus::Read;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::{filter_tab, mark_read, unread_count, InboxTab, Notification, NotificationStatus};

    fn sample() -> Vec<Notification> {
        vec![
            notification(1, NotificationStatus::Unread, "bb.issue.create"),
            notification(2, NotificationStatus::Read, "bb.issue.comment.create"),
            notification(3, NotificationStatus::Unread, "bb.pipeline.task.status.update"),
        ]
    }

    fn notification(id: i64, status: NotificationStatus, action_type: &str) -> Notification {
        Notification {
            id,
            status,
            action_type: action_type.to_string(),
            created_ts: 1_700_000_000 + id,
        }
    }

    fn ids(items: Vec<&Notification>) -> Vec<i64> {
        items.into_iter().map(|item| item.id).collect()
    }

    #[test]
    fn tabs_filter_by_status_and_action_prefix() {
        let items = sample();
        assert_eq!(ids(filter_tab(&items, &InboxTab::Unread)), vec![1, 3]);
        assert_eq!(ids(filter_tab(&items, &InboxTab::Read)), vec![2]);
        assert_eq!(ids(filter_tab(&items, &InboxTab::All)), vec![1, 2, 3]);
        assert_eq!(
            ids(filter_tab(&items, &InboxTab::Action("bb.issue.".to_string()))),
            vec![1, 2]
        );
    }

    #[test]
    fn mark_read_only_counts_state_changes() {
        let mut items = sample();
        assert_eq!(unread_count(&items), 2);

        assert_eq!(mark_read(&mut items, &[1, 2, 99]), 1);
        assert_eq!(unread_count(&items), 1);
        assert_eq!(items[0].status, NotificationStatus::Read);
    }

    #[test]
    fn status_serializes_in_upper_case() {
        let json = serde_json::to_string(&notification(5, NotificationStatus::Unread, "x")).unwrap();
        assert!(json.contains(r#""status":"UNREAD""#));
        assert!(json.contains(r#""actionType":"x""#));
    }
}
