use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::UserIdentity;
use crate::store::StoreError;

/// A task record as held by the backend collection.
///
/// `checked` is the only field that changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub owner: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl Task {
    /// Absent and `false` both count as incomplete.
    pub fn is_checked(&self) -> bool {
        self.checked == Some(true)
    }
}

/// Insert payload. Owner fields stay optional so a signed-out submit is
/// still sent and rejected by the backend rather than by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl NewTask {
    pub fn new(text: String, user: Option<&UserIdentity>) -> Self {
        Self::at(text, user, Utc::now())
    }

    pub fn at(text: String, user: Option<&UserIdentity>, created_at: DateTime<Utc>) -> Self {
        Self {
            text,
            created_at,
            owner: user.map(|u| u.id.clone()),
            username: user.map(|u| u.username.clone()),
        }
    }

    /// Turn the payload into a stored record, the way the backend does.
    pub fn into_task(self, id: Uuid) -> Result<Task, StoreError> {
        match (self.owner, self.username) {
            (Some(owner), Some(username)) => Ok(Task {
                id,
                text: self.text,
                created_at: self.created_at,
                owner,
                username,
                checked: None,
            }),
            _ => Err(StoreError::NotAuthenticated),
        }
    }
}

/// Partial update merged into an existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl TaskPatch {
    pub fn checked(checked: bool) -> Self {
        Self {
            checked: Some(checked),
        }
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(checked) = self.checked {
            task.checked = Some(checked);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn alice() -> UserIdentity {
        UserIdentity {
            id: "u1".to_string(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn unchecked_task_omits_checked_on_the_wire() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let id = Uuid::nil();
        let task = NewTask::at("Buy milk".to_string(), Some(&alice()), created_at)
            .into_task(id)
            .unwrap();

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "text": "Buy milk",
                "createdAt": "2024-03-01T12:00:00Z",
                "owner": "u1",
                "username": "alice",
            })
        );
    }

    #[test]
    fn task_without_checked_field_decodes_as_incomplete() {
        let task: Task = serde_json::from_value(json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "text": "x",
            "createdAt": "2024-03-01T12:00:00Z",
            "owner": "u1",
            "username": "alice",
        }))
        .unwrap();
        assert_eq!(task.checked, None);
        assert!(!task.is_checked());
    }

    #[test]
    fn into_task_requires_an_owner() {
        let payload = NewTask::new("orphan".to_string(), None);
        assert_eq!(payload.into_task(Uuid::new_v4()), Err(StoreError::NotAuthenticated));
    }

    #[test]
    fn patch_only_touches_checked() {
        let mut task = NewTask::new("x".to_string(), Some(&alice()))
            .into_task(Uuid::new_v4())
            .unwrap();
        let before = task.clone();

        TaskPatch::default().apply_to(&mut task);
        assert_eq!(task, before);

        TaskPatch::checked(false).apply_to(&mut task);
        assert_eq!(task.checked, Some(false));
        assert!(!task.is_checked());
        assert_eq!(task.text, before.text);
    }
}
