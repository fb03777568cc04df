use crate::domain::entities::UserRecord;

/// Identity of the caller for a single request.
///
/// Only two capabilities matter to the services: whether the caller is
/// signed in and whether they are staff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    user: Option<UserRecord>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn user(user: UserRecord) -> Self {
        Self { user: Some(user) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_staff(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.is_staff)
    }

    pub fn account(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }
}
