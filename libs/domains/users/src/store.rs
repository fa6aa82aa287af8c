use crate::error::{UserError, UserResult};
use crate::index::{BalancedIndex, OrderedStack, Status};
use crate::models::{UpdateUser, User, UserRecord};

/// User directory backed by a single [`BalancedIndex`] keyed by user id.
///
/// Callers that share a store across tasks must serialize mutations and
/// traversals themselves (see `UserService`).
#[derive(Debug, Default)]
pub struct CredentialStore {
    index: BalancedIndex<String, User>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn add_user(&mut self, user: User) -> UserResult<&UserRecord> {
        self.add_user_with_status(user, Status::default())
    }

    pub fn add_user_with_status(&mut self, user: User, status: Status) -> UserResult<&UserRecord> {
        let id = user.id.clone();
        self.index
            .insert_with_status(id.clone(), user, status)
            .map_err(|e| UserError::from_index(e, &id))?;
        self.find_user(&id)
    }

    pub fn find_user(&self, id: &str) -> UserResult<&UserRecord> {
        self.index
            .find(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    pub fn update_user(&mut self, id: &str, update: UpdateUser) -> UserResult<&UserRecord> {
        self.index
            .update_with(id, |user| user.apply_update(update))
            .map_err(|e| UserError::from_index(e, id))
    }

    pub fn set_status(&mut self, id: &str, status: Status) -> UserResult<&UserRecord> {
        self.index
            .transition_status(id, status)
            .map_err(|e| UserError::from_index(e, id))
    }

    pub fn remove_user(&mut self, id: &str) -> UserResult<User> {
        self.index
            .remove(id)
            .map(UserRecord::into_value)
            .map_err(|e| UserError::from_index(e, id))
    }

    pub fn list_ascending(&self) -> UserResult<Vec<&UserRecord>> {
        self.list(false)
    }

    pub fn list_descending(&self) -> UserResult<Vec<&UserRecord>> {
        self.list(true)
    }

    pub fn list_by_status(&self, status: Status) -> Vec<&UserRecord> {
        self.index.drain_by_status(status)
    }

    fn list(&self, descending: bool) -> UserResult<Vec<&UserRecord>> {
        let mut stack = OrderedStack::with_capacity(self.index.len());
        self.index
            .drain_ordered(&mut stack, descending)
            .map_err(|e| UserError::Internal(e.to_string()))?;
        Ok(stack.into_iter().collect())
    }
}
