// Window key value object
// Windows are scoped per (user, action) combination, not per user alone

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowKey {
    pub user_id: String,
    pub action: String,
}

impl WindowKey {
    pub fn new(user_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            action: action.into(),
        }
    }
}
