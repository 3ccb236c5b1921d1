/// Environment variable naming the operator shown in the header.
pub const USER_ENV: &str = "GARAGE_USER";

/// Who is using the console. There is no login; the name is informational
/// and every action is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    user: Option<String>,
}

impl AuthContext {
    pub fn new(user: Option<String>) -> Self {
        let user = user
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        Self { user }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(USER_ENV).ok())
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.user.as_deref().unwrap_or("Администратор")
    }

    pub fn is_authenticated(&self) -> bool {
        true
    }
}
