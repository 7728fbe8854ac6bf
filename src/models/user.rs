use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Identity-provider-owned user record. This service only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}

impl UserIdentity {
    /// Name used in outbound messages: the profile name when present,
    /// otherwise the local part of the email address.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.full_name.as_deref() {
            let name = name.trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
        match self.email.split('@').next() {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => "Usuário".to_string(),
        }
    }
}
