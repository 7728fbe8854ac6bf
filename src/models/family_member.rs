use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Registration cap enforced at the write endpoint, not by the schema.
pub const MAX_FAMILY_MEMBERS: i64 = 2;

/// A person registered by a user to receive well-being alerts about them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FamilyMember {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub relationship: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFamilyMemberRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Relationship must be 1-50 characters"))]
    pub relationship: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}
