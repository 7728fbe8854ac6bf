use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::family_member::{CreateFamilyMemberRequest, FamilyMember, MAX_FAMILY_MEMBERS};
use crate::AppState;

pub async fn list_family_members(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<FamilyMember>>> {
    let members = sqlx::query_as::<_, FamilyMember>(
        "SELECT * FROM family_members WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(members))
}

pub async fn create_family_member(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateFamilyMemberRequest>,
) -> AppResult<Json<FamilyMember>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let registered = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM family_members WHERE user_id = $1",
    )
    .bind(auth_user.id)
    .fetch_one(&state.db)
    .await?;

    if registered >= MAX_FAMILY_MEMBERS {
        return Err(AppError::Validation(format!(
            "A maximum of {} family members can be registered",
            MAX_FAMILY_MEMBERS
        )));
    }

    let member = sqlx::query_as::<_, FamilyMember>(
        r#"
        INSERT INTO family_members (id, user_id, name, relationship, email)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.name.trim())
    .bind(body.relationship.trim())
    .bind(body.email.trim().to_lowercase())
    .fetch_one(&state.db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db)
            if db.constraint() == Some("family_members_user_id_email_key") =>
        {
            AppError::Conflict("This email is already registered as a family member".into())
        }
        _ => AppError::Database(e),
    })?;

    Ok(Json(member))
}

pub async fn delete_family_member(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(member_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    // Idempotent delete — return 200 even if already gone
    let member = sqlx::query_as::<_, FamilyMember>(
        "SELECT * FROM family_members WHERE id = $1 AND user_id = $2",
    )
    .bind(member_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?;

    if let Some(member) = member {
        sqlx::query("DELETE FROM family_members WHERE id = $1")
            .bind(member.id)
            .execute(&state.db)
            .await?;

        tracing::info!(user_id = %auth_user.id, member_id = %member.id, "Family member removed");
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
