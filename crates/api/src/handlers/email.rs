//! Handlers for the `/email` resource.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use gigseeker_core::error::CoreError;
use gigseeker_core::quota::used_today;
use gigseeker_db::repositories::ProfileRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/email/limits
///
/// Today's send allowance for the caller's tier, so the UI can show
/// remaining sends and disable the action at zero.
pub async fn limits(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<serde_json::Value>> {
    let profile = ProfileRepo::find_by_user_id(&state.pool, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Profile",
            id: user.user_id,
        })?;

    let today = Utc::now().date_naive();
    let tier = profile.subscription_tier;
    let limit = tier.daily_email_limit();
    let used = used_today(
        profile.daily_email_count.max(0) as u32,
        profile.last_email_date,
        today,
    );

    Ok(Json(serde_json::json!({
        "tier": tier,
        "can_send": tier.can_send_email(),
        "limit": limit,
        "used_today": used,
        "remaining": limit.saturating_sub(used),
    })))
}
