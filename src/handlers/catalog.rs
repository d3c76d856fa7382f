use axum::Json;

use crate::models::ServiceOption;
use crate::services::catalog;

// GET /api/services
pub async fn list_services() -> Json<&'static [ServiceOption]> {
    Json(catalog::catalog())
}
