/// AI handlers: study-pack generation for a video
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::video_repo;
use crate::error::{AppError, Result};
use crate::middleware::AuthedUser;
use crate::services::{SummaryPipeline, VideoStore};

/// Generate a summary and quiz for a video via the RAG pipeline.
#[utoipa::path(
    get,
    path = "/api/ai/video/{id}/summary",
    tag = "AI",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Study pack", body = crate::services::summary::StudyPack),
        (status = 400, description = "Video file missing on server"),
        (status = 404, description = "Video not found"),
        (status = 502, description = "An AI provider call failed")
    )
)]
pub async fn video_summary(
    _user: AuthedUser,
    pool: web::Data<PgPool>,
    store: web::Data<VideoStore>,
    pipeline: web::Data<SummaryPipeline>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let video = video_repo::find_by_id(&pool, video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    let file_path = store.resolve(&video.filename)?;
    if !tokio::fs::try_exists(&file_path).await.unwrap_or(false) {
        return Err(AppError::BadRequest(
            "Video file missing on server".to_string(),
        ));
    }

    let pack = pipeline.generate(&video, &file_path).await?;
    Ok(HttpResponse::Ok().json(pack))
}
