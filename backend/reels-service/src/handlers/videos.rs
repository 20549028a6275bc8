/// Video handlers: upload, feed, detail, comments, file serving
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::{comment_repo, video_repo};
use crate::error::{AppError, Result};
use crate::middleware::AuthedUser;
use crate::models::{CommentWithAuthor, CreatorRef, VideoLevel, VideoResponse};
use crate::services::{FeedService, VideoStore};

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub video: VideoResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedResponse {
    pub feed: Vec<VideoResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoDetailResponse {
    pub video: VideoResponse,
    pub comments: Vec<CommentWithAuthor>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentCreatedResponse {
    pub video_id: Uuid,
    pub comments: Vec<CommentWithAuthor>,
}

/// Collected multipart fields of an upload request.
#[derive(Default)]
struct UploadForm {
    title: String,
    tags: String,
    concepts: String,
    level: String,
    duration_sec: String,
    stored_filename: Option<String>,
}

/// Upload a new reel (creators only).
#[utoipa::path(
    post,
    path = "/api/videos/upload",
    tag = "Videos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Video created", body = UploadResponse),
        (status = 400, description = "Missing file/title or file too large"),
        (status = 403, description = "Only creators can upload")
    )
)]
pub async fn upload_video(
    user: AuthedUser,
    pool: web::Data<PgPool>,
    store: web::Data<VideoStore>,
    feed: web::Data<FeedService>,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    if !user.is_creator() {
        return Err(AppError::Forbidden("Only creators can upload".to_string()));
    }

    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item
            .map_err(|e| AppError::BadRequest(format!("Malformed multipart payload: {e}")))?;

        let cd = field.content_disposition().cloned();
        let field_name = cd
            .as_ref()
            .and_then(|c| c.get_name())
            .unwrap_or_default()
            .to_string();

        match field_name.as_str() {
            "video" => {
                let original = cd.as_ref().and_then(|c| c.get_filename()).map(str::to_string);
                form.stored_filename =
                    Some(persist_video_field(&store, &mut field, original.as_deref()).await?);
            }
            "title" => form.title = read_text_field(&mut field).await?,
            "tags" => form.tags = read_text_field(&mut field).await?,
            "concepts" => form.concepts = read_text_field(&mut field).await?,
            "level" => form.level = read_text_field(&mut field).await?,
            "duration_sec" => form.duration_sec = read_text_field(&mut field).await?,
            // Unknown parts are drained so the client isn't blocked.
            _ => while field.next().await.is_some() {},
        }
    }

    let filename = form
        .stored_filename
        .ok_or_else(|| AppError::BadRequest("No file".to_string()))?;

    let title = form.title.trim().to_string();
    if title.is_empty() {
        store.discard(&filename).await;
        return Err(AppError::BadRequest("Missing title".to_string()));
    }

    let tags = split_csv(&form.tags);
    let concepts = split_csv(&form.concepts);
    let level = VideoLevel::from_str(form.level.trim()).unwrap_or(VideoLevel::Beginner);
    let duration_sec = form.duration_sec.trim().parse::<i32>().ok();
    let url = format!("/uploads/{filename}");

    let video = video_repo::insert_video(
        &pool,
        &title,
        &filename,
        &url,
        user.id,
        &tags,
        &concepts,
        level.as_str(),
        duration_sec,
    )
    .await?;

    // The uploader's own cached feed no longer reflects reality.
    feed.invalidate_for(user.id).await;

    tracing::info!(video_id = %video.id, creator = %user.id, "Video uploaded");
    Ok(HttpResponse::Ok().json(UploadResponse {
        video: VideoResponse::from_video(
            video,
            CreatorRef {
                id: user.id,
                name: user.name,
            },
        ),
    }))
}

/// Personalized feed: followed creators first, then the rest.
#[utoipa::path(
    get,
    path = "/api/videos/feed",
    tag = "Videos",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Feed", body = FeedResponse))
)]
pub async fn feed(user: AuthedUser, feed: web::Data<FeedService>) -> Result<HttpResponse> {
    let items = feed.personalized_feed(user.id).await?;
    Ok(HttpResponse::Ok().json(FeedResponse { feed: items }))
}

/// A single video with its comments.
#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    tag = "Videos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Video detail", body = VideoDetailResponse),
        (status = 404, description = "Video not found")
    )
)]
pub async fn get_video(
    pool: web::Data<PgPool>,
    _user: AuthedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let video = video_repo::find_by_id(&pool, video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;
    let comments = comment_repo::comments_for_video(&pool, video_id).await?;

    Ok(HttpResponse::Ok().json(VideoDetailResponse {
        video: video.into(),
        comments,
    }))
}

/// Comment on a video; returns the refreshed comment list.
#[utoipa::path(
    post,
    path = "/api/videos/{id}/comment",
    tag = "Videos",
    security(("bearer_auth" = [])),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment added", body = CommentCreatedResponse),
        (status = 400, description = "No text"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn add_comment(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("No text".to_string()));
    }

    if video_repo::find_by_id(&pool, video_id).await?.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    comment_repo::insert_comment(&pool, video_id, user.id, text).await?;
    let comments = comment_repo::comments_for_video(&pool, video_id).await?;

    Ok(HttpResponse::Ok().json(CommentCreatedResponse { video_id, comments }))
}

/// Serve a stored video file from local disk.
pub async fn serve_upload(
    store: web::Data<VideoStore>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let filename = path.into_inner();
    let file_path = store.resolve(&filename)?;

    let file = match tokio::fs::File::open(&file_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&filename))
        .streaming(ReaderStream::new(file)))
}

/// Stream one multipart file part to disk, enforcing the size cap.
/// Returns the stored filename; partial files are removed on failure.
async fn persist_video_field(
    store: &VideoStore,
    field: &mut Field,
    original_name: Option<&str>,
) -> Result<String> {
    let filename = VideoStore::generate_filename(original_name);
    let path = store.path_for(&filename);
    let mut file = tokio::fs::File::create(&path).await?;
    let mut written: usize = 0;

    while let Some(chunk) = field.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                store.discard(&filename).await;
                return Err(AppError::BadRequest(format!("Upload stream failed: {e}")));
            }
        };

        written += bytes.len();
        if written > store.max_bytes() {
            drop(file);
            store.discard(&filename).await;
            return Err(AppError::BadRequest(
                "File exceeds upload size limit".to_string(),
            ));
        }

        if let Err(e) = file.write_all(&bytes).await {
            store.discard(&filename).await;
            return Err(e.into());
        }
    }

    file.flush().await?;
    Ok(filename)
}

/// Collect a small text part into a String.
async fn read_text_field(field: &mut Field) -> Result<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes =
            chunk.map_err(|e| AppError::BadRequest(format!("Upload stream failed: {e}")))?;
        buf.extend_from_slice(&bytes);
    }

    String::from_utf8(buf).map_err(|_| AppError::BadRequest("Field is not valid UTF-8".to_string()))
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next().map(str::to_lowercase).as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_splitting_trims_and_drops_empties() {
        assert_eq!(
            split_csv(" rust, ownership ,,borrowing "),
            vec!["rust", "ownership", "borrowing"]
        );
        assert!(split_csv("").is_empty());
        assert!(split_csv(" , ,").is_empty());
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for("a.mp4"), "video/mp4");
        assert_eq!(content_type_for("a.WEBM"), "video/webm");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
