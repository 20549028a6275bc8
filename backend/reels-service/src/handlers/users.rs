/// User handlers: profile, follow graph, playlists
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::{playlist_repo, user_repo, video_repo};
use crate::error::{AppError, Result};
use crate::middleware::AuthedUser;
use crate::models::{PlaylistWithVideos, PublicUser, VideoResponse};
use crate::services::FeedService;

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FollowResponse {
    pub following: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToPlaylistRequest {
    pub title: String,
    pub video_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddToPlaylistResponse {
    pub playlist_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaylistsResponse {
    pub playlists: Vec<PlaylistWithVideos>,
}

impl From<&AuthedUser> for PublicUser {
    fn from(user: &AuthedUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

/// The authenticated account.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Current user", body = MeResponse))
)]
pub async fn me(user: AuthedUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(MeResponse {
        user: PublicUser::from(&user),
    }))
}

/// Follow or unfollow a creator (toggle).
#[utoipa::path(
    post,
    path = "/api/users/{id}/follow",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "New follow state", body = FollowResponse),
        (status = 400, description = "Cannot follow yourself"),
        (status = 404, description = "User not found")
    )
)]
pub async fn toggle_follow(
    pool: web::Data<PgPool>,
    feed: web::Data<FeedService>,
    user: AuthedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let followee_id = path.into_inner();
    if followee_id == user.id {
        return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
    }

    if user_repo::find_by_id(&pool, followee_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let following = user_repo::toggle_follow(&pool, user.id, followee_id).await?;

    // The caller's feed composition just changed.
    feed.invalidate_for(user.id).await;

    Ok(HttpResponse::Ok().json(FollowResponse { following }))
}

/// Add a video to one of the caller's playlists, creating the playlist
/// on first use.
#[utoipa::path(
    post,
    path = "/api/users/playlist",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = AddToPlaylistRequest,
    responses(
        (status = 200, description = "Video added", body = AddToPlaylistResponse),
        (status = 400, description = "Missing title or video_id"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn add_to_playlist(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    payload: web::Json<AddToPlaylistRequest>,
) -> Result<HttpResponse> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest(
            "Missing title or video_id".to_string(),
        ));
    }

    if video_repo::find_by_id(&pool, payload.video_id).await?.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    let playlist_id = playlist_repo::find_or_create(&pool, user.id, title).await?;
    playlist_repo::add_video(&pool, playlist_id, payload.video_id).await?;

    Ok(HttpResponse::Ok().json(AddToPlaylistResponse { playlist_id }))
}

/// The caller's playlists with their videos.
#[utoipa::path(
    get,
    path = "/api/users/playlists",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Playlists", body = PlaylistsResponse))
)]
pub async fn my_playlists(pool: web::Data<PgPool>, user: AuthedUser) -> Result<HttpResponse> {
    let playlists = playlist_repo::playlists_for_user(&pool, user.id).await?;

    let mut out = Vec::with_capacity(playlists.len());
    for playlist in playlists {
        let videos = playlist_repo::videos_for_playlist(&pool, playlist.id).await?;
        out.push(PlaylistWithVideos {
            id: playlist.id,
            title: playlist.title,
            created_at: playlist.created_at,
            videos: videos.into_iter().map(VideoResponse::from).collect(),
        });
    }

    Ok(HttpResponse::Ok().json(PlaylistsResponse { playlists: out }))
}
