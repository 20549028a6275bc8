use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
/// OpenAPI documentation for the Studyreel Reels Service
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services::summary;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Studyreel Reels Service API",
        version = "0.1.0",
        description = "Short-form learning platform backend: accounts, creator uploads, personalized feeds, comments, playlists, and AI-generated study packs (summary + quiz) via a RAG pipeline.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Development server"),
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::users::me,
        handlers::users::toggle_follow,
        handlers::users::add_to_playlist,
        handlers::users::my_playlists,
        handlers::videos::upload_video,
        handlers::videos::feed,
        handlers::videos::get_video,
        handlers::videos::add_comment,
        handlers::ai::video_summary,
    ),
    components(schemas(
        models::PublicUser,
        models::VideoResponse,
        models::CreatorRef,
        models::CommentWithAuthor,
        models::Playlist,
        models::PlaylistWithVideos,
        summary::StudyPack,
        summary::QuizQuestion,
    )),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Profile, follows, playlists"),
        (name = "Videos", description = "Uploads, feed, comments"),
        (name = "AI", description = "RAG summary and quiz generation"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            )
        }
    }
}
