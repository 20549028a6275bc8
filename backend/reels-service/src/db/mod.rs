/// Database repositories
///
/// Thin sqlx query modules over the shared PgPool. Business rules live
/// in services/ and handlers/; this layer is SQL only.
pub mod comment_repo;
pub mod embedding_repo;
pub mod playlist_repo;
pub mod user_repo;
pub mod video_repo;
