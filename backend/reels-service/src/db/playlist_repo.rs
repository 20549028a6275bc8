use crate::models::{Playlist, VideoWithCreator};
use sqlx::PgPool;
use uuid::Uuid;

/// Find-or-create the playlist identified by (user, title).
pub async fn find_or_create(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
) -> Result<Uuid, sqlx::Error> {
    // Upsert against the (user_id, title) unique constraint; the no-op
    // DO UPDATE makes RETURNING yield the existing row's id.
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO playlists (user_id, title)
        VALUES ($1, $2)
        ON CONFLICT (user_id, title) DO UPDATE SET title = EXCLUDED.title
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(title)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Add a video to a playlist, idempotently.
pub async fn add_video(
    pool: &PgPool,
    playlist_id: Uuid,
    video_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO playlist_videos (playlist_id, video_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(playlist_id)
    .bind(video_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// The caller's playlists, newest first
pub async fn playlists_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Playlist>, sqlx::Error> {
    let playlists = sqlx::query_as::<_, Playlist>(
        r#"
        SELECT id, user_id, title, created_at
        FROM playlists
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(playlists)
}

/// Videos in a playlist, in the order they were added
pub async fn videos_for_playlist(
    pool: &PgPool,
    playlist_id: Uuid,
) -> Result<Vec<VideoWithCreator>, sqlx::Error> {
    let videos = sqlx::query_as::<_, VideoWithCreator>(
        r#"
        SELECT v.id, v.title, v.filename, v.url, v.creator_id, u.name AS creator_name,
               v.tags, v.concepts, v.level, v.duration_sec, v.created_at
        FROM playlist_videos pv
        JOIN videos v ON pv.video_id = v.id
        JOIN users u ON v.creator_id = u.id
        WHERE pv.playlist_id = $1
        ORDER BY pv.added_at ASC
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}
