use crate::models::{Video, VideoWithCreator};
use sqlx::PgPool;
use uuid::Uuid;

const WITH_CREATOR_COLUMNS: &str = r#"
    v.id, v.title, v.filename, v.url, v.creator_id, u.name AS creator_name,
    v.tags, v.concepts, v.level, v.duration_sec, v.created_at
"#;

#[allow(clippy::too_many_arguments)]
pub async fn insert_video(
    pool: &PgPool,
    title: &str,
    filename: &str,
    url: &str,
    creator_id: Uuid,
    tags: &[String],
    concepts: &[String],
    level: &str,
    duration_sec: Option<i32>,
) -> Result<Video, sqlx::Error> {
    let video = sqlx::query_as::<_, Video>(
        r#"
        INSERT INTO videos (title, filename, url, creator_id, tags, concepts, level, duration_sec)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, title, filename, url, creator_id, tags, concepts, level, duration_sec, created_at
        "#,
    )
    .bind(title)
    .bind(filename)
    .bind(url)
    .bind(creator_id)
    .bind(tags)
    .bind(concepts)
    .bind(level)
    .bind(duration_sec)
    .fetch_one(pool)
    .await?;

    Ok(video)
}

pub async fn find_by_id(
    pool: &PgPool,
    video_id: Uuid,
) -> Result<Option<VideoWithCreator>, sqlx::Error> {
    let video = sqlx::query_as::<_, VideoWithCreator>(&format!(
        r#"
        SELECT {WITH_CREATOR_COLUMNS}
        FROM videos v JOIN users u ON v.creator_id = u.id
        WHERE v.id = $1
        "#
    ))
    .bind(video_id)
    .fetch_optional(pool)
    .await?;

    Ok(video)
}

/// Newest videos across all creators
pub async fn latest(pool: &PgPool, limit: i64) -> Result<Vec<VideoWithCreator>, sqlx::Error> {
    let videos = sqlx::query_as::<_, VideoWithCreator>(&format!(
        r#"
        SELECT {WITH_CREATOR_COLUMNS}
        FROM videos v JOIN users u ON v.creator_id = u.id
        ORDER BY v.created_at DESC
        LIMIT $1
        "#
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}

/// Newest videos from the given creators
pub async fn latest_by_creators(
    pool: &PgPool,
    creator_ids: &[Uuid],
    limit: i64,
) -> Result<Vec<VideoWithCreator>, sqlx::Error> {
    let videos = sqlx::query_as::<_, VideoWithCreator>(&format!(
        r#"
        SELECT {WITH_CREATOR_COLUMNS}
        FROM videos v JOIN users u ON v.creator_id = u.id
        WHERE v.creator_id = ANY($1)
        ORDER BY v.created_at DESC
        LIMIT $2
        "#
    ))
    .bind(creator_ids)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}

/// Newest videos from everyone except the given creators
pub async fn latest_excluding_creators(
    pool: &PgPool,
    creator_ids: &[Uuid],
    limit: i64,
) -> Result<Vec<VideoWithCreator>, sqlx::Error> {
    let videos = sqlx::query_as::<_, VideoWithCreator>(&format!(
        r#"
        SELECT {WITH_CREATOR_COLUMNS}
        FROM videos v JOIN users u ON v.creator_id = u.id
        WHERE NOT (v.creator_id = ANY($1))
        ORDER BY v.created_at DESC
        LIMIT $2
        "#
    ))
    .bind(creator_ids)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}

/// Fetch a set of videos by id, in no particular order. Callers that
/// care about ordering (the feed cache) re-order in memory.
pub async fn find_by_ids(
    pool: &PgPool,
    video_ids: &[Uuid],
) -> Result<Vec<VideoWithCreator>, sqlx::Error> {
    let videos = sqlx::query_as::<_, VideoWithCreator>(&format!(
        r#"
        SELECT {WITH_CREATOR_COLUMNS}
        FROM videos v JOIN users u ON v.creator_id = u.id
        WHERE v.id = ANY($1)
        "#
    ))
    .bind(video_ids)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}
