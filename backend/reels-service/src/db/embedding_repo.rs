use crate::models::VideoEmbedding;
use sqlx::PgPool;
use uuid::Uuid;

/// Record (or refresh) the vector-store bookkeeping row for a video.
pub async fn record_indexed(
    pool: &PgPool,
    video_id: Uuid,
    chunk_count: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO video_embeddings (video_id, chunk_count)
        VALUES ($1, $2)
        ON CONFLICT (video_id)
        DO UPDATE SET chunk_count = EXCLUDED.chunk_count, indexed_at = NOW()
        "#,
    )
    .bind(video_id)
    .bind(chunk_count)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_by_video(
    pool: &PgPool,
    video_id: Uuid,
) -> Result<Option<VideoEmbedding>, sqlx::Error> {
    let row = sqlx::query_as::<_, VideoEmbedding>(
        r#"
        SELECT video_id, chunk_count, indexed_at
        FROM video_embeddings
        WHERE video_id = $1
        "#,
    )
    .bind(video_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
