use crate::models::{Comment, CommentWithAuthor};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_comment(
    pool: &PgPool,
    video_id: Uuid,
    user_id: Uuid,
    body: &str,
) -> Result<Comment, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (video_id, user_id, body)
        VALUES ($1, $2, $3)
        RETURNING id, video_id, user_id, body, created_at
        "#,
    )
    .bind(video_id)
    .bind(user_id)
    .bind(body)
    .fetch_one(pool)
    .await?;

    Ok(comment)
}

/// All comments on a video with author names, oldest first
pub async fn comments_for_video(
    pool: &PgPool,
    video_id: Uuid,
) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
    let comments = sqlx::query_as::<_, CommentWithAuthor>(
        r#"
        SELECT c.id, c.video_id, c.user_id, u.name AS user_name, c.body, c.created_at
        FROM comments c JOIN users u ON c.user_id = u.id
        WHERE c.video_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(video_id)
    .fetch_all(pool)
    .await?;

    Ok(comments)
}
