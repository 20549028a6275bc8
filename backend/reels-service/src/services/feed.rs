/// Personalized feed assembly with a Redis id-list cache
///
/// Feed shape: the newest videos from followed creators first (capped),
/// then the newest from everyone else. Only the ordered id list is
/// cached; rows are hydrated from PostgreSQL on every read so the cache
/// never serves stale metadata. Cache failures degrade to a database
/// read, never an error.
use redis::{aio::ConnectionManager, AsyncCommands};
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::{user_repo, video_repo};
use crate::error::Result;
use crate::models::{VideoResponse, VideoWithCreator};

/// How many followed-creator videos lead the feed.
pub const FOLLOWED_FEED_LIMIT: i64 = 40;
/// Overall cap on the rest of the feed.
pub const FEED_LIMIT: i64 = 80;

#[derive(Clone)]
pub struct FeedCache {
    redis: ConnectionManager,
    ttl: Duration,
}

impl FeedCache {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self {
            redis,
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    fn feed_key(user_id: Uuid) -> String {
        format!("feed:v1:{}", user_id)
    }

    async fn read_ids(&self, user_id: Uuid) -> Option<Vec<Uuid>> {
        let key = Self::feed_key(user_id);
        let mut conn = self.redis.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(data)) => match serde_json::from_str::<Vec<Uuid>>(&data) {
                Ok(ids) => {
                    debug!("Feed cache HIT for user {}", user_id);
                    Some(ids)
                }
                Err(e) => {
                    warn!("Failed to deserialize cached feed: {}", e);
                    None
                }
            },
            Ok(None) => {
                debug!("Feed cache MISS for user {}", user_id);
                None
            }
            Err(e) => {
                warn!("Redis read error for feed cache: {}", e);
                None
            }
        }
    }

    async fn write_ids(&self, user_id: Uuid, ids: &[Uuid]) {
        let key = Self::feed_key(user_id);
        let payload = match serde_json::to_string(ids) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to serialize feed for cache: {}", e);
                return;
            }
        };

        let mut conn = self.redis.clone();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(&key, payload, self.ttl.as_secs())
            .await
        {
            warn!("Redis write error for feed cache: {}", e);
        }
    }

    async fn invalidate(&self, user_id: Uuid) {
        let key = Self::feed_key(user_id);
        let mut conn = self.redis.clone();
        if let Err(e) = conn.del::<_, ()>(&key).await {
            warn!("Redis delete error for feed cache: {}", e);
        }
    }
}

#[derive(Clone)]
pub struct FeedService {
    pool: PgPool,
    cache: FeedCache,
}

impl FeedService {
    pub fn new(pool: PgPool, redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self {
            pool,
            cache: FeedCache::new(redis, ttl_secs),
        }
    }

    /// Assemble the personalized feed for a user.
    pub async fn personalized_feed(&self, user_id: Uuid) -> Result<Vec<VideoResponse>> {
        if let Some(ids) = self.cache.read_ids(user_id).await {
            let rows = video_repo::find_by_ids(&self.pool, &ids).await?;
            if let Some(ordered) = order_by_ids(&ids, rows) {
                return Ok(ordered.into_iter().map(VideoResponse::from).collect());
            }
            // A cached video disappeared; rebuild below.
            debug!("Feed cache for user {} is stale, rebuilding", user_id);
        }

        let feed = self.build_feed(user_id).await?;
        let ids: Vec<Uuid> = feed.iter().map(|v| v.id).collect();
        self.cache.write_ids(user_id, &ids).await;

        Ok(feed.into_iter().map(VideoResponse::from).collect())
    }

    /// Followed creators first, newest first, then everyone else.
    async fn build_feed(&self, user_id: Uuid) -> Result<Vec<VideoWithCreator>> {
        let following = user_repo::following_ids(&self.pool, user_id).await?;

        if following.is_empty() {
            return Ok(video_repo::latest(&self.pool, FEED_LIMIT).await?);
        }

        let mut feed =
            video_repo::latest_by_creators(&self.pool, &following, FOLLOWED_FEED_LIMIT).await?;
        let others =
            video_repo::latest_excluding_creators(&self.pool, &following, FEED_LIMIT).await?;
        feed.extend(others);

        Ok(feed)
    }

    /// Drop the cached feed for a user (after follow changes or their
    /// own upload).
    pub async fn invalidate_for(&self, user_id: Uuid) {
        self.cache.invalidate(user_id).await;
    }
}

/// Re-order hydrated rows to match the cached id order. Returns None
/// if any id is missing (e.g. a video was deleted since caching).
fn order_by_ids(
    ids: &[Uuid],
    rows: Vec<VideoWithCreator>,
) -> Option<Vec<VideoWithCreator>> {
    let mut by_id: HashMap<Uuid, VideoWithCreator> =
        rows.into_iter().map(|v| (v.id, v)).collect();

    ids.iter().map(|id| by_id.remove(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn video(id: Uuid) -> VideoWithCreator {
        VideoWithCreator {
            id,
            title: "t".to_string(),
            filename: "f.mp4".to_string(),
            url: "/uploads/f.mp4".to_string(),
            creator_id: Uuid::new_v4(),
            creator_name: "c".to_string(),
            tags: vec![],
            concepts: vec![],
            level: "beginner".to_string(),
            duration_sec: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn order_by_ids_restores_cache_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![video(b), video(a)];

        let ordered = order_by_ids(&[a, b], rows).unwrap();
        assert_eq!(ordered[0].id, a);
        assert_eq!(ordered[1].id, b);
    }

    #[test]
    fn order_by_ids_detects_missing_rows() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![video(a)];

        assert!(order_by_ids(&[a, b], rows).is_none());
    }

    #[test]
    fn feed_key_is_per_user() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(FeedCache::feed_key(a), FeedCache::feed_key(b));
        assert!(FeedCache::feed_key(a).starts_with("feed:v1:"));
    }
}
