/// Data models for reels-service
///
/// This module defines structures for:
/// - User: accounts and the learner/creator role split
/// - Video: uploaded reels and their feed representation
/// - Comment: per-video discussion
/// - Playlist: learner-curated collections
/// - VideoEmbedding: vector-store bookkeeping for the summary pipeline
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ========================================
// User Models
// ========================================

/// Account role. Creators may upload; everyone else only consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Learner,
    Creator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learner => "learner",
            Self::Creator => "creator",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "learner" => Some(Self::Learner),
            "creator" => Some(Self::Creator),
            _ => None,
        }
    }
}

/// User database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn get_role(&self) -> UserRole {
        UserRole::from_str(&self.role).unwrap_or(UserRole::Learner)
    }
}

/// User as exposed over the API (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

// ========================================
// Video Models
// ========================================

/// Difficulty level of a reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VideoLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl VideoLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// Video database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub filename: String,
    pub url: String,
    pub creator_id: Uuid,
    pub tags: Vec<String>,
    pub concepts: Vec<String>,
    pub level: String,
    pub duration_sec: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Video row joined with its creator's name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoWithCreator {
    pub id: Uuid,
    pub title: String,
    pub filename: String,
    pub url: String,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub tags: Vec<String>,
    pub concepts: Vec<String>,
    pub level: String,
    pub duration_sec: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Creator reference embedded in feed items
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatorRef {
    pub id: Uuid,
    pub name: String,
}

/// Video as exposed in the feed and detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub creator: CreatorRef,
    pub tags: Vec<String>,
    pub concepts: Vec<String>,
    pub level: String,
    pub duration_sec: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl VideoResponse {
    /// Build a response from a freshly inserted row plus the creator we
    /// already have in hand (no re-query needed).
    pub fn from_video(video: Video, creator: CreatorRef) -> Self {
        Self {
            id: video.id,
            title: video.title,
            url: video.url,
            creator,
            tags: video.tags,
            concepts: video.concepts,
            level: video.level,
            duration_sec: video.duration_sec,
            created_at: video.created_at,
        }
    }
}

impl From<VideoWithCreator> for VideoResponse {
    fn from(v: VideoWithCreator) -> Self {
        Self {
            id: v.id,
            title: v.title,
            url: v.url,
            creator: CreatorRef {
                id: v.creator_id,
                name: v.creator_name,
            },
            tags: v.tags,
            concepts: v.concepts,
            level: v.level,
            duration_sec: v.duration_sec,
            created_at: v.created_at,
        }
    }
}

// ========================================
// Comment Models
// ========================================

/// Comment database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub video_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author's name, as exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub video_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// ========================================
// Playlist Models
// ========================================

/// Playlist database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Playlist {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Playlist with its member videos, newest playlist first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaylistWithVideos {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub videos: Vec<VideoResponse>,
}

// ========================================
// Embedding Bookkeeping
// ========================================

/// One row per video whose transcript chunks live in the vector store
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VideoEmbedding {
    pub video_id: Uuid,
    pub chunk_count: i32,
    pub indexed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        assert_eq!(UserRole::from_str("creator"), Some(UserRole::Creator));
        assert_eq!(UserRole::Creator.as_str(), "creator");
        assert_eq!(UserRole::from_str("admin"), None);
    }

    #[test]
    fn level_round_trip() {
        for level in [
            VideoLevel::Beginner,
            VideoLevel::Intermediate,
            VideoLevel::Advanced,
        ] {
            assert_eq!(VideoLevel::from_str(level.as_str()), Some(level));
        }
        assert_eq!(VideoLevel::from_str("expert"), None);
    }

    #[test]
    fn public_user_drops_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: "creator".to_string(),
            created_at: Utc::now(),
        };
        let public = PublicUser::from(user.clone());
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(user.get_role(), UserRole::Creator);
    }
}
