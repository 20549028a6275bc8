/// Authentication handlers
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::models::{PublicUser, UserRole};
use crate::security::{jwt, password};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus the public view of the account
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Register a new account and sign it in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields, weak password, or email taken")
    )
)]
pub async fn register(
    pool: web::Data<PgPool>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(AppError::BadRequest("Missing fields".to_string()));
    }

    let role = match payload.role.as_deref() {
        None | Some("") => UserRole::Learner,
        Some(raw) => UserRole::from_str(raw)
            .ok_or_else(|| AppError::BadRequest("Invalid role".to_string()))?,
    };

    if user_repo::find_by_email(&pool, payload.email.trim())
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let hash = password::hash_password(&payload.password)?;
    let user = user_repo::create_user(
        &pool,
        payload.name.trim(),
        payload.email.trim(),
        &hash,
        role.as_str(),
    )
    .await?;

    let token = jwt::issue_token(user.id).map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "Account registered");
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn login(
    pool: web::Data<PgPool>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let user = user_repo::find_by_email(&pool, payload.email.trim())
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid credentials".to_string()))?;

    password::verify_password(&payload.password, &user.password_hash)?;

    let token = jwt::issue_token(user.id).map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: user.into(),
    }))
}
