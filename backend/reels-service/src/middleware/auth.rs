/// Bearer-token authentication middleware.
///
/// Validates the JWT, then resolves the subject against the users
/// table so handlers always see a live account. A syntactically valid
/// token whose user row has been deleted is rejected.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorInternalServerError, ErrorUnauthorized},
    web, Error, HttpMessage,
};
use futures::future::{ready, Ready};
use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use uuid::Uuid;

use crate::db::user_repo;
use crate::models::UserRole;
use crate::security::jwt;

/// Authenticated user resolved from the database, available to
/// handlers as an extractor.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthedUser {
    pub fn is_creator(&self) -> bool {
        self.role == UserRole::Creator
    }
}

/// JWT + user-resolution middleware
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| ErrorUnauthorized("Missing Authorization header"))?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| ErrorUnauthorized("Invalid Authorization header format"))?;

            let user_id = jwt::user_id_from_token(token).map_err(|e| {
                tracing::warn!("JWT validation failed: {}", e);
                ErrorUnauthorized("Invalid token")
            })?;

            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| ErrorInternalServerError("Database pool not configured"))?;

            let user = user_repo::find_by_id(&pool, user_id)
                .await
                .map_err(|e| {
                    tracing::error!("User lookup failed during auth: {}", e);
                    ErrorInternalServerError("Authentication lookup failed")
                })?
                .ok_or_else(|| ErrorUnauthorized("Invalid token (user missing)"))?;

            let role = user.get_role();
            req.extensions_mut().insert(AuthedUser {
                id: user.id,
                name: user.name,
                email: user.email,
                role,
            });

            service.call(req).await
        })
    }
}

/// FromRequest implementation for AuthedUser
impl actix_web::FromRequest for AuthedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<AuthedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("User not authenticated"))),
        }
    }
}
