use crate::{config::Config, db::Db, errors::ApiError, fanout, identity, read_state};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct CreateUserReq {
    pub email: String,
    pub name: String,
}

pub async fn create_user(
    db: web::Data<Db>,
    body: web::Json<CreateUserReq>,
) -> Result<HttpResponse, ApiError> {
    let email = body.email.trim();
    if !looks_like_email(email) {
        return Err(ApiError::BadRequest("Invalid email address.".into()));
    }
    let email = normalize_email(email);
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name must not be empty.".into()));
    }
    let user = identity::create_user(&db, &email, &body.name).await?;
    Ok(HttpResponse::Created().json(user))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_users(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    q: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let skip = q.skip.unwrap_or(0).max(0);
    let limit = q.limit.unwrap_or(100).clamp(0, cfg.max_page_size.max(0));
    let users = identity::list_users(&db, skip, limit).await?;
    Ok(HttpResponse::Ok().json(users))
}

pub async fn get_user(db: web::Data<Db>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let user = identity::get_user(&db, &path.into_inner().to_string()).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn sent_messages(
    db: web::Data<Db>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let messages = fanout::sent_messages(&db, &path.into_inner().to_string()).await?;
    Ok(HttpResponse::Ok().json(messages))
}

pub async fn inbox(db: web::Data<Db>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let items = read_state::inbox(&db, &path.into_inner().to_string()).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn unread_inbox(
    db: web::Data<Db>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let items = read_state::unread_inbox(&db, &path.into_inner().to_string()).await?;
    Ok(HttpResponse::Ok().json(items))
}

// local@domain.tld, no whitespace
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}

/// Domains are case-insensitive; the local part is kept as given.
fn normalize_email(s: &str) -> String {
    match s.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => s.to_string(),
    }
}
