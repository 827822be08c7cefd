use crate::{
    db::Db,
    errors::ApiError,
    fanout::{self, NewMessage},
    read_state,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct SendMessageReq {
    pub sender_id: Uuid,
    pub subject: Option<String>,
    pub content: String,
    pub recipient_ids: Vec<Uuid>,
}

pub async fn send_message(
    db: web::Data<Db>,
    body: web::Json<SendMessageReq>,
) -> Result<HttpResponse, ApiError> {
    let sender_id = body.sender_id.to_string();
    let recipient_ids: Vec<String> = body.recipient_ids.iter().map(Uuid::to_string).collect();
    let message = fanout::send_message(
        &db,
        NewMessage {
            sender_id: &sender_id,
            subject: body.subject.as_deref(),
            content: &body.content,
            recipient_ids: &recipient_ids,
        },
    )
    .await?;
    Ok(HttpResponse::Created().json(message))
}

pub async fn get_message(
    db: web::Data<Db>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let message = fanout::get_message(&db, &path.into_inner().to_string()).await?;
    Ok(HttpResponse::Ok().json(message))
}

pub async fn recipients(
    db: web::Data<Db>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let status = read_state::recipient_status(&db, &path.into_inner().to_string()).await?;
    Ok(HttpResponse::Ok().json(status))
}

pub async fn mark_read(
    db: web::Data<Db>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let record = read_state::mark_read(&db, &path.into_inner().to_string()).await?;
    Ok(HttpResponse::Ok().json(record))
}
