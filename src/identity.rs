use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{db::Db, errors::ApiError, errors::is_unique_violation, models::User, projector};

pub async fn create_user(db: &Db, email: &str, name: &str) -> Result<User, ApiError> {
    let exists = sqlx::query("SELECT 1 FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&db.0)
        .await?;
    if exists.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        name: name.to_string(),
        created_at: Utc::now(),
    };
    let inserted = sqlx::query("INSERT INTO users(id, email, name, created_at) VALUES (?, ?, ?, ?)")
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.created_at)
        .execute(&db.0)
        .await;
    match inserted {
        Ok(_) => {}
        // Lost a race with a concurrent create for the same email.
        Err(e) if is_unique_violation(&e) => return Err(ApiError::DuplicateEmail),
        Err(e) => return Err(e.into()),
    }

    log::info!("user {} created", user.id);
    Ok(user)
}

pub async fn get_user(db: &Db, id: &str) -> Result<User, ApiError> {
    let sql = format!("SELECT {} FROM users u WHERE u.id = ?", projector::USER_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(&db.0).await?;
    let row = row.ok_or_else(|| ApiError::not_found("User", id))?;
    Ok(projector::user(&row)?)
}

/// Users in insertion order.
pub async fn list_users(db: &Db, skip: i64, limit: i64) -> Result<Vec<User>, ApiError> {
    log::debug!("listing users skip={skip} limit={limit}");
    let sql = format!(
        "SELECT {} FROM users u ORDER BY u.rowid ASC LIMIT ? OFFSET ?",
        projector::USER_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(limit).bind(skip).fetch_all(&db.0).await?;
    Ok(rows.iter().map(projector::user).collect::<Result<_, _>>()?)
}

/// Existence check usable inside an open transaction.
pub(crate) async fn user_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool, ApiError> {
    let row = sqlx::query("SELECT 1 FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

pub(crate) async fn require_user(db: &Db, id: &str) -> Result<(), ApiError> {
    let mut conn = db.0.acquire().await?;
    if user_exists(&mut *conn, id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("User", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn duplicate_email_leaves_one_row() {
        let db = Db::in_memory().await.unwrap();
        create_user(&db, "a@example.com", "A").await.unwrap();

        let err = create_user(&db, "a@example.com", "Other").await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind("a@example.com")
            .fetch_one(&db.0)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[actix_web::test]
    async fn get_user_round_trips_and_reports_missing() {
        let db = Db::in_memory().await.unwrap();
        let created = create_user(&db, "b@example.com", "B").await.unwrap();

        let fetched = get_user(&db, &created.id).await.unwrap();
        assert_eq!(fetched, created);

        let err = get_user(&db, "nope").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { entity: "User", .. }));
    }

    #[actix_web::test]
    async fn list_users_keeps_insertion_order_and_pages() {
        let db = Db::in_memory().await.unwrap();
        let mut ids = Vec::new();
        for i in 0..5 {
            let u = create_user(&db, &format!("u{i}@example.com"), &format!("U{i}")).await.unwrap();
            ids.push(u.id);
        }

        let all = list_users(&db, 0, 100).await.unwrap();
        assert_eq!(all.iter().map(|u| u.id.clone()).collect::<Vec<_>>(), ids);

        let page = list_users(&db, 1, 2).await.unwrap();
        assert_eq!(page.iter().map(|u| u.id.clone()).collect::<Vec<_>>(), ids[1..3].to_vec());

        assert!(list_users(&db, 10, 5).await.unwrap().is_empty());
        assert!(list_users(&db, 0, 0).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn require_user_reports_not_found() {
        let db = Db::in_memory().await.unwrap();
        let u = create_user(&db, "c@example.com", "C").await.unwrap();
        assert!(require_user(&db, &u.id).await.is_ok());
        assert!(matches!(
            require_user(&db, "missing").await,
            Err(ApiError::NotFound { entity: "User", .. })
        ));
    }
}
