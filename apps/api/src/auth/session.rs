//! Bearer-token sessions kept in Redis as `session:<token>` -> user id.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use redis::Client as RedisClient;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

pub fn new_token() -> String {
    let mut buf = [0u8; 32];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

pub async fn store(
    redis: &RedisClient,
    token: &str,
    user_id: Uuid,
    ttl_secs: u64,
) -> Result<(), AppError> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    redis::cmd("SET")
        .arg(session_key(token))
        .arg(user_id.to_string())
        .arg("EX")
        .arg(ttl_secs)
        .query_async::<_, ()>(&mut conn)
        .await?;
    debug!("Stored session for user {user_id}");
    Ok(())
}

/// Returns the user bound to a token, or `None` when it is unknown or expired.
pub async fn lookup(redis: &RedisClient, token: &str) -> Result<Option<Uuid>, AppError> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let stored: Option<String> = redis::cmd("GET")
        .arg(session_key(token))
        .query_async(&mut conn)
        .await?;
    Ok(stored.and_then(|raw| Uuid::parse_str(&raw).ok()))
}

pub async fn revoke(redis: &RedisClient, token: &str) -> Result<(), AppError> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    redis::cmd("DEL")
        .arg(session_key(token))
        .query_async::<_, ()>(&mut conn)
        .await?;
    Ok(())
}
