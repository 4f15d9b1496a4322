//! Redis-backed live session store for multi-instance deployments.
//!
//! Each session is a hash under `live_session_data:{key}` with the fields
//! `url`, `currentPage`, `token`, `fileName` and `updatedAt` (unix seconds).
//! Every operation that must be indivisible runs as a Lua script, so several
//! server instances can share one Redis without coordinating.
//!
//! The allocation script touches keys it does not declare up front, which
//! rules out Redis Cluster; a single primary (optionally replicated) is fine.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};

use crate::domain::foundation::Timestamp;
use crate::domain::live::{LiveSession, SessionKey, SessionToken};
use crate::ports::{ExpiredSession, LiveEventBus, LiveSessionStore, StoreError, MAX_KEY_ATTEMPTS};

/// Prefix of every session hash.
pub const DATA_KEY_PREFIX: &str = "live_session_data:";

/// Keys returned per SCAN round trip during cleanup.
const SCAN_COUNT: usize = 10;

const FIELD_URL: &str = "url";
const FIELD_PAGE: &str = "currentPage";
const FIELD_TOKEN: &str = "token";
const FIELD_FILE: &str = "fileName";
const FIELD_UPDATED: &str = "updatedAt";

/// ARGV: prefix, candidate count, candidates..., field/value pairs...
/// Returns the claimed suffix, or nil when every candidate is taken.
const CREATE_SCRIPT: &str = r#"
local prefix = ARGV[1]
local count = tonumber(ARGV[2])
local fields = {}
for i = 3 + count, #ARGV do
  fields[#fields + 1] = ARGV[i]
end
for i = 3, 2 + count do
  local candidate = prefix .. ARGV[i]
  if redis.call('EXISTS', candidate) == 0 then
    redis.call('HSET', candidate, unpack(fields))
    return ARGV[i]
  end
end
return false
"#;

/// Writes the hash only when KEYS[1] is absent.
const INSERT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
"#;

/// Replaces the hash only when KEYS[1] exists. `updatedAt` never decreases.
const UPDATE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return 0
end
local previous = tonumber(redis.call('HGET', KEYS[1], 'updatedAt')) or 0
redis.call('HSET', KEYS[1], unpack(ARGV))
local current = tonumber(redis.call('HGET', KEYS[1], 'updatedAt')) or 0
if current < previous then
  redis.call('HSET', KEYS[1], 'updatedAt', previous)
end
return 1
"#;

/// ARGV: page, updatedAt.
const CHANGE_PAGE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return 0
end
redis.call('HSET', KEYS[1], 'currentPage', ARGV[1])
local previous = tonumber(redis.call('HGET', KEYS[1], 'updatedAt')) or 0
if tonumber(ARGV[2]) > previous then
  redis.call('HSET', KEYS[1], 'updatedAt', ARGV[2])
end
return 1
"#;

/// Deletes KEYS[1] only if it is still idle since before ARGV[1].
const EXPIRE_SCRIPT: &str = r#"
local updated = tonumber(redis.call('HGET', KEYS[1], 'updatedAt'))
if updated and updated < tonumber(ARGV[1]) then
  redis.call('DEL', KEYS[1])
  return 1
end
return 0
"#;

fn backend(e: redis::RedisError) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// What the sweep does with one record, given its `updatedAt` and
/// `fileName` fields as read by `HMGET`.
#[derive(Debug, PartialEq, Eq)]
enum SweepDecision {
    Keep,
    Corrupt,
    Expire { file_name: String },
}

fn sweep_decision(updated: Option<&str>, file_name: Option<String>, cutoff: i64) -> SweepDecision {
    // A hash without updatedAt was deleted between SCAN and HMGET.
    let Some(updated) = updated else {
        return SweepDecision::Keep;
    };
    match updated.parse::<i64>() {
        Err(_) => SweepDecision::Corrupt,
        Ok(updated) if updated >= cutoff => SweepDecision::Keep,
        Ok(_) => SweepDecision::Expire {
            file_name: file_name.unwrap_or_default(),
        },
    }
}

fn data_key(key: &SessionKey) -> String {
    format!("{}{}", DATA_KEY_PREFIX, key)
}

/// Flattens a record into HSET field/value pairs.
fn encode_fields(session: &LiveSession) -> Vec<(&'static str, String)> {
    vec![
        (FIELD_URL, session.url().to_string()),
        (FIELD_PAGE, session.current_page().to_string()),
        (FIELD_TOKEN, session.token().expose().to_string()),
        (FIELD_FILE, session.file_name().to_string()),
        (FIELD_UPDATED, session.updated_at().as_unix_secs().to_string()),
    ]
}

fn decode_fields(
    key: &SessionKey,
    mut fields: HashMap<String, String>,
) -> Result<LiveSession, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        key: key.clone(),
        reason,
    };
    let mut take = |name: &str| {
        fields
            .remove(name)
            .ok_or_else(|| corrupt(format!("missing field {}", name)))
    };

    let url = take(FIELD_URL)?;
    let page = take(FIELD_PAGE)?;
    let token = take(FIELD_TOKEN)?;
    let file_name = take(FIELD_FILE)?;
    let updated = take(FIELD_UPDATED)?;

    let current_page = page
        .parse::<u32>()
        .map_err(|_| corrupt(format!("bad currentPage {:?}", page)))?;
    let updated_at = updated
        .parse::<i64>()
        .ok()
        .and_then(Timestamp::from_unix_secs)
        .ok_or_else(|| corrupt(format!("bad updatedAt {:?}", updated)))?;

    Ok(LiveSession::reconstitute(
        url,
        current_page,
        SessionToken::from_stored(token),
        file_name,
        updated_at,
    ))
}

/// Redis-backed session store.
#[derive(Clone)]
pub struct RedisLiveSessionStore {
    conn: MultiplexedConnection,
    create_script: Script,
    insert_script: Script,
    update_script: Script,
    change_page_script: Script,
    expire_script: Script,
}

impl RedisLiveSessionStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            create_script: Script::new(CREATE_SCRIPT),
            insert_script: Script::new(INSERT_SCRIPT),
            update_script: Script::new(UPDATE_SCRIPT),
            change_page_script: Script::new(CHANGE_PAGE_SCRIPT),
            expire_script: Script::new(EXPIRE_SCRIPT),
        }
    }

    /// Runs a single-key write script that returns 1 on success.
    async fn run_guarded(
        &self,
        script: &Script,
        key: &SessionKey,
        args: Vec<String>,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let mut invocation = script.key(data_key(key));
        for arg in args {
            invocation.arg(arg);
        }
        let applied: i64 = invocation.invoke_async(&mut conn).await.map_err(backend)?;
        Ok(applied == 1)
    }
}

fn flatten(session: &LiveSession) -> Vec<String> {
    encode_fields(session)
        .into_iter()
        .flat_map(|(field, value)| [field.to_string(), value])
        .collect()
}

#[async_trait]
impl LiveSessionStore for RedisLiveSessionStore {
    async fn create_session(&self, session: &LiveSession) -> Result<SessionKey, StoreError> {
        let mut conn = self.conn.clone();
        let mut invocation = self.create_script.prepare_invoke();
        invocation.arg(DATA_KEY_PREFIX).arg(MAX_KEY_ATTEMPTS);
        for _ in 0..MAX_KEY_ATTEMPTS {
            invocation.arg(SessionKey::random().as_str());
        }
        for value in flatten(session) {
            invocation.arg(value);
        }

        let claimed: Option<String> = invocation.invoke_async(&mut conn).await.map_err(backend)?;
        match claimed {
            Some(suffix) => SessionKey::parse(&suffix).map_err(|e| {
                StoreError::Backend(format!("allocation returned {:?}: {}", suffix, e))
            }),
            None => Err(StoreError::Capacity {
                attempts: MAX_KEY_ATTEMPTS,
            }),
        }
    }

    async fn insert_session(
        &self,
        key: &SessionKey,
        session: &LiveSession,
    ) -> Result<(), StoreError> {
        if self.run_guarded(&self.insert_script, key, flatten(session)).await? {
            Ok(())
        } else {
            Err(StoreError::KeyTaken(key.clone()))
        }
    }

    async fn get_session(&self, key: &SessionKey) -> Result<LiveSession, StoreError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> =
            conn.hgetall(data_key(key)).await.map_err(backend)?;
        if fields.is_empty() {
            return Err(StoreError::NotFound(key.clone()));
        }
        decode_fields(key, fields)
    }

    async fn update_session(
        &self,
        key: &SessionKey,
        session: &LiveSession,
    ) -> Result<(), StoreError> {
        if self.run_guarded(&self.update_script, key, flatten(session)).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(key.clone()))
        }
    }

    async fn change_session_page(
        &self,
        key: &SessionKey,
        page: u32,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let args = vec![page.to_string(), now.as_unix_secs().to_string()];
        if self.run_guarded(&self.change_page_script, key, args).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(key.clone()))
        }
    }

    async fn delete_session(&self, key: &SessionKey) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(data_key(key)).await.map_err(backend)?;
        if removed == 0 {
            return Err(StoreError::NotFound(key.clone()));
        }
        Ok(())
    }

    async fn clean_up(
        &self,
        older_than: Timestamp,
        bus: &dyn LiveEventBus,
    ) -> Result<Vec<ExpiredSession>, StoreError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", DATA_KEY_PREFIX);
        let cutoff = older_than.as_unix_secs();
        let mut expired = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let scanned: Result<(u64, Vec<String>), _> = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await;
            let (next, batch) = match scanned {
                Ok(page) => page,
                Err(e) if expired.is_empty() => return Err(backend(e)),
                Err(e) => {
                    tracing::error!(error = %e, removed = expired.len(), "Live session scan failed, ending sweep early");
                    break;
                }
            };

            for redis_key in batch {
                let Some(key) = redis_key
                    .strip_prefix(DATA_KEY_PREFIX)
                    .and_then(|suffix| SessionKey::parse(suffix).ok())
                else {
                    tracing::warn!(redis_key = %redis_key, "Skipping malformed live session key");
                    continue;
                };

                let reply: Result<(Option<String>, Option<String>), _> = redis::cmd("HMGET")
                    .arg(&redis_key)
                    .arg(FIELD_UPDATED)
                    .arg(FIELD_FILE)
                    .query_async(&mut conn)
                    .await;
                let (updated, file_name) = match reply {
                    Ok(fields) => fields,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Could not read live session, skipping");
                        continue;
                    }
                };

                let file_name = match sweep_decision(updated.as_deref(), file_name, cutoff) {
                    SweepDecision::Keep => continue,
                    SweepDecision::Corrupt => {
                        tracing::warn!(key = %key, "Live session has unreadable updatedAt, skipping");
                        continue;
                    }
                    SweepDecision::Expire { file_name } => file_name,
                };

                match bus.subscriber_count(&key).await {
                    Ok(0) => {}
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Subscriber count unavailable, keeping session");
                        continue;
                    }
                }

                let removed: Result<i64, _> = self
                    .expire_script
                    .key(&redis_key)
                    .arg(cutoff)
                    .invoke_async(&mut conn)
                    .await;
                match removed {
                    Ok(1) => expired.push(ExpiredSession { key, file_name }),
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Could not expire live session, skipping");
                    }
                }
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(expired)
    }
}

impl std::fmt::Debug for RedisLiveSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLiveSessionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> LiveSession {
        LiveSession::new(
            "http://files/a.json",
            "a.json",
            3,
            SessionToken::from_stored("tok"),
            Timestamp::from_unix_secs(1_700_000_000).unwrap(),
        )
    }

    fn as_map(pairs: Vec<(&'static str, String)>) -> HashMap<String, String> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn fields_decode_back_into_session() {
        let key = SessionKey::from_index(1);
        let decoded = decode_fields(&key, as_map(encode_fields(&session()))).unwrap();
        assert_eq!(decoded, session());
    }

    #[test]
    fn flatten_alternates_field_and_value() {
        let flat = flatten(&session());
        assert_eq!(flat.len(), 10);
        assert_eq!(flat[0], "url");
        assert_eq!(flat[2], "currentPage");
        assert_eq!(flat[3], "3");
        assert_eq!(flat[9], "1700000000");
    }

    #[test]
    fn missing_field_is_corrupt() {
        let key = SessionKey::from_index(1);
        let mut fields = as_map(encode_fields(&session()));
        fields.remove("token");

        assert!(matches!(
            decode_fields(&key, fields),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn unparseable_page_is_corrupt() {
        let key = SessionKey::from_index(1);
        let mut fields = as_map(encode_fields(&session()));
        fields.insert("currentPage".into(), "-1".into());

        assert!(matches!(
            decode_fields(&key, fields),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn sweep_expires_records_older_than_cutoff() {
        assert_eq!(
            sweep_decision(Some("1000"), Some("a.json".into()), 2000),
            SweepDecision::Expire {
                file_name: "a.json".into()
            }
        );
    }

    #[test]
    fn sweep_keeps_records_at_or_after_cutoff() {
        assert_eq!(
            sweep_decision(Some("2000"), Some("a.json".into()), 2000),
            SweepDecision::Keep
        );
        assert_eq!(
            sweep_decision(Some("2500"), Some("a.json".into()), 2000),
            SweepDecision::Keep
        );
    }

    #[test]
    fn sweep_skips_unreadable_and_vanished_records() {
        assert_eq!(
            sweep_decision(Some("not-a-number"), Some("a.json".into()), 2000),
            SweepDecision::Corrupt
        );
        assert_eq!(sweep_decision(None, None, 2000), SweepDecision::Keep);
    }

    #[test]
    fn data_key_uses_prefix() {
        assert_eq!(data_key(&SessionKey::from_index(42)), "live_session_data:0042");
    }

    // Integration tests below need a running Redis:
    //   LIVE_DECK_TEST_REDIS_URL=redis://localhost:6379 cargo test -- --ignored

    async fn connect() -> RedisLiveSessionStore {
        let url = std::env::var("LIVE_DECK_TEST_REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let client = redis::Client::open(url).unwrap();
        let conn = client.get_multiplexed_tokio_connection().await.unwrap();
        RedisLiveSessionStore::new(conn)
    }

    #[tokio::test]
    #[ignore = "requires redis"]
    async fn redis_create_get_update_delete() {
        let store = connect().await;
        let key = store.create_session(&session()).await.unwrap();
        assert_eq!(store.get_session(&key).await.unwrap(), session());

        store
            .change_session_page(&key, 9, Timestamp::from_unix_secs(1_700_000_100).unwrap())
            .await
            .unwrap();
        let stored = store.get_session(&key).await.unwrap();
        assert_eq!(stored.current_page(), 9);

        store.delete_session(&key).await.unwrap();
        assert_eq!(
            store.get_session(&key).await,
            Err(StoreError::NotFound(key.clone()))
        );
    }

    #[tokio::test]
    #[ignore = "requires redis"]
    async fn redis_insert_rejects_taken_key() {
        let store = connect().await;
        let key = store.create_session(&session()).await.unwrap();

        assert_eq!(
            store.insert_session(&key, &session()).await,
            Err(StoreError::KeyTaken(key.clone()))
        );
        store.delete_session(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires redis"]
    async fn redis_clean_up_skips_watched_sessions() {
        use crate::adapters::live::InMemoryEventBus;

        let store = connect().await;
        let bus = InMemoryEventBus::default();
        let stale = store.create_session(&session()).await.unwrap();
        let watched = store.create_session(&session()).await.unwrap();
        let _follower = bus.subscribe(&watched).await.unwrap();

        let cutoff = Timestamp::from_unix_secs(1_800_000_000).unwrap();
        let expired = store.clean_up(cutoff, &bus).await.unwrap();

        assert!(expired.iter().any(|e| e.key == stale));
        assert!(expired.iter().all(|e| e.key != watched));
        store.delete_session(&watched).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires redis"]
    async fn redis_clean_up_continues_past_corrupt_records() {
        use crate::adapters::live::InMemoryEventBus;

        let store = connect().await;
        let bus = InMemoryEventBus::default();
        let corrupt = store.create_session(&session()).await.unwrap();
        let stale = store.create_session(&session()).await.unwrap();
        let mut conn = store.conn.clone();
        let _: () = conn
            .hset(data_key(&corrupt), FIELD_UPDATED, "not-a-number")
            .await
            .unwrap();

        let cutoff = Timestamp::from_unix_secs(1_800_000_000).unwrap();
        let expired = store.clean_up(cutoff, &bus).await.unwrap();

        assert!(expired.iter().any(|e| e.key == stale && e.file_name == "a.json"));
        assert!(expired.iter().all(|e| e.key != corrupt));
        let _: () = conn.del(data_key(&corrupt)).await.unwrap();
    }
}
