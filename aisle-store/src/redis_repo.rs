use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::debug;
use uuid::Uuid;
use aisle_core::{BookingLedger, LedgerError, LedgerResult};
use aisle_shared::BookingRecord;

fn booking_key(booking_id: impl std::fmt::Display) -> String {
    format!("booking:{}", booking_id)
}

fn passenger_index_key(passenger_id: &str) -> String {
    format!("passenger:{}:bookings", passenger_id)
}

fn flight_index_key(flight_id: &str) -> String {
    format!("flight:{}:bookings", flight_id)
}

// Record and both index entries land together or not at all.
// Returns 1 when stored, 0 when the booking id already exists.
const SAVE_SCRIPT: &str = r#"
    if redis.call("SET", KEYS[1], ARGV[1], "NX") then
        redis.call("SADD", KEYS[2], ARGV[2])
        redis.call("SADD", KEYS[3], ARGV[2])
        return 1
    end
    return 0
"#;

fn save_outcome(reply: i64, booking_id: Uuid) -> LedgerResult<()> {
    match reply {
        0 => Err(LedgerError::AlreadyExists(booking_id)),
        _ => Ok(()),
    }
}

/// Redis-backed ledger.
///
/// Each record is a JSON string under `booking:{id}`; the passenger and
/// flight index sets hold booking ids.
#[derive(Clone)]
pub struct RedisBookingLedger {
    client: redis::Client,
}

impl RedisBookingLedger {
    pub fn open(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> LedgerResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(LedgerError::backend)
    }

    async fn load_index(&self, index_key: String) -> LedgerResult<Vec<BookingRecord>> {
        let mut conn = self.connection().await?;

        let ids: Vec<String> = conn.smembers(&index_key).await.map_err(LedgerError::backend)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(booking_key).collect();
        let payloads: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(LedgerError::backend)?;

        let mut records = Vec::with_capacity(payloads.len());
        for payload in payloads.into_iter().flatten() {
            records.push(serde_json::from_str::<BookingRecord>(&payload)?);
        }

        records.sort_by(|a, b| {
            a.booked_at
                .cmp(&b.booked_at)
                .then_with(|| a.booking_id.cmp(&b.booking_id))
        });
        Ok(records)
    }
}

#[async_trait]
impl BookingLedger for RedisBookingLedger {
    async fn save(&self, record: &BookingRecord) -> LedgerResult<()> {
        let payload = serde_json::to_string(record)?;
        let mut conn = self.connection().await?;
        let booking_id = record.booking_id.to_string();

        let reply: i64 = redis::Script::new(SAVE_SCRIPT)
            .key(booking_key(&booking_id))
            .key(passenger_index_key(&record.passenger_id))
            .key(flight_index_key(&record.flight_id))
            .arg(&payload)
            .arg(&booking_id)
            .invoke_async(&mut conn)
            .await
            .map_err(LedgerError::backend)?;
        save_outcome(reply, record.booking_id)?;

        debug!(booking_id = %record.booking_id, "Booking record stored");
        Ok(())
    }

    async fn get(&self, booking_id: Uuid) -> LedgerResult<Option<BookingRecord>> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn
            .get(booking_key(booking_id))
            .await
            .map_err(LedgerError::backend)?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn list_by_passenger(&self, passenger_id: &str) -> LedgerResult<Vec<BookingRecord>> {
        self.load_index(passenger_index_key(passenger_id)).await
    }

    async fn list_by_flight(&self, flight_id: &str) -> LedgerResult<Vec<BookingRecord>> {
        self.load_index(flight_index_key(flight_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let id = Uuid::parse_str("6f1c2a34-0b8e-4d7a-9c55-3e2f1a0b9d11").unwrap();

        assert_eq!(booking_key(id), "booking:6f1c2a34-0b8e-4d7a-9c55-3e2f1a0b9d11");
        assert_eq!(passenger_index_key("P42"), "passenger:P42:bookings");
        assert_eq!(flight_index_key("SB100"), "flight:SB100:bookings");
    }

    #[test]
    fn test_save_reply_handling() {
        let id = Uuid::new_v4();

        assert!(save_outcome(1, id).is_ok());
        assert!(matches!(save_outcome(0, id), Err(LedgerError::AlreadyExists(dup)) if dup == id));
    }

    #[test]
    fn test_save_script_is_one_conditional_write() {
        let set = SAVE_SCRIPT.find(r#""SET", KEYS[1], ARGV[1], "NX""#).unwrap();
        let first_index = SAVE_SCRIPT.find(r#""SADD", KEYS[2]"#).unwrap();
        let second_index = SAVE_SCRIPT.find(r#""SADD", KEYS[3]"#).unwrap();

        assert!(set < first_index && first_index < second_index);
        assert_eq!(booking_key("abc"), booking_key(String::from("abc")));
    }

    #[test]
    fn test_open_rejects_bad_url() {
        assert!(RedisBookingLedger::open("not a redis url").is_err());
        assert!(RedisBookingLedger::open("redis://127.0.0.1:6379").is_ok());
    }
}
