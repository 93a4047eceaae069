use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub name: String,
    pub expires: Instant,
    /// Wall-clock form of `expires`, reported to clients.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires
    }
}

pub struct SessionStore {
    sessions: HashMap<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            sessions: HashMap::new(),
            ttl,
        }
    }

    pub fn create(&mut self, email: &str, name: &str, now: Instant) -> Session {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        let session = Session {
            token: generate_session_token(),
            email: email.to_string(),
            name: name.to_string(),
            expires: now + self.ttl,
            expires_at: Utc::now()
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.sessions.insert(session.token.clone(), session.clone());
        session
    }

    pub fn get(&self, token: &str, now: Instant) -> Option<&Session> {
        self.sessions.get(token).filter(|s| !s.is_expired(now))
    }

    pub fn remove(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn cleanup_expired(&mut self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(now));
        before - self.sessions.len()
    }
}

fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.r#gen()).collect();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
