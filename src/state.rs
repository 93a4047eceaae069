use tokio::sync::Mutex;

use crate::auth::brute_force::LoginTracker;
use crate::auth::credentials::LockoutScope;
use crate::auth::session::SessionStore;
use crate::config::{Config, DemoAccount};

pub struct AppState {
    pub login_tracker: LoginTracker,
    pub lockout_scope: LockoutScope,
    pub demo_account: DemoAccount,
    pub sessions: Mutex<SessionStore>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        AppState {
            login_tracker: LoginTracker::new(config.limits),
            lockout_scope: config.lockout_scope,
            demo_account: config.demo.clone(),
            sessions: Mutex::new(SessionStore::new(config.session_ttl)),
        }
    }
}
