use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;

use crate::errors::AppError;

/// Source of "now" for request handling. Handlers read it once and pass the
/// instant down so every classification within a request agrees.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock of the machine the shop runs on.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub clock: Box<dyn Clock>,
}

impl AppState {
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database mutex poisoned")))
    }
}
