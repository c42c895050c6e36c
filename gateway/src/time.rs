use chrono::{Local, NaiveDateTime};

/// Source of the gateway-side capture time stamped onto each payload.
pub trait TimeProvider {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
pub struct SystemClock;

impl TimeProvider for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
pub struct MockClock(pub NaiveDateTime);

impl TimeProvider for MockClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
