pub mod order;
pub mod product;
pub mod transaction;
pub mod user;

use time::{OffsetDateTime, PrimitiveDateTime};

/// Current wall clock as the naive UTC timestamp stored in rows.
pub fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}
