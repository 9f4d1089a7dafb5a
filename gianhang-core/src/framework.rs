use sqlx::PgPool;

/// Execution context for database query messages.
///
/// Every SQL operation in [`crate::entities`] is a message struct processed
/// by this type via [`kanau::processor::Processor`].
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
