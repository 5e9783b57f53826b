use rusqlite::{Connection, Result};

/// Initialise the credits table. Safe to call on every startup (idempotent).
pub fn init_db(conn: &Connection) -> Result<()> {
    create_credits_table(conn)
}

fn create_credits_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS credits (
            user_id     TEXT PRIMARY KEY NOT NULL,
            balance     INTEGER NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );",
    )
}
