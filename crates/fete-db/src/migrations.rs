use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS celebrations (
            id                    TEXT PRIMARY KEY,
            slug                  TEXT NOT NULL UNIQUE,
            birthday_person_name  TEXT NOT NULL,
            view_password         TEXT NOT NULL,
            admin_password        TEXT NOT NULL,
            main_media_url        TEXT,
            main_media_type       TEXT,
            created_at            TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at            TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS messages (
            id              TEXT PRIMARY KEY,
            celebration_id  TEXT NOT NULL REFERENCES celebrations(id),
            sender_name     TEXT NOT NULL,
            message         TEXT NOT NULL,
            media_url       TEXT,
            media_type      TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_celebration
            ON messages(celebration_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
