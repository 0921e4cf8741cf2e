use crate::Database;
use crate::models::{CelebrationAuthRow, CelebrationRow, MessageRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Celebrations --

    pub fn insert_celebration(
        &self,
        id: &str,
        slug: &str,
        birthday_person_name: &str,
        view_password: &str,
        admin_password: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO celebrations (id, slug, birthday_person_name, view_password, admin_password)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, slug, birthday_person_name, view_password, admin_password),
            )?;
            Ok(())
        })
    }

    /// Password columns for a slug. Handler-side only.
    pub fn celebration_auth_by_slug(&self, slug: &str) -> Result<Option<CelebrationAuthRow>> {
        self.with_conn(|conn| query_celebration_auth(conn, slug))
    }

    /// Public projection for a slug — the SELECT excludes both passwords.
    pub fn celebration_public_by_slug(&self, slug: &str) -> Result<Option<CelebrationRow>> {
        self.with_conn(|conn| query_celebration_public(conn, slug))
    }

    /// Admin-gated media update; also refreshes updated_at.
    /// Returns false when the id no longer resolves to a row.
    pub fn update_celebration_media(
        &self,
        id: &str,
        media_url: &str,
        media_type: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE celebrations
                 SET main_media_url = ?2, main_media_type = ?3, updated_at = datetime('now')
                 WHERE id = ?1",
                (id, media_url, media_type),
            )?;
            Ok(changed > 0)
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        id: &str,
        celebration_id: &str,
        sender_name: &str,
        message: &str,
        media_url: Option<&str>,
        media_type: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, celebration_id, sender_name, message, media_url, media_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, celebration_id, sender_name, message, media_url, media_type),
            )?;
            Ok(())
        })
    }

    pub fn messages_by_celebration(&self, celebration_id: &str, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, celebration_id, limit))
    }

    pub fn message_by_id(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message_by_id(conn, id))
    }

    /// Returns the number of rows removed (0 when the message is already
    /// gone — the caller maps that to NotFound, not an error).
    pub fn delete_message(&self, id: &str) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(deleted)
        })
    }
}

fn query_celebration_auth(conn: &Connection, slug: &str) -> Result<Option<CelebrationAuthRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, view_password, admin_password FROM celebrations WHERE slug = ?1",
    )?;

    let row = stmt
        .query_row([slug], |row| {
            Ok(CelebrationAuthRow {
                id: row.get(0)?,
                view_password: row.get(1)?,
                admin_password: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_celebration_public(conn: &Connection, slug: &str) -> Result<Option<CelebrationRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, slug, birthday_person_name, main_media_url, main_media_type, created_at, updated_at
         FROM celebrations WHERE slug = ?1",
    )?;

    let row = stmt
        .query_row([slug], |row| {
            Ok(CelebrationRow {
                id: row.get(0)?,
                slug: row.get(1)?,
                birthday_person_name: row.get(2)?,
                main_media_url: row.get(3)?,
                main_media_type: row.get(4)?,
                created_at: row.get(5)?,
                updated_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_messages(conn: &Connection, celebration_id: &str, limit: u32) -> Result<Vec<MessageRow>> {
    // rowid breaks ties within the same second, keeping newest-first stable
    let mut stmt = conn.prepare(
        "SELECT id, celebration_id, sender_name, message, media_url, media_type, created_at
         FROM messages
         WHERE celebration_id = ?1
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?2",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![celebration_id, limit], map_message_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_message_by_id(conn: &Connection, id: &str) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, celebration_id, sender_name, message, media_url, media_type, created_at
         FROM messages WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], map_message_row).optional()?;

    Ok(row)
}

fn map_message_row(row: &rusqlite::Row<'_>) -> std::result::Result<MessageRow, rusqlite::Error> {
    Ok(MessageRow {
        id: row.get(0)?,
        celebration_id: row.get(1)?,
        sender_name: row.get(2)?,
        message: row.get(3)?,
        media_url: row.get(4)?,
        media_type: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
