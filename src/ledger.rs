//! Borrow ledger: one row per loan.
//!
//! A row is inserted by a borrow and touched exactly once more, by the return that
//! sets `return_date` and `fine`. [`mark_returned`] enforces the "exactly once" with a
//! compare-and-set on `return_date IS NULL`; [`set_fine`] completes it in the same
//! transaction.

use chrono::NaiveDate;
use sqlx::{Sqlite, SqliteConnection};

use crate::{error::AppResult, models::Borrow, types::BorrowHistoryItem};

const SELECT_BORROW: &str =
    "SELECT id, user_id, book_id, borrow_date, due_date, return_date, fine FROM borrows";

pub async fn insert_borrow(
    conn: &mut SqliteConnection,
    user_id: i64,
    book_id: i64,
    borrow_date: NaiveDate,
    due_date: NaiveDate,
) -> AppResult<Borrow> {
    let id = sqlx::query(
        r#"INSERT INTO borrows (user_id, book_id, borrow_date, due_date, return_date, fine)
           VALUES (?1, ?2, ?3, ?4, NULL, 0)"#,
    )
    .bind(user_id)
    .bind(book_id)
    .bind(borrow_date)
    .bind(due_date)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(Borrow { id, user_id, book_id, borrow_date, due_date, return_date: None, fine: 0 })
}

/// Looks up a borrow by id, scoped to its owner. Another user's record is `None`.
pub async fn find_owned<'e, E>(executor: E, borrow_id: i64, user_id: i64) -> AppResult<Option<Borrow>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let borrow = sqlx::query_as::<_, Borrow>(&format!("{} WHERE id = ?1 AND user_id = ?2", SELECT_BORROW))
        .bind(borrow_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    Ok(borrow)
}

#[cfg(test)]
pub async fn find_borrow<'e, E>(executor: E, borrow_id: i64) -> AppResult<Option<Borrow>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let borrow = sqlx::query_as::<_, Borrow>(&format!("{} WHERE id = ?1", SELECT_BORROW))
        .bind(borrow_id)
        .fetch_optional(executor)
        .await?;
    Ok(borrow)
}

/// Sets `return_date` on the caller's borrow if it is still open, returning the updated row.
///
/// `None` means nothing was written: the record is missing, owned by someone else,
/// or already returned. Run as the first statement of a transaction, it also takes
/// SQLite's write lock, so a concurrent return waits here and then sees the
/// record closed.
pub async fn mark_returned(
    conn: &mut SqliteConnection,
    borrow_id: i64,
    user_id: i64,
    return_date: NaiveDate,
) -> AppResult<Option<Borrow>> {
    let borrow = sqlx::query_as::<_, Borrow>(
        r#"UPDATE borrows SET return_date = ?1
           WHERE id = ?2 AND user_id = ?3 AND return_date IS NULL
           RETURNING id, user_id, book_id, borrow_date, due_date, return_date, fine"#,
    )
    .bind(return_date)
    .bind(borrow_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(borrow)
}

pub async fn set_fine(conn: &mut SqliteConnection, borrow_id: i64, fine: i64) -> AppResult<()> {
    sqlx::query("UPDATE borrows SET fine = ?1 WHERE id = ?2")
        .bind(fine)
        .bind(borrow_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// All borrows owned by `user_id`, newest first, projected with the book title.
pub async fn history_for_user<'e, E>(executor: E, user_id: i64) -> AppResult<Vec<BorrowHistoryItem>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let items = sqlx::query_as::<_, BorrowHistoryItem>(
        r#"SELECT br.id AS id, b.title AS book_title, br.borrow_date AS borrow_date,
                  br.due_date AS due_date, br.return_date AS return_date, br.fine AS fine
           FROM borrows br
           JOIN books b ON b.id = br.book_id
           WHERE br.user_id = ?1
           ORDER BY br.borrow_date DESC, br.id DESC"#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(items)
}
