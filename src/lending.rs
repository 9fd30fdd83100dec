//! Borrow, return and history: the lending lifecycle.
//!
//! Each state change runs in a single transaction covering both the ledger row and
//! the book's `borrowed_copies`, so copy accounting and the ledger never disagree.
//! `today` is passed in by the caller.

use chrono::{Duration, NaiveDate};
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::{AppError, AppResult},
    ledger,
    models::{compute_fine, Borrow},
    types::BorrowHistoryItem,
};

pub const RETURN_OK_MESSAGE: &str = "Book returned successfully.";
pub const ALREADY_RETURNED_MESSAGE: &str = "Book already returned.";
pub const BORROW_NOT_FOUND_MESSAGE: &str = "Borrow record not found";
pub const NO_COPIES_MESSAGE: &str = "No copies available for this book.";

/// Resolves the due date of a new loan: the requested one as supplied, or
/// `today + default_loan_days`.
pub fn resolve_due_date(requested: Option<NaiveDate>, today: NaiveDate, default_loan_days: i64) -> NaiveDate {
    requested.unwrap_or_else(|| today + Duration::days(default_loan_days))
}

/// Lends one copy of `book_id` to `user_id`.
pub async fn borrow_book(
    db: &SqlitePool,
    user_id: i64,
    book_id: i64,
    due_date: NaiveDate,
    today: NaiveDate,
) -> AppResult<Borrow> {
    let mut tx = db.begin().await?;

    reserve_copy(&mut tx, book_id).await?;
    let borrow = ledger::insert_borrow(&mut tx, user_id, book_id, today, due_date).await?;

    tx.commit().await?;
    tracing::info!(borrow.id = borrow.id, user.id = user_id, book.id = book_id, %due_date, "book borrowed");
    Ok(borrow)
}

/// Closes the caller's borrow `borrow_id`, assessing the overdue fine.
///
/// Fails with `NotFound` if the record does not exist or belongs to someone else,
/// and with `AlreadyReturned` if it was closed before; neither case writes anything.
pub async fn return_book(
    db: &SqlitePool,
    user_id: i64,
    borrow_id: i64,
    today: NaiveDate,
) -> AppResult<Borrow> {
    let mut tx = db.begin().await?;

    let Some(mut borrow) = ledger::mark_returned(&mut tx, borrow_id, user_id, today).await? else {
        let existing = ledger::find_owned(&mut *tx, borrow_id, user_id).await?;
        return Err(match existing {
            Some(_) => AppError::AlreadyReturned(ALREADY_RETURNED_MESSAGE.to_string()),
            None => AppError::NotFound(BORROW_NOT_FOUND_MESSAGE.to_string()),
        });
    };

    let fine = compute_fine(borrow.due_date, today);
    ledger::set_fine(&mut tx, borrow.id, fine).await?;
    release_copy(&mut tx, borrow.book_id).await?;

    tx.commit().await?;
    borrow.fine = fine;
    tracing::info!(borrow.id = borrow.id, user.id = user_id, fine, "book returned");
    Ok(borrow)
}

/// Every borrow owned by `user_id`, newest first.
pub async fn borrow_history(db: &SqlitePool, user_id: i64) -> AppResult<Vec<BorrowHistoryItem>> {
    ledger::history_for_user(db, user_id).await
}

async fn reserve_copy(conn: &mut SqliteConnection, book_id: i64) -> AppResult<()> {
    let affected = sqlx::query(
        r#"UPDATE books SET borrowed_copies = borrowed_copies + 1
           WHERE id = ?1 AND borrowed_copies < total_copies"#,
    )
    .bind(book_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();
    if affected == 1 {
        return Ok(());
    }

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE id = ?1")
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?;
    match exists {
        Some(_) => Err(AppError::NoCopiesAvailable(NO_COPIES_MESSAGE.to_string())),
        None => Err(AppError::NotFound("Book not found".to_string())),
    }
}

async fn release_copy(conn: &mut SqliteConnection, book_id: i64) -> AppResult<()> {
    // Floored at zero: an admin may have reset the count while the loan was open.
    let affected = sqlx::query(
        "UPDATE books SET borrowed_copies = borrowed_copies - 1 WHERE id = ?1 AND borrowed_copies > 0",
    )
    .bind(book_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();
    if affected == 0 {
        tracing::warn!(book.id = book_id, "borrowed_copies already zero on return");
    }
    Ok(())
}
