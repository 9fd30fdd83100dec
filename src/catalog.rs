//! Book catalog storage.
//!
//! Every write goes through [`BookFields::validate`], so the copy counts stored
//! here always satisfy `0 <= borrowed_copies <= total_copies`.

use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult, OptionExt},
    models::{Book, BookFields},
};

const BOOK_NOT_FOUND: &str = "Book not found";

const SELECT_BOOK: &str =
    "SELECT id, title, author, description, total_copies, borrowed_copies FROM books";

pub async fn list_books(db: &SqlitePool) -> AppResult<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>(&format!("{} ORDER BY id", SELECT_BOOK))
        .fetch_all(db)
        .await?;
    Ok(books)
}

pub async fn find_book(db: &SqlitePool, id: i64) -> AppResult<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(&format!("{} WHERE id = ?1", SELECT_BOOK))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(book)
}

pub async fn get_book(db: &SqlitePool, id: i64) -> AppResult<Book> {
    find_book(db, id).await?.ok_or_not_found(BOOK_NOT_FOUND)
}

pub async fn create_book(db: &SqlitePool, fields: BookFields) -> AppResult<Book> {
    fields.validate()?;
    let id = sqlx::query(
        r#"INSERT INTO books (title, author, description, total_copies, borrowed_copies)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
    )
    .bind(&fields.title)
    .bind(&fields.author)
    .bind(&fields.description)
    .bind(fields.total_copies)
    .bind(fields.borrowed_copies)
    .execute(db)
    .await?
    .last_insert_rowid();
    tracing::info!(book.id = id, title = %fields.title, "book created");

    Ok(fields.into_book(id))
}

/// Merges `apply` into the stored fields of book `id`, validates, then writes the result.
///
/// Serves both PUT and PATCH: count fields the caller leaves out keep their stored
/// values, so an edit never detaches `borrowed_copies` from the open loans.
pub async fn update_book<F>(db: &SqlitePool, id: i64, apply: F) -> AppResult<Book>
where
    F: FnOnce(&mut BookFields),
{
    let mut tx = db.begin().await?;
    // Write first: SQLite then holds the write lock before the read, and a
    // concurrent edit waits on busy_timeout instead of failing its lock upgrade.
    let matched = sqlx::query("UPDATE books SET borrowed_copies = borrowed_copies WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if matched == 0 {
        return Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()));
    }

    let current = sqlx::query_as::<_, Book>(&format!("{} WHERE id = ?1", SELECT_BOOK))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    let mut fields = BookFields::from(current);
    apply(&mut fields);
    fields.validate()?;

    sqlx::query(
        r#"UPDATE books
           SET title = ?1, author = ?2, description = ?3, total_copies = ?4, borrowed_copies = ?5
           WHERE id = ?6"#,
    )
    .bind(&fields.title)
    .bind(&fields.author)
    .bind(&fields.description)
    .bind(fields.total_copies)
    .bind(fields.borrowed_copies)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    tracing::info!(book.id = id, "book updated");

    Ok(fields.into_book(id))
}

/// Deletes the book; its borrow records go with it through the foreign-key cascade.
pub async fn delete_book(db: &SqlitePool, id: i64) -> AppResult<()> {
    let affected = sqlx::query("DELETE FROM books WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    if affected == 0 {
        return Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()));
    }
    tracing::info!(book.id = id, "book deleted");
    Ok(())
}
