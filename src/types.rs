use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Book, BookFields, Role};

// Catalog DTOs

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub total_copies: i64,
    pub borrowed_copies: i64,
    pub available_copies: i64,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            available_copies: book.available_copies(),
            id: book.id,
            title: book.title,
            author: book.author,
            description: book.description,
            total_copies: book.total_copies,
            borrowed_copies: book.borrowed_copies,
        }
    }
}

/// Body of `POST /books/` and `PUT /books/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub total_copies: Option<i64>,
    pub borrowed_copies: Option<i64>,
}

impl From<BookRequest> for BookFields {
    fn from(req: BookRequest) -> Self {
        Self {
            title: req.title,
            author: req.author,
            description: req.description,
            total_copies: req.total_copies.unwrap_or(1),
            borrowed_copies: req.borrowed_copies.unwrap_or(0),
        }
    }
}

impl BookRequest {
    /// Full replace of the text fields. Copy counts are only replaced when sent.
    pub fn apply_to(self, fields: &mut BookFields) {
        fields.title = self.title;
        fields.author = self.author;
        fields.description = self.description;
        if let Some(total) = self.total_copies {
            fields.total_copies = total;
        }
        if let Some(borrowed) = self.borrowed_copies {
            fields.borrowed_copies = borrowed;
        }
    }
}

/// Body of `PATCH /books/{id}/`; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub total_copies: Option<i64>,
    pub borrowed_copies: Option<i64>,
}

impl PatchBookRequest {
    pub fn apply_to(self, fields: &mut BookFields) {
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(author) = self.author {
            fields.author = author;
        }
        if let Some(description) = self.description {
            fields.description = description;
        }
        if let Some(total) = self.total_copies {
            fields.total_copies = total;
        }
        if let Some(borrowed) = self.borrowed_copies {
            fields.borrowed_copies = borrowed;
        }
    }
}

// Transaction DTOs

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub book: i64,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowResponse {
    pub id: i64,
    pub book: i64,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnResponse {
    pub message: String,
    pub fine: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BorrowHistoryItem {
    pub id: i64,
    pub book_title: String,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine: i64,
}

// Identity DTOs

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}
