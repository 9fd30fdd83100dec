//! Domain types for the catalog, the borrow ledger and access control.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{validation, AppError, AppResult};

/// Fine charged per day overdue, in fine-units.
pub const FINE_PER_DAY: i64 = 10;

const MAX_TITLE_CHARS: usize = 255;
const MAX_AUTHOR_CHARS: usize = 255;

/// Account role. Stored as lowercase text in the `users.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    User,
}

/// What a caller may do. Checked only through [`Role::can`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Any signed-in account: borrow, return, history.
    Authenticated,
    /// Create, update and delete books.
    ManageCatalog,
}

impl Role {
    pub fn can(self, capability: Capability) -> bool {
        match capability {
            Capability::Authenticated => true,
            Capability::ManageCatalog => matches!(self, Role::Admin),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub total_copies: i64,
    pub borrowed_copies: i64,
}

impl Book {
    /// Derived on every read; there is no stored column to drift.
    pub fn available_copies(&self) -> i64 {
        self.total_copies - self.borrowed_copies
    }
}

/// The writable fields of a book, validated as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub description: String,
    pub total_copies: i64,
    pub borrowed_copies: i64,
}

impl BookFields {
    pub fn validate(&self) -> AppResult<()> {
        validation::validate_text(&self.title, "title", MAX_TITLE_CHARS)?;
        validation::validate_text(&self.author, "author", MAX_AUTHOR_CHARS)?;
        validation::validate_non_negative(self.total_copies, "total_copies")?;
        validation::validate_non_negative(self.borrowed_copies, "borrowed_copies")?;
        if self.borrowed_copies > self.total_copies {
            return Err(AppError::validation(
                "borrowed_copies",
                format!(
                    "cannot exceed total_copies ({} > {})",
                    self.borrowed_copies, self.total_copies
                ),
            ));
        }
        Ok(())
    }

    pub fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            total_copies: self.total_copies,
            borrowed_copies: self.borrowed_copies,
        }
    }
}

impl From<Book> for BookFields {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author,
            description: book.description,
            total_copies: book.total_copies,
            borrowed_copies: book.borrowed_copies,
        }
    }
}

/// One loan transaction.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Borrow {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine: i64,
}

impl Borrow {
    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }
}

/// `max(0, days overdue) * FINE_PER_DAY`. Returning on or before the due date costs nothing.
pub fn compute_fine(due_date: NaiveDate, return_date: NaiveDate) -> i64 {
    let overdue_days = (return_date - due_date).num_days();
    overdue_days.max(0) * FINE_PER_DAY
}

/// Current date in UTC.
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fields(total: i64, borrowed: i64) -> BookFields {
        BookFields {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            description: String::new(),
            total_copies: total,
            borrowed_copies: borrowed,
        }
    }

    #[test]
    fn fine_is_zero_when_returned_early_or_on_time() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(compute_fine(due, due), 0);
        assert_eq!(compute_fine(due, due - Duration::days(4)), 0);
    }

    #[test]
    fn fine_is_ten_per_overdue_day() {
        let due = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        assert_eq!(compute_fine(due, due + Duration::days(1)), 10);
        assert_eq!(compute_fine(due, due + Duration::days(3)), 30);
        // across a leap day
        assert_eq!(compute_fine(due, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()), 30);
    }

    #[test]
    fn available_copies_tracks_borrowed() {
        let mut book = Book {
            id: 1,
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            description: String::new(),
            total_copies: 5,
            borrowed_copies: 0,
        };
        assert_eq!(book.available_copies(), 5);
        book.borrowed_copies = 2;
        assert_eq!(book.available_copies(), 3);
    }

    #[test]
    fn only_admin_manages_catalog() {
        assert!(Role::Admin.can(Capability::ManageCatalog));
        assert!(!Role::Staff.can(Capability::ManageCatalog));
        assert!(!Role::User.can(Capability::ManageCatalog));
        for role in [Role::Admin, Role::Staff, Role::User] {
            assert!(role.can(Capability::Authenticated));
        }
    }

    #[test]
    fn book_fields_validation() {
        assert!(fields(5, 0).validate().is_ok());
        assert!(fields(0, 0).validate().is_ok());

        match fields(-1, 0).validate() {
            Err(AppError::ValidationError { field, .. }) => assert_eq!(field, "total_copies"),
            other => panic!("expected validation error, got {:?}", other),
        }
        match fields(3, -1).validate() {
            Err(AppError::ValidationError { field, .. }) => assert_eq!(field, "borrowed_copies"),
            other => panic!("expected validation error, got {:?}", other),
        }
        match fields(2, 3).validate() {
            Err(AppError::ValidationError { field, .. }) => assert_eq!(field, "borrowed_copies"),
            other => panic!("expected validation error, got {:?}", other),
        }

        let mut blank = fields(1, 0);
        blank.title = "   ".into();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"staff\"");
        assert_eq!(Role::Admin.as_str(), "admin");
    }
}
