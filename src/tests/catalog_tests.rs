#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::catalog;
    use crate::error::AppError;
    use crate::lending;
    use crate::models::BookFields;
    use crate::tests::TestContext;

    fn fields(title: &str, total: i64, borrowed: i64) -> BookFields {
        BookFields {
            title: title.to_string(),
            author: "Frank Herbert".to_string(),
            description: "Desert planet".to_string(),
            total_copies: total,
            borrowed_copies: borrowed,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_book() {
        let ctx = TestContext::new().await;
        let created = catalog::create_book(ctx.db(), fields("Dune", 5, 1)).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.available_copies(), 4);

        let fetched = catalog::get_book(ctx.db(), created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_list_books_in_id_order() {
        let ctx = TestContext::new().await;
        assert!(catalog::list_books(ctx.db()).await.unwrap().is_empty());

        let a = ctx.book("A", 1).await;
        let b = ctx.book("B", 1).await;
        let ids: Vec<_> = catalog::list_books(ctx.db()).await.unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let ctx = TestContext::new().await;
        let cases = [
            (fields("   ", 1, 0), "title"),
            (fields(&"x".repeat(256), 1, 0), "title"),
            (fields("Dune", -1, 0), "total_copies"),
            (fields("Dune", 1, -1), "borrowed_copies"),
            (fields("Dune", 2, 3), "borrowed_copies"),
        ];
        for (input, expected_field) in cases {
            match catalog::create_book(ctx.db(), input).await {
                Err(AppError::ValidationError { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected validation error on {}, got {:?}", expected_field, other),
            }
        }
        assert!(catalog::list_books(ctx.db()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let ctx = TestContext::new().await;
        let book = ctx.book("Dune", 3).await;

        let updated = catalog::update_book(ctx.db(), book.id, |f| *f = fields("Dune Messiah", 6, 2)).await.unwrap();
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.available_copies(), 4);
        assert_eq!(catalog::get_book(ctx.db(), book.id).await.unwrap(), updated);

        assert!(matches!(
            catalog::update_book(ctx.db(), book.id, |f| *f = fields("Dune", 1, 2)).await,
            Err(AppError::ValidationError { .. })
        ));
        assert!(matches!(
            catalog::update_book(ctx.db(), 999, |f| *f = fields("Dune", 1, 0)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_patch_keeps_unset_fields() {
        let ctx = TestContext::new().await;
        let book = ctx.book("Dune", 3).await;

        let patched = catalog::update_book(ctx.db(), book.id, |f| f.total_copies = 8).await.unwrap();
        assert_eq!(patched.title, "Dune");
        assert_eq!(patched.author, "Author");
        assert_eq!(patched.total_copies, 8);
        assert_eq!(patched.borrowed_copies, 0);
    }

    #[tokio::test]
    async fn test_patch_cannot_drop_total_below_borrowed() {
        let ctx = TestContext::new().await;
        let (user, _) = ctx.user("reader").await;
        let book = ctx.book("Dune", 2).await;
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        lending::borrow_book(ctx.db(), user.id, book.id, today, today).await.unwrap();
        lending::borrow_book(ctx.db(), user.id, book.id, today, today).await.unwrap();

        match catalog::update_book(ctx.db(), book.id, |f| f.total_copies = 1).await {
            Err(AppError::ValidationError { field, .. }) => assert_eq!(field, "borrowed_copies"),
            other => panic!("expected validation error, got {:?}", other),
        }
        let stored = catalog::get_book(ctx.db(), book.id).await.unwrap();
        assert_eq!(stored.total_copies, 2);
        assert_eq!(stored.borrowed_copies, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_are_serialized() {
        let ctx = TestContext::new().await;
        let book = ctx.book("Dune", 1).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let db = ctx.db().clone();
                let id = book.id;
                tokio::spawn(async move { catalog::update_book(&db, id, |f| f.total_copies += 1).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(catalog::get_book(ctx.db(), book.id).await.unwrap().total_copies, 9);
    }

    #[tokio::test]
    async fn test_missing_book_is_not_found() {
        let ctx = TestContext::new().await;
        assert!(catalog::find_book(ctx.db(), 7).await.unwrap().is_none());
        match catalog::get_book(ctx.db(), 7).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Book not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert!(matches!(catalog::update_book(ctx.db(), 7, |_| {}).await, Err(AppError::NotFound(_))));
        assert!(matches!(catalog::delete_book(ctx.db(), 7).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_borrow_records() {
        let ctx = TestContext::new().await;
        let (user, _) = ctx.user("reader").await;
        let book = ctx.book("Dune", 1).await;
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        lending::borrow_book(ctx.db(), user.id, book.id, today, today).await.unwrap();

        catalog::delete_book(ctx.db(), book.id).await.unwrap();
        assert!(catalog::find_book(ctx.db(), book.id).await.unwrap().is_none());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrows WHERE book_id = ?1")
            .bind(book.id)
            .fetch_one(ctx.db())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(lending::borrow_history(ctx.db(), user.id).await.unwrap().is_empty());
    }
}
