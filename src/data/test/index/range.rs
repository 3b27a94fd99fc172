use super::*;

/// Tests listing order.
///
/// Verifies that entries are ordered by score and that equal scores fall back to numeric ID
/// order, including IDs with different digit counts.
///
/// Expected: [3, 9, 10, 100, 1]
#[tokio::test]
async fn orders_by_score_then_id() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let repo = IndexRepository::new(&test.store);

    repo.add("resources", 50, 1).await?;
    repo.add("resources", 10, 100).await?;
    repo.add("resources", 10, 10).await?;
    repo.add("resources", 10, 9).await?;
    repo.add("resources", 5, 3).await?;

    assert_eq!(repo.all_ids("resources").await?, vec![3, 9, 10, 100, 1]);

    Ok(())
}

/// Tests paging with offset and count.
///
/// Expected: The requested window, clipped at the end of the listing
#[tokio::test]
async fn pages_with_offset_and_count() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let repo = IndexRepository::new(&test.store);

    for id in 1..=10 {
        repo.add("users", id as i64, id).await?;
    }

    assert_eq!(repo.range_ids("users", 0, 3).await?, vec![1, 2, 3]);
    assert_eq!(repo.range_ids("users", 3, 3).await?, vec![4, 5, 6]);
    assert_eq!(repo.range_ids("users", 8, 5).await?, vec![9, 10]);
    assert!(repo.range_ids("users", 20, 5).await?.is_empty());

    Ok(())
}

/// Tests counts of zero or less.
///
/// Expected: The default page size is used instead
#[tokio::test]
async fn non_positive_count_uses_default_page() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let repo = IndexRepository::new(&test.store);

    let batch: WriteBatch = (1..=120u64)
        .map(|id| Mutation::SortedAdd {
            key: "bookings".to_string(),
            score: 1,
            member: store::schema::id_member(id),
        })
        .collect();
    test.store.apply(batch).await?;

    assert_eq!(
        repo.range_ids("bookings", 0, 0).await?.len(),
        DEFAULT_PAGE_SIZE as usize
    );
    assert_eq!(
        repo.range_ids("bookings", 0, -5).await?.len(),
        DEFAULT_PAGE_SIZE as usize
    );
    assert_eq!(repo.range_ids("bookings", 100, 0).await?.len(), 20);

    Ok(())
}

/// Tests reading a listing that was never written.
///
/// Expected: Ok with no IDs
#[tokio::test]
async fn missing_listing_is_empty() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let repo = IndexRepository::new(&test.store);

    assert!(repo.range_ids("user:9:bookings", 0, 10).await?.is_empty());
    assert!(repo.range_all("user:9:interests").await?.is_empty());

    Ok(())
}

/// Tests a listing holding a member that is not an ID.
///
/// Expected: Err(CorruptRecord)
#[tokio::test]
async fn rejects_non_id_members() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let repo = IndexRepository::new(&test.store);

    let mut batch = WriteBatch::new();
    batch.push(Mutation::SortedAdd {
        key: "users".to_string(),
        score: 1,
        member: "not-an-id".to_string(),
    });
    test.store.apply(batch).await?;

    let result = repo.range_ids("users", 0, 10).await;
    assert!(matches!(result, Err(AppError::CorruptRecord(_))));

    Ok(())
}

/// Tests a page size too large to express as a rank.
///
/// Expected: Everything after the offset, not an overflow
#[tokio::test]
async fn huge_count_reads_to_the_end() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let repo = IndexRepository::new(&test.store);

    for id in 1..=4 {
        repo.add("resources", id as i64, id).await?;
    }

    assert_eq!(repo.range_ids("resources", 1, i64::MAX).await?, vec![2, 3, 4]);
    assert_eq!(repo.range_ids("resources", 0, i64::MAX).await?, vec![1, 2, 3, 4]);

    Ok(())
}

/// Tests offsets that do not fit a signed rank.
///
/// Verifies that the offset is not wrapped into a negative rank, which would page from the end
/// of the listing instead.
///
/// Expected: An empty page
#[tokio::test]
async fn huge_offset_is_empty() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let repo = IndexRepository::new(&test.store);

    for id in 1..=4 {
        repo.add("resources", id as i64, id).await?;
    }

    assert!(repo.range_ids("resources", u64::MAX, 1).await?.is_empty());
    assert!(repo.range_ids("resources", u64::MAX - 1, 2).await?.is_empty());
    assert!(repo
        .range_ids("resources", isize::MAX as u64, i64::MAX)
        .await?
        .is_empty());

    Ok(())
}
