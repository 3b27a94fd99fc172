use super::*;

async fn seed(test: &test_utils::context::TestContext) -> Result<(), AppError> {
    UserFactory::new(&test.store)
        .interest("chess")
        .created_at(100)
        .build()
        .await?;
    UserFactory::new(&test.store)
        .interest("go")
        .created_at(200)
        .build()
        .await?;
    UserFactory::new(&test.store)
        .interest("chess")
        .interest("go")
        .created_at(300)
        .build()
        .await?;
    UserFactory::new(&test.store).created_at(400).build().await?;
    Ok(())
}

fn ids(users: &[User]) -> Vec<u64> {
    users.iter().map(|user| user.id).collect()
}

/// Tests listing every user.
///
/// Expected: All users in registration order, with their interests loaded
#[tokio::test]
async fn lists_in_registration_order() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    seed(&test).await?;

    let users = UserService::new(&test.store).list_users(0, 0, &[]).await?;

    assert_eq!(ids(&users), vec![1, 2, 3, 4]);
    assert_eq!(users[2].interests, tags(&["chess", "go"]));
    assert!(users[3].interests.is_empty());

    Ok(())
}

/// Tests paging through the user listing.
///
/// Expected: The requested window only
#[tokio::test]
async fn pages_with_offset_and_count() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    seed(&test).await?;

    let users = UserService::new(&test.store).list_users(1, 2, &[]).await?;

    assert_eq!(ids(&users), vec![2, 3]);

    Ok(())
}

/// Tests filtering by several interest tags.
///
/// Verifies that the result is the union of the tags' listings, in the order the tags are
/// given, with users carrying both tags listed once.
///
/// Expected: Users 2 and 3 from "go", then user 1 from "chess"
#[tokio::test]
async fn tag_filter_returns_union() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    seed(&test).await?;

    let users = UserService::new(&test.store)
        .list_users(0, 0, &tags(&["go", "chess"]))
        .await?;

    assert_eq!(ids(&users), vec![2, 3, 1]);

    Ok(())
}

/// Tests paging arguments at the edges of their integer types, with and without a tag filter.
///
/// Expected: The rest of the listing for a huge count, and nothing for a huge offset
#[tokio::test]
async fn extreme_paging_arguments() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    seed(&test).await?;
    let service = UserService::new(&test.store);
    let filter = tags(&["go", "chess"]);

    assert_eq!(ids(&service.list_users(1, i64::MAX, &[]).await?), vec![2, 3, 4]);
    assert!(service.list_users(u64::MAX, 1, &[]).await?.is_empty());
    assert_eq!(ids(&service.list_users(1, i64::MAX, &filter).await?), vec![3, 1]);
    assert!(service.list_users(u64::MAX, 1, &filter).await?.is_empty());

    Ok(())
}

/// Tests filtering by a tag nobody carries.
///
/// Expected: Ok with an empty list
#[tokio::test]
async fn unknown_tag_lists_nobody() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    seed(&test).await?;

    let users = UserService::new(&test.store)
        .list_users(0, 0, &tags(&["sailing"]))
        .await?;

    assert!(users.is_empty());

    Ok(())
}

/// Tests listing users by a single tag.
///
/// Expected: Users tagged "chess" in tagging order
#[tokio::test]
async fn lists_users_by_tag() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    seed(&test).await?;

    let users = UserService::new(&test.store)
        .users_by_tag("chess", 0, 0)
        .await?;

    assert_eq!(ids(&users), vec![1, 3]);

    Ok(())
}

/// Tests listing after a user record vanished without its listing entry.
///
/// Expected: The dangling ID is skipped instead of failing the listing
#[tokio::test]
async fn skips_dangling_ids() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    seed(&test).await?;
    delete_key(&test.store, &EntityKind::User.record_key(2)).await?;

    let users = UserService::new(&test.store).list_users(0, 0, &[]).await?;

    assert_eq!(ids(&users), vec![1, 3, 4]);

    Ok(())
}
