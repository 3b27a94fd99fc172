use super::*;

/// Tests replacing a user's tags.
///
/// Verifies that tags absent from the new set lose both directions of their edge and that
/// the new tags are written in both directions.
///
/// Expected: Tags [b, c]; user no longer listed under `a`
#[tokio::test]
async fn clears_then_writes() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let id = UserFactory::new(&test.store)
        .interest("a")
        .interest("b")
        .build()
        .await?;
    let repo = RelationRepository::new(&test.store);

    repo.replace_tags(id, &["b".to_string(), "c".to_string()])
        .await?;

    assert_eq!(
        sorted(repo.tags_of_user(id).await?),
        vec!["b".to_string(), "c".to_string()]
    );
    assert!(repo.users_by_tag("a", 0, 0).await?.is_empty());
    assert_eq!(repo.users_by_tag("b", 0, 0).await?, vec![id]);
    assert_eq!(repo.users_by_tag("c", 0, 0).await?, vec![id]);

    Ok(())
}

/// Tests replacing tags with an empty set.
///
/// Expected: No tags, no interest listing, and the tag listings no longer hold the user
#[tokio::test]
async fn empty_set_clears_everything() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let id = UserFactory::new(&test.store).interest("a").build().await?;
    let other = UserFactory::new(&test.store).interest("a").build().await?;
    let repo = RelationRepository::new(&test.store);

    repo.replace_tags(id, &[]).await?;

    assert!(repo.tags_of_user(id).await?.is_empty());
    assert!(!test.keys().await.contains(&user::interests_key(id)));
    assert_eq!(
        IndexRepository::new(&test.store)
            .all_ids(&interest::users_key("a"))
            .await?,
        vec![other]
    );

    Ok(())
}
