use super::*;

fn ids(resources: &[Resource]) -> Vec<u64> {
    resources.iter().map(|resource| resource.id).collect()
}

/// Tests listing every resource.
///
/// Expected: Resources in creation order
#[tokio::test]
async fn lists_in_creation_order() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(2).build().await.unwrap();
    ResourceFactory::new(&test.store, 1).created_at(300).build().await?;
    ResourceFactory::new(&test.store, 2).created_at(100).build().await?;
    ResourceFactory::new(&test.store, 1).created_at(200).build().await?;

    let resources = ResourceService::new(&test.store).list_resources(0, 0).await?;

    assert_eq!(ids(&resources), vec![2, 3, 1]);

    Ok(())
}

/// Tests paging through the resource listing.
///
/// Expected: The requested window only
#[tokio::test]
async fn pages_with_offset_and_count() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    for _ in 0..5 {
        create_resource(&test.store, 1).await?;
    }

    let resources = ResourceService::new(&test.store).list_resources(3, 5).await?;

    assert_eq!(ids(&resources), vec![4, 5]);

    Ok(())
}

/// Tests paging arguments at the edges of their integer types.
///
/// Expected: The rest of the listing for a huge count, and nothing for a huge offset
#[tokio::test]
async fn extreme_paging_arguments() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    for _ in 0..3 {
        create_resource(&test.store, 1).await?;
    }
    let service = ResourceService::new(&test.store);

    assert_eq!(ids(&service.list_resources(1, i64::MAX).await?), vec![2, 3]);
    assert!(service.list_resources(u64::MAX, 1).await?.is_empty());

    Ok(())
}

/// Tests listing the resources of one owner.
///
/// Expected: Only user 2's resources
#[tokio::test]
async fn lists_by_owner() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(2).build().await.unwrap();
    create_resource(&test.store, 1).await?;
    let owned = create_resource(&test.store, 2).await?;

    let resources = ResourceService::new(&test.store)
        .list_resources_by_owner(2, 0, 0)
        .await?;

    assert_eq!(ids(&resources), vec![owned]);

    Ok(())
}
