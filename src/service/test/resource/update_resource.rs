use super::*;

/// Tests the owner renaming a resource.
///
/// Expected: The name changes, capacity is untouched
#[tokio::test]
async fn owner_updates_resource() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1)
        .capacity(6)
        .build()
        .await?;
    let service = ResourceService::new(&test.store);

    let param = UpdateResourceParam {
        name: Some("Window table".to_string()),
        ..UpdateResourceParam::new(resource_id)
    };
    let updated = service.update_resource(param, 1).await?;

    assert_eq!(updated.name, "Window table");
    assert_eq!(updated.capacity, 6);
    assert!(updated.updated_at.is_some());
    assert_eq!(service.get_resource(resource_id).await?, updated);

    Ok(())
}

/// Tests another user updating a resource.
///
/// Expected: Err(PermissionDenied) and the resource is unchanged
#[tokio::test]
async fn other_user_is_denied() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(2).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1)
        .name("Table 1")
        .build()
        .await?;
    let service = ResourceService::new(&test.store);

    let param = UpdateResourceParam {
        name: Some("Mine now".to_string()),
        ..UpdateResourceParam::new(resource_id)
    };
    let result = service.update_resource(param, 2).await;

    assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    assert_eq!(service.get_resource(resource_id).await?.name, "Table 1");

    Ok(())
}

/// Tests shrinking a resource to zero seats.
///
/// Expected: Err(BadRequest)
#[tokio::test]
async fn zero_capacity_is_rejected() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let resource_id = create_resource(&test.store, 1).await?;

    let param = UpdateResourceParam {
        capacity: Some(0),
        ..UpdateResourceParam::new(resource_id)
    };
    let result = ResourceService::new(&test.store)
        .update_resource(param, 1)
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

/// Tests updating a resource that doesn't exist.
///
/// Expected: Err(NotFound)
#[tokio::test]
async fn missing_resource_is_not_found() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();

    let result = ResourceService::new(&test.store)
        .update_resource(UpdateResourceParam::new(8), 1)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}
