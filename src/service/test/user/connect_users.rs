use super::*;

/// Tests connecting two users.
///
/// Expected: Ok and the edge is visible from both sides
#[tokio::test]
async fn connects_both_directions() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(2).build().await.unwrap();
    let service = UserService::new(&test.store);

    service.connect_users(1, 2).await?;

    assert!(service.is_connected(1, 2).await?);
    assert!(service.is_connected(2, 1).await?);

    Ok(())
}

/// Tests connecting a user to themselves.
///
/// Expected: Err(BadRequest) and no edge is written
#[tokio::test]
async fn self_connection_is_rejected() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let service = UserService::new(&test.store);

    let result = service.connect_users(1, 1).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(!test.store.exists(&user::connections_key(1)).await?);

    Ok(())
}

/// Tests connecting to a user that doesn't exist.
///
/// Expected: Err(NotFound) and no edge is written
#[tokio::test]
async fn missing_user_is_not_found() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let service = UserService::new(&test.store);

    let result = service.connect_users(1, 5).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(!service.is_connected(1, 5).await?);

    Ok(())
}

/// Tests disconnecting a connected pair.
///
/// Expected: The edge is gone from both sides
#[tokio::test]
async fn disconnects_both_directions() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(2).build().await.unwrap();
    let service = UserService::new(&test.store);
    service.connect_users(1, 2).await?;

    service.disconnect_users(2, 1).await?;

    assert!(!service.is_connected(1, 2).await?);
    assert!(!service.is_connected(2, 1).await?);

    Ok(())
}
