use super::*;

/// Tests loading a user by ID.
///
/// Expected: Ok with the stored profile and interests
#[tokio::test]
async fn gets_user_by_id() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let id = UserFactory::new(&test.store)
        .email("ada@example.com")
        .firstname("Ada")
        .interest("chess")
        .build()
        .await?;

    let user = UserService::new(&test.store)
        .get_user(GetUserParam::Id(id))
        .await?;

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.profile.firstname.as_deref(), Some("Ada"));
    assert_eq!(user.interests, tags(&["chess"]));

    Ok(())
}

/// Tests loading a user by email.
///
/// Expected: Ok with the user the email is registered to
#[tokio::test]
async fn gets_user_by_email() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(2).build().await.unwrap();
    let id = create_user_with_email(&test.store, "grace@example.com").await?;

    let user = UserService::new(&test.store)
        .get_user(GetUserParam::Email("grace@example.com".to_string()))
        .await?;

    assert_eq!(user.id, id);

    Ok(())
}

/// Tests loading users that don't exist.
///
/// Expected: Err(NotFound) for an unknown ID and for an unknown email
#[tokio::test]
async fn missing_user_is_not_found() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let service = UserService::new(&test.store);

    let by_id = service.get_user(GetUserParam::Id(7)).await;
    let by_email = service
        .get_user(GetUserParam::Email("nobody@example.com".to_string()))
        .await;

    assert!(matches!(by_id, Err(AppError::NotFound(_))));
    assert!(matches!(by_email, Err(AppError::NotFound(_))));

    Ok(())
}

/// Tests an email reference whose user record is gone.
///
/// Expected: Err(NotFound) rather than a corrupt or partial user
#[tokio::test]
async fn stale_email_reference_is_not_found() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let id = create_user_with_email(&test.store, "ada@example.com").await?;
    delete_key(&test.store, &EntityKind::User.record_key(id)).await?;

    let result = UserService::new(&test.store)
        .get_user(GetUserParam::Email("ada@example.com".to_string()))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}
