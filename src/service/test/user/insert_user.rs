use super::*;

/// Tests registering a user with interests.
///
/// Expected: Ok with ID 1, interests linked in both directions
#[tokio::test]
async fn inserts_user_with_interests() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let service = UserService::new(&test.store);

    let param = CreateUserParam {
        interests: tags(&["chess", "hiking"]),
        ..CreateUserParam::new("ada@example.com")
    };
    let user = service.insert_user(param).await?;

    assert_eq!(user.id, 1);
    assert_eq!(user.interests, tags(&["chess", "hiking"]));

    let relations = RelationRepository::new(&test.store);
    let mut stored = relations.tags_of_user(user.id).await?;
    stored.sort();
    assert_eq!(stored, tags(&["chess", "hiking"]));
    assert_eq!(relations.users_by_tag("hiking", 0, 0).await?, vec![user.id]);

    Ok(())
}

/// Tests registering with repeated interests in no particular order.
///
/// Expected: The returned interests match what a later read returns
#[tokio::test]
async fn returns_interests_as_stored() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let service = UserService::new(&test.store);

    let param = CreateUserParam {
        interests: tags(&["go", "chess", "go"]),
        ..CreateUserParam::new("ada@example.com")
    };
    let user = service.insert_user(param).await?;

    assert_eq!(user.interests, tags(&["chess", "go"]));
    let loaded = service.get_user(GetUserParam::Id(user.id)).await?;
    assert_eq!(loaded.interests, user.interests);

    Ok(())
}

/// Tests registering with a blank interest tag.
///
/// Expected: Err(BadRequest) and nothing written
#[tokio::test]
async fn blank_interest_is_rejected() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let service = UserService::new(&test.store);

    for blank in ["", "  "] {
        let param = CreateUserParam {
            interests: tags(&["chess", blank]),
            ..CreateUserParam::new("ada@example.com")
        };
        let result = service.insert_user(param).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
    assert!(!test.store.exists(&interest::users_key("")).await?);
    assert!(!test.store.exists(&user::email_key("ada@example.com")).await?);
    assert!(test.keys().await.is_empty());

    Ok(())
}

/// Tests registering the same email twice.
///
/// Expected: Err(Conflict) and the email still resolves to the first user only
#[tokio::test]
async fn duplicate_email_is_conflict() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let service = UserService::new(&test.store);

    let first = service
        .insert_user(CreateUserParam::new("ada@example.com"))
        .await?;
    let result = service
        .insert_user(CreateUserParam::new("ada@example.com"))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    let resolved = service
        .get_user(GetUserParam::Email("ada@example.com".to_string()))
        .await?;
    assert_eq!(resolved.id, first.id);
    assert_eq!(
        IndexRepository::new(&test.store)
            .all_ids(EntityKind::User.listing_key())
            .await?,
        vec![first.id]
    );

    Ok(())
}

/// Tests registering from a caller-supplied field map.
///
/// Verifies that empty values count as absent and that interests are split on commas.
///
/// Expected: Ok with lastname absent and two interests
#[tokio::test]
async fn inserts_from_form() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let service = UserService::new(&test.store);

    let fields = form(&[
        ("email", "ada@example.com"),
        ("firstname", "Ada"),
        ("lastname", ""),
        ("birthdate", "1815-12-10"),
        ("interests", "chess, go,"),
    ]);
    let user = service
        .insert_user(CreateUserParam::from_form(&fields)?)
        .await?;

    assert_eq!(user.profile.firstname.as_deref(), Some("Ada"));
    assert!(user.profile.lastname.is_none());
    assert_eq!(user.interests, tags(&["chess", "go"]));

    Ok(())
}

/// Tests a field map without an email.
///
/// Expected: Err(MissingRequiredField("email"))
#[tokio::test]
async fn form_without_email_is_rejected() -> Result<(), AppError> {
    let result = CreateUserParam::from_form(&form(&[("firstname", "Ada")]));

    assert!(matches!(result, Err(AppError::MissingRequiredField("email"))));

    Ok(())
}

/// Tests a field map with a malformed birthdate.
///
/// Expected: Err(BadRequest)
#[tokio::test]
async fn form_with_bad_date_is_rejected() -> Result<(), AppError> {
    let result = CreateUserParam::from_form(&form(&[
        ("email", "ada@example.com"),
        ("birthdate", "10/12/1815"),
    ]));

    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}
