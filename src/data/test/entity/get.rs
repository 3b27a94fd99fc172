use super::*;

/// Tests reading a record written by the factories.
///
/// Expected: Ok with every stored field decoded
#[tokio::test]
async fn decodes_stored_record() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1)
        .name("Table 1")
        .capacity(12)
        .created_at(1_714_521_600)
        .build()
        .await?;

    let resource = EntityRepository::new(&test.store)
        .get::<Resource>(resource_id)
        .await?;

    assert_eq!(resource.user_id, 1);
    assert_eq!(resource.name, "Table 1");
    assert_eq!(resource.capacity, 12);
    assert_eq!(resource.created_at.timestamp(), 1_714_521_600);
    assert!(resource.opening_time.is_none());

    Ok(())
}

/// Tests reading an ID that was never written.
///
/// Expected: Err(NotFound), and find returns None
#[tokio::test]
async fn missing_record_is_not_found() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    let repo = EntityRepository::new(&test.store);

    let result = repo.get::<Booking>(42).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(repo.find::<Booking>(42).await?.is_none());

    Ok(())
}

/// Tests a numeric field holding a non-numeric value.
///
/// Expected: Err(CorruptRecord) rather than a defaulted capacity
#[tokio::test]
async fn non_numeric_field_is_corrupt() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1).build().await?;
    write_record(
        &test.store,
        &EntityKind::Resource.record_key(resource_id),
        &[(resource::CAPACITY, "lots".to_string())],
    )
    .await?;

    let result = EntityRepository::new(&test.store)
        .get::<Resource>(resource_id)
        .await;

    assert!(matches!(result, Err(AppError::CorruptRecord(_))));

    Ok(())
}

/// Tests a record missing a field every record of its kind carries.
///
/// Expected: Err(CorruptRecord)
#[tokio::test]
async fn missing_required_field_is_corrupt() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();
    write_record(
        &test.store,
        "user:5",
        &[("id", "5".to_string()), ("createdAt", "0".to_string())],
    )
    .await?;

    let result = EntityRepository::new(&test.store).get::<User>(5).await;

    assert!(matches!(result, Err(AppError::CorruptRecord(_))));

    Ok(())
}

/// Tests a booking written without seat and date by an older writer.
///
/// Expected: Ok with both fields absent
#[tokio::test]
async fn tolerates_booking_without_seat() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let booking_id = BookingFactory::new(&test.store, 1, 1)
        .without_seat()
        .without_date()
        .build()
        .await?;

    let booking = EntityRepository::new(&test.store)
        .get::<Booking>(booking_id)
        .await?;

    assert!(booking.seat_position.is_none());
    assert!(booking.date.is_none());

    Ok(())
}
