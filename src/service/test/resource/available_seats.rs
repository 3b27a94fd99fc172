use super::*;

/// Tests a resource without bookings.
///
/// Expected: Every seat `0..capacity`
#[tokio::test]
async fn unbooked_resource_is_fully_available() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1)
        .capacity(40)
        .build()
        .await?;

    let seats = ResourceService::new(&test.store)
        .available_seats(resource_id, date("2024-05-01"))
        .await?;

    assert_eq!(seats, (0..40).collect::<Vec<u32>>());

    Ok(())
}

/// Tests that a booking only occupies its seat on its own day.
///
/// Expected: Seat 5 is missing on the booked day and free on the next
#[tokio::test]
async fn booking_blocks_only_its_date() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1)
        .capacity(40)
        .build()
        .await?;
    BookingFactory::new(&test.store, resource_id, 1)
        .seat(5)
        .date("2024-05-01")
        .build()
        .await?;
    let service = ResourceService::new(&test.store);

    let booked_day = service
        .available_seats(resource_id, date("2024-05-01"))
        .await?;
    let next_day = service
        .available_seats(resource_id, date("2024-05-02"))
        .await?;

    assert_eq!(booked_day.len(), 39);
    assert!(!booked_day.contains(&5));
    assert_eq!(next_day, (0..40).collect::<Vec<u32>>());

    Ok(())
}

/// Tests a legacy booking stored without a seat position.
///
/// Expected: The booking occupies no seat
#[tokio::test]
async fn seatless_booking_occupies_nothing() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1)
        .capacity(3)
        .build()
        .await?;
    BookingFactory::new(&test.store, resource_id, 1)
        .without_seat()
        .build()
        .await?;
    BookingFactory::new(&test.store, resource_id, 1)
        .seat(1)
        .build()
        .await?;

    let seats = ResourceService::new(&test.store)
        .available_seats(resource_id, date("2024-05-01"))
        .await?;

    assert_eq!(seats, vec![0, 2]);

    Ok(())
}

/// Tests availability of a resource that doesn't exist.
///
/// Expected: Err(NotFound)
#[tokio::test]
async fn missing_resource_is_not_found() -> Result<(), AppError> {
    let test = TestBuilder::new().build().await.unwrap();

    let result = ResourceService::new(&test.store)
        .available_seats(1, date("2024-05-01"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}
