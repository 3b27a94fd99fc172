use super::*;

/// Tests booking a free seat.
///
/// Expected: Ok with the seat claimed for that day
#[tokio::test]
async fn books_free_seat() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(2).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1)
        .capacity(4)
        .build()
        .await?;

    let booking = BookingService::new(&test.store)
        .insert_booking(seat(resource_id, 2, 3, "2024-05-01"))
        .await?;

    assert_eq!(booking.id, 1);
    assert_eq!(booking.seat_position, Some(3));
    assert_eq!(booking.date, Some(date("2024-05-01")));
    assert_eq!(
        test.store
            .get(&resource::seat_key(resource_id, "2024-05-01", 3))
            .await?,
        Some("1".to_string())
    );

    Ok(())
}

/// Tests booking a seat position at the resource's capacity.
///
/// Expected: Err(BadRequest) since seats are numbered from 0
#[tokio::test]
async fn seat_outside_capacity_is_rejected() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1)
        .capacity(4)
        .build()
        .await?;

    let result = BookingService::new(&test.store)
        .insert_booking(seat(resource_id, 1, 4, "2024-05-01"))
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

/// Tests booking on a resource that doesn't exist.
///
/// Expected: Err(NotFound)
#[tokio::test]
async fn missing_resource_is_not_found() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();

    let result = BookingService::new(&test.store)
        .insert_booking(seat(6, 1, 0, "2024-05-01"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

/// Tests booking for a user that doesn't exist.
///
/// Expected: Err(NotFound) and the seat stays free
#[tokio::test]
async fn missing_user_is_not_found() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1).build().await?;

    let result = BookingService::new(&test.store)
        .insert_booking(seat(resource_id, 7, 0, "2024-05-01"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(
        !test
            .store
            .exists(&resource::seat_key(resource_id, "2024-05-01", 0))
            .await?
    );

    Ok(())
}

/// Tests booking a seat that is already taken on that day.
///
/// Expected: Err(Conflict); the same seat on another day is still bookable
#[tokio::test]
async fn double_booking_is_conflict() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(2).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1).build().await?;
    let service = BookingService::new(&test.store);
    service
        .insert_booking(seat(resource_id, 1, 2, "2024-05-01"))
        .await?;

    let result = service
        .insert_booking(seat(resource_id, 2, 2, "2024-05-01"))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    service
        .insert_booking(seat(resource_id, 2, 2, "2024-05-02"))
        .await?;

    Ok(())
}

/// Tests many users racing for the same seat.
///
/// Expected: Exactly one booking succeeds, every other attempt is a conflict
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_claim_seat_once() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(16).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1).build().await?;

    let mut handles = Vec::new();
    for user_id in 1..=16 {
        let store = test.store.clone();
        handles.push(tokio::spawn(async move {
            BookingService::new(&store)
                .insert_booking(seat(resource_id, user_id, 0, "2024-05-01"))
                .await
        }));
    }

    let mut booked = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => booked += 1,
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(e) => return Err(e),
        }
    }

    assert_eq!(booked, 1);
    assert_eq!(conflicts, 15);
    let seats = ResourceService::new(&test.store)
        .available_seats(resource_id, date("2024-05-01"))
        .await?;
    assert_eq!(seats, vec![1, 2, 3]);

    Ok(())
}

/// Tests a booking field map.
///
/// Expected: Every field is required; a complete map parses
#[tokio::test]
async fn reads_form_fields() -> Result<(), AppError> {
    let mut fields = std::collections::HashMap::new();
    fields.insert("resourceID".to_string(), "1".to_string());
    fields.insert("userID".to_string(), "9".to_string());
    fields.insert("seatPosition".to_string(), "2".to_string());

    let result = CreateBookingParam::from_form(&fields);
    assert!(matches!(result, Err(AppError::MissingRequiredField("date"))));

    fields.insert("date".to_string(), "2024-05-01".to_string());
    assert_eq!(
        CreateBookingParam::from_form(&fields)?,
        seat(1, 9, 2, "2024-05-01")
    );

    Ok(())
}

/// Tests booking a seat whose claim outlived the booking that made it.
///
/// Verifies that a seat reported as available can actually be booked when a claim naming a
/// missing booking is still stored for it.
///
/// Expected: Ok, and the seat claim names the new booking
#[tokio::test]
async fn books_seat_behind_stale_claim() -> Result<(), AppError> {
    let test = TestBuilder::new().with_users(1).build().await.unwrap();
    let resource_id = ResourceFactory::new(&test.store, 1)
        .capacity(4)
        .build()
        .await?;
    let key = resource::seat_key(resource_id, "2024-05-01", 2);
    write_claim(&test.store, &key, 99).await?;

    let seats = ResourceService::new(&test.store)
        .available_seats(resource_id, date("2024-05-01"))
        .await?;
    assert_eq!(seats, vec![0, 1, 2, 3]);

    let booking = BookingService::new(&test.store)
        .insert_booking(seat(resource_id, 1, 2, "2024-05-01"))
        .await?;

    assert_eq!(test.store.get(&key).await?, Some(booking.id.to_string()));

    Ok(())
}
