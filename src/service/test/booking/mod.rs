use store::{schema::resource, KvStore};
use test_utils::{
    builder::TestBuilder,
    factory::{
        booking::BookingFactory, create_booking, helpers::write_claim, resource::ResourceFactory,
    },
};

use super::date;
use crate::{
    error::AppError,
    model::booking::{Booking, BookingOwner, CreateBookingParam, UpdateBookingParam},
    service::{booking::BookingService, resource::ResourceService},
};

mod insert_booking;

fn seat(resource_id: u64, user_id: u64, seat_position: u32, day: &str) -> CreateBookingParam {
    CreateBookingParam {
        resource_id,
        user_id,
        seat_position,
        date: date(day),
    }
}

fn ids(bookings: &[Booking]) -> Vec<u64> {
    bookings.iter().map(|booking| booking.id).collect()
}
