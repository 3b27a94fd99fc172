/// Computes the free seats of a resource from the seats its bookings occupy.
///
/// The seat domain is `0..capacity`. Bookings without a seat position, or with a position
/// outside the domain, occupy nothing.
///
/// # Arguments
/// - `capacity` - Number of seats of the resource
/// - `occupied` - Seat position of every booking on the day in question
///
/// # Returns
/// - `Vec<u32>` - Free seat positions in ascending order
pub fn available_seats<I>(capacity: u32, occupied: I) -> Vec<u32>
where
    I: IntoIterator<Item = Option<u32>>,
{
    let mut taken = vec![false; capacity as usize];
    for seat in occupied.into_iter().flatten() {
        if let Some(slot) = taken.get_mut(seat as usize) {
            *slot = true;
        }
    }

    (0..capacity).filter(|seat| !taken[*seat as usize]).collect()
}
