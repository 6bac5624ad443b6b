use crate::seat::Seat;

/// Row/column extent of a partition's seat grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CabinGeometry {
    pub rows: usize,
    pub columns: usize,
}

impl CabinGeometry {
    /// First and last columns sit on the window/aisle by convention
    pub fn is_edge_column(&self, column: usize) -> bool {
        column == 1 || column == self.columns
    }
}

/// Picks one seat out of a partition's currently bookable seats.
///
/// Called with the partition guard held, so implementations must be cheap and
/// must not block.
pub trait SeatSelector: Send + Sync {
    fn select<'a>(&self, available: &[&'a Seat], geometry: CabinGeometry) -> Option<&'a Seat>;
}

/// Window/aisle first, then front rows, then lower column letter
#[derive(Debug, Clone, Copy, Default)]
pub struct BestSeatSelector;

impl SeatSelector for BestSeatSelector {
    fn select<'a>(&self, available: &[&'a Seat], geometry: CabinGeometry) -> Option<&'a Seat> {
        best_seat(available, geometry)
    }
}

pub fn best_seat<'a>(available: &[&'a Seat], geometry: CabinGeometry) -> Option<&'a Seat> {
    available
        .iter()
        .copied()
        .min_by_key(|seat| (!geometry.is_edge_column(seat.column), seat.row, seat.column))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(rows: usize, columns: usize) -> CabinGeometry {
        CabinGeometry { rows, columns }
    }

    #[test]
    fn test_empty_input() {
        assert!(best_seat(&[], geometry(3, 3)).is_none());
    }

    #[test]
    fn test_prefers_edge_columns_over_front_rows() {
        let seats = [
            Seat::new(1, 2, ""),
            Seat::new(2, 2, ""),
            Seat::new(3, 3, ""),
        ];
        let refs: Vec<&Seat> = seats.iter().collect();

        let seat = best_seat(&refs, geometry(3, 3)).unwrap();
        assert_eq!(seat.seat_id, "C3");
    }

    #[test]
    fn test_prefers_front_rows() {
        let seats = [Seat::new(2, 1, ""), Seat::new(1, 4, "")];
        let refs: Vec<&Seat> = seats.iter().collect();

        let seat = best_seat(&refs, geometry(2, 4)).unwrap();
        assert_eq!(seat.row, 1);
        assert_eq!(seat.seat_id, "D1");
    }

    #[test]
    fn test_lower_column_breaks_ties() {
        let seats = [Seat::new(1, 3, ""), Seat::new(1, 1, "")];
        let refs: Vec<&Seat> = seats.iter().collect();

        let seat = best_seat(&refs, geometry(1, 3)).unwrap();
        assert_eq!(seat.column, 1);
    }

    #[test]
    fn test_selection_is_reproducible() {
        let seats: Vec<Seat> = (1..=4)
            .flat_map(|row| (1..=6).map(move |col| Seat::new(row, col, "")))
            .collect();
        let mut refs: Vec<&Seat> = seats.iter().filter(|s| s.row > 1).collect();
        let first = BestSeatSelector.select(&refs, geometry(4, 6)).unwrap().seat_id.clone();

        refs.reverse();
        for _ in 0..5 {
            let again = BestSeatSelector.select(&refs, geometry(4, 6)).unwrap();
            assert_eq!(again.seat_id, first);
        }
        assert_eq!(first, "A2");
    }
}
