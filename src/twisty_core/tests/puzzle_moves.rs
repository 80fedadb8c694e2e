use std::collections::HashMap;

use twisty_core::{MoveError, Permutation, PuzzleMoves};

/// `U` turns four points around, `R` swaps two of them with two points off
/// to the side.
fn puzzle() -> PuzzleMoves {
    PuzzleMoves::new(
        &HashMap::from([
            ("U".to_owned(), vec![vec![0, 1, 2, 3]]),
            ("U'".to_owned(), vec![vec![3, 2, 1, 0]]),
            ("R".to_owned(), vec![vec![1, 4], vec![2, 5]]),
        ]),
        6,
    )
    .unwrap()
}

#[test_log::test]
fn move_orders() {
    let puzzle = puzzle();

    for (name, order) in [("U", 4), ("U'", 4), ("R", 2)] {
        let move_ = puzzle.find_move(name).unwrap();
        let mut power = Permutation::identity(puzzle.point_count());

        for i in 1..=order {
            power.compose(move_.permutation());
            assert_eq!(power.is_identity(), i == order, "{name}^{i}");
        }
    }
}

#[test_log::test]
fn commutator_is_a_five_cycle() {
    let puzzle = puzzle();
    let u = puzzle.find_move("U").unwrap().permutation();
    let r = puzzle.find_move("R").unwrap().permutation();

    let mut commutator = u.clone();
    commutator.compose(r);
    commutator.compose(&u.inverse());
    commutator.compose(&r.inverse());

    assert_eq!(commutator.cycles(), &[vec![0, 1, 2, 5, 4]]);

    let once = commutator.clone();
    for _ in 1..5 {
        assert!(!commutator.is_identity());
        commutator.compose(&once);
    }
    assert!(commutator.is_identity());
}

#[test_log::test]
fn inverses_round_trip() {
    let puzzle = puzzle();
    let inverse_of = puzzle.derive_inverses();

    assert_eq!(inverse_of.len(), 3);
    assert_eq!(inverse_of["U"], "U'");
    assert_eq!(inverse_of["R"], "R");
    puzzle.check_inverses(&inverse_of).unwrap();
}

#[test_log::test]
fn state_follows_moves() {
    let puzzle = puzzle();
    let mut state = (0..puzzle.point_count()).collect::<Vec<_>>();

    for name in ["U", "R", "R", "U'"] {
        puzzle
            .find_move(name)
            .unwrap()
            .permutation()
            .permute_in_place(&mut state);
    }

    assert_eq!(state, (0..6).collect::<Vec<_>>());
}

#[test_log::test]
fn first_bad_cycle_is_reported() {
    let err = PuzzleMoves::from_unnamed(vec![vec![vec![0, 1]], vec![vec![6, 1]]], 6).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Move `m1` references point 6, expected a value between 0 and 6 (exclusive)"
    );
    assert!(matches!(err, MoveError::PointOutOfRange { point: 6, .. }));
}
