//! Property-based tests for session invariants.

mod common;

use common::{session_with, FirstLegalOracle};
use proptest::prelude::*;
use sparring_core::move_log::replay;
use sparring_core::rules::{RulesEngine, StandardRules};
use sparring_core::{Originator, Session};

#[derive(Debug, Clone)]
enum Op {
    Restart,
    Move(usize),
    Undo,
    Redo,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Restart),
        6 => any::<usize>().prop_map(Op::Move),
        3 => Just(Op::Undo),
        2 => Just(Op::Redo),
    ]
}

fn apply(session: &mut Session, op: &Op) {
    match op {
        Op::Restart => {
            session.restart();
        }
        Op::Move(pick) => {
            let moves = session.legal_moves();
            if !moves.is_empty() {
                session.apply_human_uci(&moves[pick % moves.len()]).unwrap();
            }
        }
        Op::Undo => {
            session.undo().unwrap();
        }
        Op::Redo => {
            session.redo().unwrap();
        }
    }
}

fn replayed_fen(session: &Session) -> String {
    let rules = StandardRules;
    let positions = replay(&rules.initial_position(), session.log().moves(), &rules).unwrap();
    rules.encode(positions.last().unwrap())
}

proptest! {
    #[test]
    fn replay_reproduces_the_live_position(ops in prop::collection::vec(op(), 0..40)) {
        let mut session = session_with(FirstLegalOracle::default());
        for op in &ops {
            apply(&mut session, op);
            let fen = session.fen();
            prop_assert_eq!(replayed_fen(&session), fen.clone());

            let history = session.history().unwrap();
            prop_assert_eq!(history.fens.len(), history.sans.len() + 1);
            prop_assert_eq!(history.fens.last(), Some(&fen));
        }
    }

    #[test]
    fn legal_move_grows_log_by_one_or_two(ops in prop::collection::vec(op(), 0..30), pick in any::<usize>()) {
        let mut session = session_with(FirstLegalOracle::default());
        for op in &ops {
            apply(&mut session, op);
        }
        let moves = session.legal_moves();
        prop_assume!(!moves.is_empty());

        let before = session.move_count();
        let status = session.apply_human_uci(&moves[pick % moves.len()]).unwrap();
        let grown = status.move_count - before;
        prop_assert!(grown == 1 || grown == 2);
        if grown == 1 {
            prop_assert!(status.game_over.is_some());
        } else {
            let last = session.log().last().unwrap();
            prop_assert_eq!(last.originator, Originator::Oracle);
        }
        prop_assert!(!status.can_redo);
    }

    #[test]
    fn undo_then_redo_is_identity(ops in prop::collection::vec(op(), 0..30)) {
        let mut session = session_with(FirstLegalOracle::default());
        for op in &ops {
            apply(&mut session, op);
        }
        let before = session.status();
        let undone = session.undo().unwrap();
        if before.can_undo {
            prop_assert!(undone.move_count < before.move_count);
            let redone = session.redo().unwrap();
            prop_assert_eq!(&redone.fen, &before.fen);
            prop_assert_eq!(&redone.last_move, &before.last_move);
            prop_assert_eq!(redone.move_count, before.move_count);
        } else {
            prop_assert_eq!(&undone, &before);
        }
    }

    #[test]
    fn redo_without_undone_turns_changes_nothing(ops in prop::collection::vec(op(), 0..30)) {
        let mut session = session_with(FirstLegalOracle::default());
        for op in &ops {
            apply(&mut session, op);
        }
        prop_assume!(!session.can_redo());
        let before = session.status();
        prop_assert_eq!(session.redo().unwrap(), before);
    }
}
