use cucumber_core::game::state::GameState;
use cucumber_core::model::card::Card;
use cucumber_core::model::deck::Deck;
use cucumber_core::model::player::Player;
use cucumber_core::model::rank::{Rank, render_ranks};
use cucumber_core::rng::{SeededRng, unit};
use cucumber_core::valuation::{
    ConsistencyCheck, MonteCarloOptions, valuate_monte_carlo, valuate_static,
};

fn deal_with(rng: &mut SeededRng, deck: &mut Deck, players: usize, cards: usize) -> Vec<Player> {
    (0..players)
        .map(|_| Player::new(deck.draw_n(rng, cards).unwrap()))
        .collect()
}

fn random_move(moves: &[usize], rng: &mut SeededRng) -> usize {
    moves[(unit(rng) * moves.len() as f64) as usize]
}

fn last_move_round() -> GameState {
    let mut state = GameState::deal("123", 3, 3, 0, Deck::first(20)).unwrap();
    let mut offered = Vec::new();
    for _ in 0..3 {
        let moves = state.possible_moves();
        state.play_card(*moves.last().unwrap()).unwrap();
        offered.push(moves);
    }
    assert_eq!(offered, vec![vec![1, 2], vec![0, 1, 2], vec![0]]);
    state
}

#[test]
fn restricted_deal_plays_into_reference_round() {
    let state = GameState::deal("123", 3, 3, 0, Deck::first(20)).unwrap();
    assert_eq!(state.to_string(), "*357,68Q,346");

    let state = last_move_round();
    assert_eq!(state.verbose(), "P1  35 : 7\nP2* 68 : Q\nP3  46 : 3 3");
    assert_eq!(state.active(), 1);
    assert_eq!(state.trick(), None);
    assert_eq!(state.calc_position_index(), 0);
}

#[test]
fn consistency_checks_change_acceptance() {
    let state = last_move_round();

    let options = MonteCarloOptions::new(1000).with_consistency(ConsistencyCheck::Rank);
    let mut rng = SeededRng::from_seed_str("123");
    let result = valuate_monte_carlo(&state, &mut rng, &options, None)
        .unwrap()
        .unwrap();
    assert_eq!((result.runs, result.total), (746, 1542.0));

    let options = MonteCarloOptions::new(1000).with_cross_player(true);
    let mut rng = SeededRng::from_seed_str("123");
    let result = valuate_monte_carlo(&state, &mut rng, &options, None)
        .unwrap()
        .unwrap();
    assert_eq!((result.runs, result.total), (879, 879.5));
    assert_eq!(result.value, 1.0005688282138794);
}

#[test]
fn two_card_rounds_value_every_seat() {
    struct Case {
        seed: &'static str,
        players: usize,
        first: usize,
        deal: &'static str,
        played: &'static str,
        values: Vec<f64>,
        active: usize,
        discards: &'static str,
    }
    let cases = [
        Case {
            seed: "126",
            players: 5,
            first: 0,
            deal: "*69,35,27,3T,JQ",
            played: "932TQ",
            values: vec![2.75, 2.75, 2.75, 2.75, -11.0],
            active: 4,
            discards: " 32  ",
        },
        Case {
            seed: "127",
            players: 5,
            first: 0,
            deal: "*46,JQ,7Q,25,TK",
            played: "6QQ2K",
            values: vec![2.75, -11.0, 2.75, 2.75, 2.75],
            active: 4,
            discards: "   2 ",
        },
        Case {
            seed: "128",
            players: 5,
            first: 0,
            deal: "*49,27,4A,QQ,TK",
            played: "92AQT",
            values: vec![3.25, 3.25, 3.25, 3.25, -13.0],
            active: 2,
            discards: " 2 QT",
        },
        Case {
            seed: "136",
            players: 8,
            first: 1,
            deal: "8Q,*26,34,3K,9J,4A,TA,4A",
            played: "63K9AT48",
            values: vec![50.0, 50.0, 50.0, 50.0, 50.0, 50.0, -50.0, -50.0],
            active: 5,
            discards: "8 3 9 T4",
        },
    ];

    for case in cases {
        let mut state =
            GameState::deal(case.seed, case.players, 2, case.first, Deck::standard()).unwrap();
        assert_eq!(state.to_string(), case.deal, "seed {}", case.seed);

        let mut played = Vec::new();
        for _ in 0..case.players {
            let moves = state.possible_moves();
            played.push(state.play_card(moves[0]).unwrap());
        }
        assert_eq!(render_ranks(played), case.played, "seed {}", case.seed);
        assert!(state.is_endgame());

        let values: Vec<f64> = (0..case.players)
            .map(|player| valuate_static(&state, player, true).unwrap())
            .collect();
        assert_eq!(values, case.values, "seed {}", case.seed);
        assert_eq!(state.active(), case.active, "seed {}", case.seed);

        let discards: String = state
            .players()
            .iter()
            .map(|player| player.highest_discard().map_or(' ', Rank::symbol))
            .collect();
        assert_eq!(discards, case.discards, "seed {}", case.seed);
    }
}

#[test]
fn five_player_valuation_continues_the_deal_stream() {
    let mut rng = SeededRng::from_seed_str("646");
    let mut deck = Deck::standard();
    let players = deal_with(&mut rng, &mut deck, 5, 3);
    let mut state = GameState::new(deck, players, 0).unwrap();
    for _ in 0..4 {
        let moves = state.possible_moves();
        state.play_card(moves[0]).unwrap();
    }
    assert_eq!(
        state.verbose(),
        "P1  37 : 7\nP2  9T : 4 4\nP3  67 : 5 5\nP4  2A : 2 2\nP5* 9TA :"
    );
    assert_eq!(state.possible_moves(), vec![1]);
    state.play_card(1).unwrap();
    assert_eq!(
        state.verbose(),
        "P1  37 : 7\nP2  9T : 4 4\nP3  67 : 5 5\nP4  2A : 2 2\nP5* 9A : T"
    );

    let options = MonteCarloOptions::new(1000).anchored(state.active());
    let result = valuate_monte_carlo(&state, &mut rng, &options, None)
        .unwrap()
        .unwrap();
    assert_eq!((result.runs, result.total), (794, 45.0));
}

#[test]
fn alternative_lines_from_one_deal() {
    let opening = GameState::deal("102", 3, 3, 0, Deck::standard()).unwrap();
    assert_eq!(opening.to_string(), "*67K,66T,5QA");
    let moves = opening.possible_moves();
    assert_eq!(moves, vec![1, 2]);

    let lines = [
        (
            [moves[0], moves[1], moves[0]],
            "P1  6K : 7\nP2  66 : T\nP3* 5A : Q",
            (1600, 4521.0),
            13.0,
        ),
        (
            [moves[1], moves[0], moves[1]],
            "P1  67 : K\nP2  6T : 6 6\nP3* 5Q : A",
            (1355, 2763.0),
            0.0,
        ),
    ];
    for (plays, verbose, (runs, total), final_value) in lines {
        let mut state = opening.clone();
        for index in plays {
            state.play_card(index).unwrap();
        }
        assert_eq!(state.verbose(), verbose);

        let mut rng = SeededRng::from_seed_str("102");
        let options = MonteCarloOptions::new(1600).anchored(0);
        let result = valuate_monte_carlo(&state, &mut rng, &options, None)
            .unwrap()
            .unwrap();
        assert_eq!((result.runs, result.total), (runs, total));

        for _ in 0..state.player_count() {
            let moves = state.possible_moves();
            state.play_card(moves[0]).unwrap();
        }
        assert_eq!(valuate_static(&state, 0, false).unwrap(), final_value);
    }
}

#[test]
fn forced_move_keeps_the_valuation() {
    let mut rng = SeededRng::from_seed_str("128");
    let mut deck = Deck::first(26);
    let players = deal_with(&mut rng, &mut deck, 5, 3);
    let mut state = GameState::new(deck, players, 0).unwrap();
    for _ in 0..4 {
        let moves = state.possible_moves();
        state.play_card(random_move(&moves, &mut rng)).unwrap();
    }
    assert_eq!(
        state.verbose(),
        "P1  3J : Q\nP2  9T : A\nP3  8T : 3 3\nP4  9Q : 7 7\nP5* 57K :"
    );
    assert_eq!(state.possible_moves(), vec![0]);

    let options = MonteCarloOptions::new(1600).anchored(4);
    let before = valuate_monte_carlo(&state, &mut SeededRng::from_seed_str("129"), &options, None)
        .unwrap()
        .unwrap();
    assert_eq!((before.runs, before.total), (1031, 4608.0));

    state.play_card(0).unwrap();
    assert_eq!(
        state.verbose(),
        "P1  3J : Q\nP2* 9T : A\nP3  8T : 3 3\nP4  9Q : 7 7\nP5  7K : 5 5"
    );
    let after = valuate_monte_carlo(&state, &mut SeededRng::from_seed_str("129"), &options, None)
        .unwrap()
        .unwrap();
    assert_eq!((after.runs, after.total), (1031, 4608.0));
}

#[test]
fn single_run_samples_enumerate_hidden_hands() {
    let mut rng = SeededRng::from_seed_str("129");
    let mut deck = Deck::first(9);
    let players = deal_with(&mut rng, &mut deck, 3, 3);
    let mut state = GameState::new(deck, players, 0).unwrap();
    for _ in 0..3 {
        let moves = state.possible_moves();
        state.play_card(random_move(&moves, &mut rng)).unwrap();
    }
    assert_eq!(state.verbose(), "P1  58 : 9\nP2* 37 : T\nP3  46 : 2 2");

    let mut stream = SeededRng::from_seed_str("129");
    let single = MonteCarloOptions::new(1).anchored(0);
    let mut seen: Vec<(String, f64)> = Vec::new();
    for _ in 0..100 {
        let Some(result) = valuate_monte_carlo(&state, &mut stream, &single, None).unwrap() else {
            continue;
        };
        let key = result.last_sample.to_string();
        match seen.iter_mut().find(|(sample, _)| *sample == key) {
            Some(entry) => entry.1 = result.value,
            None => seen.push((key, result.value)),
        }
    }
    let expected: Vec<(String, f64)> = [
        ("58,*47,36", 0.0),
        ("58,*46,37", 5.0),
        ("58,*34,67", 0.0),
        ("58,*37,46", 0.0),
        ("58,*36,47", 5.0),
        ("58,*67,34", 0.0),
    ]
    .into_iter()
    .map(|(sample, value)| (sample.to_string(), value))
    .collect();
    assert_eq!(seen, expected);

    let options = MonteCarloOptions::new(400).anchored(0);
    let result = valuate_monte_carlo(&state, &mut stream, &options, None)
        .unwrap()
        .unwrap();
    assert_eq!((result.runs, result.total, result.value), (400, 665.0, 1.6625));
}

/// Fixed two-card hand for player 0 against four freshly dealt opponents.
fn two_card_total(seed: &str, runs: usize, first: usize) -> f64 {
    let mut rng = SeededRng::from_seed_str(seed);
    let mut deck = Deck::standard();
    let own: Vec<Card> = deck.draw_n(&mut rng, 2).unwrap();
    let mut total = 0.0;
    for _ in 0..runs {
        let mut table_deck = deck.clone();
        let mut players = vec![Player::new(own.clone())];
        players.extend(deal_with(&mut rng, &mut table_deck, 4, 2));
        let mut state = GameState::new(table_deck, players, first).unwrap();
        for _ in 0..5 {
            let moves = state.possible_moves();
            state.play_card(moves[0]).unwrap();
        }
        total += valuate_static(&state, 0, false).unwrap();
    }
    total
}

#[test]
fn two_card_simulations_accumulate_reference_totals() {
    assert_eq!(two_card_total("130", 1600, 1), 5552.0);
    assert_eq!(two_card_total("133", 1600, 1), 10216.0);
    assert_eq!(two_card_total("133", 1600, 0), 0.0);
    assert_eq!(two_card_total("126", 1600, 1), 3168.0);
}

#[test]
fn random_opening_tracks_position_index() {
    let mut state = GameState::deal("55", 4, 4, 0, Deck::standard()).unwrap();
    let mut rng = SeededRng::from_seed_str("55");
    let mut choices = Vec::new();
    for _ in 0..4 {
        let moves = state.possible_moves();
        let chosen = random_move(&moves, &mut rng);
        state.play_card(chosen).unwrap();
        choices.push((moves, chosen));
    }
    assert_eq!(
        choices,
        vec![
            (vec![1, 2, 3], 1),
            (vec![0, 3], 0),
            (vec![0, 2, 3], 2),
            (vec![0, 1, 3], 0),
        ]
    );
    assert_eq!(
        state.verbose(),
        "P1  28Q : 7\nP2  667 : 2 2\nP3* 368 : 7\nP4  8JJ : 4 4"
    );
    assert_eq!(state.calc_position_index(), 0);
    assert_eq!(state.trick(), None);
}

#[test]
fn position_index_counts_players_already_in_the_trick() {
    let mut state = GameState::deal("321", 4, 3, 0, Deck::standard()).unwrap();
    let mut observed = Vec::new();
    for _ in 0..3 {
        observed.push((
            state.active(),
            state.calc_position_index(),
            state.trick().map(|trick| trick.winner),
            state.to_string(),
        ));
        let moves = state.possible_moves();
        state.play_card(moves[0]).unwrap();
    }
    observed.push((
        state.active(),
        state.calc_position_index(),
        state.trick().map(|trick| trick.winner),
        state.to_string(),
    ));
    let expected = vec![
        (0, 0, None, "*79K,339,26A,39K".to_string()),
        (1, 1, Some(0), "7K,*339,26A,39K".to_string()),
        (2, 2, Some(0), "7K,39,*26A,39K".to_string()),
        (3, 3, Some(0), "7K,39,6A,*39K".to_string()),
    ];
    assert_eq!(observed, expected);
}

#[test]
fn clones_replay_identically_until_a_play_differs() {
    let opening = GameState::deal("123", 3, 3, 0, Deck::first(20)).unwrap();
    let mut left = opening.clone();
    let mut right = opening.clone();
    for _ in 0..3 {
        let moves = left.possible_moves();
        assert_eq!(moves, right.possible_moves());
        let index = *moves.last().unwrap();
        left.play_card(index).unwrap();
        right.play_card(index).unwrap();
    }
    assert_eq!(left.verbose(), right.verbose());
    assert_eq!(left, right);
    assert_eq!(opening.to_string(), "*357,68Q,346");

    let mut low = opening.clone();
    let mut high = opening.clone();
    assert_eq!(low.possible_moves(), vec![1, 2]);
    low.play_card(1).unwrap();
    high.play_card(2).unwrap();
    assert_ne!(low.verbose(), high.verbose());
    assert_ne!(low, high);
}
