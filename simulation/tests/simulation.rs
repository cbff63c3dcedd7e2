use std::{cell::RefCell, rc::Rc, time::Duration};

use nen_blaster_core::{
    ConfigError, Direction, Event, GameConfig, Outcome, RandomSource, SessionState, PLAYER_START,
};
use nen_blaster_simulation::{Simulation, MAX_CATCH_UP_TICKS};

const FUSE_TICKS: usize = 30;

fn lonely_config() -> GameConfig {
    GameConfig {
        enemy_count: 0,
        ..GameConfig::default()
    }
}

fn started(config: GameConfig, seed: u64) -> Simulation {
    let mut simulation = Simulation::seeded(config, seed).expect("valid configuration");
    let _ = simulation.start_session();
    simulation
}

fn record_outcomes(simulation: &mut Simulation) -> Rc<RefCell<Vec<Outcome>>> {
    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&outcomes);
    simulation.on_terminal_outcome(move |outcome| sink.borrow_mut().push(outcome));
    outcomes
}

#[test]
fn invalid_configuration_is_rejected_at_construction() {
    let config = GameConfig {
        tick_interval_ms: 0,
        ..GameConfig::default()
    };

    let result = Simulation::seeded(config, 1);

    assert!(matches!(result, Err(ConfigError::ZeroTickInterval)));
}

#[test]
fn actions_before_the_first_session_are_ignored() {
    let mut simulation = Simulation::seeded(GameConfig::default(), 3).expect("valid");

    assert!(simulation.move_player(Direction::East).is_empty());
    assert!(simulation.place_bomb().is_empty());
    assert!(simulation.tick().is_empty());
    assert_eq!(simulation.advance(Duration::from_secs(1)), 0);
    assert_eq!(simulation.state(), SessionState::Initializing);
}

#[test]
fn starting_a_session_loads_a_generated_level() {
    let mut simulation = Simulation::seeded(GameConfig::default(), 11).expect("valid");

    let events = simulation.start_session().to_vec();

    assert_eq!(
        events,
        vec![Event::SessionStarted {
            enemies: 4,
            allies: 3
        }]
    );
    let snapshot = simulation.snapshot();
    assert_eq!(snapshot.state, SessionState::Running);
    assert_eq!(snapshot.player.cell, PLAYER_START);
    assert_eq!((snapshot.grid.columns(), snapshot.grid.rows()), (15, 13));
    assert_eq!(snapshot.enemies.len(), 4);
    assert_eq!(snapshot.allies.len(), 3);
}

#[test]
fn self_bombing_ends_the_session_and_freezes_the_clock() {
    let mut simulation = started(lonely_config(), 5);
    let outcomes = record_outcomes(&mut simulation);
    assert_eq!(simulation.place_bomb().len(), 1);

    for _ in 0..FUSE_TICKS - 1 {
        let _ = simulation.tick();
    }
    assert!(simulation.state().is_running());
    let events = simulation.tick().to_vec();

    assert!(events.contains(&Event::SessionEnded {
        outcome: Outcome::Defeat
    }));
    assert_eq!(simulation.state(), SessionState::Ended(Outcome::Defeat));
    assert_eq!(*outcomes.borrow(), vec![Outcome::Defeat]);

    let frozen = simulation.snapshot();
    assert_eq!(frozen.tick_index, 30);
    for _ in 0..5 {
        assert!(simulation.tick().is_empty());
    }
    assert_eq!(simulation.advance(Duration::from_secs(2)), 0);
    assert!(simulation.move_player(Direction::South).is_empty());
    assert_eq!(simulation.snapshot(), frozen);
    assert_eq!(outcomes.borrow().len(), 1, "outcome fires exactly once");
}

#[test]
fn restart_begins_a_fresh_session_and_keeps_callbacks() {
    let mut simulation = started(lonely_config(), 8);
    let outcomes = record_outcomes(&mut simulation);
    let _ = simulation.place_bomb();
    for _ in 0..FUSE_TICKS {
        let _ = simulation.tick();
    }
    assert_eq!(simulation.state(), SessionState::Ended(Outcome::Defeat));

    let events = simulation.restart_session().to_vec();

    assert_eq!(
        events,
        vec![Event::SessionStarted {
            enemies: 0,
            allies: 3
        }]
    );
    let snapshot = simulation.snapshot();
    assert_eq!(snapshot.state, SessionState::Running);
    assert_eq!(snapshot.tick_index, 0);
    assert!(snapshot.bombs.is_empty());
    assert!(snapshot.explosions.is_empty());

    let _ = simulation.place_bomb();
    for _ in 0..FUSE_TICKS {
        let _ = simulation.tick();
    }
    assert_eq!(*outcomes.borrow(), vec![Outcome::Defeat, Outcome::Defeat]);
}

#[test]
fn advance_runs_whole_ticks_and_carries_the_remainder() {
    let mut simulation = started(lonely_config(), 2);

    assert_eq!(simulation.advance(Duration::from_millis(250)), 2);
    assert_eq!(simulation.snapshot().tick_index, 2);
    assert_eq!(simulation.advance(Duration::from_millis(40)), 0);
    assert_eq!(simulation.advance(Duration::from_millis(10)), 1);
    assert_eq!(simulation.snapshot().tick_index, 3);

    let advanced = simulation
        .events()
        .iter()
        .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
        .count();
    assert_eq!(advanced, 1);
}

#[test]
fn advance_caps_catch_up_and_drops_the_backlog() {
    let mut simulation = started(lonely_config(), 2);

    assert_eq!(
        simulation.advance(Duration::from_secs(10)),
        MAX_CATCH_UP_TICKS
    );
    assert_eq!(simulation.events().len(), MAX_CATCH_UP_TICKS);
    assert_eq!(simulation.advance(Duration::ZERO), 0, "backlog was dropped");
    assert_eq!(simulation.snapshot().tick_index, MAX_CATCH_UP_TICKS as u64);
}

#[test]
fn advance_stops_at_a_terminal_outcome() {
    let mut simulation = started(lonely_config(), 4);
    let _ = simulation.place_bomb();
    for _ in 0..FUSE_TICKS - 2 {
        let _ = simulation.tick();
    }

    let ran = simulation.advance(Duration::from_millis(500));

    assert_eq!(ran, 2, "ticks stop once the session ends");
    assert_eq!(simulation.state(), SessionState::Ended(Outcome::Defeat));
    assert_eq!(simulation.advance(Duration::from_millis(500)), 0);
}

#[test]
fn enemies_only_move_on_gated_ticks() {
    let mut simulation = started(GameConfig::default(), 21);

    for tick in 1..=40u64 {
        let events = simulation.tick().to_vec();
        if events.is_empty() {
            break;
        }
        let moved = events
            .iter()
            .any(|event| matches!(event, Event::EnemyMoved { .. }));
        if moved {
            assert_eq!(tick % 6, 1, "unexpected enemy pass on tick {tick}");
        }
    }
}

#[test]
fn identical_seeds_replay_identically() {
    let first = replay(77);
    let second = replay(77);

    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn different_seeds_generate_different_levels() {
    let first = started(GameConfig::default(), 1).snapshot();
    let second = started(GameConfig::default(), 2).snapshot();

    assert_ne!(first.grid, second.grid);
}

#[test]
fn custom_random_sources_drive_generation_and_wandering() {
    struct AlwaysFirst;

    impl RandomSource for AlwaysFirst {
        fn next_below(&mut self, _bound: usize) -> usize {
            0
        }

        fn chance(&mut self, _probability: f64) -> bool {
            false
        }
    }

    let run = || {
        let mut simulation = Simulation::new(GameConfig::default(), AlwaysFirst).expect("valid");
        let _ = simulation.start_session();
        let mut log = Vec::new();
        for _ in 0..12 {
            log.extend_from_slice(simulation.tick());
        }
        (log, simulation.snapshot())
    };

    let (first_log, first_snapshot) = run();
    let (second_log, second_snapshot) = run();

    assert!(first_snapshot.power_ups.is_empty());
    assert_eq!(first_log, second_log);
    assert_eq!(first_snapshot, second_snapshot);
}

fn replay(seed: u64) -> (Vec<Event>, nen_blaster_core::SessionSnapshot) {
    let mut simulation = started(GameConfig::default(), seed);
    let mut log = simulation.events().to_vec();
    let script = [
        Some(Direction::East),
        None,
        Some(Direction::South),
        Some(Direction::West),
        Some(Direction::North),
    ];

    for (index, step) in script.iter().cycle().take(90).enumerate() {
        if index % 17 == 0 {
            log.extend_from_slice(simulation.place_bomb());
        }
        if let Some(direction) = step {
            log.extend_from_slice(simulation.move_player(*direction));
        }
        log.extend_from_slice(simulation.tick());
    }

    (log, simulation.snapshot())
}
