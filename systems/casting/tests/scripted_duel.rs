use std::{collections::HashMap, time::Duration};

use gesture_cast_core::{
    ActorConfig, ActorId, ActorKind, ActorState, Command, Event, Point2, Polyline, Side, SpellId,
};
use gesture_cast_patterns::{densify, PatternConfig, PatternLibrary};
use gesture_cast_system_casting::Casting;
use gesture_cast_world::{self as world, query, SimulationConfig, World};

const TICKS: usize = 120;

fn line(points: &[(f32, f32)]) -> Polyline {
    points.iter().map(|&(x, y)| Point2::new(x, y)).collect()
}

fn config() -> ActorConfig {
    ActorConfig {
        cooldown: Duration::from_millis(40),
        tracing: Duration::from_millis(200),
        loading: Duration::from_millis(60),
        ..ActorConfig::default()
    }
}

fn run_duel(stroke: &[(f32, f32)]) -> Vec<Event> {
    let library = PatternLibrary::from_polylines(
        [(SpellId::Pudding, line(&[(0.0, 0.0), (1.0, 0.0)]))],
        PatternConfig::default(),
    )
    .expect("valid pattern");
    let mut world = World::new(SimulationConfig {
        sway_interval_ticks: 0,
        ..SimulationConfig::default()
    });
    let casting = Casting::default();
    let inputs = HashMap::new();
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::RegisterActor {
            side: Side::Protagonist,
            kind: ActorKind::Scripted {
                stroke: densify(&line(stroke), library.config().densify_step),
            },
            config: config(),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::RegisterActor {
            side: Side::Antagonist,
            kind: ActorKind::Interactive,
            config: config(),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    for _ in 0..TICKS {
        world::apply(&mut world, Command::Tick, &mut events);
        commands.clear();
        casting.handle(&query::actor_view(&world), &inputs, &library, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
    }
    events
}

fn transitions(events: &[Event], actor: ActorId) -> Vec<(ActorState, ActorState)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::StateEntered { actor: entered, from, to } if *entered == actor => {
                Some((*from, *to))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn matching_script_charges_and_fires_at_the_opponent() {
    let events = run_duel(&[(0.0, 0.0), (1.0, 0.0)]);
    let caster = ActorId::new(0);
    let opponent = ActorId::new(1);

    let cycle = transitions(&events, caster);
    assert!(cycle.len() >= 4, "cycle incomplete: {cycle:?}");
    assert_eq!(
        &cycle[..4],
        &[
            (ActorState::Idle, ActorState::Tracing),
            (ActorState::Tracing, ActorState::Loading),
            (ActorState::Loading, ActorState::Loaded),
            (ActorState::Loaded, ActorState::Idle),
        ]
    );

    let first_shot = events
        .iter()
        .find(|event| matches!(event, Event::ShotResolved { .. }));
    assert_eq!(
        first_shot,
        Some(&Event::ShotResolved {
            shooter: caster,
            target: opponent,
            spell: Some(SpellId::Pudding),
        })
    );
    assert!(transitions(&events, opponent).is_empty());
}

#[test]
fn perpendicular_script_never_charges() {
    let events = run_duel(&[(0.0, 0.0), (0.0, 1.0)]);
    let caster = ActorId::new(0);

    let cycle = transitions(&events, caster);
    assert!(cycle.len() >= 2, "trace never ended: {cycle:?}");
    assert!(cycle
        .iter()
        .all(|&(from, to)| to != ActorState::Loading && from != ActorState::Loading));
    assert_eq!(cycle[1], (ActorState::Tracing, ActorState::Idle));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ShotResolved { .. })));
}

#[test]
fn replay_is_deterministic() {
    let stroke = [(0.0, 0.0), (1.0, 0.0)];
    assert_eq!(run_duel(&stroke), run_duel(&stroke));
}
