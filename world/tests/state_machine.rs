use std::time::Duration;

use gesture_cast_core::{
    ActorConfig, ActorId, ActorKind, ActorState, Command, Cue, Event, ParticleKind, Point2,
    Polyline, Side, SpellId, SpellMatch,
};
use gesture_cast_world::{self as world, query, SimulationConfig, World};

const TICK: Duration = Duration::from_millis(20);

fn still_world() -> World {
    World::new(SimulationConfig {
        tick: TICK,
        sway_interval_ticks: 0,
        ..SimulationConfig::default()
    })
}

fn quick_config() -> ActorConfig {
    ActorConfig {
        cooldown: Duration::from_millis(40),
        tracing: Duration::from_millis(60),
        loading: Duration::from_millis(60),
        min_sample_spacing: 0.25,
        sample_cadence: 1,
        spark_cadence: 1,
    }
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn register(world: &mut World, side: Side, kind: ActorKind, config: ActorConfig) -> ActorId {
    let events = run(world, Command::RegisterActor { side, kind, config });
    match events.as_slice() {
        [Event::ActorRegistered { actor, .. }] => *actor,
        other => panic!("unexpected registration events: {other:?}"),
    }
}

fn state(world: &World, actor: ActorId) -> ActorState {
    query::actor(world, actor).expect("registered").state
}

fn scripted(points: &[(f32, f32)]) -> ActorKind {
    ActorKind::Scripted {
        stroke: points.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
    }
}

fn transition(actor: ActorId, to: ActorState) -> Command {
    Command::Transition { actor, to }
}

#[test]
fn registration_assigns_sequential_ids_and_sides() {
    let mut world = still_world();
    assert_eq!(query::next_actor_id(&world), ActorId::new(0));
    let hero = register(&mut world, Side::Protagonist, ActorKind::Interactive, quick_config());
    let villain = register(&mut world, Side::Antagonist, scripted(&[(0.0, 0.0)]), quick_config());
    let minion = register(&mut world, Side::Antagonist, scripted(&[(0.0, 0.0)]), quick_config());

    assert_eq!(hero, ActorId::new(0));
    assert_eq!(villain, ActorId::new(1));
    assert_eq!(minion, ActorId::new(2));
    assert_eq!(query::next_actor_id(&world), ActorId::new(3));
    assert_eq!(query::first_actor(&world, Side::Antagonist), Some(villain));
    assert_eq!(query::first_actor(&world, Side::Protagonist), Some(hero));

    let view = query::actor_view(&world);
    assert_eq!(view.iter().count(), 3);
    assert!(view.iter().all(|snapshot| snapshot.state == ActorState::Idle));
}

#[test]
fn cooldown_is_ready_after_the_first_tick() {
    let mut world = still_world();
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, quick_config());

    assert!(!query::actor(&world, actor).expect("registered").cooldown_elapsed);
    let _ = run(&mut world, Command::Tick);
    assert!(query::actor(&world, actor).expect("registered").cooldown_elapsed);
}

#[test]
fn transitions_to_the_current_state_are_silent() {
    let mut world = still_world();
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, quick_config());

    assert!(run(&mut world, transition(actor, ActorState::Idle)).is_empty());
    assert_eq!(state(&world, actor), ActorState::Idle);
}

#[test]
fn transitions_outside_the_table_are_ignored() {
    let mut world = still_world();
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, quick_config());

    assert!(run(&mut world, transition(actor, ActorState::Loaded)).is_empty());
    assert!(run(&mut world, transition(actor, ActorState::Loading)).is_empty());
    assert_eq!(state(&world, actor), ActorState::Idle);

    let _ = run(&mut world, transition(actor, ActorState::Tracing));
    assert!(
        run(&mut world, transition(actor, ActorState::Idle)).is_empty(),
        "a trace only ends through its verdict"
    );
    assert_eq!(state(&world, actor), ActorState::Tracing);
}

#[test]
fn commands_for_unknown_actors_are_ignored() {
    let mut world = still_world();
    let ghost = ActorId::new(7);

    assert!(run(&mut world, transition(ghost, ActorState::Tracing)).is_empty());
    assert!(run(
        &mut world,
        Command::ConcludeTrace {
            actor: ghost,
            release: None,
            verdict: SpellMatch::Unrecognized,
        }
    )
    .is_empty());
    assert!(query::actor(&world, ghost).is_none());
}

#[test]
fn interactive_samples_respect_minimum_spacing() {
    let mut world = still_world();
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, quick_config());
    let entered = run(&mut world, transition(actor, ActorState::Tracing));
    assert_eq!(
        entered,
        vec![Event::StateEntered {
            actor,
            from: ActorState::Idle,
            to: ActorState::Tracing,
        }]
    );

    for x in [0.0, 0.1, 0.3, 0.4, 0.6] {
        let _ = run(
            &mut world,
            Command::SamplePointer {
                actor,
                position: Point2::new(x, 0.0),
            },
        );
    }

    let captured = query::captured(&world, actor).expect("registered");
    assert_eq!(
        captured.points(),
        &[
            Point2::new(0.0, 0.0),
            Point2::new(0.3, 0.0),
            Point2::new(0.6, 0.0)
        ]
    );
}

#[test]
fn sample_cadence_only_considers_every_nth_pointer_sample() {
    let mut world = still_world();
    let config = ActorConfig {
        min_sample_spacing: 0.0,
        sample_cadence: 3,
        spark_cadence: 2,
        ..quick_config()
    };
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, config);
    let _ = run(&mut world, transition(actor, ActorState::Tracing));

    let mut sparks = 0;
    for step in 0..7 {
        let events = run(
            &mut world,
            Command::SamplePointer {
                actor,
                position: Point2::new(step as f32, 0.0),
            },
        );
        sparks += events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::ParticleEmitted {
                        kind: ParticleKind::Spark,
                        ..
                    }
                )
            })
            .count();
    }

    let captured = query::captured(&world, actor).expect("registered");
    assert_eq!(
        captured.points(),
        &[
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(6.0, 0.0)
        ]
    );
    assert_eq!(sparks, 4);
}

#[test]
fn samples_outside_tracing_are_dropped() {
    let mut world = still_world();
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, quick_config());

    let events = run(
        &mut world,
        Command::SamplePointer {
            actor,
            position: Point2::new(1.0, 1.0),
        },
    );

    assert!(events.is_empty());
    assert!(query::captured(&world, actor).expect("registered").is_empty());
}

#[test]
fn entering_tracing_clears_the_previous_trace() {
    let mut world = still_world();
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, quick_config());

    let _ = run(&mut world, transition(actor, ActorState::Tracing));
    let _ = run(
        &mut world,
        Command::SamplePointer {
            actor,
            position: Point2::new(2.0, 2.0),
        },
    );
    let _ = run(
        &mut world,
        Command::ConcludeTrace {
            actor,
            release: None,
            verdict: SpellMatch::Unrecognized,
        },
    );
    assert_eq!(query::captured(&world, actor).expect("registered").len(), 1);

    let _ = run(&mut world, transition(actor, ActorState::Tracing));
    assert!(query::captured(&world, actor).expect("registered").is_empty());
}

#[test]
fn release_point_bypasses_the_sampling_gates() {
    let mut world = still_world();
    let config = ActorConfig {
        sample_cadence: 4,
        ..quick_config()
    };
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, config);
    let _ = run(&mut world, transition(actor, ActorState::Tracing));
    for x in 0..=5 {
        let _ = run(
            &mut world,
            Command::SamplePointer {
                actor,
                position: Point2::new(x as f32, 0.0),
            },
        );
    }

    let events = run(
        &mut world,
        Command::ConcludeTrace {
            actor,
            release: Some(Point2::new(4.1, 0.0)),
            verdict: SpellMatch::Unrecognized,
        },
    );

    assert_eq!(
        events,
        vec![Event::StateEntered {
            actor,
            from: ActorState::Tracing,
            to: ActorState::Idle,
        }]
    );
    let captured = query::captured(&world, actor).expect("registered");
    assert_eq!(
        captured.points(),
        &[
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.1, 0.0)
        ]
    );
}

#[test]
fn release_point_is_ignored_outside_tracing() {
    let mut world = still_world();
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, quick_config());

    let events = run(
        &mut world,
        Command::ConcludeTrace {
            actor,
            release: Some(Point2::new(1.0, 1.0)),
            verdict: SpellMatch::Unrecognized,
        },
    );

    assert!(events.is_empty());
    assert!(query::captured(&world, actor).expect("registered").is_empty());
}

#[test]
fn scripted_actor_replays_its_stroke_point_by_point() {
    let mut world = still_world();
    let stroke = [(0.0, 0.0), (0.5, 0.0), (1.0, 0.0)];
    let actor = register(&mut world, Side::Antagonist, scripted(&stroke), quick_config());
    let _ = run(&mut world, transition(actor, ActorState::Tracing));

    assert!(
        run(&mut world, Command::AdvanceScript { actor }).is_empty(),
        "the first micro-step has not elapsed yet"
    );

    for (index, &(x, y)) in stroke.iter().enumerate() {
        let _ = run(&mut world, Command::Tick);
        let snapshot = query::actor(&world, actor).expect("registered");
        assert!(snapshot.tracing_elapsed);
        assert!(!snapshot.script_exhausted);

        let events = run(&mut world, Command::AdvanceScript { actor });
        assert_eq!(
            events,
            vec![Event::ParticleEmitted {
                actor,
                kind: ParticleKind::SpellStep,
                position: Point2::new(x, y),
            }]
        );
        assert_eq!(
            query::captured(&world, actor).expect("registered").len(),
            index + 1
        );
    }

    let snapshot = query::actor(&world, actor).expect("registered");
    assert!(snapshot.script_exhausted);
    assert!(!snapshot.tracing_elapsed);
    let _ = run(&mut world, Command::Tick);
    assert!(query::actor(&world, actor).expect("registered").tracing_elapsed);
    assert!(run(&mut world, Command::AdvanceScript { actor }).is_empty());

    let expected: Polyline = stroke.iter().map(|&(x, y)| Point2::new(x, y)).collect();
    assert_eq!(query::captured(&world, actor), Some(&expected));
}

#[test]
fn unrecognized_trace_returns_to_idle_without_loading() {
    let mut world = still_world();
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, quick_config());
    let _ = run(&mut world, transition(actor, ActorState::Tracing));

    let events = run(
        &mut world,
        Command::ConcludeTrace {
            actor,
            release: None,
            verdict: SpellMatch::Unrecognized,
        },
    );

    assert_eq!(
        events,
        vec![Event::StateEntered {
            actor,
            from: ActorState::Tracing,
            to: ActorState::Idle,
        }]
    );
    let snapshot = query::actor(&world, actor).expect("registered");
    assert_eq!(snapshot.state, ActorState::Idle);
    assert!(snapshot.loading_elapsed, "no loading timer is armed");
    assert_eq!(snapshot.loaded_spell, None);
}

#[test]
fn recognized_spell_charges_and_resolves_against_the_first_opponent() {
    let mut world = still_world();
    let caster = register(&mut world, Side::Protagonist, scripted(&[(0.0, 0.0)]), quick_config());
    let first_foe = register(&mut world, Side::Antagonist, ActorKind::Interactive, quick_config());
    let _ = register(&mut world, Side::Antagonist, ActorKind::Interactive, quick_config());

    let _ = run(&mut world, transition(caster, ActorState::Tracing));
    let events = run(
        &mut world,
        Command::ConcludeTrace {
            actor: caster,
            release: None,
            verdict: SpellMatch::Recognized(SpellId::Frog),
        },
    );
    assert_eq!(
        events,
        vec![
            Event::StateEntered {
                actor: caster,
                from: ActorState::Tracing,
                to: ActorState::Loading,
            },
            Event::CuePlayed {
                actor: caster,
                cue: Cue::Recognized,
            },
        ]
    );
    let snapshot = query::actor(&world, caster).expect("registered");
    assert_eq!(snapshot.loaded_spell, Some(SpellId::Frog));
    assert!(!snapshot.loading_elapsed);

    for _ in 0..2 {
        let _ = run(&mut world, Command::Tick);
        assert!(!query::actor(&world, caster).expect("registered").loading_elapsed);
    }
    let _ = run(&mut world, Command::Tick);
    assert!(query::actor(&world, caster).expect("registered").loading_elapsed);

    let _ = run(&mut world, transition(caster, ActorState::Loaded));
    let snapshot = query::actor(&world, caster).expect("registered");
    assert_eq!(snapshot.state, ActorState::Loaded);
    assert!(!snapshot.cooldown_elapsed, "loading re-arms the cooldown");

    let events = run(&mut world, transition(caster, ActorState::Idle));
    assert_eq!(
        events,
        vec![
            Event::StateEntered {
                actor: caster,
                from: ActorState::Loaded,
                to: ActorState::Idle,
            },
            Event::ShotResolved {
                shooter: caster,
                target: first_foe,
                spell: Some(SpellId::Frog),
            },
            Event::CuePlayed {
                actor: caster,
                cue: Cue::Shot,
            },
        ]
    );
    let snapshot = query::actor(&world, caster).expect("registered");
    assert_eq!(snapshot.loaded_spell, None);
    assert!(!snapshot.cooldown_elapsed);
}

#[test]
fn shot_without_opponent_still_returns_to_idle() {
    let mut world = still_world();
    let caster = register(&mut world, Side::Antagonist, scripted(&[(0.0, 0.0)]), quick_config());

    let _ = run(&mut world, transition(caster, ActorState::Tracing));
    let _ = run(
        &mut world,
        Command::ConcludeTrace {
            actor: caster,
            release: None,
            verdict: SpellMatch::Recognized(SpellId::Darkness),
        },
    );
    let _ = run(&mut world, transition(caster, ActorState::Loaded));
    let events = run(&mut world, transition(caster, ActorState::Idle));

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ShotResolved { .. })));
    assert!(events.contains(&Event::CuePlayed {
        actor: caster,
        cue: Cue::Shot,
    }));
    let snapshot = query::actor(&world, caster).expect("registered");
    assert_eq!(snapshot.state, ActorState::Idle);
    assert_eq!(snapshot.loaded_spell, None);
}

#[test]
fn wand_sway_alternates_with_the_counter_phase() {
    let mut world = World::new(SimulationConfig {
        tick: TICK,
        sway_interval_ticks: 2,
        sway_degrees: 5,
        ..SimulationConfig::default()
    });
    let actor = register(&mut world, Side::Protagonist, ActorKind::Interactive, quick_config());

    let mut swings = Vec::new();
    for _ in 0..20 {
        for event in run(&mut world, Command::Tick) {
            if let Event::WandSwayed { actor: swayed, degrees } = event {
                assert_eq!(swayed, actor);
                swings.push(degrees);
            }
        }
    }

    assert_eq!(swings, vec![5, 5, 5, 5, -5, -5, -5, -5, -5, 5]);
    assert_eq!(query::tick_index(&world), 20);
}

#[test]
fn timers_are_released_when_traces_end() {
    let mut world = still_world();
    let actor = register(&mut world, Side::Antagonist, scripted(&[(0.0, 0.0)]), quick_config());
    let baseline = query::live_timers(&world);

    let _ = run(&mut world, transition(actor, ActorState::Tracing));
    assert_eq!(query::live_timers(&world), baseline + 1);

    let _ = run(
        &mut world,
        Command::ConcludeTrace {
            actor,
            release: None,
            verdict: SpellMatch::Unrecognized,
        },
    );
    assert_eq!(query::live_timers(&world), baseline);
}
