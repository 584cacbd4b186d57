use std::time::Duration;

use pantheon_siege_core::{
    AgentId, AnimationKey, BatState, BodyRef, Command, EffectKind, EnemyKind, Event, Health,
    InputFrame, PlayerState, SkeletonState, TimerRole, Velocity, WorldPoint,
};
use pantheon_siege_world::{self as world, query, World};

fn apply(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tick(world: &mut World, ms: u64) -> Vec<Event> {
    apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(ms),
        },
    )
}

fn spawn(world: &mut World, kind: EnemyKind, x: f32, y: f32) -> AgentId {
    let events = apply(
        world,
        Command::SpawnEnemy {
            kind,
            position: WorldPoint::new(x, y),
        },
    );
    match events.as_slice() {
        [Event::EnemySpawned { agent, .. }] => *agent,
        other => panic!("expected EnemySpawned, got {other:?}"),
    }
}

fn submit(world: &mut World, input: InputFrame) {
    let events = apply(world, Command::SubmitInput { input });
    assert!(events.is_empty());
}

fn damage(world: &mut World, agent: AgentId, amount: u32) -> Vec<Event> {
    apply(world, Command::ApplyDamage { agent, amount })
}

#[test]
fn player_death_is_emitted_exactly_once() {
    let mut world = World::new();

    let events = apply(&mut world, Command::DamagePlayer { amount: 5 });
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::PlayerDied))
            .count(),
        1,
    );

    let player = query::player(&world);
    assert_eq!(player.state, PlayerState::Dead);
    assert_eq!(player.health, Health::new(0));
    assert_eq!(player.velocity, Velocity::ZERO);
    assert!(query::pending_timer_roles(&world, BodyRef::Player).is_empty());

    // Dead is terminal: repeated damage stays silent and input is ignored.
    assert!(apply(&mut world, Command::DamagePlayer { amount: 1 }).is_empty());
    submit(
        &mut world,
        InputFrame {
            right: true,
            ..InputFrame::default()
        },
    );
    let _ = tick(&mut world, 500);
    let player = query::player(&world);
    assert_eq!(player.state, PlayerState::Dead);
    assert_eq!(player.position, WorldPoint::new(150.0, 170.0));
}

#[test]
fn hit_stun_blocks_damage_until_recovery() {
    let mut world = World::new();
    let agent = spawn(&mut world, EnemyKind::Skeleton, 240.0, 170.0);

    let events = damage(&mut world, agent, 1);
    assert!(events.contains(&Event::AgentDamaged {
        agent,
        kind: EnemyKind::Skeleton,
        health: Health::new(3),
    }));
    assert_eq!(query::skeletons(&world)[0].state, SkeletonState::Hit);

    // A second hit lands inside the stun window and is ignored outright.
    assert!(damage(&mut world, agent, 1).is_empty());
    assert_eq!(query::skeletons(&world)[0].health, Health::new(3));

    // The stun arms its recovery and flash on the following tick.
    let _ = tick(&mut world, 16);
    assert_eq!(
        query::pending_timer_roles(&world, BodyRef::Agent(agent)),
        vec![TimerRole::HitRecovery, TimerRole::HitFlash],
    );

    let _ = tick(&mut world, 400);
    assert_eq!(query::skeletons(&world)[0].state, SkeletonState::Walk);
    assert!(!query::skeletons(&world)[0].flash_lit);

    // The killing blow releases the slot with the skeleton's death effect.
    let position = query::skeletons(&world)[0].position;
    let events = damage(&mut world, agent, 3);
    assert!(events.contains(&Event::EffectRequested {
        effect: EffectKind::Explosion,
        position: position.offset(-2.0, 3.0),
    }));
    assert!(events.contains(&Event::AgentDied {
        agent,
        kind: EnemyKind::Skeleton,
        position,
    }));
    assert!(query::skeletons(&world).is_empty());
    assert!(query::pending_timer_roles(&world, BodyRef::Agent(agent)).is_empty());

    // Stale reports against the released agent resolve to nothing.
    assert!(damage(&mut world, agent, 1).is_empty());
    let events = apply(
        &mut world,
        Command::NotifyAnimationFrame {
            subject: BodyRef::Agent(agent),
            animation: AnimationKey::SkeletonThrow,
            frame: 2,
        },
    );
    assert!(events.is_empty());
}

#[test]
fn slime_damage_has_no_invulnerability_window() {
    let mut world = World::new();
    let agent = spawn(&mut world, EnemyKind::Slime, 200.0, 170.0);

    for expected in [3, 2, 1] {
        let events = damage(&mut world, agent, 1);
        assert!(events.contains(&Event::AgentDamaged {
            agent,
            kind: EnemyKind::Slime,
            health: Health::new(expected),
        }));
    }

    let events = damage(&mut world, agent, 1);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::AgentDied { .. })));
    assert!(query::slimes(&world).is_empty());
}

#[test]
fn skeleton_throw_attack_anchors_and_resets() {
    let mut world = World::new();
    let agent = spawn(&mut world, EnemyKind::Skeleton, 240.0, 170.0);
    let mut log: Vec<Event> = Vec::new();

    // Walking inside throw range (distance 90, range at least 100) arms the
    // randomized windup; a full window later the attack is anchored.
    log.extend(tick(&mut world, 16));
    assert_eq!(
        query::pending_timer_roles(&world, BodyRef::Agent(agent)),
        vec![TimerRole::ThrowWindup],
    );

    log.extend(tick(&mut world, 2_500));
    let snapshot = query::skeletons(&world)[0];
    assert_eq!(snapshot.state, SkeletonState::ThrowAttack);
    assert_eq!(snapshot.anchor_x, 150.0);
    assert_eq!(snapshot.remaining_throws, 2);
    assert!(snapshot.ready_to_throw);
    assert_eq!(snapshot.velocity, Velocity::ZERO);

    // The designated animation frame releases exactly one bone and spends
    // one throw from the budget.
    log.extend(apply(
        &mut world,
        Command::NotifyAnimationFrame {
            subject: BodyRef::Agent(agent),
            animation: AnimationKey::SkeletonThrow,
            frame: 2,
        },
    ));
    assert_eq!(query::skeletons(&world)[0].remaining_throws, 1);
    assert_eq!(query::bones(&world).len(), 1);

    log.extend(apply(
        &mut world,
        Command::NotifyAnimationComplete {
            subject: BodyRef::Agent(agent),
            animation: AnimationKey::SkeletonThrow,
        },
    ));
    assert!(!query::skeletons(&world)[0].ready_to_throw);
    assert!(query::pending_timer_roles(&world, BodyRef::Agent(agent))
        .contains(&TimerRole::ThrowRest));

    // The player walking away from the anchor arms the reset window.
    submit(
        &mut world,
        InputFrame {
            right: true,
            ..InputFrame::default()
        },
    );
    log.extend(tick(&mut world, 1_000));
    log.extend(tick(&mut world, 16));
    assert!(query::pending_timer_roles(&world, BodyRef::Agent(agent))
        .contains(&TimerRole::ThrowReset));

    // Step the player back out so the reset lands outside punch range, then
    // let the reset window elapse: pursuit resumes with the budget restored.
    submit(
        &mut world,
        InputFrame {
            left: true,
            ..InputFrame::default()
        },
    );
    log.extend(tick(&mut world, 1_900));
    submit(&mut world, InputFrame::default());
    log.extend(tick(&mut world, 150));

    let snapshot = query::skeletons(&world)[0];
    assert_eq!(snapshot.state, SkeletonState::Walk);
    assert_eq!(snapshot.remaining_throws, 2);
    assert!(snapshot.ready_to_throw);

    let launches = log
        .iter()
        .filter(|event| matches!(event, Event::BoneLaunched { .. }))
        .count();
    let detonations = log
        .iter()
        .filter(|event| matches!(event, Event::BoneDetonated { .. }))
        .count();
    assert_eq!(launches, 1, "one bone per designated frame");
    assert_eq!(detonations, 1, "the arc completed during the scenario");
    assert!(query::bones(&world).is_empty());
}

#[test]
fn bat_recovers_from_two_hits_and_dies_on_the_third() {
    let mut world = World::new();
    let agent = spawn(&mut world, EnemyKind::Bat, 250.0, 60.0);
    let _ = tick(&mut world, 16);
    assert_eq!(query::bats(&world)[0].state, BatState::Fly);

    let events = damage(&mut world, agent, 1);
    assert!(events.contains(&Event::AgentDamaged {
        agent,
        kind: EnemyKind::Bat,
        health: Health::new(2),
    }));
    assert_eq!(query::bats(&world)[0].state, BatState::Hit);

    // Invulnerable while stunned.
    assert!(damage(&mut world, agent, 1).is_empty());

    let recovery = tick(&mut world, 250);
    assert!(recovery
        .iter()
        .any(|event| matches!(event, Event::FlashToggled { .. })));
    assert_eq!(query::bats(&world)[0].state, BatState::Fly);
    assert!(!query::bats(&world)[0].flash_lit);

    let _ = damage(&mut world, agent, 1);
    let _ = tick(&mut world, 250);
    assert_eq!(query::bats(&world)[0].health, Health::new(1));

    let position = query::bats(&world)[0].position;
    let events = damage(&mut world, agent, 1);
    assert!(events.contains(&Event::EffectRequested {
        effect: EffectKind::SmallExplosion,
        position,
    }));
    assert!(events.contains(&Event::AgentDied {
        agent,
        kind: EnemyKind::Bat,
        position,
    }));
    assert!(query::bats(&world).is_empty());
    assert!(query::pending_timer_roles(&world, BodyRef::Agent(agent)).is_empty());
}

#[test]
fn bat_dive_windup_arms_once_and_ground_contact_is_fatal() {
    let mut world = World::new();
    let agent = spawn(&mut world, EnemyKind::Bat, 150.0, 60.0);

    // Aligned above the player: one tick to commit, one to arm the windup.
    let _ = tick(&mut world, 16);
    assert_eq!(query::bats(&world)[0].state, BatState::Attack);

    let arm = tick(&mut world, 16);
    assert_eq!(
        arm.iter()
            .filter(|event| matches!(event, Event::DiveWindupStarted { .. }))
            .count(),
        1,
    );

    // Re-entering the attack handler does not stack a second windup.
    let rearm = tick(&mut world, 16);
    assert!(rearm
        .iter()
        .all(|event| !matches!(event, Event::DiveWindupStarted { .. })));
    assert_eq!(
        query::pending_timer_roles(&world, BodyRef::Agent(agent)),
        vec![TimerRole::DiveWindup],
    );

    // The windup elapses into the dive.
    let _ = tick(&mut world, 484);
    assert_eq!(query::bats(&world)[0].velocity.y(), 120.0);

    // Diving into the ground releases the bat with its death effect.
    let events = tick(&mut world, 1_000);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::AgentDied { agent: died, kind: EnemyKind::Bat, .. } if *died == agent)));
    assert!(query::bats(&world).is_empty());
    assert!(query::pending_timer_roles(&world, BodyRef::Agent(agent)).is_empty());
}

#[test]
fn ground_contact_reports_only_fell_bats() {
    let mut world = World::new();
    let skeleton = spawn(&mut world, EnemyKind::Skeleton, 220.0, 170.0);
    let bat = spawn(&mut world, EnemyKind::Bat, 250.0, 60.0);

    assert!(apply(&mut world, Command::NotifyGroundContact { agent: skeleton }).is_empty());
    assert_eq!(query::skeletons(&world).len(), 1);

    let events = apply(&mut world, Command::NotifyGroundContact { agent: bat });
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::AgentDied { agent, .. } if *agent == bat)));
    assert!(query::bats(&world).is_empty());
}

#[test]
fn roll_has_a_fixed_duration_and_cooldown() {
    let mut world = World::new();
    let dash = InputFrame {
        right: true,
        dash: true,
        dash_pressed: true,
        ..InputFrame::default()
    };

    submit(&mut world, dash);
    let _ = tick(&mut world, 16);
    let player = query::player(&world);
    assert_eq!(player.state, PlayerState::Roll);
    assert_eq!(player.velocity, Velocity::new(75.0, 0.0));

    submit(&mut world, InputFrame::default());
    let _ = tick(&mut world, 400);
    let player = query::player(&world);
    assert_eq!(player.state, PlayerState::Idle);
    assert_eq!(player.velocity, Velocity::ZERO);

    // Rolling again inside the cooldown falls through to a plain walk.
    submit(&mut world, dash);
    let _ = tick(&mut world, 16);
    assert_eq!(query::player(&world).state, PlayerState::Idle);

    submit(&mut world, InputFrame::default());
    let _ = tick(&mut world, 500);

    submit(&mut world, dash);
    let _ = tick(&mut world, 16);
    assert_eq!(query::player(&world).state, PlayerState::Roll);
}

#[test]
fn fire_animation_completion_launches_arrows() {
    let mut world = World::new();

    submit(
        &mut world,
        InputFrame {
            fire: true,
            ..InputFrame::default()
        },
    );
    let _ = tick(&mut world, 16);
    let player = query::player(&world);
    assert_eq!(player.fire_aim.map(|aim| aim.animation()), Some(AnimationKey::PlayerFireStand));
    assert_eq!(player.velocity, Velocity::ZERO);

    let events = apply(
        &mut world,
        Command::NotifyAnimationComplete {
            subject: BodyRef::Player,
            animation: AnimationKey::PlayerFireStand,
        },
    );
    assert!(events.contains(&Event::ArrowFired {
        agent: query::arrows(&world)[0].agent,
        position: WorldPoint::new(153.0, 169.0),
        velocity: Velocity::new(250.0, 0.0),
    }));

    // The arrow flies off the right edge and releases.
    let events = tick(&mut world, 1_000);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ArrowExpired { .. })));
    assert!(query::arrows(&world).is_empty());

    // Upward aim launches vertically.
    submit(
        &mut world,
        InputFrame {
            fire: true,
            up: true,
            ..InputFrame::default()
        },
    );
    let _ = tick(&mut world, 16);
    let events = apply(
        &mut world,
        Command::NotifyAnimationComplete {
            subject: BodyRef::Player,
            animation: AnimationKey::PlayerFireUp,
        },
    );
    assert!(events.contains(&Event::ArrowFired {
        agent: query::arrows(&world)[0].agent,
        position: WorldPoint::new(150.0, 168.0),
        velocity: Velocity::new(0.0, -250.0),
    }));
    let _ = tick(&mut world, 1_000);
    assert!(query::arrows(&world).is_empty());

    // A completion that arrives after the fire key lifted releases nothing.
    submit(&mut world, InputFrame::default());
    let events = apply(
        &mut world,
        Command::NotifyAnimationComplete {
            subject: BodyRef::Player,
            animation: AnimationKey::PlayerFireStand,
        },
    );
    assert!(events.is_empty());
}

#[test]
fn pools_bound_simultaneous_agents_and_never_reuse_ids() {
    let mut world = World::new();
    let mut spawned: Vec<AgentId> = Vec::new();
    let mut forfeited = 0;

    for _ in 0..11 {
        let events = apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Slime,
                position: WorldPoint::new(300.0, 170.0),
            },
        );
        match events.as_slice() {
            [Event::EnemySpawned { agent, .. }] => spawned.push(*agent),
            [Event::SpawnForfeited {
                kind: EnemyKind::Slime,
            }] => forfeited += 1,
            other => panic!("unexpected spawn outcome: {other:?}"),
        }
    }

    assert_eq!(spawned.len(), 8);
    assert_eq!(forfeited, 3);
    assert_eq!(query::slimes(&world).len(), 8);

    // Releasing a slot lets a new activation in under a fresh id.
    let retired = spawned[0];
    let _ = damage(&mut world, retired, 4);
    let replacement = spawn(&mut world, EnemyKind::Slime, 20.0, 170.0);
    assert!(spawned.iter().all(|id| *id != replacement));

    // The retired id stays dead even though its slot is live again.
    assert!(damage(&mut world, retired, 1).is_empty());
    assert_eq!(query::slimes(&world).len(), 8);
}

#[test]
fn agent_view_spans_every_active_kind() {
    let mut world = World::new();
    let skeleton = spawn(&mut world, EnemyKind::Skeleton, 240.0, 170.0);
    let bat = spawn(&mut world, EnemyKind::Bat, 250.0, 60.0);

    let view = query::agents(&world);
    assert!(view.contains(skeleton));
    assert!(view.contains(bat));
    assert_eq!(view.iter().count(), 2);
    assert!(!view.contains(AgentId::new(999)));
}
