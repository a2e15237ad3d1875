//! Game master scenarios.
//!
//! Tables are seated from the unshuffled deck so roles are known:
//! with 10 seats, wolves sit at 0-2, then Seer 3, Witch 4, Hunter 5,
//! Guard 6 and Villagers 7-9. With 8 seats, wolves sit at 0-1, then
//! Seer 2, Witch 3, Hunter 4, Guard 5 and Villagers 6-7.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use rust_werewolf::core::{
    ActionDecision, BadgeTransferPolicy, GameConfig, Phase, Reaction, SpeechKind, Team, VoteKind,
};
use rust_werewolf::decision::{channel, Answer, DecisionSource, Prompt, RandomSource, RequestTag, ScriptedSource};
use rust_werewolf::events::{DeathCause, EventLog, GameEvent};
use rust_werewolf::rules::VoteOutcome;
use rust_werewolf::{GameMaster, RoleDeck};

fn seated(config: GameConfig, sources: Vec<Arc<dyn DecisionSource>>) -> (GameMaster, EventLog) {
    let deck = RoleDeck::for_players(config.player_count).unwrap();
    let log = EventLog::new();
    let master = GameMaster::with_deck(config, deck, sources)
        .unwrap()
        .with_observer(log.clone());
    (master, log)
}

fn eliminations(log: &EventLog) -> Vec<(u8, DeathCause)> {
    log.events_of("elimination")
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::Elimination { seat, cause } => Some((seat.0, cause)),
            _ => None,
        })
        .collect()
}

async fn step_until(master: &mut GameMaster, phase: Phase) {
    while master.state().phase != phase && !master.is_over() {
        master.step().await;
    }
}

#[tokio::test]
async fn test_guarded_night_then_villager_win() {
    init_tracing();
    let mut s = scripts(10);
    // Night 1: pack and guard both on the Hunter.
    edit(&mut s, &[0, 1, 2], |x| x.with_action(1, target(5)));
    edit(&mut s, &[6], |x| x.with_action(1, target(5)));
    // Night 2: the Witch poisons seat 0.
    edit(&mut s, &[4], |x| x.with_action(2, ActionDecision::Poison(seat(0))));
    // Day 1 votes out seat 1, day 2 votes out seat 2.
    edit(&mut s, &[0, 2, 3, 4, 5, 6, 7, 8, 9], |x| {
        x.with_vote(1, VoteKind::Elimination, vote_for(1))
    });
    edit(&mut s, &[3, 4, 5, 6, 7, 8, 9], |x| {
        x.with_vote(2, VoteKind::Elimination, vote_for(2))
    });

    let (mut master, log) = seated(GameConfig::default(), boxed(s));
    let winner = master.run().await;

    assert_eq!(winner, Some(Team::Villager));
    assert_eq!(master.state().phase, Phase::GameEnd);
    assert!(master.state().is_alive(seat(5)));
    assert_eq!(
        eliminations(&log),
        vec![(1, DeathCause::Vote), (0, DeathCause::Poison), (2, DeathCause::Vote)]
    );

    let dawns: Vec<_> = log
        .events_of("dawn")
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::Dawn { deaths } => Some(deaths.to_vec()),
            _ => None,
        })
        .collect();
    assert_eq!(dawns, vec![vec![], vec![seat(0)]]);

    assert_eq!(log.rounds(), vec![1, 2]);
    assert_eq!(log.ended(), Some(Some(Team::Villager)));
    assert_eq!(log.events_of("game-end").len(), 1);
    assert!(log.events_of("failure").is_empty());
    assert!(!master.state().players[seat(4)].witch_has_poison);
}

#[tokio::test]
async fn test_first_day_elimination_keeps_game_going() {
    let mut s = scripts(10);
    edit(&mut s, &[0, 2, 3, 4, 5, 6, 7, 8, 9], |x| {
        x.with_vote(1, VoteKind::Elimination, vote_for(1))
    });
    let (mut master, _log) = seated(GameConfig::default(), boxed(s));

    master.run_rounds(1).await;

    assert!(!master.is_over());
    assert_eq!(master.winner(), None);
    assert_eq!(master.state().round, 2);
    assert_eq!(master.state().phase, Phase::NightStart);
    assert!(!master.state().is_alive(seat(1)));
}

#[tokio::test]
async fn test_double_save_survives() {
    let mut s = scripts(10);
    edit(&mut s, &[0, 1, 2, 6], |x| x.with_action(1, target(7)));
    edit(&mut s, &[4], |x| x.with_action(1, ActionDecision::Antidote));
    let (mut master, log) = seated(GameConfig::default(), boxed(s));

    step_until(&mut master, Phase::DayStart).await;

    assert!(master.state().is_alive(seat(7)));
    assert!(master.state().last_night_deaths.is_empty());
    assert!(eliminations(&log).is_empty());
    assert!(!master.state().players[seat(4)].witch_has_antidote);
    assert!(master.state().players[seat(4)].witch_has_poison);
    assert_eq!(master.state().players[seat(6)].guard_last_target, Some(seat(7)));
}

#[tokio::test]
async fn test_poison_kills_through_guard() {
    let mut s = scripts(10);
    edit(&mut s, &[6], |x| x.with_action(1, target(8)));
    edit(&mut s, &[4], |x| x.with_action(1, ActionDecision::Poison(seat(8))));
    let (mut master, log) = seated(GameConfig::default(), boxed(s));

    step_until(&mut master, Phase::DayStart).await;

    assert!(!master.state().is_alive(seat(8)));
    assert_eq!(eliminations(&log), vec![(8, DeathCause::Poison)]);
}

#[tokio::test]
async fn test_guard_repeat_is_skipped() {
    let mut s = scripts(10);
    edit(&mut s, &[6], |x| x.with_action(1, target(7)).with_action(2, target(7)));
    edit(&mut s, &[0, 1, 2], |x| x.with_action(2, target(7)));
    let (mut master, log) = seated(GameConfig::default(), boxed(s));

    master.run_rounds(1).await;
    step_until(&mut master, Phase::DayStart).await;

    // Second protection of seat 7 was refused, so the attack landed.
    assert!(!master.state().is_alive(seat(7)));
    assert_eq!(eliminations(&log), vec![(7, DeathCause::WolfAttack)]);
    assert_eq!(master.state().players[seat(6)].guard_last_target, None);
}

#[tokio::test]
async fn test_poisoned_hunter_shoots_before_speeches() {
    let mut s = scripts(10);
    edit(&mut s, &[4], |x| x.with_action(1, ActionDecision::Poison(seat(5))));
    edit(&mut s, &[5], |x| x.with_action(1, target(0)));
    let config = GameConfig::default().with_badge_election(false);
    let (mut master, log) = seated(config, boxed(s));

    step_until(&mut master, Phase::DayStart).await;
    assert!(!master.state().is_alive(seat(5)));
    assert_eq!(master.state().reactions.front(), Some(&Reaction::HunterShoot(seat(5))));

    assert_eq!(master.step().await, Phase::HunterShoot);
    assert_eq!(master.step().await, Phase::DayLastWords);
    assert!(!master.state().is_alive(seat(0)));
    assert!(!master.state().players[seat(5)].hunter_can_shoot);
    assert_eq!(
        eliminations(&log),
        vec![(5, DeathCause::Poison), (0, DeathCause::HunterShot)]
    );

    assert_eq!(master.step().await, Phase::DaySpeech);
    let last_words: Vec<u8> = master
        .state()
        .transcript
        .iter()
        .filter(|s| s.kind == SpeechKind::LastWords)
        .map(|s| s.seat.0)
        .collect();
    assert_eq!(last_words, vec![5, 0]);
}

#[tokio::test]
async fn test_poisoned_hunter_can_be_silenced() {
    let mut s = scripts(10);
    edit(&mut s, &[4], |x| x.with_action(1, ActionDecision::Poison(seat(5))));
    edit(&mut s, &[5], |x| x.with_action(1, target(0)));
    let config = GameConfig::default()
        .with_badge_election(false)
        .with_hunter_shoots_when_poisoned(false);
    let (mut master, _log) = seated(config, boxed(s));

    step_until(&mut master, Phase::DayStart).await;
    assert!(master.state().reactions.is_empty());
    assert_eq!(master.step().await, Phase::DayLastWords);
    assert!(master.state().is_alive(seat(0)));
}

fn transitions(log: &EventLog) -> Vec<(Phase, Phase)> {
    log.events_of("phase-changed")
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::PhaseChanged { from, to, .. } => Some((from, to)),
            _ => None,
        })
        .collect()
}

/// 8 seats. Night 1 the pack takes seat 6 and the Witch poisons seat 7,
/// leaving two wolves against the Seer, Witch, Hunter and Guard.
fn thinned_table() -> Vec<ScriptedSource> {
    let mut s = scripts(8);
    edit(&mut s, &[0, 1], |x| x.with_action(1, target(6)));
    edit(&mut s, &[3], |x| x.with_action(1, ActionDecision::Poison(seat(7))));
    s
}

#[tokio::test]
async fn test_night_win_drops_hunter_shot() {
    let mut s = thinned_table();
    edit(&mut s, &[0, 1, 3, 4, 5], |x| {
        x.with_vote(1, VoteKind::Elimination, vote_for(2))
    });
    edit(&mut s, &[0, 1], |x| x.with_action(2, target(4)));
    edit(&mut s, &[4], |x| x.with_action(2, target(0)));
    let config = GameConfig::default().with_player_count(8);
    let (mut master, log) = seated(config, boxed(s));

    let winner = master.run().await;

    assert_eq!(winner, Some(Team::Wolf));
    assert_eq!(master.state().phase, Phase::GameEnd);
    assert_eq!(master.state().round, 2);
    assert!(master.state().reactions.is_empty());
    assert!(master.state().last_words.is_empty());
    assert!(master.state().is_alive(seat(0)));
    assert!(master.state().players[seat(4)].hunter_can_shoot);

    let phases = transitions(&log);
    assert_eq!(phases.last(), Some(&(Phase::NightResolve, Phase::GameEnd)));
    assert!(phases.iter().all(|(_, to)| *to != Phase::HunterShoot));
    assert!(log.events_of("hunter-shot").is_empty());
    assert_eq!(
        eliminations(&log),
        vec![
            (6, DeathCause::WolfAttack),
            (7, DeathCause::Poison),
            (2, DeathCause::Vote),
            (4, DeathCause::WolfAttack),
        ]
    );
}

#[tokio::test]
async fn test_hunter_shot_win_drops_last_words() {
    let mut s = thinned_table();
    edit(&mut s, &[0, 1, 2, 3, 5], |x| {
        x.with_vote(1, VoteKind::Elimination, vote_for(4))
    });
    edit(&mut s, &[4], |x| x.with_action(1, target(2)));
    let config = GameConfig::default().with_player_count(8);
    let (mut master, log) = seated(config, boxed(s));

    let winner = master.run().await;

    // The shot leaves two wolves against the Witch and the Guard.
    assert_eq!(winner, Some(Team::Wolf));
    assert_eq!(master.state().round, 1);
    assert!(master.state().last_words.is_empty());
    assert_eq!(
        transitions(&log).last(),
        Some(&(Phase::HunterShoot, Phase::GameEnd))
    );
    assert_eq!(
        log.events_of("hunter-shot"),
        vec![GameEvent::HunterShot {
            hunter: seat(4),
            target: Some(seat(2)),
        }]
    );

    let final_words: Vec<u8> = master
        .state()
        .transcript
        .iter()
        .filter(|s| s.kind == SpeechKind::LastWords)
        .map(|s| s.seat.0)
        .filter(|s| *s == 2 || *s == 4)
        .collect();
    assert!(final_words.is_empty());
}

#[tokio::test]
async fn test_badge_runoff_elects_holder() {
    let mut s = scripts(8);
    edit(&mut s, &[2, 3], |x| x.with_candidacy(true));
    edit(&mut s, &[0, 1, 2], |x| x.with_vote(1, VoteKind::BadgeElection, vote_for(2)));
    edit(&mut s, &[4, 5, 6], |x| x.with_vote(1, VoteKind::BadgeElection, vote_for(3)));
    let config = GameConfig::default().with_player_count(8);
    let (mut master, log) = seated(config, boxed(s));

    step_until(&mut master, Phase::DaySpeech).await;

    let ballots: Vec<(u32, VoteOutcome)> = log
        .events_of("vote-resolved")
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::VoteResolved { ballot, outcome, .. } => Some((ballot, outcome)),
            _ => None,
        })
        .collect();
    assert_eq!(
        ballots,
        vec![
            (0, VoteOutcome::Runoff(vec![seat(2), seat(3)])),
            (1, VoteOutcome::Elected(seat(3))),
        ]
    );
    assert_eq!(master.state().badge_holder(), Some(seat(3)));

    let pk_speakers: Vec<u8> = master
        .state()
        .transcript
        .iter()
        .filter(|s| s.kind == SpeechKind::PkDefence)
        .map(|s| s.seat.0)
        .collect();
    assert_eq!(pk_speakers, vec![2, 3]);
}

#[tokio::test]
async fn test_repeated_tie_abandons_vote() {
    let mut s = scripts(8);
    edit(&mut s, &[0, 1], |x| x.with_vote(1, VoteKind::Elimination, vote_for(6)));
    edit(&mut s, &[2, 3], |x| x.with_vote(1, VoteKind::Elimination, vote_for(7)));
    let config = GameConfig::default()
        .with_player_count(8)
        .with_revote_limits(1, 1);
    let (mut master, log) = seated(config, boxed(s));

    master.run_rounds(1).await;

    let outcomes: Vec<VoteOutcome> = log
        .events_of("vote-resolved")
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::VoteResolved { kind: VoteKind::Elimination, outcome, .. } => Some(outcome),
            _ => None,
        })
        .collect();
    assert_eq!(
        outcomes,
        vec![VoteOutcome::Runoff(vec![seat(6), seat(7)]), VoteOutcome::NoResult]
    );
    assert_eq!(master.state().living().len(), 8);
    assert_eq!(master.state().round, 2);
}

#[tokio::test]
async fn test_dead_badge_holder_passes_badge() {
    let mut s = scripts(8);
    edit(&mut s, &[3], |x| {
        x.with_candidacy(true)
            .with_vote(1, VoteKind::BadgeTransfer, vote_for(6))
    });
    edit(&mut s, &[0, 1, 2, 4, 5, 6, 7], |x| {
        x.with_vote(1, VoteKind::Elimination, vote_for(3))
    });
    let config = GameConfig::default().with_player_count(8);
    let (mut master, log) = seated(config, boxed(s));

    master.run_rounds(1).await;

    assert!(!master.state().is_alive(seat(3)));
    assert_eq!(master.state().badge_holder(), Some(seat(6)));
    let transfers: Vec<_> = log
        .events_of("badge-assigned")
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::BadgeAssigned { from, to } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(transfers, vec![(None, Some(seat(3))), (Some(seat(3)), Some(seat(6)))]);
}

#[tokio::test]
async fn test_discarded_badge_leaves_game() {
    let mut s = scripts(8);
    edit(&mut s, &[3], |x| {
        x.with_candidacy(true)
            .with_vote(1, VoteKind::BadgeTransfer, vote_for(6))
    });
    edit(&mut s, &[0, 1, 2, 4, 5, 6, 7], |x| {
        x.with_vote(1, VoteKind::Elimination, vote_for(3))
    });
    let config = GameConfig::default()
        .with_player_count(8)
        .with_badge_transfer(BadgeTransferPolicy::Discard);
    let (mut master, _log) = seated(config, boxed(s));

    master.run_rounds(1).await;

    assert_eq!(master.state().badge_holder(), None);
}

#[tokio::test(start_paused = true)]
async fn test_silent_and_failing_seats_are_skipped() {
    let mut sources = boxed(scripts(8));
    sources.push(Arc::new(FailingSource));
    sources.push(Arc::new(SilentSource));
    let config = GameConfig::default().with_decision_timeout_ms(500);
    let (mut master, log) = seated(config, sources);

    let start = tokio::time::Instant::now();
    master.run_rounds(1).await;

    assert_eq!(master.state().round, 2);
    assert!(!master.is_over());
    assert!(start.elapsed() >= Duration::from_millis(500));
    // The two broken seats never spoke.
    assert!(master.state().transcript.iter().all(|s| s.seat.0 < 8));
    assert!(!log.events_of("vote-resolved").is_empty());
}

#[tokio::test]
async fn test_human_seat_ignores_stale_answers() {
    let mut sources = boxed(scripts(9));
    let (human_seat, mut human) = channel(16);
    sources.push(Arc::new(human_seat));
    let (mut master, _log) = seated(GameConfig::default(), sources);

    let ui = tokio::spawn(async move {
        let mut prompts = 0;
        while let Some(message) = human.next_prompt().await {
            prompts += 1;
            let answer = match message.prompt {
                Prompt::Action { .. } => Answer::Action(ActionDecision::Skip),
                Prompt::Vote { .. } => Answer::Vote(rust_werewolf::VoteDecision::Abstain),
                Prompt::Speech { .. } => Answer::Speech("from the human".into()),
                Prompt::Candidacy => Answer::Candidacy(false),
            };
            let old_game = RequestTag {
                game_id: message.tag.game_id.wrapping_sub(1),
                sequence: message.tag.sequence,
            };
            human.answer(old_game, Answer::Speech("stale".into())).await.unwrap();
            human.answer(message.tag, answer).await.unwrap();
        }
        prompts
    });

    master.run_rounds(1).await;
    assert_eq!(master.state().round, 2);

    let human_speeches: Vec<&str> = master
        .state()
        .transcript
        .iter()
        .filter(|s| s.seat == seat(9))
        .map(|s| s.text.as_str())
        .collect();
    assert_eq!(human_speeches, vec!["from the human"]);

    drop(master);
    let prompts = ui.await.unwrap();
    assert!(prompts >= 3);
}

#[tokio::test]
async fn test_random_tables_are_reproducible() {
    async fn play(seed: u64) -> GameMaster {
        let config = GameConfig::default().with_seed(seed);
        let sources: Vec<Arc<dyn DecisionSource>> = (0..config.player_count as u8)
            .map(|i| Arc::new(RandomSource::for_seat(seed, seat(i), config.difficulty)) as Arc<dyn DecisionSource>)
            .collect();
        let mut master = GameMaster::new(config, sources).unwrap();
        master.run_rounds(40).await;
        master
    }

    let a = play(2024).await;
    let b = play(2024).await;

    assert!(a.winner().is_some());
    assert_eq!(a.winner(), b.winner());
    assert_eq!(a.state().history, b.state().history);
    assert_eq!(a.snapshot(), b.snapshot());
}

#[tokio::test]
async fn test_new_game_replaces_old() {
    let (mut master, log) = seated(GameConfig::default(), boxed(scripts(10)));
    master.run_rounds(1).await;

    master.start_new_game(77).unwrap();

    assert_eq!(master.state().game_id, 2);
    assert_eq!(master.state().phase, Phase::NightStart);
    assert_eq!(master.state().living().len(), 10);
    assert!(master.state().transcript.is_empty());
    assert!(log.snapshot_count() > 0);
}

#[tokio::test]
async fn test_scripted_source_is_default_quiet() {
    // A table of quiet seats never ends on its own, but keeps cycling.
    let sources: Vec<Arc<dyn DecisionSource>> = (0..10)
        .map(|_| Arc::new(ScriptedSource::new()) as Arc<dyn DecisionSource>)
        .collect();
    let (mut master, log) = seated(GameConfig::default(), sources);

    master.run_rounds(3).await;

    assert_eq!(master.state().round, 4);
    // Round 4's night has been entered but not yet played.
    assert_eq!(log.rounds(), vec![1, 2, 3]);
    assert!(eliminations(&log).is_empty());
}
