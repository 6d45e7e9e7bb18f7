//! End-to-end cycle tests against the mock league.

use fpl_scout::engine::run_cycle;
use fpl_scout::notify::format::{HEADER, NO_UPGRADES};
use fpl_scout::optimiser::TransferOptimiser;
use fpl_scout::types::*;

use crate::mock_sources::{default_players, player, MockFpl, RecordingSink};

fn keys(rec: &Recommendation) -> Vec<(PlayerId, PlayerId)> {
    rec.swaps().iter().map(SwapCandidate::key).collect()
}

#[tokio::test]
async fn test_full_cycle_ranks_and_delivers() {
    let fpl = MockFpl::new();
    let sink = RecordingSink::new();

    let report = run_cycle(&fpl, &fpl, &sink, &TransferOptimiser::default())
        .await
        .unwrap();

    assert!(report.delivered);
    assert_eq!(report.squad_size, 15);
    assert_eq!(report.universe_size, 21);
    assert_eq!(report.bank, 5);
    assert_eq!(report.feasible_swaps, 9);

    // Saka -> Odegaard (+0.2, same-club slot reuse), Gvardiol -> Porro (+0.1).
    assert_eq!(keys(&report.recommendation), vec![(8, 22), (4, 24)]);

    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    let lines: Vec<_> = messages[0].lines().collect();
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines[1], "1. *Saka* → *Odegaard* _(ΔxP +0.20, £10.0m → £8.5m)_");
    assert_eq!(lines[2], "2. *Gvardiol* → *Porro* _(ΔxP +0.10, £6.0m → £5.5m)_");
}

#[tokio::test]
async fn test_full_club_only_reachable_by_selling_from_it() {
    let fpl = MockFpl::new();
    let sink = RecordingSink::new();
    let report = run_cycle(&fpl, &fpl, &sink, &TransferOptimiser::default())
        .await
        .unwrap();

    // Arsenal (club 1) already has three owned players: only Arsenal
    // players may be swapped for Odegaard.
    for swap in report.recommendation.swaps() {
        if swap.buy.id == 22 {
            assert_eq!(swap.sell.club, 1);
        }
    }
    assert!(!keys(&report.recommendation).contains(&(9, 22)));
    assert!(!keys(&report.recommendation).contains(&(10, 22)));
}

#[tokio::test]
async fn test_top_n_limits_output() {
    let fpl = MockFpl::new();
    let sink = RecordingSink::new();
    let report = run_cycle(&fpl, &fpl, &sink, &TransferOptimiser::new(1))
        .await
        .unwrap();
    assert_eq!(keys(&report.recommendation), vec![(8, 22)]);
}

#[tokio::test]
async fn test_single_forward_upgrade_within_bank() {
    let players = vec![
        player(1, "Owned", Position::Forward, 3, 80, 4.0),
        player(2, "Target", Position::Forward, 5, 84, 4.6),
    ];
    let fpl = MockFpl::with_data(RosterSnapshot { owned_ids: vec![1], bank: 5 }, players);
    let sink = RecordingSink::new();

    let report = run_cycle(&fpl, &fpl, &sink, &TransferOptimiser::default())
        .await
        .unwrap();
    assert_eq!(keys(&report.recommendation), vec![(1, 2)]);
    assert_eq!(report.recommendation.swaps()[0].buy_cost, 84);
}

#[tokio::test]
async fn test_no_upgrades_is_delivered_distinctly() {
    let players = vec![
        player(1, "Owned", Position::Goalkeeper, 1, 50, 5.0),
        player(2, "Worse", Position::Goalkeeper, 2, 45, 4.0),
        player(3, "Equal", Position::Goalkeeper, 3, 50, 5.0),
    ];
    let fpl = MockFpl::with_data(RosterSnapshot { owned_ids: vec![1], bank: 50 }, players);
    let sink = RecordingSink::new();

    let report = run_cycle(&fpl, &fpl, &sink, &TransferOptimiser::default())
        .await
        .unwrap();
    assert_eq!(report.recommendation, Recommendation::NoUpgrades);
    assert_eq!(report.feasible_swaps, 2);
    assert_eq!(sink.deliveries(), vec![Recommendation::NoUpgrades]);
    assert_eq!(sink.messages(), vec![NO_UPGRADES.to_string()]);
}

#[tokio::test]
async fn test_placeholder_score_does_not_break_cycle() {
    let players = vec![
        player(1, "Unknown", Position::Defender, 1, 45, coerce_projected_score(Some("-"))),
        player(2, "Known", Position::Defender, 2, 45, 0.5),
    ];
    let fpl = MockFpl::with_data(RosterSnapshot { owned_ids: vec![1], bank: 0 }, players);
    let sink = RecordingSink::new();

    let report = run_cycle(&fpl, &fpl, &sink, &TransferOptimiser::default())
        .await
        .unwrap();
    assert_eq!(keys(&report.recommendation), vec![(1, 2)]);
    assert!((report.recommendation.swaps()[0].score_delta - 0.5).abs() < 1e-12);
}

#[tokio::test]
async fn test_auth_failure_aborts_without_delivery() {
    let fpl = MockFpl::new();
    fpl.fail_auth("login redirect reported state=fail");
    let sink = RecordingSink::new();

    let err = run_cycle(&fpl, &fpl, &sink, &TransferOptimiser::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ScoutError::Authentication(_)));
    assert!(sink.deliveries().is_empty());
}

#[tokio::test]
async fn test_universe_failure_aborts_without_delivery() {
    let fpl = MockFpl::new();
    fpl.fail_fetch("bootstrap-static timed out");
    let sink = RecordingSink::new();

    let err = run_cycle(&fpl, &fpl, &sink, &TransferOptimiser::default())
        .await
        .unwrap_err();
    match err {
        ScoutError::DataFetch { source_name, message } => {
            assert_eq!(source_name, "mock-fpl");
            assert!(message.contains("timed out"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(sink.deliveries().is_empty());
}

#[tokio::test]
async fn test_delivery_failure_keeps_recommendation() {
    let fpl = MockFpl::new();
    let sink = RecordingSink::failing();

    let report = run_cycle(&fpl, &fpl, &sink, &TransferOptimiser::default())
        .await
        .unwrap();
    assert!(!report.delivered);
    assert_eq!(keys(&report.recommendation), vec![(8, 22), (4, 24)]);
}

#[tokio::test]
async fn test_roster_with_unknown_player_is_malformed() {
    let fpl = MockFpl::with_data(
        RosterSnapshot { owned_ids: vec![1, 999], bank: 0 },
        default_players(),
    );
    let sink = RecordingSink::new();

    let err = run_cycle(&fpl, &fpl, &sink, &TransferOptimiser::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ScoutError::MalformedData(_)));
}

#[tokio::test]
async fn test_repeated_cycles_are_identical() {
    let fpl = MockFpl::new();
    let sink = RecordingSink::new();
    let optimiser = TransferOptimiser::default();

    let first = run_cycle(&fpl, &fpl, &sink, &optimiser).await.unwrap();
    let second = run_cycle(&fpl, &fpl, &sink, &optimiser).await.unwrap();

    assert_eq!(first.recommendation, second.recommendation);
    let messages = sink.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], messages[1]);
    // Each cycle fetches the roster and the universe fresh.
    assert_eq!(fpl.fetch_count(), 4);
}
