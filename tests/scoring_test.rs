//! Dissimilarity engine: weighting modes, dedup, short-circuit, ties.

use fingerprint_detector::{
    features::{ActionFrequency, DailyProfile},
    model::{Window, WindowCapacity},
    risk::{DissimilarityEngine, WeightingMode},
    DetectorError,
};

fn profile(pairs: &[(&str, u64)]) -> DailyProfile {
    pairs.iter().map(|(a, c)| (*a, *c)).collect()
}

fn window(entries: Vec<DailyProfile>) -> Window {
    Window::with_entries(WindowCapacity::Unlimited, entries)
}

#[test]
fn empty_window_has_no_baseline() {
    let engine = DissimilarityEngine::new(WeightingMode::None);
    let w = Window::new(WindowCapacity::Bounded(10));
    let best = engine
        .score(&profile(&[("login", 3)]), &w, &ActionFrequency::new())
        .unwrap();
    assert!(best.is_none());
}

#[test]
fn identical_profile_scores_zero() {
    let engine = DissimilarityEngine::new(WeightingMode::None);
    let w = window(vec![profile(&[("login", 5)])]);
    let best = engine
        .score(&profile(&[("login", 5)]), &w, &ActionFrequency::new())
        .unwrap()
        .unwrap();
    assert_eq!(best.score, 0.0);
    assert_eq!(best.distance, 0.0);
    assert_eq!(best.limit, 5.0);
}

#[test]
fn extra_action_counts_toward_distance_and_limit() {
    let engine = DissimilarityEngine::new(WeightingMode::None);
    let w = window(vec![profile(&[("login", 5)])]);
    let candidate = profile(&[("login", 5), ("transfer", 5)]);
    let best = engine
        .score(&candidate, &w, &ActionFrequency::new())
        .unwrap()
        .unwrap();
    assert_eq!(best.distance, 5.0);
    assert_eq!(best.limit, 10.0);
    assert_eq!(best.score, 0.5);
}

#[test]
fn disjoint_profiles_score_one() {
    let engine = DissimilarityEngine::new(WeightingMode::None);
    let w = window(vec![profile(&[("login", 2)])]);
    let best = engine
        .score(&profile(&[("logout", 3)]), &w, &ActionFrequency::new())
        .unwrap()
        .unwrap();
    assert_eq!(best.distance, 5.0);
    assert_eq!(best.limit, 5.0);
    assert_eq!(best.score, 1.0);
}

#[test]
fn best_match_is_minimum_over_entries() {
    let engine = DissimilarityEngine::new(WeightingMode::None);
    let far = profile(&[("upload", 9)]);
    let near = profile(&[("login", 4)]);
    let w = window(vec![far, near.clone()]);
    let best = engine
        .score(&profile(&[("login", 5)]), &w, &ActionFrequency::new())
        .unwrap()
        .unwrap();
    assert_eq!(best.profile, &near);
    assert!((best.score - 0.2).abs() < 1e-12);
    assert_eq!(best.compared, 2);
}

#[test]
fn exact_match_stops_the_scan() {
    let engine = DissimilarityEngine::new(WeightingMode::None);
    let candidate = profile(&[("login", 5)]);
    let w = window(vec![
        candidate.clone(),
        profile(&[("upload", 1)]),
        profile(&[("login", 1)]),
    ]);
    let best = engine
        .score(&candidate, &w, &ActionFrequency::new())
        .unwrap()
        .unwrap();
    assert_eq!(best.score, 0.0);
    assert_eq!(best.compared, 1);
}

#[test]
fn duplicate_entries_are_scored_once() {
    let engine = DissimilarityEngine::new(WeightingMode::None);
    let a = profile(&[("login", 1)]);
    let b = profile(&[("upload", 1)]);
    let w = window(vec![a.clone(), a.clone(), a, b.clone()]);
    let best = engine
        .score(&b, &w, &ActionFrequency::new())
        .unwrap()
        .unwrap();
    assert_eq!(best.compared, 2);
    assert_eq!(best.profile, &b);
}

#[test]
fn ties_keep_the_oldest_entry() {
    let engine = DissimilarityEngine::new(WeightingMode::None);
    // Both score exactly 0.5 against {login: 2}.
    let older = profile(&[("login", 1)]);
    let newer = profile(&[("login", 2), ("upload", 2)]);
    let w = window(vec![older.clone(), newer]);
    let best = engine
        .score(&profile(&[("login", 2)]), &w, &ActionFrequency::new())
        .unwrap()
        .unwrap();
    assert_eq!(best.score, 0.5);
    assert_eq!(best.profile, &older);
    assert_eq!(best.compared, 2);
}

#[test]
fn normalized_mode_compares_relative_frequencies() {
    let candidate = profile(&[("login", 2), ("upload", 2)]);
    let w = window(vec![profile(&[("login", 1), ("upload", 1)])]);
    let freq = ActionFrequency::new();

    let raw = DissimilarityEngine::new(WeightingMode::None)
        .score(&candidate, &w, &freq)
        .unwrap()
        .unwrap();
    assert_eq!(raw.score, 0.5);

    let norm = DissimilarityEngine::new(WeightingMode::Normalized)
        .score(&candidate, &w, &freq)
        .unwrap()
        .unwrap();
    assert_eq!(norm.score, 0.0);
    assert_eq!(norm.limit, 1.0);
}

#[test]
fn idf_mode_uses_live_user_frequencies() {
    let mut freq = ActionFrequency::new();
    freq.record("alice", "login");
    freq.record("bob", "login");
    freq.record("bob", "transfer");
    assert_eq!(freq.user_count(), 2);
    assert_eq!(freq.users_for("login"), 2);
    assert_eq!(freq.users_for("transfer"), 1);

    let engine = DissimilarityEngine::new(WeightingMode::Idf);
    let cmp = engine
        .compare(
            &profile(&[("login", 1), ("transfer", 1)]),
            &profile(&[("login", 1)]),
            &freq,
        )
        .unwrap();
    let idf_login = (3.0f64 / 2.0).log10();
    let idf_transfer = 3.0f64.log10();
    assert!((cmp.distance - idf_transfer).abs() < 1e-12);
    assert!((cmp.limit - (idf_login + idf_transfer)).abs() < 1e-12);
    assert!((cmp.score() - 0.730422710309185).abs() < 1e-9);
}

#[test]
fn idf_grows_as_new_users_arrive() {
    let mut freq = ActionFrequency::new();
    freq.record("alice", "login");
    let before = freq.idf("login");
    freq.record("bob", "upload");
    let after = freq.idf("login");
    assert!(after > before);
}

#[test]
fn empty_profiles_are_a_fatal_error() {
    let engine = DissimilarityEngine::new(WeightingMode::None);
    let err = engine
        .compare(&DailyProfile::new(), &DailyProfile::new(), &ActionFrequency::new())
        .unwrap_err();
    assert!(matches!(err, DetectorError::EmptyProfile));
    assert!(!err.is_recoverable());
}

#[test]
fn scoring_is_repeatable() {
    let mut freq = ActionFrequency::new();
    for (u, a) in [("a", "login"), ("b", "login"), ("b", "mail"), ("c", "print")] {
        freq.record(u, a);
    }
    let w = window(vec![
        profile(&[("login", 3), ("mail", 7)]),
        profile(&[("print", 1), ("login", 2)]),
    ]);
    let candidate = profile(&[("login", 4), ("mail", 1), ("print", 2)]);
    for mode in [WeightingMode::None, WeightingMode::Idf, WeightingMode::Normalized] {
        let engine = DissimilarityEngine::new(mode);
        let first = engine.score(&candidate, &w, &freq).unwrap().unwrap();
        let second = engine.score(&candidate, &w, &freq).unwrap().unwrap();
        assert_eq!(first.score.to_bits(), second.score.to_bits());
        assert_eq!(first.limit.to_bits(), second.limit.to_bits());
        assert!(std::ptr::eq(first.profile, second.profile));
    }
}

#[test]
fn weighting_mode_parses_names_only() {
    assert_eq!("idf".parse::<WeightingMode>().unwrap(), WeightingMode::Idf);
    assert_eq!("Normalized".parse::<WeightingMode>().unwrap(), WeightingMode::Normalized);
    assert_eq!("none".parse::<WeightingMode>().unwrap(), WeightingMode::None);
    assert!("2".parse::<WeightingMode>().is_err());
    assert!("tfidf".parse::<WeightingMode>().is_err());
}
