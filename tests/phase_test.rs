//! Phase machine: counter hysteresis, verdicts, model update decisions.

use fingerprint_detector::risk::{Phase, PhaseMachine, RetrainCounter, Verdict};

#[test]
fn missing_baseline_is_never_anomalous() {
    let machine = PhaseMachine::new(0.0, 1, false);
    let mut counter = machine.initial_counter();
    let d = machine.step(&mut counter, None);
    assert_eq!(d.verdict, Verdict::Normal);
    assert_eq!(d.phase, Phase::Training);
    assert_eq!(counter.value(), 0);
    assert!(d.memorize);
}

#[test]
fn threshold_is_exclusive() {
    let machine = PhaseMachine::new(0.7, 1, false);
    let mut counter = RetrainCounter::new(0);
    assert_eq!(machine.step(&mut counter, Some(0.7)).verdict, Verdict::Normal);
    assert_eq!(machine.step(&mut counter, Some(0.70001)).verdict, Verdict::Anomalous);
}

#[test]
fn anomaly_forces_retraining_days() {
    let machine = PhaseMachine::new(0.7, 2, false);
    let mut counter = RetrainCounter::new(0);

    // Phase is read before the counter resets.
    let day1 = machine.step(&mut counter, Some(0.9));
    assert_eq!((day1.phase, day1.verdict), (Phase::Detection, Verdict::Anomalous));
    assert_eq!(counter.value(), 2);
    assert!(day1.memorize);

    let day2 = machine.step(&mut counter, Some(0.1));
    assert_eq!((day2.phase, day2.verdict), (Phase::Training, Verdict::Normal));
    assert_eq!(counter.value(), 1);
    assert!(day2.memorize);

    let day3 = machine.step(&mut counter, Some(0.1));
    assert_eq!(day3.phase, Phase::Training);
    assert_eq!(counter.value(), 0);
    assert!(day3.memorize);

    let day4 = machine.step(&mut counter, Some(0.1));
    assert_eq!(day4.phase, Phase::Detection);
    assert_eq!(counter.value(), -1);
    assert!(!day4.memorize);
}

#[test]
fn counter_decrements_once_per_normal_day_and_goes_negative() {
    let machine = PhaseMachine::new(0.5, 1, false);
    let mut counter = machine.initial_counter();
    for expected in [0, -1, -2, -3] {
        machine.step(&mut counter, Some(0.1));
        assert_eq!(counter.value(), expected);
    }
    machine.step(&mut counter, Some(0.9));
    assert_eq!(counter.value(), 1);
}

#[test]
fn always_update_memorizes_detection_days() {
    let machine = PhaseMachine::new(0.5, 0, true);
    let mut counter = machine.initial_counter();
    for _ in 0..3 {
        let d = machine.step(&mut counter, Some(0.1));
        assert_eq!(d.phase, Phase::Detection);
        assert!(d.memorize);
    }
}

#[test]
fn zero_retrain_length_starts_in_detection() {
    let machine = PhaseMachine::new(0.5, 0, false);
    let mut counter = machine.initial_counter();
    assert_eq!(counter.phase(), Phase::Detection);
    let d = machine.step(&mut counter, Some(0.9));
    assert_eq!(d.verdict, Verdict::Anomalous);
    // Re-entering training with an empty countdown still memorizes the day.
    assert_eq!(counter.value(), 0);
    assert!(d.memorize);
}
