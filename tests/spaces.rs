use roarpilot::Error;
use roarpilot::spaces::{Space, Value};

fn control_space() -> Space {
    Space::dict([
        ("throttle", Space::uniform(-1.0, 1.0, &[1])),
        ("steer", Space::uniform(-1.0, 1.0, &[1])),
        ("reverse", Space::Discrete(2)),
    ])
}

#[test]
fn dict_flattens_in_key_order() {
    let space = control_space();
    let value = Value::dict([
        ("throttle", Value::scalar(0.7)),
        ("steer", Value::scalar(-0.2)),
        ("reverse", Value::Discrete(1)),
    ]);
    // reverse (one-hot), steer, throttle
    assert_eq!(space.flatten(&value).unwrap(), vec![0.0, 1.0, -0.2, 0.7]);
    assert_eq!(space.flatdim(), 4);
}

#[test]
fn unflatten_restores_structure() {
    let space = control_space();
    let value = space.unflatten(&[0.9, 0.1, 0.5, -0.5]).unwrap();
    assert_eq!(value.get("reverse"), Some(&Value::Discrete(0)));
    assert_eq!(value.get("steer").and_then(Value::as_scalar), Some(0.5));
    assert_eq!(value.get("throttle").and_then(Value::as_scalar), Some(-0.5));

    assert!(matches!(
        space.unflatten(&[0.0; 3]),
        Err(Error::ShapeMismatch { expected: 4, actual: 3, .. })
    ));
}

#[test]
fn flatten_rejects_malformed_values() {
    let space = control_space();
    let missing = Value::dict([("throttle", Value::scalar(0.0)), ("steer", Value::scalar(0.0))]);
    assert!(matches!(space.flatten(&missing), Err(Error::UnknownChannel(k)) if k == "reverse"));

    let too_long = Value::dict([
        ("throttle", Value::Array(vec![0.0, 1.0])),
        ("steer", Value::scalar(0.0)),
        ("reverse", Value::Discrete(0)),
    ]);
    assert!(matches!(space.flatten(&too_long), Err(Error::ShapeMismatch { .. })));

    let bad_gear = Value::dict([
        ("throttle", Value::scalar(0.0)),
        ("steer", Value::scalar(0.0)),
        ("reverse", Value::Discrete(2)),
    ]);
    assert!(matches!(space.flatten(&bad_gear), Err(Error::OutOfSpace(_))));
}

#[test]
fn subset_keeps_named_channels() {
    let space = control_space();
    let restricted = space.subset(&["steer", "throttle"]).unwrap();
    assert_eq!(restricted.keys(), vec!["steer", "throttle"]);
    assert_eq!(restricted.flatdim(), 2);
    assert!(matches!(space.subset(&["brake"]), Err(Error::UnknownChannel(k)) if k == "brake"));
}

#[test]
fn flat_space_concatenates_bounds() {
    let flat = control_space().flatten_space();
    assert_eq!(
        flat,
        Space::Box {
            low: vec![0.0, 0.0, -1.0, -1.0],
            high: vec![1.0, 1.0, 1.0, 1.0],
            shape: vec![4],
        }
    );
}

#[test]
fn contains_checks_bounds_and_keys() {
    let space = control_space();
    let inside = Value::dict([
        ("throttle", Value::scalar(1.0)),
        ("steer", Value::scalar(-1.0)),
        ("reverse", Value::Discrete(0)),
    ]);
    assert!(space.contains(&inside));

    let outside = Value::dict([
        ("throttle", Value::scalar(1.5)),
        ("steer", Value::scalar(0.0)),
        ("reverse", Value::Discrete(0)),
    ]);
    assert!(!space.contains(&outside));
    assert!(!space.contains(&Value::scalar(0.0)));
}
