use roarpilot::Error;
use roarpilot::policies::SacPolicy;
use roarpilot::policy::Policy;
use roarpilot::spaces::Space;
use tch::Device;

fn unit_actions() -> Space {
    Space::uniform(-1.0, 1.0, &[2])
}

fn within(actions: &[f32], low: &[f32], high: &[f32]) -> bool {
    actions
        .iter()
        .zip(low.iter().zip(high))
        .all(|(a, (lo, hi))| *a >= lo - 1e-6 && *a <= hi + 1e-6)
}

#[test]
fn deterministic_predictions_repeat() {
    let policy = SacPolicy::new(Device::Cpu, 8, &unit_actions(), &[16, 16]).unwrap();
    let observation = vec![0.1; 8];
    let action = policy.predict(&observation, true).unwrap();
    assert_eq!(action.len(), 2);
    assert_eq!(action, policy.predict(&observation, true).unwrap());
    assert!(within(&action, &[-1.0, -1.0], &[1.0, 1.0]));
}

#[test]
fn sampled_actions_rescale_to_the_bounds() {
    let space = Space::Box {
        low: vec![0.0, 10.0],
        high: vec![1.0, 20.0],
        shape: vec![2],
    };
    let policy = SacPolicy::new(Device::Cpu, 5, &space, &[32]).unwrap();
    let observation = vec![-0.3, 0.2, 1.5, 0.0, 4.0];
    for _ in 0..20 {
        let action = policy.predict(&observation, false).unwrap();
        assert!(within(&action, &[0.0, 10.0], &[1.0, 20.0]), "{action:?}");
    }
}

#[test]
fn saved_weights_load_back() {
    let path = std::env::temp_dir().join(format!("roarpilot-actor-{}.ot", std::process::id()));
    let trained = SacPolicy::new(Device::Cpu, 6, &unit_actions(), &[16]).unwrap();
    trained.save(&path).unwrap();

    let loaded = SacPolicy::load(&path, Device::Cpu, 6, &unit_actions(), &[16]).unwrap();
    let observation = vec![0.5, -0.5, 0.25, 1.0, 0.0, -2.0];
    assert_eq!(
        trained.predict(&observation, true).unwrap(),
        loaded.predict(&observation, true).unwrap()
    );
    let _ = std::fs::remove_file(&path);
}

#[test]
fn observation_length_is_checked() {
    let policy = SacPolicy::new(Device::Cpu, 8, &unit_actions(), &[16]).unwrap();
    assert!(matches!(
        policy.predict(&vec![0.0; 3], false),
        Err(Error::ShapeMismatch { expected: 8, actual: 3, .. })
    ));
}

#[test]
fn needs_a_flat_box_action_space() {
    assert!(SacPolicy::new(Device::Cpu, 4, &Space::Discrete(3), &[8]).is_err());
}
