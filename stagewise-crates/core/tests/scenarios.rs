#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::priorities;
use helpers::Echo;
use helpers::Priorities;
use helpers::Recorder;
use helpers::Threshold;
use stagewise_core::stages::Connecting;
use stagewise_core::stages::Generator;
use stagewise_core::stages::MonitoringGenerator;
use stagewise_core::stages::PropagatingEitherWay;
use stagewise_core::termination::Indefinite;
use stagewise_core::ConfigurationError;
use stagewise_core::Cost;
use stagewise_core::Pipeline;
use stagewise_core::StateDraft;

#[test]
fn generated_states_are_ordered_by_priority() {
    let mut pipeline = Pipeline::new("scenario");
    let generator = pipeline.add_stage(Generator::new(
        "generator",
        Priorities(vec![5.0, 1.0, 3.0]),
    ));
    pipeline.initialise().expect("a lone generator is valid");

    for _ in 0..3 {
        assert!(pipeline.compute(generator).expect("initialised"));
    }

    let pushed = pipeline.back_sink().expect("created during initialisation");
    assert_eq!(vec![1.0, 3.0, 5.0], priorities(pushed, pipeline.states()));
    assert!(!pipeline.can_compute(generator));
}

#[test]
fn failing_inputs_are_pruned() {
    let mut pipeline = Pipeline::new("scenario");
    let forward = pipeline.add_stage(PropagatingEitherWay::forward(
        "forward",
        Threshold::new(10.0),
    ));
    pipeline.initialise().expect("the boundaries feed the stage");

    let mut inputs = vec![];
    for priority in [2.0, 12.0, 4.0] {
        inputs.push(
            pipeline
                .insert_start(StateDraft::new((), priority))
                .expect("the stage reads starts"),
        );
    }
    let expensive = inputs[1];

    let num_computes = pipeline.run(Indefinite).expect("initialised");

    assert_eq!(3, num_computes);
    let data = pipeline.stage_data(forward).expect("stage exists");
    let costs = data
        .solutions()
        .solutions()
        .map(|solution| solution.cost())
        .collect::<Vec<_>>();
    assert_eq!(vec![Cost::new(2.0), Cost::new(4.0)], costs);
    assert_eq!(1, data.solutions().num_failures());
    assert_eq!(1, data.statistics().num_states_pruned);

    assert!(pipeline.states().is_pruned(expensive));
    let starts = data
        .starts()
        .and_then(|id| pipeline.interface(id))
        .expect("stage reads starts");
    assert!(!starts.contains(expensive));
    assert!(starts.is_empty());
}

#[test]
fn pairs_are_attempted_by_summed_priority() {
    let mut pipeline = Pipeline::new("scenario");
    let connecting = pipeline.add_stage(Connecting::new("connect", Recorder::default()));
    pipeline.initialise().expect("the boundaries feed the stage");

    for priority in [1.0, 4.0] {
        let _ = pipeline
            .insert_start(StateDraft::new((), priority))
            .expect("the stage reads starts");
    }
    for priority in [2.0, 3.0] {
        let _ = pipeline
            .insert_end(StateDraft::new((), priority))
            .expect("the stage reads ends");
    }

    let stage = pipeline
        .stage::<Connecting<Recorder>>(connecting)
        .expect("stage has this type");
    let keys = stage
        .pending()
        .map(|(cost, _)| cost.value())
        .collect::<Vec<_>>();
    assert_eq!(vec![3.0, 4.0, 6.0, 7.0], keys);

    let num_computes = pipeline.run(Indefinite).expect("initialised");

    assert_eq!(4, num_computes);
    let stage = pipeline
        .stage::<Connecting<Recorder>>(connecting)
        .expect("stage has this type");
    assert_eq!(
        vec![(1.0, 2.0), (1.0, 3.0), (4.0, 2.0), (4.0, 3.0)],
        stage.hook().attempts
    );
    let data = pipeline.stage_data(connecting).expect("stage exists");
    assert_eq!(4, data.solutions().num_solutions());
}

#[test]
fn monitoring_registers_once() {
    let mut pipeline = Pipeline::new("scenario");
    let seed = pipeline.add_stage(Generator::new("seed", Priorities(vec![1.0, 2.0])));
    let _ = pipeline.add_stage(Connecting::new("connect", Recorder::default()));
    let derived = pipeline.add_stage(MonitoringGenerator::new("derived", seed, Echo::default()));

    pipeline.initialise().expect("the pipeline is valid");
    pipeline.initialise().expect("initialising again is allowed");

    let seed_data = pipeline.stage_data(seed).expect("stage exists");
    assert_eq!(1, seed_data.solutions().num_callbacks());

    let _ = pipeline.run(Indefinite).expect("initialised");

    let monitoring = pipeline
        .stage::<MonitoringGenerator<Echo>>(derived)
        .expect("stage has this type");
    assert_eq!(2, monitoring.hook().seen);
    assert_eq!(0, monitoring.num_pending());
    let derived_data = pipeline.stage_data(derived).expect("stage exists");
    assert_eq!(2, derived_data.solutions().num_solutions());
    assert_eq!(
        2,
        pipeline.back_sink().map_or(0, |sink| sink.len()),
        "one derived state per monitored solution"
    );
}

#[test]
fn removing_a_monitor_withdraws_its_callback() {
    let mut pipeline = Pipeline::new("scenario");
    let seed = pipeline.add_stage(Generator::new("seed", Priorities(vec![1.0, 2.0])));
    let _ = pipeline.add_stage(Connecting::new("connect", Recorder::default()));
    let derived = pipeline.add_stage(MonitoringGenerator::new("derived", seed, Echo::default()));
    pipeline.initialise().expect("the pipeline is valid");

    let removed = pipeline.remove_stage(derived).expect("stage exists");
    pipeline.initialise().expect("generator and connector are valid");
    let _ = pipeline.run(Indefinite).expect("initialised");

    let seed_data = pipeline.stage_data(seed).expect("stage exists");
    assert_eq!(0, seed_data.solutions().num_callbacks());
    assert_eq!(2, seed_data.solutions().num_solutions());
    let monitoring = removed
        .downcast_ref::<MonitoringGenerator<Echo>>()
        .expect("stage has this type");
    assert_eq!(0, monitoring.num_pending());
}

#[test]
fn monitoring_a_removed_stage_fails_on_every_initialisation() {
    let mut pipeline = Pipeline::new("scenario");
    let seed = pipeline.add_stage(Generator::new("seed", Priorities(vec![1.0])));
    let _ = pipeline.add_stage(Connecting::new("connect", Recorder::default()));
    let derived = pipeline.add_stage(MonitoringGenerator::new("derived", seed, Echo::default()));
    pipeline.initialise().expect("the pipeline is valid");

    let _ = pipeline.remove_stage(seed).expect("stage exists");

    let missing = Err(ConfigurationError::MissingMonitoredStage {
        stage: "derived".to_owned(),
    });
    assert_eq!(missing, pipeline.initialise());
    assert_eq!(missing, pipeline.initialise());
    let monitoring = pipeline
        .stage::<MonitoringGenerator<Echo>>(derived)
        .expect("stage has this type");
    assert_eq!(None, monitoring.callback());
    let derived_data = pipeline.stage_data(derived).expect("stage exists");
    assert!(derived_data.registrations().is_empty());
}
