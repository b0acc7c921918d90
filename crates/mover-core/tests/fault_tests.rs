//! 任务异常测试
//!
//! 执行机构返回错误或 panic 时：队列被清空，worker 继续服务。

mod common;

use common::{FaultyActuator, fast_config, init_tracing, wait_for};
use mover_core::{
    ActuatorCommand, MovementJob, Mover, MoverBuilder, MoverConfig, MoverError, WorkerState,
};
use std::sync::Arc;
use std::time::Duration;

fn faulty_mover(config: MoverConfig) -> (Mover, Arc<FaultyActuator>) {
    init_tracing();
    let actuator = Arc::new(FaultyActuator::default());
    let mover = MoverBuilder::new()
        .config(config)
        .actuator(actuator.clone())
        .build()
        .unwrap();
    (mover, actuator)
}

#[test]
fn test_actuator_error_resets_queue() {
    let (mover, actuator) = faulty_mover(fast_config());
    assert!(mover.delay(50));
    assert!(mover.kick());
    assert!(mover.stop());
    assert!(mover.stop());
    mover.wait_for_completion();

    let metrics = mover.metrics();
    assert_eq!(metrics.job_faults, 1);
    assert_eq!(metrics.jobs_discarded, 2);
    assert!(actuator.sent.lock().is_empty());

    // worker 仍然存活
    assert!(mover.stop());
    mover.wait_for_completion();
    assert_eq!(*actuator.sent.lock(), vec![ActuatorCommand::Stop]);
    assert_ne!(mover.worker_state(), WorkerState::Dead);
}

#[test]
fn test_panicking_job_is_contained() {
    let (mover, actuator) = faulty_mover(fast_config());
    assert!(mover.delay(50));
    assert!(mover.rotate(1.0));
    assert!(mover.move_vector(1.0, 2.0));
    mover.wait_for_completion();

    let metrics = mover.metrics();
    assert_eq!(metrics.job_faults, 1);
    assert_eq!(metrics.jobs_discarded, 1);
    assert!(actuator.sent.lock().is_empty());
    assert!(!mover.is_dead());

    assert!(mover.move_vector(3.0, 4.0));
    assert!(mover.wait_for_completion_timeout(Duration::from_secs(2)));
    assert_eq!(
        *actuator.sent.lock(),
        vec![ActuatorCommand::Drive {
            speed_x: 3.0,
            speed_y: 4.0
        }]
    );
}

#[test]
fn test_full_queue_exhausts_retries() {
    let (mover, _actuator) = faulty_mover(MoverConfig {
        queue_capacity: 2,
        push_attempts: 3,
        ..fast_config()
    });

    assert!(mover.delay(300));
    assert!(wait_for(
        || mover.is_running() && !mover.has_queued_jobs(),
        Duration::from_secs(2)
    ));
    assert!(mover.delay(1));
    assert!(mover.delay(1));

    match mover.submit(MovementJob::Stop) {
        Err(MoverError::QueueInsertExhausted { attempts, capacity }) => {
            assert_eq!(attempts, 3);
            assert_eq!(capacity, 2);
        },
        other => panic!("Expected QueueInsertExhausted, got {:?}", other),
    }
    assert_eq!(mover.num_queued_jobs(), 2);
    assert_eq!(mover.reset_queue(), 2);
}
