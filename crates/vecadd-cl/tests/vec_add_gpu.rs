//! End-to-end auf echter Hardware: `cargo test -- --ignored` auf einer GPU-Maschine.

use vecadd_cl::{
    ClError, DeviceKind, Fill, GpuBuffer, GpuEventGuard, Queued, Ready, RunConfig, VecAdd, device,
    report,
};

fn pipeline(profile: bool) -> VecAdd {
    let dev = device::select(0, 0, DeviceKind::Gpu).expect("no OpenCL GPU available");
    VecAdd::new(dev, profile).expect("pipeline setup failed")
}

#[test]
#[ignore = "requires OpenCL runtime - run with --ignored on GPU machine"]
fn constant_fill_yields_three_everywhere() {
    let cfg = RunConfig::default();
    let (a, b) = cfg.inputs();
    let out = pipeline(false).run(&a, &b).unwrap();

    assert_eq!(out.values.len(), 1024);
    assert!(out.values.iter().all(|&x| x == 3.0));
    assert_eq!(report::verify(&a, &b, &out.values).to_string(), "Result is correct");
    assert!(out.kernel_time.is_none());
}

#[test]
#[ignore = "requires OpenCL runtime - run with --ignored on GPU machine"]
fn ramp_fill_matches_host_reference() {
    let cfg = RunConfig { len: 100_003, fill: Fill::Ramp, ..RunConfig::default() };
    let (a, b) = cfg.inputs();
    let out = pipeline(false).run(&a, &b).unwrap();
    assert!(report::verify(&a, &b, &out.values).is_correct());
}

#[test]
#[ignore = "requires OpenCL runtime - run with --ignored on GPU machine"]
fn pipeline_is_reusable() {
    let mut p = pipeline(false);
    let first = p.run(&[1.0; 16], &[2.0; 16]).unwrap();
    let second = p.run(&[5.0; 7], &[-1.0; 7]).unwrap();
    assert_eq!(first.values, vec![3.0; 16]);
    assert_eq!(second.values, vec![4.0; 7]);
}

#[test]
#[ignore = "requires OpenCL runtime - run with --ignored on GPU machine"]
fn profiling_reports_kernel_time() {
    let out = pipeline(true).run(&[1.0; 1024], &[2.0; 1024]).unwrap();
    assert!(out.kernel_time.is_some());
}

#[test]
#[ignore = "requires OpenCL runtime - run with --ignored on GPU machine"]
fn mismatched_inputs_fail_before_dispatch() {
    let err = pipeline(false).run(&[1.0; 4], &[2.0; 3]).unwrap_err();
    assert!(matches!(err, ClError::LengthMismatch { expected: 4, actual: 3 }));

    let err = pipeline(false).run(&[], &[]).unwrap_err();
    assert!(matches!(err, ClError::InvalidSize(0)));
}

#[test]
#[ignore = "requires OpenCL runtime - run with --ignored on GPU machine"]
fn buffers_enforce_length() {
    use opencl3::{command_queue::CommandQueue, context::Context};

    let dev = device::select(0, 0, DeviceKind::Gpu).unwrap();
    let context = Context::from_device(dev.device()).unwrap();
    #[allow(deprecated)]
    let queue = CommandQueue::create(&context, dev.device().id(), 0).unwrap();

    assert!(matches!(
        GpuBuffer::<f32, Queued>::new(&context, 0),
        Err(ClError::InvalidSize(0))
    ));
    assert!(matches!(
        GpuBuffer::<f32, Ready>::from_host(&context, &[]),
        Err(ClError::InvalidSize(0))
    ));

    let ready = GpuBuffer::<f32, Ready>::from_host(&context, &[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(ready.len(), 3);
    assert_eq!(ready.to_vec(&queue).unwrap(), vec![1.0, 2.0, 3.0]);

    let mut short = [0.0_f32; 2];
    assert!(matches!(
        ready.read_into(&queue, &mut short),
        Err(ClError::LengthMismatch { expected: 3, actual: 2 })
    ));

    // Marker-Event: leere Queue, sofort fertig
    let out = GpuBuffer::<f32, Queued>::new(&context, 3).unwrap().launch();
    let evt = unsafe { queue.enqueue_marker_with_wait_list(&[]) }.unwrap();
    let done = GpuEventGuard::new(evt).wait().unwrap();
    let out = out.into_ready(&done);
    assert_eq!(out.len(), 3);

    // Guard ohne explizites Wait: Drop wartet und gibt das Event frei
    let evt = unsafe { queue.enqueue_marker_with_wait_list(&[]) }.unwrap();
    drop(GpuEventGuard::new(evt));
}
