// tests/lifecycle.rs
//! Full session lifecycle, driven end to end through the scripted driver.

use dispmanx::drivers::mock::{Call, Fault, MockDriver};
use dispmanx::{DispmanX, DispmanxError, Options, PixelFormat};
use test_log::test;

fn open(driver: &MockDriver) -> DispmanX<&MockDriver> {
    DispmanX::with_driver(driver, Options::default()).unwrap()
}

#[test]
fn full_lifecycle_on_a_two_by_two_display() {
    let driver = MockDriver::new().with_device(0, 2, 2);
    let options = Options {
        pixel_format: PixelFormat::Rgb,
        ..Options::default()
    };
    let mut session = DispmanX::with_driver(&driver, options).unwrap();

    // 2 x 2 pixels at 3 bytes each.
    assert_eq!(session.buffer().unwrap().len_bytes(), 12);
    session.buffer_mut().unwrap().fill(0xFF);
    assert!(session
        .buffer()
        .unwrap()
        .as_bytes()
        .iter()
        .all(|&b| b == 0xFF));

    let before = driver.calls().len();
    session.update().unwrap();
    let cycle = driver.calls()[before..].to_vec();
    assert_eq!(cycle.len(), 3, "write plus one begin/submit pair: {:?}", cycle);
    assert!(matches!(
        cycle[0],
        Call::ResourceWriteData {
            pitch: 6,
            data_len: 12,
            ..
        }
    ));
    assert!(matches!(cycle[1], Call::UpdateStart { .. }));
    assert!(matches!(cycle[2], Call::UpdateSubmitSync { .. }));

    session.destroy().unwrap();
    let calls = driver.calls();
    let remove_at = calls
        .iter()
        .position(|c| matches!(c, Call::ElementRemove { .. }))
        .expect("element was removed");
    let delete_at = calls
        .iter()
        .position(|c| matches!(c, Call::ResourceDelete { .. }))
        .expect("resource was deleted");
    assert!(remove_at < delete_at, "element removed before resource deleted");
    assert_eq!(
        driver.count_calls(|c| matches!(c, Call::ElementRemove { .. })),
        1
    );
    assert_eq!(
        driver.count_calls(|c| matches!(c, Call::ResourceDelete { .. })),
        1
    );
}

#[test]
fn construction_acquires_in_order() {
    let driver = MockDriver::new().with_device(0, 16, 16);
    let _session = open(&driver);
    let calls = driver.calls();
    let open_at = calls
        .iter()
        .position(|c| matches!(c, Call::DisplayOpen { .. }))
        .unwrap();
    let create_at = calls
        .iter()
        .position(|c| matches!(c, Call::ResourceCreate { .. }))
        .unwrap();
    let add_at = calls
        .iter()
        .position(|c| matches!(c, Call::ElementAdd { .. }))
        .unwrap();
    assert!(open_at < create_at && create_at < add_at);
    // The element is bound inside a transaction.
    let start_at = calls
        .iter()
        .position(|c| matches!(c, Call::UpdateStart { .. }))
        .unwrap();
    let submit_at = calls
        .iter()
        .position(|c| matches!(c, Call::UpdateSubmitSync { .. }))
        .unwrap();
    assert!(start_at < add_at && add_at < submit_at);
}

#[test]
fn back_to_back_updates_are_independent_cycles() {
    let driver = MockDriver::new().with_device(0, 8, 8);
    let mut session = open(&driver);

    let before = driver.calls().len();
    session.update().unwrap();
    session.update().unwrap();
    let cycles = driver.calls()[before..].to_vec();
    assert_eq!(cycles.len(), 6);
    for cycle in cycles.chunks(3) {
        assert!(matches!(cycle[0], Call::ResourceWriteData { .. }));
        assert!(matches!(cycle[1], Call::UpdateStart { .. }));
        assert!(matches!(cycle[2], Call::UpdateSubmitSync { .. }));
    }
}

#[test]
fn update_begin_failure_never_submits() {
    let driver = MockDriver::new().with_device(0, 8, 8);
    let mut session = open(&driver);
    let submits_before = driver.count_calls(|c| matches!(c, Call::UpdateSubmitSync { .. }));

    driver.inject(Fault::UpdateStart);
    assert_eq!(session.update().unwrap_err(), DispmanxError::UpdateStart);
    assert_eq!(
        driver.count_calls(|c| matches!(c, Call::UpdateSubmitSync { .. })),
        submits_before
    );
}

#[test]
fn destroy_is_idempotent() {
    let driver = MockDriver::new().with_device(0, 4, 4);
    let mut session = open(&driver);
    session.destroy().unwrap();
    let after_first = driver.calls().len();
    session.destroy().unwrap();
    assert_eq!(driver.calls().len(), after_first, "no second native teardown");
}

#[test]
fn destroyed_session_fails_fast_everywhere() {
    let driver = MockDriver::new().with_device(0, 4, 4);
    let mut session = open(&driver);
    session.destroy().unwrap();
    let settled = driver.calls().len();

    assert_eq!(session.display().unwrap_err(), DispmanxError::AlreadyDestroyed);
    assert_eq!(session.size().unwrap_err(), DispmanxError::AlreadyDestroyed);
    assert_eq!(session.width().unwrap_err(), DispmanxError::AlreadyDestroyed);
    assert_eq!(session.height().unwrap_err(), DispmanxError::AlreadyDestroyed);
    assert_eq!(
        session.pixel_format().unwrap_err(),
        DispmanxError::AlreadyDestroyed
    );
    assert_eq!(session.layer().unwrap_err(), DispmanxError::AlreadyDestroyed);
    assert_eq!(session.buffer().unwrap_err(), DispmanxError::AlreadyDestroyed);
    assert_eq!(
        session.buffer_mut().unwrap_err(),
        DispmanxError::AlreadyDestroyed
    );
    assert_eq!(session.update().unwrap_err(), DispmanxError::AlreadyDestroyed);

    // None of that touched native state.
    assert_eq!(driver.calls().len(), settled);
}

#[test]
fn drop_destroys_the_session() {
    let driver = MockDriver::new().with_device(0, 4, 4);
    {
        let _session = open(&driver);
    }
    assert_eq!(
        driver.count_calls(|c| matches!(c, Call::ElementRemove { .. })),
        1
    );
    assert_eq!(
        driver.count_calls(|c| matches!(c, Call::ResourceDelete { .. })),
        1
    );
}

#[test]
fn drop_after_destroy_releases_nothing_twice() {
    let driver = MockDriver::new().with_device(0, 4, 4);
    {
        let mut session = open(&driver);
        session.destroy().unwrap();
    }
    assert_eq!(
        driver.count_calls(|c| matches!(c, Call::ElementRemove { .. })),
        1
    );
    assert_eq!(
        driver.count_calls(|c| matches!(c, Call::ResourceDelete { .. })),
        1
    );
}

#[test]
fn element_remove_failure_is_fatal_and_final() {
    let driver = MockDriver::new().with_device(0, 4, 4);
    let mut session = open(&driver);

    driver.inject(Fault::ElementRemove);
    assert_eq!(session.destroy().unwrap_err(), DispmanxError::ElementRemove);
    // The teardown transaction was still closed.
    let removes = driver.count_calls(|c| matches!(c, Call::ElementRemove { .. }));
    assert_eq!(removes, 1);

    // The session counts as destroyed: no second teardown, usage fails fast.
    let settled = driver.calls().len();
    session.destroy().unwrap();
    assert_eq!(driver.calls().len(), settled);
    assert_eq!(session.update().unwrap_err(), DispmanxError::AlreadyDestroyed);
}

#[test]
fn resource_delete_failure_still_marks_destroyed() {
    let driver = MockDriver::new().with_device(0, 4, 4);
    let mut session = open(&driver);

    driver.inject(Fault::ResourceDelete);
    assert_eq!(session.destroy().unwrap_err(), DispmanxError::ResourceDelete);
    assert_eq!(
        driver.count_calls(|c| matches!(c, Call::ResourceDelete { .. })),
        1
    );

    session.destroy().unwrap();
    assert_eq!(
        driver.count_calls(|c| matches!(c, Call::ResourceDelete { .. })),
        1,
        "no second delete attempt"
    );
}
