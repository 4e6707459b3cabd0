//! Global subscriber installation
//!
//! Kept in its own test binary so no other test shares the process-wide
//! subscriber.

#[test]
fn test_init_installs_once() {
    assert!(formmail::observability::init().is_ok());
    assert!(formmail::observability::init().is_err());
}
