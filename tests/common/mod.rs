use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use nvo_collections::Collection;

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn collection_of(pairs: &[(&str, i32)]) -> Collection<i32> {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

#[allow(dead_code)]
pub fn sorted<T: Ord>(mut items: Vec<T>) -> Vec<T> {
    items.sort();
    items
}

/// Runs `f` on its own thread and fails the test if it has not finished
/// within `timeout`. A hung lock shows up as a failure instead of a stuck
/// test run.
#[allow(dead_code)]
pub fn within<T, F>(timeout: Duration, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let _ = sender.send(f());
    });
    receiver
        .recv_timeout(timeout)
        .unwrap_or_else(|e| panic!("operation did not finish within {:?}: {}", timeout, e))
}
