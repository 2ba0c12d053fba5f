use std::sync::Arc;

use petri_exec::{
    net::cancel::CancelToken,
    nets::multiplicator::{self, MultiplicatorPlace},
    threading::thread_pool::ThreadPool,
};

/// Runs a full multiplication with a pool of workers hammering the shared
/// transition set, waits for quiescence through the end transition and reads
/// the product off the final marking.
fn multiply(a: usize, b: usize, workers: usize) -> usize {
    let net = Arc::new(multiplicator::new_net(a, b));
    let shared = multiplicator::worker_transitions();
    let end = multiplicator::end_transitions();

    let pool = ThreadPool::new(workers);
    let tokens: Vec<CancelToken> = (0..workers).map(|_| CancelToken::new()).collect();
    for token in &tokens {
        let net = Arc::clone(&net);
        let token = token.clone();
        let transitions = shared.clone();
        pool.spawn(move || while net.fire_cancellable(&transitions, &token).is_ok() {});
    }

    net.fire(&end).unwrap();
    for token in &tokens {
        token.cancel();
    }
    pool.join();

    let result = net.marking();
    assert_eq!(result.tokens(&MultiplicatorPlace::End), 1);
    // once End is marked its own inhibitor pins the net
    assert_eq!(net.reachable(&end).len(), 1);

    result.tokens(&MultiplicatorPlace::Res)
}

#[test]
fn multiplies_small_numbers() {
    assert_eq!(multiply(3, 4, 4), 12);
}

#[test]
fn one_is_neutral() {
    assert_eq!(multiply(7, 1, 4), 7);
    assert_eq!(multiply(1, 6, 2), 6);
}

#[test]
fn zero_times_anything_is_zero() {
    // a multiplicand of zero skips the copy phase entirely
    assert_eq!(multiply(5, 0, 2), 0);
}

#[test]
fn a_single_worker_suffices() {
    assert_eq!(multiply(4, 4, 1), 16);
}
