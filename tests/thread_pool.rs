use petri_exec::threading::thread_pool::ThreadPool;

#[test]
fn collects_every_job_result() {
    let pool = ThreadPool::new(4);
    for i in 0..8 {
        pool.spawn(move || i * 2);
    }

    let mut results = pool.join();
    results.sort();

    assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14]);
}

#[test]
#[should_panic]
fn an_empty_pool_is_rejected() {
    let _pool: ThreadPool<()> = ThreadPool::new(0);
}
