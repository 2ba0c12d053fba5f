use std::{
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc, Mutex,
    },
    thread,
};

type Job<T> = Box<dyn (FnOnce() -> T) + Send + 'static>;

/// A fixed-size pool of result-collecting workers.
///
/// Jobs may block for a long time (the multiplicator workers sit inside
/// [PetriNet::fire](crate::net::PetriNet::fire) for most of their lives), so
/// the pool never tries to stop a running job itself; long-running jobs are
/// expected to exit cooperatively, e.g. through a
/// [CancelToken](crate::net::cancel::CancelToken).
pub struct ThreadPool<T: Send + 'static> {
    workers: Vec<Worker>,
    sender: Option<Sender<Job<T>>>,
    results: Arc<Mutex<Vec<T>>>,
}

impl<T: Send + 'static> ThreadPool<T> {
    pub fn new(size: usize) -> ThreadPool<T> {
        assert!(size > 0);

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));
        let results = Arc::new(Mutex::new(vec![]));

        let workers = (0..size)
            .map(|id| Worker::new(id, Arc::clone(&receiver), Arc::clone(&results)))
            .collect();

        ThreadPool {
            workers,
            sender: Some(sender),
            results,
        }
    }

    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> T,
        F: Send + 'static,
    {
        match &self.sender {
            Some(sender) => sender.send(Box::new(job)).unwrap(),
            None => panic!("cannot spawn a job on a joined thread pool"),
        }
    }

    /// Waits for every worker to finish and returns the collected job
    /// results, in completion order.
    pub fn join(mut self) -> Vec<T> {
        self.shutdown();
        let mut results = self.results.lock().unwrap();
        results.drain(..).collect()
    }

    fn shutdown(&mut self) {
        drop(self.sender.take());
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    eprintln!("worker {} panicked", worker.id);
                }
            }
        }
    }
}

impl<T: Send + 'static> Drop for ThreadPool<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new<T: Send + 'static>(
        id: usize,
        receiver: Arc<Mutex<Receiver<Job<T>>>>,
        results: Arc<Mutex<Vec<T>>>,
    ) -> Worker {
        let thread = thread::spawn(move || loop {
            let job = match receiver.lock().unwrap().recv() {
                Ok(job) => job,
                Err(_) => break,
            };

            let result = job();

            results.lock().unwrap().push(result);
        });

        Worker {
            id,
            thread: Some(thread),
        }
    }
}
