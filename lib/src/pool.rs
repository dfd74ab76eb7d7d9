use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

/// A unit of work executed by the pool, one block each
pub type Job = Box<dyn FnOnce() + Send + 'static>;

struct State {
    jobs: Vec<Job>,
    running: usize,
    joined: bool,
}

struct Inner {
    state: Mutex<State>,
    work: Condvar,
    idle: Condvar,
}

/// Fixed-size pool of worker threads consuming jobs from a shared queue.
///
/// [`WorkerPool::wait`] is the drain-to-empty barrier the frame scanner
/// relies on: once it returns, every job pushed before it has completed, so
/// buffers those jobs referenced can be recycled. No ordering is guaranteed
/// between jobs.
pub struct WorkerPool {
    inner: Arc<Inner>,
    threads: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `threads` workers (at least one)
    pub fn new(threads: usize) -> Self {
        let threads = threads.max(1);
        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                jobs: Vec::new(),
                running: 0,
                joined: false,
            }),
            work: Condvar::new(),
            idle: Condvar::new(),
        });

        let handles = (0..threads)
            .map(|_| {
                let inner = Arc::clone(&inner);
                std::thread::spawn(move || run(&inner))
            })
            .collect();

        WorkerPool {
            inner,
            threads: handles,
        }
    }

    /// Number of worker threads
    pub fn threads(&self) -> usize {
        self.threads.len()
    }

    /// Queues a job and wakes one worker. Must not be called after
    /// [`WorkerPool::join`].
    pub fn push(&self, job: Job) {
        let mut state = self.inner.state.lock().unwrap();
        assert!(!state.joined, "push on a joined pool");
        state.jobs.push(job);
        self.inner.work.notify_one();
    }

    /// Blocks until the queue is empty and no job is running
    pub fn wait(&self) {
        let mut state = self.inner.state.lock().unwrap();
        while !(state.jobs.is_empty() && state.running == 0) {
            state = self.inner.idle.wait(state).unwrap();
        }
    }

    /// Drains the queue, stops and joins all workers
    pub fn join(&mut self) {
        self.wait();
        {
            let mut state = self.inner.state.lock().unwrap();
            if state.joined {
                return;
            }
            state.joined = true;
        }
        self.inner.work.notify_all();
        for handle in self.threads.drain(..) {
            handle.join().expect("worker thread panicked");
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join();
    }
}

fn run(inner: &Inner) {
    let mut state = inner.state.lock().unwrap();
    loop {
        if state.joined {
            return;
        }
        match state.jobs.pop() {
            Some(job) => {
                state.running += 1;
                drop(state);
                job();
                state = inner.state.lock().unwrap();
                state.running -= 1;
                if state.jobs.is_empty() && state.running == 0 {
                    inner.idle.notify_all();
                }
            }
            None => {
                state = inner.work.wait(state).unwrap();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_all_jobs_run() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.push(Box::new(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            }));
        }
        pool.wait();
        assert_eq!(counter.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_wait_is_a_barrier() {
        let pool = WorkerPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        for round in 1..=10 {
            for _ in 0..10 {
                let counter = Arc::clone(&counter);
                pool.push(Box::new(move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                }));
            }
            pool.wait();
            assert_eq!(counter.load(Ordering::Relaxed), round * 10);
        }
    }

    #[test]
    fn test_wait_on_idle_pool() {
        let pool = WorkerPool::new(1);
        pool.wait();
        pool.wait();
    }

    #[test]
    fn test_join_twice_is_harmless() {
        let mut pool = WorkerPool::new(2);
        pool.push(Box::new(|| {}));
        pool.join();
        pool.join();
        assert_eq!(pool.threads(), 0);
    }
}
