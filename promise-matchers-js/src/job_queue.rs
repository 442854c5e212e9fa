//! A minimal microtask queue for promise reaction jobs.
//!
//! Semantics follow the HTML "perform a microtask checkpoint" algorithm:
//! - FIFO job ordering
//! - a checkpoint drains until empty, including jobs enqueued while running
//!
//! The queue is a shared handle: promises created by one
//! [`PromiseConstructor`](crate::PromiseConstructor) all enqueue into the same queue, and the host
//! drains it from [`Host::run_microtasks`](crate::Host::run_microtasks) or a clock tick.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A queued unit of work.
pub struct Job {
  run: Box<dyn FnOnce()>,
}

impl Job {
  pub fn new(run: impl FnOnce() + 'static) -> Self {
    Self { run: Box::new(run) }
  }

  /// Run the job, consuming it.
  #[inline]
  pub fn run(self) {
    (self.run)()
  }
}

impl fmt::Debug for Job {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Job").finish_non_exhaustive()
  }
}

/// A shared FIFO microtask queue.
#[derive(Clone, Default)]
pub struct JobQueue {
  queue: Rc<RefCell<VecDeque<Job>>>,
}

impl JobQueue {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn enqueue(&self, job: Job) {
    self.queue.borrow_mut().push_back(job);
  }

  pub fn is_empty(&self) -> bool {
    self.queue.borrow().is_empty()
  }

  pub fn len(&self) -> usize {
    self.queue.borrow().len()
  }

  /// Runs all queued jobs (and any jobs enqueued while running) until the queue is empty.
  ///
  /// Returns the number of jobs run. The queue is not borrowed while a job runs, so jobs may
  /// enqueue further jobs or start a nested checkpoint.
  pub fn perform_microtask_checkpoint(&self) -> usize {
    let mut ran = 0;
    loop {
      let next = self.queue.borrow_mut().pop_front();
      let Some(job) = next else {
        break;
      };
      job.run();
      ran += 1;
    }
    if ran > 0 {
      tracing::trace!(jobs = ran, "microtask checkpoint");
    }
    ran
  }

  /// Drops every queued job without running it. Returns how many were cancelled.
  pub fn drain_and_cancel(&self) -> usize {
    // Dropped after the borrow is released: a job's captures may own promises that touch this
    // queue when dropped.
    let cancelled = std::mem::take(&mut *self.queue.borrow_mut());
    cancelled.len()
  }

  /// Whether both handles refer to the same queue.
  pub fn ptr_eq(&self, other: &JobQueue) -> bool {
    Rc::ptr_eq(&self.queue, &other.queue)
  }
}

impl fmt::Debug for JobQueue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("JobQueue").field("len", &self.len()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn runs_jobs_in_fifo_order() {
    let sink = Rc::new(RefCell::new(Vec::new()));
    let queue = JobQueue::new();
    for i in 1..=3u8 {
      let sink = sink.clone();
      queue.enqueue(Job::new(move || sink.borrow_mut().push(i)));
    }

    assert_eq!(queue.perform_microtask_checkpoint(), 3);
    assert!(queue.is_empty());
    assert_eq!(&*sink.borrow(), &[1, 2, 3]);
  }

  #[test]
  fn drains_until_empty_including_nested_enqueues() {
    let sink = Rc::new(RefCell::new(Vec::new()));
    let queue = JobQueue::new();
    {
      let sink = sink.clone();
      let inner_queue = queue.clone();
      queue.enqueue(Job::new(move || {
        sink.borrow_mut().push(1);
        let sink = sink.clone();
        inner_queue.enqueue(Job::new(move || sink.borrow_mut().push(2)));
      }));
    }

    assert_eq!(queue.perform_microtask_checkpoint(), 2);
    assert_eq!(&*sink.borrow(), &[1, 2]);
  }

  #[test]
  fn drain_and_cancel_skips_jobs() {
    let ran = Rc::new(RefCell::new(false));
    let queue = JobQueue::new();
    {
      let ran = ran.clone();
      queue.enqueue(Job::new(move || *ran.borrow_mut() = true));
    }

    assert_eq!(queue.drain_and_cancel(), 1);
    assert_eq!(queue.perform_microtask_checkpoint(), 0);
    assert!(!*ran.borrow());
  }
}
