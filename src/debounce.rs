use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs a task once input has been quiet for `delay`.
///
/// Scheduling always aborts the previously pending timer first. Only the
/// wait is cancellable: once the timer fires, the task is spawned on its own
/// and runs to completion even if something else is scheduled afterwards.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Fired = Arc<Mutex<Vec<&'static str>>>;

    fn push(fired: &Fired, label: &'static str) -> impl Future<Output = ()> + Send + 'static {
        let fired = fired.clone();
        async move {
            fired.lock().unwrap().push(label);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_scheduled_task_fires() {
        let fired = Fired::default();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(push(&fired, "first"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.schedule(push(&fired, "second"));
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(fired.lock().unwrap().is_empty());
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*fired.lock().unwrap(), vec!["second"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_pending_task() {
        let fired = Fired::default();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule(push(&fired, "never"));
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(fired.lock().unwrap().is_empty());
    }
}
