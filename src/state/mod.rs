//! Shared month-offset state handed to the rendering layer.
//!
//! `MonthContext` owns the current offset; anything that derives from it
//! (the main grid, the sidebar calendar) holds a `MonthSubscription` and
//! rebuilds when it reports a change.

use std::sync::Arc;
use tokio::sync::watch;

use crate::calendar::MonthIndex;

#[derive(Debug, Clone)]
pub struct MonthContext {
    tx: Arc<watch::Sender<MonthIndex>>,
}

impl Default for MonthContext {
    fn default() -> Self { Self::new() }
}

impl MonthContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(MonthIndex::today());
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> MonthIndex { *self.tx.borrow() }

    /// Subscribers are only notified when the value actually changes.
    pub fn set(&self, index: MonthIndex) {
        let changed = self.tx.send_if_modified(|cur| {
            if *cur == index { return false; }
            *cur = index;
            true
        });
        if changed {
            tracing::debug!(offset = %index, "month offset changed");
        }
    }

    pub fn increment(&self) { self.set(self.get().next()); }
    pub fn decrement(&self) { self.set(self.get().prev()); }
    pub fn reset(&self)     { self.set(MonthIndex::today()); }

    /// The returned subscription starts with the current value marked seen.
    pub fn subscribe(&self) -> MonthSubscription {
        MonthSubscription { rx: self.tx.subscribe() }
    }
}

#[derive(Debug, Clone)]
pub struct MonthSubscription {
    rx: watch::Receiver<MonthIndex>,
}

impl MonthSubscription {
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Waits for the next change. Returns false once the context is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    pub fn borrow_and_update(&mut self) -> MonthIndex {
        *self.rx.borrow_and_update()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_today() {
        assert_eq!(MonthContext::new().get(), MonthIndex::today());
    }

    #[test]
    fn increment_then_decrement_round_trips() {
        let ctx = MonthContext::new();
        ctx.set(MonthIndex::new(-7).unwrap());
        ctx.increment();
        assert_eq!(ctx.get().get(), -6);
        ctx.decrement();
        assert_eq!(ctx.get().get(), -7);
        ctx.reset();
        assert_eq!(ctx.get(), MonthIndex::today());
    }

    #[test]
    fn setting_same_value_does_not_notify() {
        let ctx = MonthContext::new();
        let sub = ctx.subscribe();
        ctx.set(MonthIndex::today());
        assert!(!sub.has_changed());
        ctx.reset();
        assert!(!sub.has_changed());
    }

    #[test]
    fn subscribers_see_latest_value() {
        let ctx     = MonthContext::new();
        let mut sub = ctx.subscribe();
        ctx.increment();
        ctx.increment();
        assert!(sub.has_changed());
        assert_eq!(sub.borrow_and_update().get(), 2);
        assert!(!sub.has_changed());
    }

    #[tokio::test]
    async fn changed_wakes_on_update_from_another_task() {
        let ctx     = MonthContext::new();
        let mut sub = ctx.subscribe();
        let writer  = ctx.clone();
        tokio::spawn(async move { writer.decrement(); });
        assert!(sub.changed().await);
        assert_eq!(sub.borrow_and_update().get(), -1);
    }

    #[tokio::test]
    async fn changed_reports_closed_context() {
        let ctx     = MonthContext::new();
        let mut sub = ctx.subscribe();
        drop(ctx);
        assert!(!sub.changed().await);
    }
}
