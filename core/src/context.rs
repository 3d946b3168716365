// core/src/context.rs

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, lockable state threaded through every step of a pipeline run.
///
/// Cloning is cheap and yields a handle to the same underlying value.
///
/// Guards returned by [`read`](Self::read) and [`write`](Self::write) are
/// blocking and not `Send`: drop them before the next `.await`.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Replaces the value of `field` with `None` and returns what was there.
  pub fn take<U>(&self, field: impl FnOnce(&mut T) -> &mut Option<U>) -> Option<U> {
    let mut guard = self.0.write();
    field(&mut guard).take()
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + Default + 'static> Default for ContextData<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}
