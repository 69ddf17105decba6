//! Change notifications for editor owners.
//!
//! An editor calls its notifier once per successful edit with the complete
//! merged configuration. Owners decide what to do with it (store it on the
//! node, stream it to a UI, persist it, ignore it).

use std::sync::Arc;

use tokio::sync::mpsc;
use verbena_config::ConfigMap;

/// Emitted after every edit.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChange {
  /// Tool the edited configuration belongs to.
  pub tool_id: String,
  /// The complete merged configuration after the edit, never a delta.
  pub config: Arc<ConfigMap>,
  /// Keys written by the edit, derived fields included, in sorted order.
  pub changed: Vec<String>,
}

/// Trait for receiving configuration changes.
pub trait ChangeNotifier: Send + Sync {
  /// Called once per edit.
  fn notify(&self, change: ConfigChange);
}

/// A notifier that discards all changes.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
  fn notify(&self, _change: ConfigChange) {}
}

/// A notifier that sends changes to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ConfigChange>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ConfigChange>) -> Self {
    Self { sender }
  }
}

impl ChangeNotifier for ChannelNotifier {
  fn notify(&self, change: ConfigChange) {
    // A closed channel means the owner stopped listening.
    let _ = self.sender.send(change);
  }
}

/// A notifier backed by a closure, the direct analogue of an `onChange` prop.
pub struct FnNotifier<F>(F);

impl<F> FnNotifier<F>
where
  F: Fn(ConfigChange) + Send + Sync,
{
  pub fn new(callback: F) -> Self {
    Self(callback)
  }
}

impl<F> ChangeNotifier for FnNotifier<F>
where
  F: Fn(ConfigChange) + Send + Sync,
{
  fn notify(&self, change: ConfigChange) {
    (self.0)(change)
  }
}

impl<N: ChangeNotifier + ?Sized> ChangeNotifier for Arc<N> {
  fn notify(&self, change: ConfigChange) {
    (**self).notify(change)
  }
}
