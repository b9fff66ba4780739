use std::{collections::HashMap, fmt};

use amf::amf0::Value as Amf0Value;
use rtmp_formats::shared_object::{SharedObjectEvent, SharedObjectMessage};

use crate::errors::{RtmpSessionError, RtmpSessionResult};

/// Hooks invoked while server events are applied to a shared object. They
/// run synchronously on the session task and must not block it.
pub trait SharedObjectObserver {
    fn on_change(&mut self, _key: &str) {}
    fn on_delete(&mut self, _key: &str) {}
    fn on_message(&mut self, _arguments: &[Amf0Value]) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl SharedObjectObserver for NoopObserver {}

/// Client side replica of a remote shared object. The server owns the data,
/// the client applies the event stream to its local copy.
///
/// A fresh object is not in use yet: the first message claimed for it must
/// open with UseSuccess followed by Clear, which the transition consumes.
pub struct SharedObject {
    name: String,
    data: HashMap<String, Amf0Value>,
    use_success: bool,
    observer: Box<dyn SharedObjectObserver + Send>,
}

impl SharedObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_observer(name, Box::new(NoopObserver))
    }

    pub fn with_observer(
        name: impl Into<String>,
        observer: Box<dyn SharedObjectObserver + Send>,
    ) -> Self {
        Self {
            name: name.into(),
            data: HashMap::new(),
            use_success: false,
            observer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &HashMap<String, Amf0Value> {
        &self.data
    }

    pub fn use_success(&self) -> bool {
        self.use_success
    }

    /// The subscription message announcing this object to the server.
    pub(crate) fn use_request(&mut self) -> SharedObjectMessage {
        self.use_success = false;
        SharedObjectMessage::use_request(&self.name)
    }

    /// Applies a shared object message if it targets this object. Returns
    /// false when the name does not match so another object can claim it.
    pub fn handle_message(&mut self, message: &SharedObjectMessage) -> RtmpSessionResult<bool> {
        if message.name != self.name {
            return Ok(false);
        }

        let mut events = message.events.as_slice();
        if !self.use_success {
            match events {
                [SharedObjectEvent::UseSuccess, SharedObjectEvent::Clear, rest @ ..] => {
                    self.use_success = true;
                    events = rest;
                }
                _ => return Err(RtmpSessionError::UseNotAcknowledged(self.name.clone())),
            }
        }

        self.handle_events(events)?;
        Ok(true)
    }

    fn handle_events(&mut self, events: &[SharedObjectEvent]) -> RtmpSessionResult<()> {
        for event in events {
            match event {
                SharedObjectEvent::Change(entries) => {
                    for pair in entries {
                        self.data.insert(pair.key.clone(), pair.value.clone());
                        self.observer.on_change(&pair.key);
                    }
                }
                SharedObjectEvent::Delete(key) => {
                    if self.data.remove(key).is_none() {
                        return Err(RtmpSessionError::MissingSharedObjectKey {
                            object: self.name.clone(),
                            key: key.clone(),
                        });
                    }
                    self.observer.on_delete(key);
                }
                SharedObjectEvent::Message(arguments) => {
                    self.observer.on_message(arguments);
                }
                other => {
                    return Err(RtmpSessionError::UnexpectedSharedObjectEvent(format!(
                        "{:?} on {} while in use",
                        other.event_type(),
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SharedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedObject")
            .field("name", &self.name)
            .field("data", &self.data)
            .field("use_success", &self.use_success)
            .finish()
    }
}
