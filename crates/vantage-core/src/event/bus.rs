// Copyright 2025 the vantage authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Manages a generic, thread-safe event channel.
///
/// The bus is generic over the event type `T` so this crate stays decoupled
/// from the concrete events defined by higher-level crates (the sandbox
/// shell uses it to route reload and resize requests).
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + Sync + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> EventBus<T> {
    /// Creates a new bus backed by an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("EventBus initialized.");
        Self { sender, receiver }
    }

    /// Attempts to send an event, logging an error if the receiver is gone.
    pub fn publish(&self, event: T) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to send event: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sender end of the channel so other parts of
    /// the system can publish events.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns a reference to the receiver end of the channel. Intended for
    /// the owner of the bus to drain events.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }
}

impl<T: Clone + Send + Sync + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flume::TryRecvError;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Resized { width: u32, height: u32 },
        Shutdown,
    }

    #[test]
    fn starts_empty() {
        let bus = EventBus::<TestEvent>::new();
        assert!(bus.receiver().is_empty());
        assert_eq!(bus.receiver().try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn publish_then_drain_in_order() {
        let bus = EventBus::<TestEvent>::new();
        bus.publish(TestEvent::Resized {
            width: 800,
            height: 600,
        });
        bus.publish(TestEvent::Shutdown);

        let drained: Vec<_> = bus.receiver().try_iter().collect();
        assert_eq!(
            drained,
            vec![
                TestEvent::Resized {
                    width: 800,
                    height: 600
                },
                TestEvent::Shutdown
            ]
        );
    }

    #[test]
    fn detached_sender_still_delivers() {
        let bus = EventBus::<TestEvent>::new();
        let sender = bus.sender();
        sender.send(TestEvent::Shutdown).expect("send should succeed");
        assert_eq!(bus.receiver().try_recv(), Ok(TestEvent::Shutdown));
    }
}
