//! Communication with the game server
//!
//! This module defines the trait the client uses to hand requests to the
//! transport. The client never owns a connection: whatever carries messages
//! to the server (a WebSocket, a socket.io bridge, a test double) implements
//! [`Tunnel`].

use super::OutgoingMessage;

/// Trait for sending requests through a communication tunnel
pub trait Tunnel {
    /// Sends a request to the server
    ///
    /// Delivery is fire-and-forget. The outcome of a request becomes visible
    /// only through later server pushes.
    ///
    /// # Arguments
    ///
    /// * `message` - The request to send
    fn emit(&self, message: &OutgoingMessage);
}

impl<T: Tunnel + ?Sized> Tunnel for &T {
    fn emit(&self, message: &OutgoingMessage) {
        (**self).emit(message);
    }
}
