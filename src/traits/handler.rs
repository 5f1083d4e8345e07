use crate::core::Envelope;
use crate::traits::Result;

/// Handler for messages of a single dispatch tag
///
/// Handlers are invoked inline on the connection task, one at a time;
/// no two handlers of the same manager ever run concurrently. A handler
/// error is logged and the connection continues.
pub trait MessageHandler: Send + 'static {
    /// Handle one message routed to this handler's tag
    fn handle(&mut self, message: Envelope) -> Result<()>;
}

/// Closures can be used directly as handlers
impl<F> MessageHandler for F
where
    F: FnMut(Envelope) -> Result<()> + Send + 'static,
{
    fn handle(&mut self, message: Envelope) -> Result<()> {
        self(message)
    }
}
