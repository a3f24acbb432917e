/// Commands the presentation layer feeds into a running session.
#[derive(Debug)]
pub enum SessionCommand {
    /// Produce the opening local payload. Offering side, once at start.
    Initiate,
    /// Apply a pasted peer payload.
    AcceptRemote { payload: String },
    /// Send a chat message over the open channel.
    SendMessage { text: String },
    /// Tear the session down.
    Close,
}
