use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// STUN/TURN urls handed to the peer connection.
    pub ice_servers: Vec<String>,
    /// Hard deadline for one candidate gathering round.
    pub gather_timeout: Duration,
    /// Label of the data channel the offering side opens.
    pub channel_label: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun.l.google.com:19302".to_string()],
            gather_timeout: Duration::from_millis(1000),
            channel_label: "chat".to_string(),
        }
    }
}
