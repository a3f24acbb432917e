pub mod mock_output;

pub use mock_output::*;
pub use mock_telemetry::*;
