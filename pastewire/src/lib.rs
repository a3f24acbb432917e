pub use pastewire_core::model::SessionId;

pub mod codec {
    pub use pastewire_core::codec::*;
}

pub mod model {
    pub use pastewire_core::model::*;
}

#[cfg(feature = "session")]
pub mod session {
    pub use pastewire_session::*;
}
