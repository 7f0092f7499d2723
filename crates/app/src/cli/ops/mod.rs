pub mod init;
pub mod keys;
pub mod login;
pub mod paste;
pub mod register;
pub mod version;

pub use init::Init;
pub use keys::Keys;
pub use login::Login;
pub use paste::Paste;
pub use register::Register;
pub use version::Version;
