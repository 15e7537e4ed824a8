mod convert;
mod groups;
mod init;
mod locate;
mod merge;
mod preview;

pub use self::convert::convert;
pub use self::groups::groups;
pub use self::init::init;
pub use self::locate::locate;
pub use self::merge::merge;
pub use self::preview::preview;
