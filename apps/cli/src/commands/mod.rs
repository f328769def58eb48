//! 命令定义和实现

pub mod chain;
pub mod convert;
pub mod decode;
pub mod frame;
pub mod locate;

pub use chain::ChainCommand;
pub use convert::ConvertCommand;
pub use decode::DecodeCommand;
pub use frame::FrameCommand;
pub use locate::LocateCommand;
