pub mod audit;
pub mod claim;
pub mod complete;
pub mod dispatch;
pub mod init;
pub mod schema;
pub mod seed;
pub mod shared;
pub mod status;
pub mod sweep;
pub mod task;
pub mod unclaim;
pub mod watch;
