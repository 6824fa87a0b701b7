pub mod comment;
pub mod event;
pub mod session;

pub use comment::{CommentRecord, CommentThread, LikedStore, NewComment};
pub use event::{BettingEvent, ListingKind, NewEvent, OddsEntry};
pub use session::{ConnectionState, WalletSession};
