mod amount;
mod identifiers;
mod records;
mod status;

pub use amount::Wei;
pub use identifiers::{Address, NetworkId, PostId, TxHash};
pub use records::{Post, Profile};
pub use status::{ProviderKind, SessionStatus};
