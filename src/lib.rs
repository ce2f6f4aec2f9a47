pub mod error;
pub mod interface;
pub mod protocol_envelope;
pub mod provider;
pub mod registry;
pub mod session;
pub mod social;
pub mod types;
pub mod view;

pub use error::{code, get_error_info, Result, SessionError};
pub use interface::{ContractInterface, MethodDescriptor, Mutability};
pub use provider::{
    DetectedProvider, DevChain, DevChainBuilder, Provider, ProviderError, ProviderEvent,
    ProviderHost, StaticHost,
};
pub use registry::{Deployment, DeploymentRegistry};
pub use session::{ContractSession, SendOptions, Session, SessionSnapshot, TransactionSubmission};
pub use social::{FeeSchedule, SocialClient, MAX_FEED_LIMIT};
pub use types::*;
