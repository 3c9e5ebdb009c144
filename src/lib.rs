//! Interactive OAuth 2.0 offline access flow producing the client ID,
//! client secret and refresh token that Google Ads API clients read
//! from their environment.

pub mod acquirer;
pub mod error;
pub mod options;
pub mod outcome;
pub mod report;

pub use error::{Error, Result};
pub use options::FlowOptions;
pub use outcome::{Credentials, ExchangeOutcome};
