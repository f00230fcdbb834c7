pub mod composer;
#[cfg(feature = "render")]
pub mod droid;
pub mod fetcher;
pub mod gatherer;
pub mod openai_client;
pub mod pipeline;
pub mod search;

pub use composer::*;
#[cfg(feature = "render")]
pub use droid::*;
pub use fetcher::*;
pub use gatherer::*;
pub use openai_client::*;
pub use pipeline::*;
pub use search::*;
