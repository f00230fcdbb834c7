pub mod analysis;
pub mod page_text;
pub mod prompt;
pub mod ranking;
pub mod site;
pub mod taxonomy;
pub mod ui_schema;

pub use analysis::*;
pub use page_text::*;
pub use ranking::*;
pub use site::*;
