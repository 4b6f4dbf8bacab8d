pub mod logging;
pub mod slug;

pub use slug::slugify;
