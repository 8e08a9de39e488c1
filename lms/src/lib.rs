mod error;
pub use error::{Error, Result};

pub mod category;
pub mod course;

pub use category::Category;
pub use course::Course;
