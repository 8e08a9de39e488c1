mod error;
pub use error::{Error, Result};

pub mod categories;
pub mod codec;
pub mod courses;
pub mod reader;
pub mod row;
pub mod settings;
pub mod sql;

pub use reader::ExtDb;
pub use row::{Row, Value};
pub use settings::ExtDbSettings;
