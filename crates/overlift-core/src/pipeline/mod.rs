pub mod frontend;

pub use frontend::{Frontend, QueryInput, QuerySource};
