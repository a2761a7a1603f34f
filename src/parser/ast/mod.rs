pub mod query;
pub use query::*;

pub mod text_collector;
pub use text_collector::*;

pub mod field;
pub use field::*;

pub mod column;
pub use column::*;

pub mod table_ref;
pub use table_ref::*;

pub mod join;
pub use join::*;

pub mod condition;
pub use condition::*;
