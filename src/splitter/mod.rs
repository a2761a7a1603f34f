pub mod split_error;
pub use split_error::*;

pub mod group_resolver;
pub use group_resolver::*;

pub mod ownership;
pub use ownership::*;

pub mod table_grouper;
pub use table_grouper::*;

pub mod column_partitioner;
pub use column_partitioner::*;

pub mod condition_partitioner;
pub use condition_partitioner::*;

pub mod bridging_resolver;
pub use bridging_resolver::*;

pub mod sql_assembler;
pub use sql_assembler::*;

pub mod split_plan;
pub use split_plan::*;

pub mod query_splitter;
pub use query_splitter::*;
