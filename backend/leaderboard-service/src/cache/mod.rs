pub mod metadata;
pub mod rank_index;

pub use metadata::{MetadataTable, UserMeta};
pub use rank_index::RankIndex;
