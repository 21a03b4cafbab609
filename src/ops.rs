pub mod combine_latest;
pub mod into_stream;
pub mod map;

pub use combine_latest::{combine_latest2, combine_latest3, combine_latest4, CombineLatest};
pub use into_stream::IntoStream;
pub use map::Map;
