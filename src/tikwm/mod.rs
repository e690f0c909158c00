pub mod api;
pub mod types;

pub use api::{ChannelPage, PAGE_SIZE, fetch_user_posts, fetch_video};
