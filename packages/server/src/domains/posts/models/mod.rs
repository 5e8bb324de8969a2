pub mod post;

pub use post::{Comment, Like, Media, Post, Tag, MAX_COMMENT_CHARS};
