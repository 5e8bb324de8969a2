//! Posts domain actions - the post lifecycle
//!
//! Create runs as a saga over the media store and the post store; like,
//! comment and list consult the family resolver; delete is author-only.

mod create_post;
mod delete_post;
mod engagement;
mod queries;
mod views;

pub use create_post::{check_upload, create_post, NewPost, MAX_FILES_PER_POST, MAX_FILE_BYTES};
pub use delete_post::delete_post;
pub use engagement::{add_comment, like_post, LikeOutcome};
pub use queries::list_family_posts;
pub use views::{present_new_post, CommentView, LikeView, PostUser, PostView};
