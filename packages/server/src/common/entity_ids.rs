//! Typed ID definitions for all domain entities.

pub use super::id::Id;

/// Marker type for User accounts (parents and guardians).
pub struct User;

/// Marker type for Dependent profiles (children and pets embedded under a user).
pub struct Dependent;

/// Marker type for Post entities (family feed entries).
pub struct Post;

/// Marker type for Comment entries on a post.
pub struct Comment;

/// Marker type for Like entries on a post.
pub struct Like;

pub type UserId = Id<User>;
pub type DependentId = Id<Dependent>;
pub type PostId = Id<Post>;
pub type CommentId = Id<Comment>;
pub type LikeId = Id<Like>;
