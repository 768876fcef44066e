use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::{POST_DISPLAY_CHARS, truncate_chars};
use super::AuthorRef;

/// Comment entity - a reply to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(truncate_chars(&self.text, POST_DISPLAY_CHARS))
    }
}

/// A comment joined with its author.
#[derive(Debug, Clone, Serialize)]
pub struct CommentEntry {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorRef,
}

impl CommentEntry {
    pub fn new(comment: Comment, author: AuthorRef) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            created_at: comment.created_at,
            author,
        }
    }
}
