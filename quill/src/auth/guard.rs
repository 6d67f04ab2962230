//! Authorization checks applied after a resource has been loaded.

use crate::{
    auth::identity::Identity,
    db::models::{
        comments::CommentDBResponse,
        posts::{PostDBResponse, PostStatus},
    },
    errors::Error,
};

/// Only the author of a post may mutate it.
pub fn ensure_post_owner(identity: &Identity, post: &PostDBResponse) -> Result<(), Error> {
    if identity.user_id != post.author_id {
        return Err(Error::AccessDenied {
            resource: "post".to_string(),
        });
    }

    Ok(())
}

/// Only the author of a comment may mutate it.
pub fn ensure_comment_owner(identity: &Identity, comment: &CommentDBResponse) -> Result<(), Error> {
    if identity.user_id != comment.author_id {
        return Err(Error::AccessDenied {
            resource: "comment".to_string(),
        });
    }

    Ok(())
}

/// Published posts are visible to everyone; drafts only to their author.
pub fn ensure_post_visible(identity: Option<&Identity>, post: &PostDBResponse) -> Result<(), Error> {
    if post.status == PostStatus::Published {
        return Ok(());
    }

    match identity {
        Some(identity) if identity.user_id == post.author_id => Ok(()),
        _ => Err(Error::AccessDenied {
            resource: "post".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity(user_id: i64) -> Identity {
        Identity {
            user_id,
            email: format!("user{user_id}@example.com"),
        }
    }

    fn post(author_id: i64, status: PostStatus) -> PostDBResponse {
        PostDBResponse {
            id: 1,
            title: "a title".to_string(),
            content: "some content".to_string(),
            status,
            author_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn comment(author_id: i64) -> CommentDBResponse {
        CommentDBResponse {
            id: 1,
            content: "a comment".to_string(),
            post_id: 1,
            author_id,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_post_owner_check() {
        assert!(ensure_post_owner(&identity(1), &post(1, PostStatus::Draft)).is_ok());

        let err = ensure_post_owner(&identity(2), &post(1, PostStatus::Published)).unwrap_err();
        assert!(matches!(err, Error::AccessDenied { .. }));
    }

    #[test]
    fn test_comment_owner_check() {
        assert!(ensure_comment_owner(&identity(1), &comment(1)).is_ok());

        let err = ensure_comment_owner(&identity(2), &comment(1)).unwrap_err();
        assert!(matches!(err, Error::AccessDenied { .. }));
    }

    #[test]
    fn test_published_posts_visible_to_all() {
        let published = post(1, PostStatus::Published);
        assert!(ensure_post_visible(Some(&identity(1)), &published).is_ok());
        assert!(ensure_post_visible(Some(&identity(2)), &published).is_ok());
        assert!(ensure_post_visible(None, &published).is_ok());
    }

    #[test]
    fn test_drafts_visible_only_to_author() {
        let draft = post(1, PostStatus::Draft);
        assert!(ensure_post_visible(Some(&identity(1)), &draft).is_ok());

        let err = ensure_post_visible(Some(&identity(2)), &draft).unwrap_err();
        assert!(matches!(err, Error::AccessDenied { .. }));

        let err = ensure_post_visible(None, &draft).unwrap_err();
        assert!(matches!(err, Error::AccessDenied { .. }));
    }
}
