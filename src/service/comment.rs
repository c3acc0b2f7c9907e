//! Comments on tasks.

use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::repository::CommentRepository;
use crate::service::task::require;
use crate::task::{AddCommentInput, Comment};

#[derive(Debug, Clone)]
pub struct CommentService<R> {
    repo: R,
}

impl<R: CommentRepository> CommentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn add_comment(&self, input: AddCommentInput) -> Result<Comment> {
        require(&input.task_id, "task id is required")?;
        require(&input.provider_id, "provider id is required")?;
        require(&input.body_md, "comment body is required")?;

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            task_id: input.task_id,
            provider_id: input.provider_id,
            remote_id: None,
            body_md: input.body_md,
            author: input.author,
            created_at: Utc::now(),
        };
        self.repo.create_comment(comment)
    }

    pub fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>> {
        require(task_id, "task id is required")?;
        self.repo.list_comments(task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::repository::TaskRepository;
    use crate::task::fixtures::task;

    #[test]
    fn test_add_and_list_comments() {
        let store = Store::in_memory();
        store.create_task(task("t1", "A")).unwrap();
        let service = CommentService::new(store);
        service
            .add_comment(AddCommentInput {
                task_id: "t1".to_string(),
                provider_id: "p1".to_string(),
                body_md: "first".to_string(),
                author: None,
            })
            .unwrap();
        let comments = service.list_comments("t1").unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body_md, "first");
    }

    #[test]
    fn test_blank_body_rejected() {
        let service = CommentService::new(Store::in_memory());
        let err = service
            .add_comment(AddCommentInput {
                task_id: "t1".to_string(),
                provider_id: "p1".to_string(),
                body_md: "  ".to_string(),
                author: None,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "comment body is required");
    }
}
