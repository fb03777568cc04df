mod support;

use pressroom::application::posts::CreatePostCommand;
use pressroom::application::taxonomy::{CreateCategoryCommand, CreateTagCommand, TaxonomyError};
use pressroom::application::users::UserError;
use pressroom::application::viewer::Viewer;
use pressroom::domain::types::{ActivityAction, PostStatus};

use support::Harness;

#[tokio::test]
async fn deleting_a_post_removes_its_comments_and_logs_first() {
    let h = Harness::new();
    let author = h.staff("editor").await;
    let reader = h.member("reader").await;
    let post = h.published(&author, "Doomed", "body").await;
    let keep = h.published(&author, "Kept", "body").await;

    for target in [post.id, keep.id] {
        h.app
            .comments
            .add_comment(&Viewer::user(reader.clone()), target, "nice".into())
            .await
            .expect("comment");
    }
    assert_eq!(h.store.comment_count().await, 2);

    let removed = h.app.posts.delete_post(post.id).await.expect("delete");
    assert_eq!(removed.title, "Doomed");
    assert!(h.store.post(post.id).await.is_none());
    assert_eq!(h.store.comment_count().await, 1);

    let rows = h.store.activity_rows().await;
    let last = rows.last().expect("delete row");
    assert_eq!(last.action, ActivityAction::DeletePost);
    assert_eq!(last.target_title, "Doomed");
    assert_eq!(last.user_id, Some(author.id));
}

#[tokio::test]
async fn deleting_a_category_keeps_its_posts() {
    let h = Harness::new();
    let author = h.staff("editor").await;
    let category = h
        .app
        .taxonomy
        .create_category(CreateCategoryCommand {
            name: "技术分享".into(),
            slug: None,
            description: String::new(),
        })
        .await
        .expect("category");
    assert_eq!(category.slug, "ji-shu-fen-xiang");

    let post = h
        .app
        .posts
        .create_post(CreatePostCommand {
            title: "Filed".into(),
            content: "body".into(),
            author_id: author.id,
            status: Some(PostStatus::Published),
            category_id: Some(category.id),
            tag_ids: Vec::new(),
        })
        .await
        .expect("create");

    h.app
        .taxonomy
        .delete_category(category.id)
        .await
        .expect("delete category");

    let survivor = h.store.post(post.id).await.expect("post survives");
    assert_eq!(survivor.category_id, None);

    let again = h
        .app
        .taxonomy
        .delete_category(category.id)
        .await
        .expect_err("already gone");
    assert!(matches!(
        again,
        TaxonomyError::NotFound {
            entity: "category"
        }
    ));
}

#[tokio::test]
async fn deleting_a_tag_unlinks_it_from_posts() {
    let h = Harness::new();
    let author = h.staff("editor").await;
    let tag = h
        .app
        .taxonomy
        .create_tag(CreateTagCommand {
            name: "Rust".into(),
            slug: None,
        })
        .await
        .expect("tag");
    let post = h.published(&author, "Tagged", "body").await;
    h.app
        .posts
        .set_tags(post.id, &[tag.id])
        .await
        .expect("set tags");

    let detail = h
        .app
        .posts
        .detail(&Viewer::anonymous(), post.id)
        .await
        .expect("detail");
    assert_eq!(detail.tags.len(), 1);

    h.app.taxonomy.delete_tag(tag.id).await.expect("delete tag");
    let detail = h
        .app
        .posts
        .detail(&Viewer::anonymous(), post.id)
        .await
        .expect("detail");
    assert!(detail.tags.is_empty());
}

#[tokio::test]
async fn deleting_a_user_removes_their_content_but_keeps_history() {
    let h = Harness::new();
    let author = h.staff("leaving").await;
    let other = h.staff("staying").await;
    let first = h.published(&author, "One", "body").await;
    h.post(&author, "Two", "body", None).await;
    let survivor = h.published(&other, "Three", "body").await;

    h.app
        .comments
        .add_comment(&Viewer::user(author.clone()), survivor.id, "bye".into())
        .await
        .expect("comment");
    h.app
        .users
        .issue_token("leaving")
        .await
        .expect("token");
    assert_eq!(h.store.token_count().await, 1);

    h.app.users.delete_user(author.id).await.expect("delete user");

    assert!(h.store.post(first.id).await.is_none());
    assert!(h.store.post(survivor.id).await.is_some());
    assert_eq!(h.store.comment_count().await, 0);
    assert_eq!(h.store.token_count().await, 0);

    let rows = h.store.activity_rows().await;
    let deletes: Vec<_> = rows
        .iter()
        .filter(|row| row.action == ActivityAction::DeletePost)
        .collect();
    assert_eq!(deletes.len(), 2);
    assert!(
        rows.iter()
            .filter(|row| row.target_title == "leaving" || row.target_title == "One")
            .all(|row| row.user_id.is_none() && row.username.is_none())
    );
    assert!(
        rows.iter()
            .filter(|row| row.target_title == "Three")
            .all(|row| row.user_id == Some(other.id))
    );
}

#[tokio::test]
async fn deleting_a_missing_user_is_not_found() {
    let h = Harness::new();
    let err = h
        .app
        .users
        .delete_user(uuid::Uuid::new_v4())
        .await
        .expect_err("missing");
    assert!(matches!(err, UserError::NotFound));
}

#[tokio::test]
async fn usernames_are_unique() {
    let h = Harness::new();
    h.member("dup").await;
    let err = h
        .app
        .users
        .register("  dup ", false)
        .await
        .expect_err("taken");
    assert!(matches!(err, UserError::UsernameTaken(name) if name == "dup"));
}

#[tokio::test]
async fn issued_tokens_authenticate_their_owner() {
    let h = Harness::new();
    let staff = h.staff("editor").await;
    let issued = h.app.users.issue_token("editor").await.expect("token");
    assert!(issued.token.starts_with("pr_"));

    let viewer = h
        .app
        .users
        .authenticate(&issued.token)
        .await
        .expect("authenticate");
    assert!(viewer.is_staff());
    assert_eq!(viewer.account().map(|u| u.id), Some(staff.id));

    let mut tampered = issued.token.clone();
    tampered.pop();
    tampered.push(if issued.token.ends_with('0') { '1' } else { '0' });
    assert!(h.app.users.authenticate(&tampered).await.is_err());
    assert!(h.app.users.authenticate("garbage").await.is_err());
}
