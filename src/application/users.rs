use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::audit::AuditRecorder;
use crate::application::posts::{PostError, PostService};
use crate::application::repos::{
    CreateTokenParams, CreateUserParams, PostsRepo, RepoError, UsersRepo,
};
use crate::application::viewer::Viewer;
use crate::domain::entities::UserRecord;
use crate::domain::error::{DomainError, require_text};

const TOKEN_PREFIX: &str = "pr";
const MIN_SECRET_LEN: usize = 32;
pub const MAX_USERNAME_CHARS: usize = 150;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("username `{0}` is already taken")]
    UsernameTaken(String),
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Posts(#[from] PostError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid token")]
    Invalid,
    #[error("revoked token")]
    Revoked,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub user: UserRecord,
    pub token: String,
}

struct ParsedToken {
    prefix: String,
    secret: String,
}

/// Accounts and bearer tokens.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UsersRepo>,
    posts: Arc<dyn PostsRepo>,
    post_service: PostService,
    audit: AuditRecorder,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        posts: Arc<dyn PostsRepo>,
        post_service: PostService,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            users,
            posts,
            post_service,
            audit,
        }
    }

    /// Create an account and record the registration.
    pub async fn register(&self, username: &str, is_staff: bool) -> Result<UserRecord, UserError> {
        let username = require_text("username", username, MAX_USERNAME_CHARS)?;
        if self.users.find_user_by_username(&username).await?.is_some() {
            return Err(UserError::UsernameTaken(username));
        }

        let user = match self
            .users
            .create_user(CreateUserParams {
                username: username.clone(),
                is_staff,
            })
            .await
        {
            Ok(user) => user,
            Err(RepoError::Duplicate { .. }) => return Err(UserError::UsernameTaken(username)),
            Err(err) => return Err(err.into()),
        };

        self.audit.user_registered(&user).await?;

        info!(
            target = "pressroom::users",
            user_id = %user.id,
            is_staff,
            "user registered"
        );
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<UserRecord, UserError> {
        self.users
            .find_user_by_username(username.trim())
            .await?
            .ok_or(UserError::NotFound)
    }

    /// Mint a bearer token. Only the digest of its secret is stored.
    pub async fn issue_token(&self, username: &str) -> Result<IssuedToken, UserError> {
        let user = self.find_by_username(username).await?;

        let prefix = Self::generate_prefix();
        let secret = Self::generate_secret();
        let token = format!("{TOKEN_PREFIX}_{prefix}_{secret}");

        self.users
            .create_token(CreateTokenParams {
                user_id: user.id,
                prefix,
                hashed_secret: Self::hash_secret(&secret),
            })
            .await?;

        Ok(IssuedToken { user, token })
    }

    pub async fn authenticate(&self, token: &str) -> Result<Viewer, AuthError> {
        let parsed = Self::parse_token(token.trim()).ok_or(AuthError::Invalid)?;
        let record = self
            .users
            .find_token_by_prefix(&parsed.prefix)
            .await
            .map_err(|_| AuthError::Invalid)?
            .ok_or(AuthError::Invalid)?;

        if record.revoked_at.is_some() {
            return Err(AuthError::Revoked);
        }

        let hashed_input = Self::hash_secret(&parsed.secret);
        if record.hashed_secret.ct_eq(&hashed_input).unwrap_u8() == 0 {
            return Err(AuthError::Invalid);
        }

        let user = self
            .users
            .find_user(record.user_id)
            .await
            .map_err(|_| AuthError::Invalid)?
            .ok_or(AuthError::Invalid)?;

        Ok(Viewer::user(user))
    }

    /// Remove a user. Their posts are deleted one by one through the audited
    /// post path first; comments and tokens cascade with the account.
    pub async fn delete_user(&self, id: Uuid) -> Result<(), UserError> {
        if self.users.find_user(id).await?.is_none() {
            return Err(UserError::NotFound);
        }

        for post_id in self.posts.list_post_ids_by_author(id).await? {
            match self.post_service.delete_post(post_id).await {
                Ok(_) | Err(PostError::NotFound) => {}
                Err(err) => return Err(err.into()),
            }
        }

        self.users.delete_user(id).await?;
        info!(target = "pressroom::users", user_id = %id, "user deleted");
        Ok(())
    }

    fn hash_secret(secret: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hasher.finalize().to_vec()
    }

    fn generate_prefix() -> String {
        Uuid::new_v4().simple().to_string()[..12].to_string()
    }

    fn generate_secret() -> String {
        format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
    }

    fn parse_token(token: &str) -> Option<ParsedToken> {
        let mut parts = token.splitn(3, '_');
        if parts.next()? != TOKEN_PREFIX {
            return None;
        }
        let prefix = parts.next()?;
        let secret = parts.next()?;
        if secret.len() < MIN_SECRET_LEN || prefix.is_empty() {
            return None;
        }
        Some(ParsedToken {
            prefix: prefix.to_string(),
            secret: secret.to_string(),
        })
    }
}
