use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Identity, Page, PageRequest, PublicAgent, ResultEngine, Role, User, bookings,
    properties, users,
    util::{normalize_email, normalize_optional_text, normalize_text},
};

use super::{Engine, with_tx};

/// Input of [`Engine::create_user`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// Platform counters shown to admins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub users: u64,
    pub agents: u64,
    pub properties: u64,
    pub bookings: u64,
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Engine {
    /// Registers an account and returns it together with its API token.
    ///
    /// Emails are unique regardless of case.
    pub async fn create_user(
        &self,
        new_user: NewUser,
        now: DateTime<Utc>,
    ) -> ResultEngine<(User, String)> {
        let name = normalize_text(&new_user.name, "name", 2, Some(100))?;
        let email = normalize_email(&new_user.email)?;

        let (user, token) = with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(email));
            }

            let user = User {
                id: Uuid::new_v4(),
                name,
                email,
                phone: normalize_optional_text(new_user.phone.as_deref()),
                role: new_user.role,
                is_active: true,
                is_verified: false,
                created_at: now,
            };
            let token = new_token();
            users::ActiveModel::from_user(&user, &token)
                .insert(&db_tx)
                .await?;
            Ok::<_, EngineError>((user, token))
        })?;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "user created");
        Ok((user, token))
    }

    /// Resolves an API token into the caller's identity.
    pub async fn authenticate(&self, token: &str) -> ResultEngine<Identity> {
        let token = token.trim();
        if token.is_empty() {
            return Err(EngineError::Unauthorized("missing token".to_string()));
        }

        with_tx!(self, |db_tx| {
            let user = users::Entity::find()
                .filter(users::Column::ApiToken.eq(token))
                .one(&db_tx)
                .await?
                .map(User::try_from)
                .transpose()?
                .filter(|user| user.is_active)
                .ok_or_else(|| EngineError::Unauthorized("invalid token".to_string()))?;
            Ok(user.identity())
        })
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| self.require_user(&db_tx, user_id).await)
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        with_tx!(self, |db_tx| {
            users::Entity::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not found".to_string()))
                .and_then(User::try_from)
        })
    }

    /// Replaces the API token of a user; the old one stops working.
    pub async fn reissue_token(&self, user_id: Uuid) -> ResultEngine<String> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let token = new_token();
            users::ActiveModel {
                id: ActiveValue::Unchanged(user_id.to_string()),
                api_token: ActiveValue::Set(token.clone()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(token)
        })
    }

    /// Active agents, oldest first.
    pub async fn agents(&self) -> ResultEngine<Vec<PublicAgent>> {
        with_tx!(self, |db_tx| {
            users::Entity::find()
                .filter(users::Column::Role.eq(Role::Agent.as_str()))
                .filter(users::Column::IsActive.eq(true))
                .order_by_asc(users::Column::CreatedAt)
                .order_by_asc(users::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| User::try_from(model).map(PublicAgent::from))
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn agent(&self, agent_id: Uuid) -> ResultEngine<PublicAgent> {
        let user = self.user(agent_id).await?;
        if user.role != Role::Agent || !user.is_active {
            return Err(EngineError::KeyNotFound("agent not found".to_string()));
        }
        Ok(PublicAgent::from(user))
    }

    /// Admin only.
    pub async fn set_user_active(
        &self,
        caller: &Identity,
        user_id: Uuid,
        active: bool,
    ) -> ResultEngine<User> {
        caller.require_admin()?;
        if caller.subject_id == user_id && !active {
            return Err(EngineError::InvalidArgument(
                "admins cannot deactivate themselves".to_string(),
            ));
        }

        let user = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let model = users::ActiveModel {
                id: ActiveValue::Unchanged(user_id.to_string()),
                is_active: ActiveValue::Set(active),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            User::try_from(model)
        })?;

        tracing::info!(user_id = %user.id, active, "user activity changed");
        Ok(user)
    }

    /// Guest accounts, newest first. Admin only.
    pub async fn users_page(
        &self,
        caller: &Identity,
        request: PageRequest,
    ) -> ResultEngine<Page<User>> {
        caller.require_admin()?;
        let request = request.validated()?;

        with_tx!(self, |db_tx| {
            let paginator = users::Entity::find()
                .filter(users::Column::Role.eq(Role::User.as_str()))
                .order_by_desc(users::Column::CreatedAt)
                .order_by_desc(users::Column::Id)
                .paginate(&db_tx, request.limit);
            let totals = paginator.num_items_and_pages().await?;
            let items = paginator
                .fetch_page(request.index())
                .await?
                .into_iter()
                .map(User::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(Page {
                items,
                total: totals.number_of_items,
                page: request.page,
                limit: request.limit,
                pages: totals.number_of_pages,
            })
        })
    }

    /// Admin only.
    pub async fn overview(&self, caller: &Identity) -> ResultEngine<Overview> {
        caller.require_admin()?;
        with_tx!(self, |db_tx| {
            Ok(Overview {
                users: users::Entity::find().count(&db_tx).await?,
                agents: users::Entity::find()
                    .filter(users::Column::Role.eq(Role::Agent.as_str()))
                    .count(&db_tx)
                    .await?,
                properties: properties::Entity::find().count(&db_tx).await?,
                bookings: bookings::Entity::find().count(&db_tx).await?,
            })
        })
    }
}
