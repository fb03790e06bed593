//! Credential and profile storage for the three account kinds.
//!
//! Each kind lives in its own table; [`ActorDirectory`] maps an [`ActorKind`] onto the
//! repository owning that table so callers never pick a table by name.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::ActorKind;
use crate::entities::{customer, dealer, delivery_agent};
use crate::repositories::{order_repository::OrderRepository, Repository};

use super::BaseRepository;

/// Public view of an account. Address fields are only present for customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActorProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub id: i32,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[derive(Debug, Clone)]
pub struct NewActor {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    /// Required for customers, ignored otherwise.
    pub postal: Option<PostalAddress>,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
    /// Required for customers, ignored otherwise.
    pub postal: Option<PostalAddress>,
}

fn missing_postal() -> DbErr {
    DbErr::Custom("customer records require a postal address".to_string())
}

#[async_trait]
pub trait ActorRepository: Send + Sync {
    fn kind(&self) -> ActorKind;

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, DbErr>;

    async fn insert(&self, actor: NewActor) -> Result<ActorProfile, DbErr>;

    async fn profile(&self, id: i32) -> Result<Option<ActorProfile>, DbErr>;

    /// Returns `None` when no account has this id.
    async fn update_profile(
        &self,
        id: i32,
        update: ProfileUpdate,
    ) -> Result<Option<ActorProfile>, DbErr>;
}

impl From<dealer::Model> for ActorProfile {
    fn from(m: dealer::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            address: None,
            city: None,
            state: None,
            pincode: None,
            created_at: m.created_at,
        }
    }
}

impl From<delivery_agent::Model> for ActorProfile {
    fn from(m: delivery_agent::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            address: None,
            city: None,
            state: None,
            pincode: None,
            created_at: m.created_at,
        }
    }
}

impl From<customer::Model> for ActorProfile {
    fn from(m: customer::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            address: Some(m.address),
            city: Some(m.city),
            state: Some(m.state),
            pincode: Some(m.pincode),
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DealerRepository {
    base: BaseRepository,
}

impl DealerRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl ActorRepository for DealerRepository {
    fn kind(&self) -> ActorKind {
        ActorKind::Dealer
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, DbErr> {
        Ok(dealer::Entity::find()
            .filter(dealer::Column::Email.eq(email))
            .one(self.base.get_db())
            .await?
            .map(|m| Credentials {
                id: m.id,
                password_hash: m.password_hash,
            }))
    }

    async fn insert(&self, actor: NewActor) -> Result<ActorProfile, DbErr> {
        let model = dealer::ActiveModel {
            name: Set(actor.name),
            email: Set(actor.email),
            password_hash: Set(actor.password_hash),
            phone: Set(actor.phone),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await?;
        Ok(model.into())
    }

    async fn profile(&self, id: i32) -> Result<Option<ActorProfile>, DbErr> {
        Ok(dealer::Entity::find_by_id(id)
            .one(self.base.get_db())
            .await?
            .map(Into::into))
    }

    async fn update_profile(
        &self,
        id: i32,
        update: ProfileUpdate,
    ) -> Result<Option<ActorProfile>, DbErr> {
        let db = self.base.get_db();
        let Some(existing) = dealer::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut active = existing.into_active_model();
        active.name = Set(update.name);
        active.phone = Set(update.phone);
        Ok(Some(active.update(db).await?.into()))
    }
}

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    base: BaseRepository,
}

impl CustomerRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl ActorRepository for CustomerRepository {
    fn kind(&self) -> ActorKind {
        ActorKind::Customer
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, DbErr> {
        Ok(customer::Entity::find()
            .filter(customer::Column::Email.eq(email))
            .one(self.base.get_db())
            .await?
            .map(|m| Credentials {
                id: m.id,
                password_hash: m.password_hash,
            }))
    }

    async fn insert(&self, actor: NewActor) -> Result<ActorProfile, DbErr> {
        let postal = actor.postal.ok_or_else(missing_postal)?;
        let model = customer::ActiveModel {
            name: Set(actor.name),
            email: Set(actor.email),
            password_hash: Set(actor.password_hash),
            phone: Set(actor.phone),
            address: Set(postal.address),
            city: Set(postal.city),
            state: Set(postal.state),
            pincode: Set(postal.pincode),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await?;
        Ok(model.into())
    }

    async fn profile(&self, id: i32) -> Result<Option<ActorProfile>, DbErr> {
        Ok(customer::Entity::find_by_id(id)
            .one(self.base.get_db())
            .await?
            .map(Into::into))
    }

    async fn update_profile(
        &self,
        id: i32,
        update: ProfileUpdate,
    ) -> Result<Option<ActorProfile>, DbErr> {
        let postal = update.postal.ok_or_else(missing_postal)?;
        let db = self.base.get_db();
        let Some(existing) = customer::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let mut active = existing.into_active_model();
        active.name = Set(update.name);
        active.phone = Set(update.phone);
        active.address = Set(postal.address);
        active.city = Set(postal.city);
        active.state = Set(postal.state);
        active.pincode = Set(postal.pincode);
        Ok(Some(active.update(db).await?.into()))
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryAgentRepository {
    base: BaseRepository,
}

impl DeliveryAgentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<delivery_agent::Model>, DbErr> {
        delivery_agent::Entity::find_by_id(id)
            .one(self.base.get_db())
            .await
    }

    pub async fn all(&self) -> Result<Vec<delivery_agent::Model>, DbErr> {
        delivery_agent::Entity::find()
            .order_by_asc(delivery_agent::Column::Name)
            .order_by_asc(delivery_agent::Column::Id)
            .all(self.base.get_db())
            .await
    }

    /// Agents holding no `accepted` or `in-progress` order right now.
    pub async fn available(&self) -> Result<Vec<delivery_agent::Model>, DbErr> {
        delivery_agent::Entity::find()
            .filter(delivery_agent::Column::Id.not_in_subquery(OrderRepository::busy_agent_ids()))
            .order_by_asc(delivery_agent::Column::Name)
            .order_by_asc(delivery_agent::Column::Id)
            .all(self.base.get_db())
            .await
    }
}

#[async_trait]
impl ActorRepository for DeliveryAgentRepository {
    fn kind(&self) -> ActorKind {
        ActorKind::DeliveryAgent
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, DbErr> {
        Ok(delivery_agent::Entity::find()
            .filter(delivery_agent::Column::Email.eq(email))
            .one(self.base.get_db())
            .await?
            .map(|m| Credentials {
                id: m.id,
                password_hash: m.password_hash,
            }))
    }

    async fn insert(&self, actor: NewActor) -> Result<ActorProfile, DbErr> {
        let model = delivery_agent::ActiveModel {
            name: Set(actor.name),
            email: Set(actor.email),
            password_hash: Set(actor.password_hash),
            phone: Set(actor.phone),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await?;
        Ok(model.into())
    }

    async fn profile(&self, id: i32) -> Result<Option<ActorProfile>, DbErr> {
        Ok(self.find_by_id(id).await?.map(Into::into))
    }

    async fn update_profile(
        &self,
        id: i32,
        update: ProfileUpdate,
    ) -> Result<Option<ActorProfile>, DbErr> {
        let db = self.base.get_db();
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let mut active = existing.into_active_model();
        active.name = Set(update.name);
        active.phone = Set(update.phone);
        Ok(Some(active.update(db).await?.into()))
    }
}

/// Lookup table from account kind to the repository owning that kind's table.
#[derive(Clone)]
pub struct ActorDirectory {
    dealers: Arc<dyn ActorRepository>,
    customers: Arc<dyn ActorRepository>,
    agents: Arc<dyn ActorRepository>,
}

impl ActorDirectory {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            dealers: Arc::new(DealerRepository::new(db.clone())),
            customers: Arc::new(CustomerRepository::new(db.clone())),
            agents: Arc::new(DeliveryAgentRepository::new(db)),
        }
    }

    pub fn get(&self, kind: ActorKind) -> &dyn ActorRepository {
        match kind {
            ActorKind::Dealer => self.dealers.as_ref(),
            ActorKind::Customer => self.customers.as_ref(),
            ActorKind::DeliveryAgent => self.agents.as_ref(),
        }
    }
}

impl std::fmt::Debug for ActorDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorDirectory").finish_non_exhaustive()
    }
}
