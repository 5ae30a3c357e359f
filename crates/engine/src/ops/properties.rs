use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
    prelude::*,
    sea_query::{Func, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    EngineError, Identity, MoneyCents, Page, PageRequest, Property, PublicAgent, ResultEngine,
    User, bookings, properties, users,
    util::{normalize_text, require_positive},
};

use super::{Engine, with_tx};

/// Editable fields of a property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub price: MoneyCents,
}

impl PropertyDraft {
    fn normalized(&self) -> ResultEngine<PropertyDraft> {
        require_positive(self.price, "price")?;
        Ok(PropertyDraft {
            title: normalize_text(&self.title, "title", 3, Some(255))?,
            description: normalize_text(&self.description, "description", 10, None)?,
            price: self.price,
        })
    }
}

/// A property together with its owner, as listed to admins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedProperty {
    pub property: Property,
    pub owner: PublicAgent,
}

/// Filters for listing properties.
///
/// Price bounds are inclusive.
#[derive(Clone, Debug, Default)]
pub struct PropertyFilter {
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    pub min_price: Option<MoneyCents>,
    pub max_price: Option<MoneyCents>,
    /// If true, includes deactivated properties (default: false).
    pub include_inactive: bool,
}

fn lower(column: properties::Column) -> SimpleExpr {
    Func::lower(Expr::col(column)).into()
}

impl Engine {
    /// Lists a new property owned by `caller`. Only agents and admins own
    /// properties.
    pub async fn create_property(
        &self,
        caller: &Identity,
        draft: PropertyDraft,
        now: DateTime<Utc>,
    ) -> ResultEngine<Property> {
        if !caller.role.can_own_properties() {
            return Err(EngineError::Forbidden(
                "only agents can list properties".to_string(),
            ));
        }
        let draft = draft.normalized()?;

        let property = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, caller.subject_id).await?;
            let property = Property::new(
                caller.subject_id,
                draft.title,
                draft.description,
                draft.price,
                now,
            );
            let model = properties::ActiveModel::from(&property)
                .insert(&db_tx)
                .await?;
            Property::try_from(model)
        })?;

        tracing::info!(property_id = %property.id, owner_id = %property.owner_id, "property created");
        Ok(property)
    }

    pub async fn property(&self, property_id: Uuid) -> ResultEngine<Property> {
        with_tx!(self, |db_tx| self.require_property(&db_tx, property_id).await)
    }

    /// Newest first.
    pub async fn list_properties(&self, filter: &PropertyFilter) -> ResultEngine<Vec<Property>> {
        if let (Some(min), Some(max)) = (filter.min_price, filter.max_price)
            && min > max
        {
            return Err(EngineError::InvalidArgument(
                "min_price must be <= max_price".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let mut query = properties::Entity::find();
            if !filter.include_inactive {
                query = query.filter(properties::Column::IsActive.eq(true));
            }
            if let Some(min) = filter.min_price {
                query = query.filter(properties::Column::PriceMinor.gte(min.cents()));
            }
            if let Some(max) = filter.max_price {
                query = query.filter(properties::Column::PriceMinor.lte(max.cents()));
            }
            if let Some(search) = filter.search.as_deref().map(str::trim)
                && !search.is_empty()
            {
                let pattern = format!("%{}%", search.to_lowercase());
                query = query.filter(
                    Condition::any()
                        .add(Expr::expr(lower(properties::Column::Title)).like(pattern.as_str()))
                        .add(
                            Expr::expr(lower(properties::Column::Description))
                                .like(pattern.as_str()),
                        ),
                );
            }

            query
                .order_by_desc(properties::Column::CreatedAt)
                .order_by_desc(properties::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Property::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Replaces title, description and price. Owner only.
    pub async fn update_property(
        &self,
        caller: &Identity,
        property_id: Uuid,
        draft: PropertyDraft,
        now: DateTime<Utc>,
    ) -> ResultEngine<Property> {
        with_tx!(self, |db_tx| {
            self.require_property_owner(&db_tx, property_id, caller)
                .await?;
            let draft = draft.normalized()?;

            let model = properties::ActiveModel {
                id: ActiveValue::Unchanged(property_id.to_string()),
                title: ActiveValue::Set(draft.title),
                description: ActiveValue::Set(draft.description),
                price_minor: ActiveValue::Set(draft.price.cents()),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Property::try_from(model)
        })
    }

    /// Activates or deactivates a property. Allowed to its owner and to
    /// admins. Existing bookings are left untouched.
    pub async fn set_property_active(
        &self,
        caller: &Identity,
        property_id: Uuid,
        active: bool,
        now: DateTime<Utc>,
    ) -> ResultEngine<Property> {
        let property = with_tx!(self, |db_tx| {
            let property = self.require_property(&db_tx, property_id).await?;
            if !property.is_owned_by(caller.subject_id) {
                caller.require_admin()?;
            }

            let model = properties::ActiveModel {
                id: ActiveValue::Unchanged(property.id.to_string()),
                is_active: ActiveValue::Set(active),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Property::try_from(model)
        })?;

        tracing::info!(property_id = %property.id, active, "property activity changed");
        Ok(property)
    }

    /// Moderation switch for admins, regardless of ownership.
    pub async fn admin_set_property_active(
        &self,
        caller: &Identity,
        property_id: Uuid,
        active: bool,
        now: DateTime<Utc>,
    ) -> ResultEngine<Property> {
        caller.require_admin()?;
        self.set_property_active(caller, property_id, active, now)
            .await
    }

    /// Every property, active or not, newest first. Admin only.
    pub async fn properties_page(
        &self,
        caller: &Identity,
        request: PageRequest,
    ) -> ResultEngine<Page<OwnedProperty>> {
        caller.require_admin()?;
        let request = request.validated()?;

        with_tx!(self, |db_tx| {
            let paginator = properties::Entity::find()
                .order_by_desc(properties::Column::CreatedAt)
                .order_by_desc(properties::Column::Id)
                .paginate(&db_tx, request.limit);
            let totals = paginator.num_items_and_pages().await?;
            let listed = paginator
                .fetch_page(request.index())
                .await?
                .into_iter()
                .map(Property::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let owner_ids: Vec<String> = listed.iter().map(|p| p.owner_id.to_string()).collect();
            let owners = users::Entity::find()
                .filter(users::Column::Id.is_in(owner_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(User::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let items = listed
                .into_iter()
                .map(|property| -> ResultEngine<OwnedProperty> {
                    let owner = owners
                        .iter()
                        .find(|owner| owner.id == property.owner_id)
                        .cloned()
                        .ok_or_else(|| EngineError::KeyNotFound("user not found".to_string()))?;
                    Ok(OwnedProperty {
                        property,
                        owner: PublicAgent::from(owner),
                    })
                })
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

    /// Deletes a property that has never been booked. Owner only.
    pub async fn delete_property(&self, caller: &Identity, property_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_property_owner(&db_tx, property_id, caller)
                .await?;

            let booked = bookings::Entity::find()
                .filter(bookings::Column::PropertyId.eq(property_id.to_string()))
                .count(&db_tx)
                .await?;
            if booked > 0 {
                return Err(EngineError::InvalidState(
                    "property has bookings, deactivate it instead".to_string(),
                ));
            }

            properties::Entity::delete_by_id(property_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
