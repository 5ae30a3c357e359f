use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Identity, Property, ResultEngine, User, properties, users};

use super::Engine;

fn property_not_found() -> EngineError {
    EngineError::KeyNotFound("property not found".to_string())
}

impl Engine {
    pub(super) async fn find_property(
        &self,
        db: &DatabaseTransaction,
        property_id: Uuid,
    ) -> ResultEngine<Option<Property>> {
        properties::Entity::find_by_id(property_id.to_string())
            .one(db)
            .await?
            .map(Property::try_from)
            .transpose()
    }

    pub(super) async fn require_property(
        &self,
        db: &DatabaseTransaction,
        property_id: Uuid,
    ) -> ResultEngine<Property> {
        self.find_property(db, property_id)
            .await?
            .ok_or_else(property_not_found)
    }

    /// Loads the property and checks that `caller` owns it.
    pub(super) async fn require_property_owner(
        &self,
        db: &DatabaseTransaction,
        property_id: Uuid,
        caller: &Identity,
    ) -> ResultEngine<Property> {
        let property = self.require_property(db, property_id).await?;
        if !property.is_owned_by(caller.subject_id) {
            return Err(EngineError::Forbidden(
                "not the owner of this property".to_string(),
            ));
        }
        Ok(property)
    }

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not found".to_string()))
            .and_then(User::try_from)
    }
}
