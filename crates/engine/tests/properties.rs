use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::Database;

use engine::{
    Engine, EngineError, Identity, MoneyCents, NewUser, PageRequest, Property, PropertyDraft,
    PropertyFilter, Role,
};
use migration::MigratorTrait;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()
}

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn user(engine: &Engine, name: &str, role: Role) -> Identity {
    engine
        .create_user(
            NewUser {
                name: name.to_string(),
                email: format!("{name}@example.com"),
                phone: Some("+44 20 7946 0000".to_string()),
                role,
            },
            now(),
        )
        .await
        .unwrap()
        .0
        .identity()
}

fn draft(title: &str, description: &str, cents: i64) -> PropertyDraft {
    PropertyDraft {
        title: title.to_string(),
        description: description.to_string(),
        price: MoneyCents::new(cents),
    }
}

async fn listed(engine: &Engine, owner: &Identity, d: PropertyDraft, minutes: i64) -> Property {
    engine
        .create_property(owner, d, now() + Duration::minutes(minutes))
        .await
        .unwrap()
}

#[tokio::test]
async fn agents_list_properties_guests_cannot() {
    let engine = engine().await;
    let agent = user(&engine, "agnes", Role::Agent).await;
    let guest = user(&engine, "gus", Role::User).await;

    let property = listed(
        &engine,
        &agent,
        draft("Harbour loft", "Two rooms facing the harbour", 12_000),
        0,
    )
    .await;
    assert_eq!(property.owner_id, agent.subject_id);
    assert!(property.is_active);
    assert_eq!(engine.property(property.id).await.unwrap(), property);

    let err = engine
        .create_property(
            &guest,
            draft("Garden flat", "Ground floor with a garden", 9_000),
            now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)), "{err:?}");
}

#[tokio::test]
async fn search_and_price_filters() {
    let engine = engine().await;
    let agent = user(&engine, "agnes", Role::Agent).await;
    let loft = listed(
        &engine,
        &agent,
        draft("Harbour loft", "Two rooms facing the harbour", 12_000),
        0,
    )
    .await;
    let cabin = listed(
        &engine,
        &agent,
        draft("Forest cabin", "Wood stove, near the HARBOUR trail", 7_500),
        1,
    )
    .await;
    let flat = listed(
        &engine,
        &agent,
        draft("City flat", "Fifth floor, lift, balcony", 20_000),
        2,
    )
    .await;

    let ids = |props: Vec<Property>| props.into_iter().map(|p| p.id).collect::<Vec<_>>();

    let all = engine.list_properties(&PropertyFilter::default()).await.unwrap();
    assert_eq!(ids(all), vec![flat.id, cabin.id, loft.id]);

    let harbour = engine
        .list_properties(&PropertyFilter {
            search: Some("harbour".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(harbour), vec![cabin.id, loft.id]);

    let mid = engine
        .list_properties(&PropertyFilter {
            min_price: Some(MoneyCents::new(7_500)),
            max_price: Some(MoneyCents::new(12_000)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(mid), vec![cabin.id, loft.id]);

    let err = engine
        .list_properties(&PropertyFilter {
            min_price: Some(MoneyCents::new(2)),
            max_price: Some(MoneyCents::new(1)),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)), "{err:?}");
}

#[tokio::test]
async fn inactive_properties_are_hidden_by_default() {
    let engine = engine().await;
    let agent = user(&engine, "agnes", Role::Agent).await;
    let property = listed(
        &engine,
        &agent,
        draft("Harbour loft", "Two rooms facing the harbour", 12_000),
        0,
    )
    .await;

    engine
        .set_property_active(&agent, property.id, false, now())
        .await
        .unwrap();

    assert!(
        engine
            .list_properties(&PropertyFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
    let with_inactive = engine
        .list_properties(&PropertyFilter {
            include_inactive: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(with_inactive.len(), 1);
    assert!(!with_inactive[0].is_active);
}

#[tokio::test]
async fn only_owner_updates() {
    let engine = engine().await;
    let agent = user(&engine, "agnes", Role::Agent).await;
    let rival = user(&engine, "rita", Role::Agent).await;
    let property = listed(
        &engine,
        &agent,
        draft("Harbour loft", "Two rooms facing the harbour", 12_000),
        0,
    )
    .await;

    let err = engine
        .update_property(
            &rival,
            property.id,
            draft("Stolen loft", "Two rooms facing the harbour", 1),
            now(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("not the owner of this property".to_string())
    );

    let later = now() + Duration::hours(1);
    let updated = engine
        .update_property(
            &agent,
            property.id,
            draft("Harbour loft XL", "Three rooms facing the harbour", 15_000),
            later,
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Harbour loft XL");
    assert_eq!(updated.price, MoneyCents::new(15_000));
    assert_eq!(updated.updated_at, later);
    assert_eq!(updated.created_at, property.created_at);
}

#[tokio::test]
async fn admin_may_deactivate_foreign_property() {
    let engine = engine().await;
    let agent = user(&engine, "agnes", Role::Agent).await;
    let rival = user(&engine, "rita", Role::Agent).await;
    let admin = user(&engine, "ada", Role::Admin).await;
    let property = listed(
        &engine,
        &agent,
        draft("Harbour loft", "Two rooms facing the harbour", 12_000),
        0,
    )
    .await;

    let err = engine
        .set_property_active(&rival, property.id, false, now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)), "{err:?}");

    let deactivated = engine
        .set_property_active(&admin, property.id, false, now())
        .await
        .unwrap();
    assert!(!deactivated.is_active);
}

#[tokio::test]
async fn booked_property_cannot_be_deleted() {
    let engine = engine().await;
    let agent = user(&engine, "agnes", Role::Agent).await;
    let guest = user(&engine, "gus", Role::User).await;
    let booked = listed(
        &engine,
        &agent,
        draft("Harbour loft", "Two rooms facing the harbour", 12_000),
        0,
    )
    .await;
    let spare = listed(
        &engine,
        &agent,
        draft("Forest cabin", "Wood stove and a quiet lane", 7_500),
        1,
    )
    .await;

    engine
        .create_booking(
            &guest,
            booked.id,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            MoneyCents::new(12_000),
            now(),
        )
        .await
        .unwrap();

    let err = engine.delete_property(&agent, booked.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)), "{err:?}");

    let err = engine.delete_property(&guest, spare.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)), "{err:?}");

    engine.delete_property(&agent, spare.id).await.unwrap();
    let err = engine.property(spare.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("property not found".to_string()));
}

#[tokio::test]
async fn unknown_property_is_not_found() {
    let engine = engine().await;
    let err = engine.property(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("property not found".to_string()));
}

#[tokio::test]
async fn admin_moderation_requires_admin_even_for_owner() {
    let engine = engine().await;
    let agent = user(&engine, "agnes", Role::Agent).await;
    let admin = user(&engine, "ada", Role::Admin).await;
    let property = listed(
        &engine,
        &agent,
        draft("Harbour loft", "Two rooms facing the harbour", 12_000),
        0,
    )
    .await;

    let err = engine
        .admin_set_property_active(&agent, property.id, false, now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)), "{err:?}");
    assert!(engine.property(property.id).await.unwrap().is_active);

    let deactivated = engine
        .admin_set_property_active(&admin, property.id, false, now())
        .await
        .unwrap();
    assert!(!deactivated.is_active);
}

#[tokio::test]
async fn properties_page_includes_owner_and_inactive_listings() {
    let engine = engine().await;
    let agnes = user(&engine, "agnes", Role::Agent).await;
    let rita = user(&engine, "rita", Role::Agent).await;
    let admin = user(&engine, "ada", Role::Admin).await;

    let loft = listed(
        &engine,
        &agnes,
        draft("Harbour loft", "Two rooms facing the harbour", 12_000),
        1,
    )
    .await;
    let flat = listed(
        &engine,
        &rita,
        draft("Garden flat", "Ground floor with a garden", 9_000),
        2,
    )
    .await;
    let cabin = listed(
        &engine,
        &agnes,
        draft("Pine cabin", "Wood stove and a view of the lake", 15_000),
        3,
    )
    .await;
    engine
        .set_property_active(&agnes, cabin.id, false, now())
        .await
        .unwrap();

    let err = engine
        .properties_page(&agnes, PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)), "{err:?}");

    let first = engine
        .properties_page(&admin, PageRequest { page: 1, limit: 2 })
        .await
        .unwrap();
    assert_eq!((first.total, first.pages), (3, 2));
    let ids: Vec<_> = first.items.iter().map(|l| l.property.id).collect();
    assert_eq!(ids, [cabin.id, flat.id]);
    assert!(!first.items[0].property.is_active);
    assert_eq!(first.items[1].owner.id, rita.subject_id);

    let second = engine
        .properties_page(&admin, PageRequest { page: 2, limit: 2 })
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].property, loft);
    assert_eq!(second.items[0].owner.email, "agnes@example.com");
}
