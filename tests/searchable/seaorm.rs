//! Wiring the binder to a real ORM: sea-orm entities over in-memory
//! SQLite, with lifecycle hooks called at the application's hook points.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, Database,
    DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Schema,
};

use elastic_searchable::{
    Error, IndexConfig, RecordStore, Result, SearchIndex, SearchOptions, Searchable,
};

use crate::support::engine::StubEngine;

mod post {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "posts")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        pub body: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl Searchable for post::Model {
    fn document_type() -> &'static str {
        "posts"
    }

    fn record_id(&self) -> i64 {
        i64::from(self.id)
    }
}

struct SeaOrmStore {
    db: DatabaseConnection,
}

#[async_trait]
impl RecordStore<post::Model> for SeaOrmStore {
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<post::Model>> {
        let ids: Vec<i32> = ids.iter().map(|id| *id as i32).collect();
        post::Entity::find()
            .filter(post::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(Error::store)
    }

    async fn all(&self) -> Result<Vec<post::Model>> {
        post::Entity::find().all(&self.db).await.map_err(Error::store)
    }
}

async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect sqlite");
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let statement = schema.create_table_from_entity(post::Entity);
    db.execute(backend.build(&statement))
        .await
        .expect("create posts table");
    db
}

async fn create_post(db: &DatabaseConnection, title: &str, body: &str) -> post::Model {
    post::ActiveModel {
        title: Set(title.to_string()),
        body: Set(body.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert post")
}

#[tokio::test]
async fn test_lifecycle_and_hydration_through_sea_orm() {
    let engine = StubEngine::start().await;
    let db = setup_db().await;
    let store = Arc::new(SeaOrmStore { db: db.clone() });
    let index = SearchIndex::new(
        engine.client(),
        IndexConfig::new().with_index_name("posts_idx"),
        store,
    );
    index.create_index().await.unwrap();

    // The application's hook points call into the binder after each write.
    let first = create_post(&db, "foo", "first bar").await;
    index.after_create(&first).await.unwrap();
    let second = create_post(&db, "foo", "second bar").await;
    index.after_create(&second).await.unwrap();
    index.refresh().await.unwrap();

    let results = index.search("first", &SearchOptions::new()).await.unwrap();
    assert_eq!(results.items(), &[first.clone()]);

    let all = index.search("foo", &SearchOptions::new()).await.unwrap();
    assert_eq!(all.total_entries(), 2);

    // Destroy the second post completely: relational delete, then the hook.
    second.clone().delete(&db).await.expect("delete post");
    index.after_destroy(&second).await.unwrap();
    assert!(engine
        .client()
        .get_document("posts_idx", "posts", second.record_id())
        .await
        .is_err());

    // Delete the first relationally without its hook: the document lingers
    // in the index and hydration skips it instead of failing.
    let id = first.record_id();
    first.delete(&db).await.expect("delete post");
    index.refresh().await.unwrap();
    let remaining = index.search("foo", &SearchOptions::new()).await.unwrap();
    assert!(remaining.is_empty());
    assert_eq!(remaining.total_entries(), 1);

    index.delete_id(id).await.expect("clean up lingering doc");
}

#[tokio::test]
async fn test_reindex_all_from_relational_store() {
    let engine = StubEngine::start().await;
    let db = setup_db().await;
    let store = Arc::new(SeaOrmStore { db: db.clone() });
    let index = SearchIndex::new(
        engine.client(),
        IndexConfig::new().with_index_name("posts_idx"),
        store,
    );
    index.create_index().await.unwrap();

    let first = create_post(&db, "foo", "first bar").await;
    let second = create_post(&db, "foo", "second bar").await;

    let indexed = index.reindex_all().await.unwrap();
    assert_eq!(indexed, 2);

    index.refresh().await.unwrap();
    let results = index.search("foo", &SearchOptions::new()).await.unwrap();
    assert_eq!(results.items(), &[first, second]);
}
