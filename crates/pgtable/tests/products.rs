//! Round trips against a real database. Skipped unless `DATABASE_URL` is set.

use pgtable::{
    Criteria, Record, RowSet, SearchArgs, Table, TableError, TableIdentity, TableResult, Value,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::{Client, NoTls};

struct Fixture {
    client: Arc<Client>,
    table: String,
}

impl Fixture {
    /// Connect and create a fresh `products`-shaped table seeded with four rows.
    async fn products(test: &str) -> TableResult<Option<Self>> {
        dotenvy::dotenv().ok();
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(v) => v,
            Err(_) => {
                eprintln!("DATABASE_URL is not set; skipping {test}");
                return Ok(None);
            }
        };

        let (client, connection) = tokio_postgres::connect(&database_url, NoTls).await?;
        tokio::spawn(async move {
            let _ = connection.await;
        });

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX_EPOCH")
            .as_nanos();
        let table = format!("pgtable_products_{test}_{}_{nanos}", std::process::id());
        client
            .batch_execute(&format!(
                r#"
                CREATE TABLE "{table}" (
                    id serial PRIMARY KEY,
                    name text NOT NULL,
                    price double precision NOT NULL DEFAULT 0,
                    in_stock boolean NOT NULL DEFAULT true,
                    description text,
                    tags text[] NOT NULL DEFAULT '{{}}'
                );
                INSERT INTO "{table}" (name, price, in_stock, description, tags) VALUES
                    ('Product 1', 12.00, true, 'Product 1 description', '{{tag1,tag2}}'),
                    ('Product 2', 24.00, true, 'Product 2 description', '{{tag3}}'),
                    ('Product 3', 35.00, false, 'Product 3 description', '{{}}'),
                    ('Product 4', 40.00, true, 'An electric guitar', '{{tag4}}');
                "#
            ))
            .await?;

        Ok(Some(Self {
            client: Arc::new(client),
            table,
        }))
    }

    fn table(&self) -> Table<Arc<Client>> {
        Table::new(
            TableIdentity::public(&self.table).expect("valid table name"),
            Arc::clone(&self.client),
        )
    }

    async fn drop_table(self) -> TableResult<()> {
        self.client
            .batch_execute(&format!(r#"DROP TABLE IF EXISTS "{}""#, self.table))
            .await?;
        Ok(())
    }
}

fn text(record: &Record, column: &str) -> String {
    record
        .get(column)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn id_of(record: &Record) -> i64 {
    record.get("id").and_then(Value::as_i64).expect("id column")
}

#[tokio::test]
async fn scalar_criteria_match_every_returned_row() -> TableResult<()> {
    let Some(fx) = Fixture::products("scalar").await? else {
        return Ok(());
    };
    let products = fx.table();

    let rows = products.find(json!({"in_stock": true})).await?.into_vec();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.get("in_stock") == Some(&Value::Bool(true))));

    let rows = products.find(Criteria::eq("price >", 30)).await?.into_vec();
    assert_eq!(rows.len(), 2);

    fx.drop_table().await
}

#[tokio::test]
async fn membership_and_negated_membership() -> TableResult<()> {
    let Some(fx) = Fixture::products("membership").await? else {
        return Ok(());
    };
    let products = fx.table();

    let rows = products
        .find(json!({"name": ["Product 1", "Product 3"]}))
        .await?
        .into_vec();
    let mut names: Vec<_> = rows.iter().map(|r| text(r, "name")).collect();
    names.sort();
    assert_eq!(names, vec!["Product 1", "Product 3"]);

    let rows = products
        .find(json!({"name !=": ["Product 1", "Product 3"]}))
        .await?
        .into_vec();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| !["Product 1", "Product 3"].contains(&text(r, "name").as_str())));

    let rows = products.find(json!({"name": []})).await?.into_vec();
    assert!(rows.is_empty());

    fx.drop_table().await
}

#[tokio::test]
async fn primary_key_shortcut_returns_single_row() -> TableResult<()> {
    let Some(fx) = Fixture::products("pk").await? else {
        return Ok(());
    };
    let products = fx.table();

    let first = products.find_one(Criteria::eq("name", "Product 2")).await?.expect("row");
    let id = id_of(&first);

    let by_key = products.find(id).await?;
    assert!(by_key.is_single());
    assert_eq!(by_key.into_one(), Some(first.clone()));

    let by_criteria = products.find_one(Criteria::eq("id", id)).await?;
    assert_eq!(by_criteria, Some(first));

    assert_eq!(products.find(999_999).await?, RowSet::Single(None));

    fx.drop_table().await
}

#[tokio::test]
async fn insert_many_preserves_order_and_arrays() -> TableResult<()> {
    let Some(fx) = Fixture::products("insert_many").await? else {
        return Ok(());
    };
    let products = fx.table();

    let rows = products
        .insert_many(vec![
            Record::new().with("name", "A").with("tags", vec!["x", "y"]),
            Record::new().with("name", "B").with("tags", vec!["z"]),
        ])
        .await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(text(&rows[0], "name"), "A");
    assert_eq!(rows[0].get("tags"), Some(&Value::from(vec!["x", "y"])));
    assert_eq!(text(&rows[1], "name"), "B");

    fx.drop_table().await
}

#[tokio::test]
async fn save_updates_by_key_and_inserts_without() -> TableResult<()> {
    let Some(fx) = Fixture::products("save").await? else {
        return Ok(());
    };
    let products = fx.table();

    let existing = products.find_one(Criteria::eq("name", "Product 1")).await?.expect("row");
    let id = id_of(&existing);
    let input = Record::new().with("id", id).with("name", "Renamed");

    let saved = products.save(&input).await?.expect("updated row");
    assert_eq!(text(&saved, "name"), "Renamed");
    assert_eq!(input.get("id"), Some(&Value::Int(id)));

    let inserted = products
        .save(Record::new().with("name", "Brand new"))
        .await?
        .expect("inserted row");
    assert_ne!(id_of(&inserted), id);
    assert_eq!(products.count(()).await?, 5);

    fx.drop_table().await
}

#[tokio::test]
async fn update_with_empty_criteria_touches_every_row() -> TableResult<()> {
    let Some(fx) = Fixture::products("update_all").await? else {
        return Ok(());
    };
    let products = fx.table();

    let updated = products
        .update(json!({"in_stock": false}), Criteria::new())
        .await?;
    assert_eq!(updated.len(), 4);
    assert_eq!(products.count(json!({"in_stock": true})).await?, 0);

    let updated = products
        .update(json!({"price": 1}), json!({"name": ["Product 1", "Product 2"]}))
        .await?;
    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|r| r.get("price") == Some(&Value::Float(1.0))));

    fx.drop_table().await
}

#[tokio::test]
async fn count_tracks_insert_and_destroy() -> TableResult<()> {
    let Some(fx) = Fixture::products("count").await? else {
        return Ok(());
    };
    let products = fx.table();

    assert_eq!(products.count(()).await?, 4);
    let row = products
        .insert_one(Record::new().with("name", "Fifth").with("price", 5))
        .await?
        .expect("inserted row");
    assert_eq!(products.count(()).await?, 5);

    let deleted = products.destroy(Criteria::eq("id", id_of(&row))).await?;
    assert_eq!(deleted.len(), 1);
    assert_eq!(products.count(()).await?, 4);

    assert_eq!(
        products
            .count(pgtable::Conditions::raw("price > $1", vec![Value::Int(20)]))
            .await?,
        3
    );

    fx.drop_table().await
}

#[tokio::test]
async fn destroy_everything_then_find_nothing() -> TableResult<()> {
    let Some(fx) = Fixture::products("destroy_all").await? else {
        return Ok(());
    };
    let products = fx.table();

    let deleted = products.destroy(json!({})).await?;
    assert_eq!(deleted.len(), 4);
    assert!(products.find(json!({})).await?.is_empty());

    fx.drop_table().await
}

#[tokio::test]
async fn where_raw_and_search() -> TableResult<()> {
    let Some(fx) = Fixture::products("raw_search").await? else {
        return Ok(());
    };
    let products = fx.table();

    let rows = products
        .where_raw("price > $1 AND in_stock = $2", vec![Value::Int(20), Value::Bool(true)])
        .await?;
    assert_eq!(rows.len(), 2);

    let rows = products
        .search(&SearchArgs::new(["name", "description"], "guitar"))
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(text(&rows[0], "name"), "Product 4");

    fx.drop_table().await
}

#[tokio::test]
async fn errors_from_the_database_pass_through() -> TableResult<()> {
    let Some(fx) = Fixture::products("db_error").await? else {
        return Ok(());
    };
    let products = fx.table();

    let existing = products.find_one(Criteria::eq("name", "Product 1")).await?.expect("row");
    let err = products
        .insert(Record::new().with("id", id_of(&existing)).with("name", "dup"))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    let err = products.find(Criteria::eq("no_such_column", 1)).await.unwrap_err();
    assert!(matches!(err, TableError::Query(_)));

    fx.drop_table().await
}

#[tokio::test]
async fn transaction_can_stand_in_for_the_client() -> TableResult<()> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set; skipping transaction_can_stand_in_for_the_client");
        return Ok(());
    };
    let (mut client, connection) = tokio_postgres::connect(&database_url, NoTls).await?;
    tokio::spawn(async move {
        let _ = connection.await;
    });

    let tx = client.transaction().await?;
    tx.batch_execute("CREATE TEMP TABLE tx_products (id serial PRIMARY KEY, name text)")
        .await?;
    let products = Table::new(TableIdentity::public("tx_products")?, &tx);
    products.insert(json!([{"name": "a"}, {"name": "b"}])).await?;
    assert_eq!(products.count(()).await?, 2);
    tx.rollback().await?;
    Ok(())
}
